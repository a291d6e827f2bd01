use std::sync::{Arc, Mutex, RwLock};

use bytes::Bytes;
use serde::Serialize;

use crate::cursor::{Cursor, CursorId, CursorStats};
use crate::log::Log;
use crate::sync;
use crate::Offset;

/// A named log together with the cursors reading it.
#[derive(Debug)]
pub struct Topic {
    name: Arc<str>,
    log: Arc<Log>,
    cursors: RwLock<Vec<Arc<Cursor>>>,
    /// Serializes append + fan-out (and cursor registration against them)
    /// so every cursor receives offsets in the order they were assigned.
    fanout: Mutex<()>,
}

/// Point-in-time view of a topic, for inspection.
#[derive(Debug, Clone, Serialize)]
pub struct TopicStats {
    pub name: String,
    pub next_offset: Offset,
    pub low_offset: Offset,
    pub retained: usize,
    pub cursors: Vec<CursorStats>,
}

impl Topic {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            log: Arc::new(Log::new()),
            cursors: RwLock::new(Vec::new()),
            fanout: Mutex::new(()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn log(&self) -> &Log {
        &self.log
    }

    /// Register a new cursor. It receives every offset published from now on.
    pub fn subscribe(&self) -> Arc<Cursor> {
        let _serial = sync::lock(&self.fanout, "topic fanout");
        let mut cursors = sync::write(&self.cursors, "topic cursors");
        let cursor = Arc::new(Cursor::new(cursors.len(), self.name.clone(), self.log.clone()));
        cursors.push(cursor.clone());
        cursor
    }

    /// Append `payload` and hand its offset to every registered cursor.
    pub fn publish(&self, payload: Bytes) -> Offset {
        let _serial = sync::lock(&self.fanout, "topic fanout");
        let offset = self.log.append(payload);
        for cursor in sync::read(&self.cursors, "topic cursors").iter() {
            cursor.enqueue(offset);
        }
        offset
    }

    pub fn lookup(&self, offset: Offset) -> Option<Bytes> {
        self.log.lookup(offset)
    }

    pub fn cursors(&self) -> Vec<Arc<Cursor>> {
        sync::read(&self.cursors, "topic cursors").clone()
    }

    /// Committed watermark of every cursor, `None` for cursors that have
    /// nothing committed yet.
    pub fn watermarks(&self) -> Vec<(CursorId, Option<Offset>)> {
        sync::read(&self.cursors, "topic cursors")
            .iter()
            .map(|c| (c.id(), c.watermark()))
            .collect()
    }

    /// Commit `offset` for cursor `id`. See [`Cursor::commit`].
    pub fn commit(&self, id: CursorId, offset: Offset) -> bool {
        let cursor = sync::read(&self.cursors, "topic cursors").get(id).cloned();
        match cursor {
            Some(cursor) => cursor.commit(offset),
            None => {
                tracing::warn!(topic = %self.name, cursor = id, "commit for unknown cursor");
                false
            }
        }
    }

    pub fn truncate(&self, offset: Offset) -> usize {
        self.log.truncate(offset)
    }

    /// Release everything the slowest cursor has already committed.
    ///
    /// A cursor without a watermark pins the whole window. Without cursors
    /// nothing can ever be read again, so the window is emptied. Returns the
    /// number of payloads released.
    pub fn compact(&self) -> usize {
        let watermarks = self.watermarks();
        let upto = if watermarks.is_empty() {
            self.log.next_offset().checked_sub(1)
        } else {
            // None orders before Some, so one uncommitted cursor wins
            watermarks.into_iter().map(|(_, w)| w).min().flatten()
        };
        let Some(upto) = upto else {
            return 0;
        };
        let released = self.log.truncate(upto);
        if released > 0 {
            tracing::debug!(topic = %self.name, offset = upto, released, "truncated topic");
        }
        released
    }

    pub fn stats(&self) -> TopicStats {
        TopicStats {
            name: self.name.to_string(),
            next_offset: self.log.next_offset(),
            low_offset: self.log.low_offset(),
            retained: self.log.len(),
            cursors: self.cursors().iter().map(|c| c.stats()).collect(),
        }
    }
}
