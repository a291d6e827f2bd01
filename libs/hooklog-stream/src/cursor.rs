use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::error::StreamError;
use crate::log::Log;
use crate::sync;
use crate::{Message, Offset};

/// Ordinal of a cursor within its topic.
pub type CursorId = usize;

/// One offset ready to be claimed, followed by everything that arrived
/// while it was waiting. Arrival order is publish order.
#[derive(Debug, Default)]
struct Dispatch {
    slot: Option<Offset>,
    backlog: VecDeque<Offset>,
}

impl Dispatch {
    /// Take the slot and promote the oldest queued offset into it.
    /// The flag tells whether the slot was refilled.
    fn take(&mut self) -> Option<(Offset, bool)> {
        let offset = self.slot.take()?;
        self.slot = self.backlog.pop_front();
        Some((offset, self.slot.is_some()))
    }
}

/// Reading position of one consumer group over a topic.
///
/// The producer side ([`enqueue`](Self::enqueue)) never waits: if the slot is
/// taken the offset joins an unbounded queue. Any number of workers may
/// [`claim`](Self::claim) concurrently; each slot fill goes to exactly one of
/// them. Which waiter wins a race is up to the scheduler.
#[derive(Debug)]
pub struct Cursor {
    id: CursorId,
    topic: Arc<str>,
    log: Arc<Log>,
    dispatch: Mutex<Dispatch>,
    ready: Notify,
    /// Highest committed offset. `None` until anything is committed on a
    /// topic that was empty at subscription time.
    watermark: Mutex<Option<Offset>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CursorStats {
    pub id: CursorId,
    pub watermark: Option<Offset>,
    pub backlog: usize,
}

impl Cursor {
    pub(crate) fn new(id: CursorId, topic: Arc<str>, log: Arc<Log>) -> Self {
        // Offsets assigned before subscription are never delivered here,
        // so they count as handled from the start.
        let watermark = log.next_offset().checked_sub(1);
        Self {
            id,
            topic,
            log,
            dispatch: Mutex::new(Dispatch::default()),
            ready: Notify::new(),
            watermark: Mutex::new(watermark),
        }
    }

    pub fn id(&self) -> CursorId {
        self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn watermark(&self) -> Option<Offset> {
        *sync::lock(&self.watermark, "cursor watermark")
    }

    /// Offsets delivered to this cursor but not claimed yet.
    pub fn backlog(&self) -> usize {
        let dispatch = sync::lock(&self.dispatch, "cursor dispatch");
        dispatch.backlog.len() + usize::from(dispatch.slot.is_some())
    }

    pub fn stats(&self) -> CursorStats {
        CursorStats {
            id: self.id,
            watermark: self.watermark(),
            backlog: self.backlog(),
        }
    }

    /// Hand `offset` to this cursor. Never blocks.
    pub(crate) fn enqueue(&self, offset: Offset) {
        let mut dispatch = sync::lock(&self.dispatch, "cursor dispatch");
        if dispatch.slot.is_none() {
            dispatch.slot = Some(offset);
            drop(dispatch);
            self.ready.notify_one();
        } else {
            dispatch.backlog.push_back(offset);
        }
    }

    /// Wait for the next offset, resolve its payload and commit it.
    ///
    /// Returns [`StreamError::Cancelled`] once `cancel` fires while waiting,
    /// and [`StreamError::OffsetNotFound`] when the offset was compacted away
    /// before it could be read. In the latter case the offset is consumed.
    pub async fn claim(&self, cancel: &CancellationToken) -> Result<Message, StreamError> {
        let (offset, refilled) = loop {
            let notified = self.ready.notified();
            tokio::pin!(notified);
            // register before looking at the slot so a concurrent fill
            // cannot slip between the check and the wait
            notified.as_mut().enable();

            let taken = sync::lock(&self.dispatch, "cursor dispatch").take();
            if let Some(taken) = taken {
                break taken;
            }

            tokio::select! {
                _ = &mut notified => {}
                _ = cancel.cancelled() => {
                    if sync::lock(&self.dispatch, "cursor dispatch").slot.is_some() {
                        self.ready.notify_one();
                    }
                    return Err(StreamError::Cancelled);
                }
            }
        };

        if refilled {
            self.ready.notify_one();
        }

        let Some(payload) = self.log.lookup(offset) else {
            return Err(StreamError::OffsetNotFound {
                topic: self.topic.to_string(),
                offset,
            });
        };

        self.commit(offset);

        Ok(Message { offset, payload })
    }

    /// Move the watermark to `offset`.
    ///
    /// A move backwards is rejected only while `offset` is also below the
    /// write frontier; at or past the frontier the new value always wins.
    /// Returns whether the watermark was updated.
    pub fn commit(&self, offset: Offset) -> bool {
        let frontier = self.log.next_offset();
        let mut watermark = sync::lock(&self.watermark, "cursor watermark");
        if let Some(current) = *watermark {
            if current > offset && frontier > offset {
                tracing::warn!(
                    topic = %self.topic,
                    cursor = self.id,
                    current,
                    offset,
                    "rejected watermark regression"
                );
                return false;
            }
        }
        *watermark = Some(offset);
        true
    }
}
