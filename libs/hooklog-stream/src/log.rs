use std::collections::VecDeque;
use std::sync::RwLock;

use bytes::Bytes;

use crate::Offset;
use crate::sync;

/// Retained payloads covering offsets `[low, next)`.
///
/// `entries[i]` holds offset `low + i`, so the window doubles as the
/// offset index: it only grows at the back and only shrinks at the front.
#[derive(Debug, Default)]
struct Window {
    low: Offset,
    next: Offset,
    entries: VecDeque<Bytes>,
}

impl Window {
    fn position(&self, offset: Offset) -> Option<usize> {
        if offset < self.low || offset >= self.next {
            return None;
        }
        usize::try_from(offset - self.low).ok()
    }
}

/// Append-only payload storage of one topic.
#[derive(Debug, Default)]
pub struct Log {
    window: RwLock<Window>,
}

impl Log {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `payload` under the next offset and return that offset.
    pub fn append(&self, payload: Bytes) -> Offset {
        let mut window = sync::write(&self.window, "log window");
        let offset = window.next;
        window.entries.push_back(payload);
        window.next += 1;
        offset
    }

    /// Payload stored under `offset`, if it is still retained.
    pub fn lookup(&self, offset: Offset) -> Option<Bytes> {
        let window = sync::read(&self.window, "log window");
        let pos = window.position(offset)?;
        window.entries.get(pos).cloned()
    }

    /// The write frontier: offset the next append will get.
    pub fn next_offset(&self) -> Offset {
        sync::read(&self.window, "log window").next
    }

    /// Lowest retained offset. Equals [`next_offset`](Self::next_offset) when
    /// nothing is retained.
    pub fn low_offset(&self) -> Offset {
        sync::read(&self.window, "log window").low
    }

    pub fn len(&self) -> usize {
        sync::read(&self.window, "log window").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discard every retained payload with an offset `<= offset`.
    ///
    /// Offsets past the frontier clamp to it, so the window is emptied but
    /// never moves ahead of offsets that were actually assigned. Returns the
    /// number of payloads released.
    pub fn truncate(&self, offset: Offset) -> usize {
        let mut window = sync::write(&self.window, "log window");
        if offset < window.low {
            return 0;
        }
        let end = offset.saturating_add(1).min(window.next);
        let count = window.entries.len().min((end - window.low) as usize);
        window.entries.drain(..count);
        window.low = end;
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(n: u8) -> Log {
        let log = Log::new();
        for i in 0..n {
            log.append(Bytes::from(vec![b'A' + i]));
        }
        log
    }

    #[test]
    fn offsets_start_at_zero_and_increase() {
        let log = Log::new();
        assert_eq!(log.append(Bytes::from_static(b"a")), 0);
        assert_eq!(log.append(Bytes::from_static(b"b")), 1);
        assert_eq!(log.append(Bytes::new()), 2);
        assert_eq!(log.next_offset(), 3);
        assert_eq!(log.lookup(2), Some(Bytes::new()));
        assert_eq!(log.lookup(3), None);
    }

    #[test]
    fn truncate_discards_prefix_only() {
        let log = filled(10);

        assert_eq!(log.truncate(2), 3);
        for offset in 0..=2 {
            assert_eq!(log.lookup(offset), None, "offset {offset}");
        }
        for offset in 3..10 {
            let want = Bytes::from(vec![b'A' + offset as u8]);
            assert_eq!(log.lookup(offset), Some(want), "offset {offset}");
        }
        assert_eq!(log.low_offset(), 3);
        assert_eq!(log.len(), 7);

        // offsets keep counting from the frontier, not from the window
        assert_eq!(log.append(Bytes::from_static(b"x")), 10);
        assert_eq!(log.lookup(10), Some(Bytes::from_static(b"x")));
    }

    #[test]
    fn truncate_below_window_is_noop() {
        let log = filled(5);
        log.truncate(3);
        assert_eq!(log.truncate(1), 0);
        assert_eq!(log.lookup(4), Some(Bytes::from_static(b"E")));
    }

    #[test]
    fn truncate_past_frontier_clamps() {
        let log = filled(3);
        assert_eq!(log.truncate(100), 3);
        assert!(log.is_empty());
        assert_eq!(log.low_offset(), 3);
        assert_eq!(log.append(Bytes::from_static(b"D")), 3);
        assert_eq!(log.lookup(3), Some(Bytes::from_static(b"D")));
    }
}
