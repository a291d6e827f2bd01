//! In-process publish/subscribe log.
//!
//! A [`Stream`] owns named topics. Every topic is an append-only [`Log`] of
//! opaque payloads addressed by strictly increasing offsets. Consumers
//! subscribe with a [`Handler`] and a worker count; each subscription gets
//! its own [`Cursor`] that sees every offset published after it was
//! created. Committed watermarks drive [`Stream::compact`], the only way
//! retained payloads are released.
//!
//! Nothing here survives the process: the log is memory-resident and
//! delivery is best-effort.

pub mod error;
mod cursor;
mod handler;
mod log;
mod stream;
mod sync;
mod topic;

pub use cursor::{Cursor, CursorId, CursorStats};
pub use error::{BoxError, StreamError};
pub use handler::{Handler, HandlerFn, handler_fn};
pub use log::Log;
pub use stream::Stream;
pub use topic::{Topic, TopicStats};

pub use bytes::Bytes;
pub use tokio_util::sync::CancellationToken;

/// Position of a payload within its topic.
pub type Offset = u64;

/// A payload delivered to a handler together with its offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub offset: Offset,
    pub payload: Bytes,
}
