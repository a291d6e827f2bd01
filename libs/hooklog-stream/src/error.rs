use crate::Offset;

/// Error type handlers return. Any collaborator error converts into it.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The wait in [`Cursor::claim`](crate::Cursor::claim) was cancelled.
    #[error("cancelled")]
    Cancelled,

    /// The offset was never assigned or has already been truncated.
    #[error("offset {offset} not found in topic '{topic}'")]
    OffsetNotFound { topic: String, offset: Offset },
}

impl StreamError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StreamError::Cancelled)
    }
}
