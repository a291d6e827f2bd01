use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::Message;
use crate::error::BoxError;

/// Capability invoked once per delivered message.
///
/// `shutdown` fires when the stream stops. The worker never interrupts a
/// running call; long handlers may watch the token to return early.
pub trait Handler: Send + Sync {
    fn handle(
        &self,
        message: Message,
        shutdown: CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + '_>>;
}

/// Adapter turning an async closure into a [`Handler`].
pub struct HandlerFn<F>(F);

pub fn handler_fn<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(Message, CancellationToken) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    HandlerFn(f)
}

impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Message, CancellationToken) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    fn handle(
        &self,
        message: Message,
        shutdown: CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + '_>> {
        Box::pin((self.0)(message, shutdown))
    }
}
