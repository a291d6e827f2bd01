use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::cursor::Cursor;
use crate::error::StreamError;
use crate::handler::Handler;
use crate::sync;
use crate::topic::Topic;
use crate::Offset;

/// Registry of topics and the worker loops consuming them.
///
/// Topics are created on first use and live as long as the stream. One
/// shutdown token is shared by every worker of every subscription.
#[derive(Debug, Default)]
pub struct Stream {
    topics: RwLock<HashMap<String, Arc<Topic>>>,
    shutdown: CancellationToken,
    workers: TaskTracker,
}

impl Stream {
    pub fn new() -> Self {
        Self::default()
    }

    fn topic_or_create(&self, name: &str) -> Arc<Topic> {
        if let Some(topic) = sync::read(&self.topics, "stream topics").get(name) {
            return topic.clone();
        }

        let mut topics = sync::write(&self.topics, "stream topics");
        topics
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::info!(topic = %name, "created topic");
                Arc::new(Topic::new(name))
            })
            .clone()
    }

    /// Append `payload` to `topic` and fan it out to the topic's cursors.
    pub fn publish(&self, topic: &str, payload: impl Into<Bytes>) -> Offset {
        let offset = self.topic_or_create(topic).publish(payload.into());
        tracing::trace!(topic = %topic, offset, "published");
        offset
    }

    /// Create a cursor on `topic` and start `workers` loops feeding `handler`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn subscribe(&self, topic: &str, handler: Arc<dyn Handler>, workers: usize) -> Arc<Cursor> {
        let cursor = self.topic_or_create(topic).subscribe();
        if workers == 0 {
            tracing::warn!(topic = %topic, cursor = cursor.id(), "subscribed without workers");
        }

        for worker in 0..workers {
            self.workers.spawn(run_worker(
                cursor.clone(),
                handler.clone(),
                self.shutdown.clone(),
                worker,
            ));
        }

        tracing::info!(topic = %topic, cursor = cursor.id(), workers, "subscribed");
        cursor
    }

    /// Signal every worker to stop and wait until all of them have exited.
    ///
    /// Handlers already running are allowed to finish. Calling it again only
    /// waits for the same workers.
    pub async fn stop(&self) {
        if self.shutdown.is_cancelled() {
            tracing::warn!("stream already stopped");
        }
        self.shutdown.cancel();
        self.workers.close();
        self.workers.wait().await;
        tracing::info!("stream stopped");
    }

    pub fn is_stopped(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Number of worker loops still running.
    pub fn active_workers(&self) -> usize {
        self.workers.len()
    }

    /// Truncate every topic up to its slowest cursor's watermark. Returns
    /// the number of payloads released across all topics.
    pub fn compact(&self) -> usize {
        let topics: Vec<Arc<Topic>> = sync::read(&self.topics, "stream topics")
            .values()
            .cloned()
            .collect();

        let released = topics.iter().map(|t| t.compact()).sum();
        tracing::debug!(topics = topics.len(), released, "compacted stream");
        released
    }

    pub fn topic(&self, name: &str) -> Option<Arc<Topic>> {
        sync::read(&self.topics, "stream topics").get(name).cloned()
    }

    /// Names of all known topics, sorted.
    pub fn topic_names(&self) -> Vec<String> {
        let mut names: Vec<String> = sync::read(&self.topics, "stream topics")
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

async fn run_worker(
    cursor: Arc<Cursor>,
    handler: Arc<dyn Handler>,
    shutdown: CancellationToken,
    worker: usize,
) {
    tracing::debug!(topic = %cursor.topic(), cursor = cursor.id(), worker, "worker started");

    loop {
        let message = match cursor.claim(&shutdown).await {
            Ok(message) => message,
            Err(StreamError::Cancelled) => break,
            Err(e) => {
                tracing::warn!(topic = %cursor.topic(), cursor = cursor.id(), error = %e, "failed to claim message");
                continue;
            }
        };

        let offset = message.offset;
        if let Err(e) = handler.handle(message, shutdown.clone()).await {
            tracing::error!(
                topic = %cursor.topic(),
                cursor = cursor.id(),
                offset,
                error = %e,
                "failed to process message"
            );
        }

        if shutdown.is_cancelled() {
            break;
        }
    }

    tracing::debug!(topic = %cursor.topic(), cursor = cursor.id(), worker, "worker stopped");
}
