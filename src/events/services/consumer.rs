//! Consumer loop dispatching broker messages to event handlers.

use crate::events::domain::{TaskEventEnvelope, TaskEventType, TaskSnapshotEvent};
use crate::events::ports::{Delivery, MessageStream};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[cfg(test)]
use mockall::automock;

/// Opaque failure reported by an event handler.
#[derive(Debug, Clone, Error)]
#[error("event handler failure: {0}")]
pub struct EventHandlerError(Arc<dyn std::error::Error + Send + Sync>);

impl EventHandlerError {
    /// Wraps a handler error.
    #[must_use]
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}

/// Business reactions to task lifecycle events.
///
/// Handlers must tolerate duplicate deliveries: at-least-once semantics
/// mean a handled-but-uncommitted event is delivered again after a
/// restart, and no deduplication by event id happens upstream.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TaskEventHandler: Send + Sync {
    /// Reacts to a task-created event.
    ///
    /// # Errors
    ///
    /// Returns [`EventHandlerError`] when the reaction fails; the message
    /// is left unacknowledged and redelivered later.
    async fn on_task_created(&self, event: &TaskSnapshotEvent) -> Result<(), EventHandlerError>;

    /// Reacts to a task-updated event.
    ///
    /// # Errors
    ///
    /// Returns [`EventHandlerError`] when the reaction fails; the message
    /// is left unacknowledged and redelivered later.
    async fn on_task_updated(&self, event: &TaskSnapshotEvent) -> Result<(), EventHandlerError>;
}

/// Placeholder sink that logs each event.
///
/// Future business reactions attach here by replacing this handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventHandler;

#[async_trait]
impl TaskEventHandler for LoggingEventHandler {
    async fn on_task_created(&self, event: &TaskSnapshotEvent) -> Result<(), EventHandlerError> {
        tracing::info!(
            task_id = %event.envelope.task_id,
            title = %event.title,
            "processing task created event"
        );
        Ok(())
    }

    async fn on_task_updated(&self, event: &TaskSnapshotEvent) -> Result<(), EventHandlerError> {
        tracing::info!(
            task_id = %event.envelope.task_id,
            title = %event.title,
            "processing task updated event"
        );
        Ok(())
    }
}

/// Errors raised while processing a single delivery.
#[derive(Debug, Error)]
pub enum ConsumeError {
    /// The payload could not be deserialized.
    #[error("failed to decode event payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// The handler rejected the event.
    #[error(transparent)]
    Handler(#[from] EventHandlerError),
}

/// Long-lived loop consuming task events from a broker subscription.
///
/// Each successfully handled message is acknowledged so it is not
/// redelivered; a failed message is logged and left unacknowledged, to be
/// retried when the consumer group resubscribes.
pub struct TaskEventConsumer<H>
where
    H: TaskEventHandler,
{
    stream: Box<dyn MessageStream>,
    handler: H,
}

impl<H> TaskEventConsumer<H>
where
    H: TaskEventHandler,
{
    /// Creates a consumer over an open subscription.
    #[must_use]
    pub fn new(stream: Box<dyn MessageStream>, handler: H) -> Self {
        Self { stream, handler }
    }

    /// Runs until cancelled or the broker shuts down.
    ///
    /// Cancellation is treated as a normal shutdown, not an error.
    pub async fn run(mut self, shutdown: CancellationToken) {
        let cancelled = shutdown.cancelled_owned();
        tokio::pin!(cancelled);
        loop {
            tokio::select! {
                () = &mut cancelled => {
                    tracing::info!("event consumer shutting down");
                    break;
                }
                received = self.stream.next() => match received {
                    Ok(Some(delivery)) => self.process(&delivery).await,
                    Ok(None) => {
                        tracing::info!("broker closed, consumer ending");
                        break;
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "broker transport failure, consumer ending");
                        break;
                    }
                },
            }
        }
    }

    async fn process(&mut self, delivery: &Delivery) {
        match dispatch(&self.handler, delivery).await {
            Ok(()) => {
                if let Err(err) = self.stream.commit(delivery).await {
                    tracing::error!(
                        offset = delivery.offset,
                        error = %err,
                        "failed to acknowledge task event"
                    );
                }
            }
            Err(err) => {
                // No acknowledgment: the message is redelivered on the
                // group's next subscription.
                tracing::error!(
                    offset = delivery.offset,
                    error = %err,
                    "failed to process task event"
                );
            }
        }
    }
}

/// Parses the base envelope and routes to the type-specific handler.
///
/// Unknown event types are skipped without error so that consumers built
/// before a new event type keep working.
async fn dispatch<H>(handler: &H, delivery: &Delivery) -> Result<(), ConsumeError>
where
    H: TaskEventHandler,
{
    let envelope: TaskEventEnvelope = serde_json::from_slice(&delivery.payload)?;
    match envelope.event_type {
        TaskEventType::TaskCreated => {
            let event: TaskSnapshotEvent = serde_json::from_slice(&delivery.payload)?;
            handler.on_task_created(&event).await?;
        }
        TaskEventType::TaskUpdated => {
            let event: TaskSnapshotEvent = serde_json::from_slice(&delivery.payload)?;
            handler.on_task_updated(&event).await?;
        }
        TaskEventType::Unknown => {
            tracing::warn!(
                event_id = %envelope.event_id,
                task_id = %envelope.task_id,
                "ignoring unknown task event type"
            );
        }
    }
    Ok(())
}
