//! Publisher service serializing task events onto the broker.

use crate::events::domain::{TaskEventType, TaskSnapshot, TaskSnapshotEvent};
use crate::events::ports::{BrokerError, MessageBroker};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned while publishing a task event.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The event could not be serialized.
    #[error("failed to serialize event: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The broker rejected the message.
    #[error(transparent)]
    Broker(#[from] BrokerError),
}

/// Builds, serializes, and publishes task lifecycle events.
///
/// Events are keyed by task id, so all events for one task land on the
/// same partition and preserve per-task order. Once handed to the broker
/// an event is never read back or retried by this side.
#[derive(Clone)]
pub struct TaskEventPublisher<B, C>
where
    B: MessageBroker,
    C: Clock + Send + Sync,
{
    broker: Arc<B>,
    topic: String,
    clock: Arc<C>,
}

impl<B, C> TaskEventPublisher<B, C>
where
    B: MessageBroker,
    C: Clock + Send + Sync,
{
    /// Creates a publisher targeting the given topic.
    #[must_use]
    pub fn new(broker: Arc<B>, topic: impl Into<String>, clock: Arc<C>) -> Self {
        Self {
            broker,
            topic: topic.into(),
            clock,
        }
    }

    /// Publishes a task-created event for the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when serialization fails or the broker
    /// rejects the message.
    pub async fn publish_task_created(&self, snapshot: &TaskSnapshot) -> Result<(), PublishError> {
        self.publish(TaskEventType::TaskCreated, snapshot).await
    }

    /// Publishes a task-updated event for the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when serialization fails or the broker
    /// rejects the message.
    pub async fn publish_task_updated(&self, snapshot: &TaskSnapshot) -> Result<(), PublishError> {
        self.publish(TaskEventType::TaskUpdated, snapshot).await
    }

    async fn publish(
        &self,
        event_type: TaskEventType,
        snapshot: &TaskSnapshot,
    ) -> Result<(), PublishError> {
        let event = TaskSnapshotEvent::from_snapshot(event_type, snapshot, &*self.clock);
        let payload = serde_json::to_vec(&event)?;
        self.broker
            .publish(&self.topic, &snapshot.task_id.to_string(), payload)
            .await?;
        tracing::debug!(
            topic = %self.topic,
            task_id = %snapshot.task_id,
            event_type = event_type.as_str(),
            "published task event"
        );
        Ok(())
    }
}
