//! Broker port for publish/subscribe event transport.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for broker operations.
pub type BrokerResult<T> = Result<T, BrokerError>;

/// A message received from a topic subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Partition key the message was published under.
    pub key: String,
    /// Serialized message payload.
    pub payload: Vec<u8>,
    /// Position of the message in the topic, used for acknowledgement.
    pub offset: u64,
}

/// Publish/subscribe transport contract.
///
/// Messages published under the same key preserve their relative order;
/// there is no ordering guarantee across keys or topics.
#[async_trait]
pub trait MessageBroker: Send + Sync {
    /// Publishes a payload to a topic under a partition key.
    ///
    /// Blocks until the broker has accepted the message.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::QueueFull`] when the topic backlog is at
    /// capacity and [`BrokerError::Closed`] when the broker has shut down.
    async fn publish(&self, topic: &str, key: &str, payload: Vec<u8>) -> BrokerResult<()>;

    /// Opens a consumer-group subscription on a topic.
    ///
    /// The subscription starts at the group's committed offset, so
    /// messages that were delivered but never acknowledged are delivered
    /// again. Subscribing remains possible after shutdown so a restarted
    /// group can drain its uncommitted messages.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError`] on transport failure.
    async fn subscribe(&self, topic: &str, group: &str) -> BrokerResult<Box<dyn MessageStream>>;
}

/// A consumer-group subscription yielding messages in topic order.
#[async_trait]
pub trait MessageStream: Send {
    /// Waits for and returns the next message.
    ///
    /// Returns `Ok(None)` once the broker is closed and every remaining
    /// message has been delivered; treat that as normal shutdown.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError`] on transport failure.
    async fn next(&mut self) -> BrokerResult<Option<Delivery>>;

    /// Acknowledges a delivery, committing the group's offset past it.
    ///
    /// An unacknowledged message is redelivered the next time the group
    /// subscribes.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError`] on transport failure.
    async fn commit(&mut self, delivery: &Delivery) -> BrokerResult<()>;
}

/// Errors returned by broker implementations.
#[derive(Debug, Clone, Error)]
pub enum BrokerError {
    /// The topic backlog is at capacity.
    #[error("topic '{topic}' backlog is full")]
    QueueFull {
        /// The topic that rejected the publish.
        topic: String,
    },

    /// The broker has shut down.
    #[error("broker is closed")]
    Closed,

    /// Transport-layer failure.
    #[error("transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl BrokerError {
    /// Wraps a transport error.
    #[must_use]
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
