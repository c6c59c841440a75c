//! Services for the event publish/consume pipeline.

mod consumer;
mod publisher;
mod relay;

pub use consumer::{
    ConsumeError, EventHandlerError, LoggingEventHandler, TaskEventConsumer, TaskEventHandler,
};
pub use publisher::{PublishError, TaskEventPublisher};
pub use relay::{TaskEventFeed, TaskEventMessage, TaskEventNotifier, TaskEventRelay, event_queue};

#[cfg(test)]
pub use consumer::MockTaskEventHandler;
