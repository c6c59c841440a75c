//! Bounded queue decoupling task mutations from event publication.
//!
//! The lifecycle service enqueues snapshots through a [`TaskEventNotifier`]
//! without awaiting broker acknowledgment; a dedicated [`TaskEventRelay`]
//! task drains the queue and drives the publisher. A full or closed queue
//! drops the event with a warning rather than failing the task mutation —
//! publish failures are explicitly not rolled back against the persisted
//! write.

use crate::events::domain::TaskSnapshot;
use crate::events::ports::MessageBroker;
use crate::events::services::publisher::TaskEventPublisher;
use crate::task::domain::Task;
use mockable::Clock;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// A snapshot queued for publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEventMessage {
    /// The task was created.
    Created(TaskSnapshot),
    /// The task was updated.
    Updated(TaskSnapshot),
}

/// Creates the bounded queue connecting the lifecycle service to the
/// publisher task.
#[must_use]
pub fn event_queue(capacity: usize) -> (TaskEventNotifier, TaskEventFeed) {
    let (sender, receiver) = mpsc::channel(capacity);
    (TaskEventNotifier { sender }, TaskEventFeed { receiver })
}

/// Cheap cloneable handle for enqueueing task events.
#[derive(Debug, Clone)]
pub struct TaskEventNotifier {
    sender: mpsc::Sender<TaskEventMessage>,
}

impl TaskEventNotifier {
    /// Enqueues a task-created event with a snapshot taken now.
    pub fn task_created(&self, task: &Task) {
        self.enqueue(TaskEventMessage::Created(TaskSnapshot::of(task)));
    }

    /// Enqueues a task-updated event with a snapshot taken now.
    pub fn task_updated(&self, task: &Task) {
        self.enqueue(TaskEventMessage::Updated(TaskSnapshot::of(task)));
    }

    fn enqueue(&self, message: TaskEventMessage) {
        let (TaskEventMessage::Created(snapshot) | TaskEventMessage::Updated(snapshot)) = &message;
        let task_id = snapshot.task_id;
        match self.sender.try_send(message) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(%task_id, "event queue full, dropping task event");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!(%task_id, "event queue closed, dropping task event");
            }
        }
    }
}

/// Receiving end of the event queue, owned by the relay task.
#[derive(Debug)]
pub struct TaskEventFeed {
    receiver: mpsc::Receiver<TaskEventMessage>,
}

impl TaskEventFeed {
    /// Waits for the next queued event.
    ///
    /// Returns `None` once every notifier has been dropped and the queue
    /// is drained.
    pub async fn recv(&mut self) -> Option<TaskEventMessage> {
        self.receiver.recv().await
    }
}

/// Long-lived task draining the event queue into the publisher.
pub struct TaskEventRelay<B, C>
where
    B: MessageBroker,
    C: Clock + Send + Sync,
{
    feed: TaskEventFeed,
    publisher: TaskEventPublisher<B, C>,
}

impl<B, C> TaskEventRelay<B, C>
where
    B: MessageBroker,
    C: Clock + Send + Sync,
{
    /// Creates a relay draining `feed` into `publisher`.
    #[must_use]
    pub const fn new(feed: TaskEventFeed, publisher: TaskEventPublisher<B, C>) -> Self {
        Self { feed, publisher }
    }

    /// Runs until cancelled or the queue's senders are gone.
    ///
    /// Publish failures are logged and swallowed here; there is no retry
    /// and no outbox compensation.
    pub async fn run(mut self, shutdown: CancellationToken) {
        let cancelled = shutdown.cancelled_owned();
        tokio::pin!(cancelled);
        loop {
            tokio::select! {
                () = &mut cancelled => {
                    tracing::info!("event relay shutting down");
                    break;
                }
                message = self.feed.recv() => match message {
                    Some(message) => self.dispatch(&message).await,
                    None => {
                        tracing::info!("event queue closed, relay ending");
                        break;
                    }
                },
            }
        }
    }

    async fn dispatch(&self, message: &TaskEventMessage) {
        let result = match message {
            TaskEventMessage::Created(snapshot) => {
                self.publisher.publish_task_created(snapshot).await
            }
            TaskEventMessage::Updated(snapshot) => {
                self.publisher.publish_task_updated(snapshot).await
            }
        };
        if let Err(err) = result {
            let (TaskEventMessage::Created(snapshot) | TaskEventMessage::Updated(snapshot)) =
                message;
            tracing::error!(
                task_id = %snapshot.task_id,
                error = %err,
                "failed to publish task event"
            );
        }
    }
}
