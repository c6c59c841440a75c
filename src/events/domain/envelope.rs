//! Event envelope and snapshot types.
//!
//! The wire format is JSON: a base envelope `{event_id, task_id,
//! event_type, timestamp}` extended by snapshot fields `{title,
//! description, status}` for the task-created and task-updated events.
//! Consumers parse the base envelope first so that unknown future event
//! types can be skipped instead of failing deserialization.

use crate::task::domain::{Task, TaskId, TaskStatus};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a single event emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random event identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an event identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of task lifecycle transition an event describes.
///
/// Wire values outside the enumeration deserialize to [`Unknown`] so that
/// consumers tolerate event types introduced after they were built.
///
/// [`Unknown`]: TaskEventType::Unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskEventType {
    /// A task was created.
    #[serde(rename = "TASK_CREATED")]
    TaskCreated,
    /// A task was updated.
    #[serde(rename = "TASK_UPDATED")]
    TaskUpdated,
    /// An event type this build does not recognise.
    #[serde(other)]
    Unknown,
}

impl TaskEventType {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TaskCreated => "TASK_CREATED",
            Self::TaskUpdated => "TASK_UPDATED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Base event envelope shared by every task event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEventEnvelope {
    /// Unique identifier of this emission.
    pub event_id: EventId,
    /// Identifier of the task the event refers to. A reference, not
    /// ownership: the task may since have changed or been deleted.
    pub task_id: TaskId,
    /// The lifecycle transition described.
    pub event_type: TaskEventType,
    /// When the event was emitted.
    pub timestamp: DateTime<Utc>,
}

/// Capture of the task fields carried by an event, taken at emission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSnapshot {
    /// Identifier of the snapshotted task.
    pub task_id: TaskId,
    /// Title at emission time.
    pub title: String,
    /// Description at emission time.
    pub description: Option<String>,
    /// Status at emission time.
    pub status: TaskStatus,
}

impl TaskSnapshot {
    /// Captures the event-carried fields of a task.
    #[must_use]
    pub fn of(task: &Task) -> Self {
        Self {
            task_id: task.id(),
            title: task.title().to_owned(),
            description: task.description().map(ToOwned::to_owned),
            status: task.status(),
        }
    }
}

/// A task event carrying the full snapshot payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSnapshotEvent {
    /// Base envelope fields, flattened into the JSON object.
    #[serde(flatten)]
    pub envelope: TaskEventEnvelope,
    /// Title at emission time.
    pub title: String,
    /// Description at emission time.
    pub description: Option<String>,
    /// Status at emission time.
    pub status: TaskStatus,
}

impl TaskSnapshotEvent {
    /// Builds an event from a snapshot with a fresh event identifier and
    /// the current clock time.
    #[must_use]
    pub fn from_snapshot(
        event_type: TaskEventType,
        snapshot: &TaskSnapshot,
        clock: &impl Clock,
    ) -> Self {
        Self {
            envelope: TaskEventEnvelope {
                event_id: EventId::new(),
                task_id: snapshot.task_id,
                event_type,
                timestamp: clock.utc(),
            },
            title: snapshot.title.clone(),
            description: snapshot.description.clone(),
            status: snapshot.status,
        }
    }
}
