//! Domain types for task lifecycle events.

mod envelope;

pub use envelope::{EventId, TaskEventEnvelope, TaskEventType, TaskSnapshot, TaskSnapshotEvent};
