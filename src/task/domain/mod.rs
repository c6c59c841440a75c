//! Domain model for task lifecycle management.
//!
//! The task domain models the task aggregate, its status enumeration, and
//! partial-update semantics while keeping all infrastructure concerns
//! outside of the domain boundary.

mod error;
mod ids;
mod task;

pub use error::{ParseTaskStatusError, TaskDomainError};
pub use ids::TaskId;
pub use task::{PersistedTaskData, Task, TaskPatch, TaskStatus};
