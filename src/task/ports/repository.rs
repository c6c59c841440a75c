//! Repository port for task persistence, lookup, and listing.

use crate::pagination::Page;
use crate::task::domain::{Task, TaskId, TaskStatus};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Optional predicates applied to [`TaskRepository::list`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Equality predicate on the task status.
    pub status: Option<TaskStatus>,
}

impl TaskFilter {
    /// Creates a filter matching every task.
    #[must_use]
    pub const fn all() -> Self {
        Self { status: None }
    }

    /// Creates a filter matching tasks in the given status.
    #[must_use]
    pub const fn by_status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
        }
    }

    /// Returns whether the task satisfies every predicate in the filter.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.status.is_none_or(|status| task.status() == status)
    }
}

/// Task persistence contract.
///
/// Both adapters must produce equivalent observable behavior for this
/// contract; that equivalence is what allows swapping implementations at
/// startup without touching the service layer. `list` orders results by
/// `(created_at, id)` so pagination is deterministic.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID
    /// already exists.
    async fn create(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Fetches a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist.
    async fn get_by_id(&self, id: TaskId) -> TaskRepositoryResult<Task>;

    /// Persists changes to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist. An update racing a delete surfaces this way rather than
    /// through locking.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Removes a task. Hard delete, no tombstone.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist.
    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()>;

    /// Lists tasks matching the filter, paged, together with the total
    /// match count across all pages.
    ///
    /// An offset past the end of the result set yields an empty page, not
    /// an error.
    async fn list(&self, filter: TaskFilter, page: Page) -> TaskRepositoryResult<(Vec<Task>, usize)>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    #[must_use]
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
