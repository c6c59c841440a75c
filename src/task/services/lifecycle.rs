//! Service layer orchestrating task storage and event emission.

use crate::events::services::TaskEventNotifier;
use crate::pagination::{Page, PageInfo};
use crate::task::{
    domain::{Task, TaskDomainError, TaskId, TaskPatch, TaskStatus},
    ports::{TaskFilter, TaskRepository, TaskRepositoryError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskInput {
    title: String,
    description: Option<String>,
    due_date: Option<DateTime<Utc>>,
}

impl CreateTaskInput {
    /// Creates a request with the required title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            due_date: None,
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Request payload for partially updating a task.
///
/// Absent fields leave the stored value untouched. The status arrives as
/// an untrusted string and must parse to the enumeration before any write
/// happens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskInput {
    title: Option<String>,
    description: Option<String>,
    status: Option<String>,
    due_date: Option<DateTime<Utc>>,
}

impl UpdateTaskInput {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a replacement title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets a replacement description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets a replacement status from its wire representation.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Sets a replacement due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
///
/// Single source of truth for task invariants. Storage writes are
/// synchronous and authoritative; event emission is an asynchronous,
/// best-effort enqueue that never fails the triggering operation. Each
/// storage operation is attempted exactly once — no retry logic lives
/// here.
#[derive(Clone)]
pub struct TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    events: TaskEventNotifier,
    clock: Arc<C>,
}

impl<R, C> TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(repository: Arc<R>, events: TaskEventNotifier, clock: Arc<C>) -> Self {
        Self {
            repository,
            events,
            clock,
        }
    }

    /// Creates and persists a new pending task, then requests publication
    /// of a task-created event.
    ///
    /// No event is emitted when persistence fails.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the title is empty or the
    /// repository rejects the write.
    pub async fn create_task(&self, input: CreateTaskInput) -> TaskLifecycleResult<Task> {
        let task = Task::new(
            input.title,
            input.description,
            input.due_date,
            &*self.clock,
        )?;
        self.repository.create(&task).await?;
        self.events.task_created(&task);
        Ok(task)
    }

    /// Fetches a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] verbatim when the task
    /// does not exist.
    pub async fn get_task(&self, id: TaskId) -> TaskLifecycleResult<Task> {
        Ok(self.repository.get_by_id(id).await?)
    }

    /// Applies a partial update to an existing task, then requests
    /// publication of a task-updated event with the post-update snapshot.
    ///
    /// An invalid status value fails the operation before any write.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task does not exist, the
    /// patch is invalid, or the repository rejects the write.
    pub async fn update_task(
        &self,
        id: TaskId,
        input: UpdateTaskInput,
    ) -> TaskLifecycleResult<Task> {
        let status = input
            .status
            .as_deref()
            .map(TaskStatus::try_from)
            .transpose()
            .map_err(TaskDomainError::from)?;

        let mut task = self.repository.get_by_id(id).await?;
        task.apply_patch(
            TaskPatch {
                title: input.title,
                description: input.description,
                status,
                due_date: input.due_date,
            },
            &*self.clock,
        )?;
        self.repository.update(&task).await?;
        self.events.task_updated(&task);
        Ok(task)
    }

    /// Removes a task. No event is emitted for deletion.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] verbatim when the task
    /// does not exist.
    pub async fn delete_task(&self, id: TaskId) -> TaskLifecycleResult<()> {
        Ok(self.repository.delete(id).await?)
    }

    /// Lists tasks with an optional status filter and pagination summary.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the listing fails.
    pub async fn list_tasks(
        &self,
        status: Option<TaskStatus>,
        page: Page,
    ) -> TaskLifecycleResult<(Vec<Task>, PageInfo)> {
        let filter = status.map_or_else(TaskFilter::all, TaskFilter::by_status);
        let (tasks, total) = self.repository.list(filter, page).await?;
        Ok((tasks, PageInfo::for_page(page, total)))
    }
}
