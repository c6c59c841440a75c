//! In-memory repository backed by a reader/writer-locked map.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::pagination::Page;
use crate::task::{
    domain::{Task, TaskId},
    ports::{TaskFilter, TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// Reads take the shared lock and return deep copies, so callers can never
/// mutate shared state; writes are serialized behind the exclusive lock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    tasks: Arc<RwLock<HashMap<TaskId, Task>>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned(message: String) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(message))
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut tasks = self.tasks.write().map_err(|err| lock_poisoned(err.to_string()))?;
        if tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: TaskId) -> TaskRepositoryResult<Task> {
        let tasks = self.tasks.read().map_err(|err| lock_poisoned(err.to_string()))?;
        tasks
            .get(&id)
            .cloned()
            .ok_or(TaskRepositoryError::NotFound(id))
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut tasks = self.tasks.write().map_err(|err| lock_poisoned(err.to_string()))?;
        if !tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::NotFound(task.id()));
        }
        tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        let mut tasks = self.tasks.write().map_err(|err| lock_poisoned(err.to_string()))?;
        tasks
            .remove(&id)
            .map(|_| ())
            .ok_or(TaskRepositoryError::NotFound(id))
    }

    async fn list(
        &self,
        filter: TaskFilter,
        page: Page,
    ) -> TaskRepositoryResult<(Vec<Task>, usize)> {
        let tasks = self.tasks.read().map_err(|err| lock_poisoned(err.to_string()))?;

        let mut matches: Vec<Task> = tasks
            .values()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect();
        matches.sort_by_key(|task| (task.created_at(), task.id()));

        let total = matches.len();
        let paged: Vec<Task> = matches
            .into_iter()
            .skip(page.offset())
            .take(page.size())
            .collect();

        Ok((paged, total))
    }
}
