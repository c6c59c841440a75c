//! `PostgreSQL` repository implementation for task storage.

use super::{
    models::{NewTaskRow, TaskChangeset, TaskRow},
    schema::tasks,
};
use crate::config::DatabaseConfig;
use crate::pagination::Page;
use crate::task::{
    domain::{PersistedTaskData, Task, TaskId, TaskStatus},
    ports::{TaskFilter, TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// Statement creating the task table when the auto-migrate flag is set.
const CREATE_TASKS_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS tasks (
    id UUID PRIMARY KEY,
    title VARCHAR(255) NOT NULL,
    description TEXT,
    status VARCHAR(20) NOT NULL,
    due_date TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
)";

/// Builds a connection pool from the persistence configuration.
///
/// # Errors
///
/// Returns [`PoolError`] when the pool cannot be initialised.
pub fn build_pool(config: &DatabaseConfig) -> Result<TaskPgPool, PoolError> {
    Pool::builder()
        .max_size(config.max_pool_size)
        .max_lifetime(Some(config.connection_lifetime))
        .build(ConnectionManager::new(&config.url))
}

/// `PostgreSQL`-backed task repository.
///
/// Concurrency relies on the connection pool and the engine's isolation;
/// update/delete races are surfaced by the zero-rows-affected convention,
/// not by application-level locking.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    /// Creates missing schema objects.
    ///
    /// Called by wiring code when the auto-migrate flag is set.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when the statement
    /// fails.
    pub async fn ensure_schema(&self) -> TaskRepositoryResult<()> {
        self.run_blocking(|connection| {
            connection
                .batch_execute(CREATE_TASKS_TABLE)
                .map_err(TaskRepositoryError::persistence)
        })
        .await
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn create(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let new_row = to_new_row(task);

        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn get_by_id(&self, id: TaskId) -> TaskRepositoryResult<Task> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map_or(Err(TaskRepositoryError::NotFound(id)), row_to_task)
        })
        .await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let changeset = to_changeset(task);

        self.run_blocking(move |connection| {
            let affected = diesel::update(tasks::table.filter(tasks::id.eq(task_id.into_inner())))
                .set(&changeset)
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            if affected == 0 {
                return Err(TaskRepositoryError::NotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let affected = diesel::delete(tasks::table.filter(tasks::id.eq(id.into_inner())))
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            if affected == 0 {
                return Err(TaskRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn list(
        &self,
        filter: TaskFilter,
        page: Page,
    ) -> TaskRepositoryResult<(Vec<Task>, usize)> {
        // Count and fetch are two round-trips under the same predicate; a
        // concurrent insert or delete between them can skew the total
        // relative to the returned page. Accepted, documented race.
        self.run_blocking(move |connection| {
            let total_rows: i64 = match filter.status {
                Some(status) => tasks::table
                    .filter(tasks::status.eq(status.as_str()))
                    .count()
                    .get_result(connection),
                None => tasks::table.count().get_result(connection),
            }
            .map_err(TaskRepositoryError::persistence)?;
            let total =
                usize::try_from(total_rows).map_err(TaskRepositoryError::persistence)?;

            let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
            let limit = i64::try_from(page.size()).unwrap_or(i64::MAX);
            let rows: Vec<TaskRow> = match filter.status {
                Some(status) => tasks::table
                    .filter(tasks::status.eq(status.as_str()))
                    .order((tasks::created_at.asc(), tasks::id.asc()))
                    .offset(offset)
                    .limit(limit)
                    .select(TaskRow::as_select())
                    .load(connection),
                None => tasks::table
                    .order((tasks::created_at.asc(), tasks::id.asc()))
                    .offset(offset)
                    .limit(limit)
                    .select(TaskRow::as_select())
                    .load(connection),
            }
            .map_err(TaskRepositoryError::persistence)?;

            let listed = rows
                .into_iter()
                .map(row_to_task)
                .collect::<TaskRepositoryResult<Vec<Task>>>()?;
            Ok((listed, total))
        })
        .await
    }
}

fn to_new_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        id: task.id().into_inner(),
        title: task.title().to_owned(),
        description: task.description().map(ToOwned::to_owned),
        status: task.status().as_str().to_owned(),
        due_date: task.due_date(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

fn to_changeset(task: &Task) -> TaskChangeset {
    TaskChangeset {
        title: task.title().to_owned(),
        description: task.description().map(ToOwned::to_owned),
        status: task.status().as_str().to_owned(),
        due_date: task.due_date(),
        updated_at: task.updated_at(),
    }
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        title,
        description,
        status: persisted_status,
        due_date,
        created_at,
        updated_at,
    } = row;

    let status = TaskStatus::try_from(persisted_status.as_str())
        .map_err(TaskRepositoryError::persistence)?;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        title,
        description,
        status,
        due_date,
        created_at,
        updated_at,
    };
    Ok(Task::from_persisted(data))
}
