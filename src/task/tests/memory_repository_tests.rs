//! Unit tests for the in-memory repository adapter.

use crate::pagination::Page;
use crate::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{Task, TaskId, TaskPatch, TaskStatus},
    ports::{TaskFilter, TaskRepository, TaskRepositoryError},
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn repository() -> InMemoryTaskRepository {
    InMemoryTaskRepository::new()
}

fn sample_task(title: &str) -> Task {
    Task::new(title, None, None, &DefaultClock).expect("valid task")
}

#[rstest]
#[tokio::test]
async fn create_then_get_round_trips(repository: InMemoryTaskRepository) {
    let task = sample_task("stored");
    repository.create(&task).await.expect("create should succeed");

    let fetched = repository
        .get_by_id(task.id())
        .await
        .expect("get should succeed");
    assert_eq!(fetched, task);
}

#[rstest]
#[tokio::test]
async fn duplicate_identifier_is_rejected(repository: InMemoryTaskRepository) {
    let task = sample_task("first");
    repository.create(&task).await.expect("create should succeed");

    let result = repository.create(&task).await;
    assert!(matches!(
        result,
        Err(TaskRepositoryError::DuplicateTask(id)) if id == task.id()
    ));
}

#[rstest]
#[tokio::test]
async fn get_returns_a_deep_copy(repository: InMemoryTaskRepository) {
    let task = sample_task("immutable from outside");
    repository.create(&task).await.expect("create should succeed");

    let mut fetched = repository
        .get_by_id(task.id())
        .await
        .expect("get should succeed");
    fetched
        .apply_patch(
            TaskPatch {
                status: Some(TaskStatus::Completed),
                ..TaskPatch::default()
            },
            &DefaultClock,
        )
        .expect("patch should apply");

    let refetched = repository
        .get_by_id(task.id())
        .await
        .expect("get should succeed");
    assert_eq!(refetched.status(), TaskStatus::Pending);
}

#[rstest]
#[tokio::test]
async fn update_of_missing_task_is_not_found(repository: InMemoryTaskRepository) {
    let task = sample_task("never stored");
    let result = repository.update(&task).await;
    assert!(matches!(result, Err(TaskRepositoryError::NotFound(_))));
}

#[rstest]
#[tokio::test]
async fn delete_of_missing_task_is_not_found(repository: InMemoryTaskRepository) {
    let result = repository.delete(TaskId::new()).await;
    assert!(matches!(result, Err(TaskRepositoryError::NotFound(_))));
}

#[rstest]
#[tokio::test]
async fn list_filters_by_status(repository: InMemoryTaskRepository) {
    let pending = sample_task("pending work");
    let mut completed = sample_task("finished work");
    completed
        .apply_patch(
            TaskPatch {
                status: Some(TaskStatus::Completed),
                ..TaskPatch::default()
            },
            &DefaultClock,
        )
        .expect("patch should apply");

    repository
        .create(&pending)
        .await
        .expect("create should succeed");
    repository
        .create(&completed)
        .await
        .expect("create should succeed");

    let (tasks, total) = repository
        .list(TaskFilter::by_status(TaskStatus::Completed), Page::default())
        .await
        .expect("list should succeed");

    assert_eq!(total, 1);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks.first().map(Task::id), Some(completed.id()));
}

#[rstest]
#[tokio::test]
async fn offset_past_the_end_yields_an_empty_page(repository: InMemoryTaskRepository) {
    for index in 0..3 {
        repository
            .create(&sample_task(&format!("task {index}")))
            .await
            .expect("create should succeed");
    }

    let page = Page::new(5, 10).expect("valid page");
    let (tasks, total) = repository
        .list(TaskFilter::all(), page)
        .await
        .expect("list should succeed");

    assert_eq!(total, 3);
    assert!(tasks.is_empty());
}

#[rstest]
#[tokio::test]
async fn listing_is_stable_across_calls(repository: InMemoryTaskRepository) {
    for index in 0..10 {
        repository
            .create(&sample_task(&format!("task {index}")))
            .await
            .expect("create should succeed");
    }

    let page = Page::new(1, 10).expect("valid page");
    let (first, _) = repository
        .list(TaskFilter::all(), page)
        .await
        .expect("list should succeed");
    let (second, _) = repository
        .list(TaskFilter::all(), page)
        .await
        .expect("list should succeed");

    let first_ids: Vec<_> = first.iter().map(Task::id).collect();
    let second_ids: Vec<_> = second.iter().map(Task::id).collect();
    assert_eq!(first_ids, second_ids);
}
