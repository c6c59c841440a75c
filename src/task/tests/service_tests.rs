//! Service orchestration tests for the task lifecycle.

use std::sync::Arc;

use crate::events::services::{TaskEventFeed, TaskEventMessage, event_queue};
use crate::pagination::{Page, PageInfo};
use crate::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{ParseTaskStatusError, TaskDomainError, TaskId, TaskStatus},
    ports::{MockTaskRepository, TaskRepositoryError},
    services::{CreateTaskInput, TaskLifecycleError, TaskLifecycleService, UpdateTaskInput},
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

type TestService = TaskLifecycleService<InMemoryTaskRepository, DefaultClock>;

#[fixture]
fn harness() -> (TestService, TaskEventFeed) {
    let (notifier, feed) = event_queue(16);
    let service = TaskLifecycleService::new(
        Arc::new(InMemoryTaskRepository::new()),
        notifier,
        Arc::new(DefaultClock),
    );
    (service, feed)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_persists_and_emits_created_event(harness: (TestService, TaskEventFeed)) {
    let (service, mut feed) = harness;
    let input = CreateTaskInput::new("Draft the proposal").with_description("One pager");

    let created = service
        .create_task(input)
        .await
        .expect("creation should succeed");
    assert_eq!(created.status(), TaskStatus::Pending);
    assert_eq!(created.created_at(), created.updated_at());

    let fetched = service
        .get_task(created.id())
        .await
        .expect("lookup should succeed");
    assert_eq!(fetched, created);

    let message = feed.recv().await.expect("one event should be queued");
    let TaskEventMessage::Created(snapshot) = message else {
        panic!("expected a created event");
    };
    assert_eq!(snapshot.task_id, created.id());
    assert_eq!(snapshot.title, "Draft the proposal");
    assert_eq!(snapshot.status, TaskStatus::Pending);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_title_fails_without_persisting_or_emitting(harness: (TestService, TaskEventFeed)) {
    let (service, mut feed) = harness;

    let result = service.create_task(CreateTaskInput::new("  ")).await;
    assert!(matches!(
        result,
        Err(TaskLifecycleError::Domain(TaskDomainError::EmptyTitle))
    ));

    let (tasks, info) = service
        .list_tasks(None, Page::default())
        .await
        .expect("list should succeed");
    assert!(tasks.is_empty());
    assert_eq!(info.total_items, 0);

    drop(service);
    assert_eq!(feed.recv().await, None);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_status_fails_before_any_write(harness: (TestService, TaskEventFeed)) {
    let (service, mut feed) = harness;
    let created = service
        .create_task(CreateTaskInput::new("Stays pending"))
        .await
        .expect("creation should succeed");

    let result = service
        .update_task(created.id(), UpdateTaskInput::new().with_status("archived"))
        .await;
    assert!(matches!(
        result,
        Err(TaskLifecycleError::Domain(TaskDomainError::InvalidStatus(
            ParseTaskStatusError(value)
        ))) if value == "archived"
    ));

    let stored = service
        .get_task(created.id())
        .await
        .expect("lookup should succeed");
    assert_eq!(stored, created);

    drop(service);
    assert!(matches!(
        feed.recv().await,
        Some(TaskEventMessage::Created(_))
    ));
    assert_eq!(feed.recv().await, None);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn single_field_patches_compose(harness: (TestService, TaskEventFeed)) {
    let (service, mut feed) = harness;
    let created = service
        .create_task(CreateTaskInput::new("Original title"))
        .await
        .expect("creation should succeed");

    service
        .update_task(created.id(), UpdateTaskInput::new().with_title("New title"))
        .await
        .expect("title patch should apply");
    let updated = service
        .update_task(
            created.id(),
            UpdateTaskInput::new().with_description("New description"),
        )
        .await
        .expect("description patch should apply");

    assert_eq!(updated.title(), "New title");
    assert_eq!(updated.description(), Some("New description"));
    assert_eq!(updated.status(), TaskStatus::Pending);

    drop(service);
    assert!(matches!(
        feed.recv().await,
        Some(TaskEventMessage::Created(_))
    ));
    for _ in 0..2 {
        let message = feed.recv().await.expect("updated event should be queued");
        let TaskEventMessage::Updated(snapshot) = message else {
            panic!("expected an updated event");
        };
        assert_eq!(snapshot.task_id, created.id());
    }
    assert_eq!(feed.recv().await, None);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_update_carries_post_update_snapshot(harness: (TestService, TaskEventFeed)) {
    let (service, mut feed) = harness;
    let created = service
        .create_task(CreateTaskInput::new("Move along"))
        .await
        .expect("creation should succeed");

    service
        .update_task(
            created.id(),
            UpdateTaskInput::new().with_status("in_progress"),
        )
        .await
        .expect("status patch should apply");

    drop(service);
    assert!(matches!(
        feed.recv().await,
        Some(TaskEventMessage::Created(_))
    ));
    let message = feed.recv().await.expect("updated event should be queued");
    let TaskEventMessage::Updated(snapshot) = message else {
        panic!("expected an updated event");
    };
    assert_eq!(snapshot.status, TaskStatus::InProgress);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleted_tasks_are_absent_and_emit_nothing(harness: (TestService, TaskEventFeed)) {
    let (service, mut feed) = harness;
    let created = service
        .create_task(CreateTaskInput::new("Short lived"))
        .await
        .expect("creation should succeed");

    service
        .delete_task(created.id())
        .await
        .expect("delete should succeed");

    let lookup = service.get_task(created.id()).await;
    assert!(matches!(
        lookup,
        Err(TaskLifecycleError::Repository(
            TaskRepositoryError::NotFound(_)
        ))
    ));
    let second_delete = service.delete_task(created.id()).await;
    assert!(matches!(
        second_delete,
        Err(TaskLifecycleError::Repository(
            TaskRepositoryError::NotFound(_)
        ))
    ));

    drop(service);
    assert!(matches!(
        feed.recv().await,
        Some(TaskEventMessage::Created(_))
    ));
    assert_eq!(feed.recv().await, None);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_of_unknown_id_is_not_found(harness: (TestService, TaskEventFeed)) {
    let (service, _feed) = harness;
    let result = service.delete_task(TaskId::new()).await;
    assert!(matches!(
        result,
        Err(TaskLifecycleError::Repository(
            TaskRepositoryError::NotFound(_)
        ))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pagination_summarises_the_final_partial_page(harness: (TestService, TaskEventFeed)) {
    let (service, _feed) = harness;
    for index in 0..25 {
        service
            .create_task(CreateTaskInput::new(format!("task {index:02}")))
            .await
            .expect("creation should succeed");
    }

    let page = Page::new(3, 10).expect("valid page");
    let (tasks, info) = service
        .list_tasks(None, page)
        .await
        .expect("list should succeed");

    assert_eq!(tasks.len(), 5);
    assert_eq!(
        info,
        PageInfo {
            page: 3,
            page_size: 10,
            total_items: 25,
            total_pages: 3,
        }
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn persistence_failure_emits_no_event() {
    let mut repository = MockTaskRepository::new();
    repository.expect_create().returning(|_| {
        Err(TaskRepositoryError::persistence(std::io::Error::other(
            "disk on fire",
        )))
    });
    let (notifier, mut feed) = event_queue(16);
    let service =
        TaskLifecycleService::new(Arc::new(repository), notifier, Arc::new(DefaultClock));

    let result = service.create_task(CreateTaskInput::new("Doomed")).await;
    assert!(matches!(
        result,
        Err(TaskLifecycleError::Repository(
            TaskRepositoryError::Persistence(_)
        ))
    ));

    drop(service);
    assert_eq!(feed.recv().await, None);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_event_queue_does_not_fail_the_mutation() {
    let (notifier, mut feed) = event_queue(1);
    let service = TaskLifecycleService::new(
        Arc::new(InMemoryTaskRepository::new()),
        notifier,
        Arc::new(DefaultClock),
    );

    service
        .create_task(CreateTaskInput::new("first"))
        .await
        .expect("creation should succeed");
    let second = service
        .create_task(CreateTaskInput::new("second"))
        .await
        .expect("creation should succeed despite the full queue");
    assert_eq!(second.title(), "second");

    drop(service);
    assert!(matches!(
        feed.recv().await,
        Some(TaskEventMessage::Created(_))
    ));
    // The overflowing event was dropped, not queued behind the first.
    assert_eq!(feed.recv().await, None);
}
