//! Application services for task lifecycle orchestration.

mod lifecycle;

pub use lifecycle::{
    CreateTaskInput, TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService,
    UpdateTaskInput,
};
