//! Taskwright: task lifecycle engine with asynchronous event propagation.
//!
//! This crate provides the core of a task management service: invariant
//! enforcement for task entities, interchangeable persistence backends, and
//! an at-least-once publish/consume pipeline for task lifecycle events.
//!
//! # Architecture
//!
//! Taskwright follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, broker)
//!
//! # Modules
//!
//! - [`task`]: Task aggregate, repository port and adapters, and the
//!   lifecycle service
//! - [`events`]: Event envelope, broker port and channel adapter, and the
//!   publisher and consumer services
//! - [`pagination`]: Page request and summary value objects
//! - [`config`]: Environment-backed runtime configuration

pub mod config;
pub mod events;
pub mod pagination;
pub mod task;
