//! Task lifecycle management.
//!
//! This module implements the task lifecycle engine: creating, reading,
//! updating, deleting, and listing task records through a repository port
//! with interchangeable in-memory and PostgreSQL adapters. Successful
//! create and update operations hand a task snapshot to the event pipeline
//! in [`crate::events`]. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
