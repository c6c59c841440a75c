//! Task lifecycle event propagation.
//!
//! Successful task create and update operations emit immutable events that
//! reach consumers asynchronously through a publish/subscribe broker.
//! Delivery is at-least-once: a consumer acknowledges each message after
//! handling it, and unacknowledged messages are redelivered when the
//! subscription restarts. Publication is fire-and-forget with respect to
//! the triggering request; a failed publish is logged, never rolled back
//! against the persisted write.
//!
//! - Event envelope and snapshot types in [`domain`]
//! - Broker port contracts in [`ports`]
//! - In-process channel broker in [`adapters`]
//! - Publisher, relay, and consumer services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
