//! Port contracts for event transport.
//!
//! Ports define broker-agnostic interfaces used by the publisher and
//! consumer services.

pub mod broker;

pub use broker::{BrokerError, BrokerResult, Delivery, MessageBroker, MessageStream};
