//! Adapter implementations of the broker port.

pub mod channel;

pub use channel::ChannelBroker;
