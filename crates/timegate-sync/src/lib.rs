//! Forwarding layer: batch delivery of newly accepted records to the
//! downstream HTTP collector.

pub mod collector;

pub use collector::{CollectorRecord, ForwardClient, ForwardError, ForwardReport};
