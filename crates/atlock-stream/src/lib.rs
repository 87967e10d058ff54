//! The Progress/Receipt Stream (C8): an in-process, at-least-once event bus
//! the coordinator publishes to and the RPC layer's subscription handlers
//! read from.

pub mod bus;
pub mod event;

pub use bus::EventBus;
pub use event::{Envelope, ProgressEvent};
