pub mod confirmations;
pub mod monotonic;

pub use confirmations::{ConfirmationEvent, ConfirmationTracker};
pub use monotonic::MonotonicClock;
