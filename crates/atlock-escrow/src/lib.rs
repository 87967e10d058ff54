pub mod escrow;
pub mod transitions;

pub use escrow::deposit;
pub use transitions::{claim, refund};
