pub mod account;
pub mod claims;
pub mod constants;
pub mod error;
pub mod transaction;
pub mod types;

pub use account::*;
pub use claims::{ClaimRecord, ClaimsLedger};
pub use constants::*;
pub use error::AtlockError;
pub use transaction::*;
pub use types::*;
