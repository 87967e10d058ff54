use atlock_core::error::AtlockError;
use tracing::{info, warn};

use crate::coordinator::Coordinator;

/// Re-drive every non-terminal order found in the store at startup (§4.7).
/// Each order resumes from whatever phase its persisted status names; a
/// fault in one order never blocks recovery of the others.
pub async fn recover_non_terminal_orders(coordinator: &Coordinator) -> Result<usize, AtlockError> {
    let pending = coordinator.store().iter_non_terminal_orders()?;
    info!(count = pending.len(), "crash-recovery scan found non-terminal orders");

    let mut recovered = 0;
    for order in pending {
        let order_id = order.order_id.clone();
        match coordinator.drive(order_id.clone()).await {
            Ok(()) => recovered += 1,
            Err(e) if e.is_transient() => {
                warn!(order_id = %order_id, error = %e, "recovery hit a transient error, will retry on next scan");
            }
            Err(e) => {
                warn!(order_id = %order_id, error = %e, "recovery failed for order");
            }
        }
    }
    Ok(recovered)
}
