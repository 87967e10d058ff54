use atlock_core::types::OrderId;
use atlock_crypto::sha256;

/// Deterministic nonce for one coordinator step, derived from `(order_id,
/// step_name)`. Reusing the same nonce across a crash-and-retry of the same
/// step lets adapters deduplicate the resulting ledger call instead of
/// double-submitting.
pub fn step_nonce(order_id: &OrderId, step_name: &str) -> String {
    let mut preimage = Vec::with_capacity(32 + step_name.len());
    preimage.extend_from_slice(&order_id.0);
    preimage.extend_from_slice(step_name.as_bytes());
    hex::encode(sha256(&preimage))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_inputs_produce_same_nonce() {
        let order_id = OrderId([1u8; 32]);
        assert_eq!(step_nonce(&order_id, "deposit_a"), step_nonce(&order_id, "deposit_a"));
    }

    #[test]
    fn different_steps_produce_different_nonces() {
        let order_id = OrderId([1u8; 32]);
        assert_ne!(step_nonce(&order_id, "deposit_a"), step_nonce(&order_id, "deposit_b"));
    }

    #[test]
    fn different_orders_produce_different_nonces() {
        assert_ne!(
            step_nonce(&OrderId([1u8; 32]), "deposit_a"),
            step_nonce(&OrderId([2u8; 32]), "deposit_a")
        );
    }
}
