use std::path::Path;

use atlock_core::error::AtlockError;
use atlock_core::transaction::Order;
use atlock_core::types::OrderId;

/// The durable key-value store backing the Swap Coordinator's Order Record
/// Store (C6), sled-backed (pure Rust, no C/LLVM deps).
///
/// Named trees:
///   orders — OrderId bytes → bincode(Order), schema_version-prefixed
///   meta   — utf8 key bytes → raw bytes
pub struct OrderStore {
    _db: sled::Db,
    orders: sled::Tree,
    meta: sled::Tree,
}

impl OrderStore {
    /// Open or create the record store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AtlockError> {
        let db = sled::open(path).map_err(|e| AtlockError::Storage(e.to_string()))?;
        let orders = db
            .open_tree("orders")
            .map_err(|e| AtlockError::Storage(e.to_string()))?;
        let meta = db
            .open_tree("meta")
            .map_err(|e| AtlockError::Storage(e.to_string()))?;
        Ok(Self { _db: db, orders, meta })
    }

    /// Persist `order`. Every write is atomic w.r.t. the store (a single
    /// sled key insert); coordinator callers checkpoint before and after
    /// each ledger call by invoking this twice around that call.
    pub fn put_order(&self, order: &Order) -> Result<(), AtlockError> {
        if order.schema_version > atlock_core::constants::CURRENT_SCHEMA_VERSION {
            return Err(AtlockError::UnsupportedSchemaVersion(order.schema_version));
        }
        let bytes =
            bincode::serialize(order).map_err(|e| AtlockError::Serialization(e.to_string()))?;
        self.orders
            .insert(order.order_id.0, bytes)
            .map_err(|e| AtlockError::Storage(e.to_string()))?;
        Ok(())
    }

    pub fn get_order(&self, order_id: &OrderId) -> Result<Option<Order>, AtlockError> {
        match self
            .orders
            .get(order_id.0)
            .map_err(|e| AtlockError::Storage(e.to_string()))?
        {
            Some(bytes) => {
                let order: Order = bincode::deserialize(&bytes)
                    .map_err(|e| AtlockError::Serialization(e.to_string()))?;
                if order.schema_version > atlock_core::constants::CURRENT_SCHEMA_VERSION {
                    return Err(AtlockError::UnsupportedSchemaVersion(order.schema_version));
                }
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    /// Every order currently in the store, regardless of status.
    pub fn iter_all_orders(&self) -> Result<Vec<Order>, AtlockError> {
        let mut out = Vec::new();
        for item in self.orders.iter() {
            let (_, bytes) = item.map_err(|e| AtlockError::Storage(e.to_string()))?;
            let order: Order = bincode::deserialize(&bytes)
                .map_err(|e| AtlockError::Serialization(e.to_string()))?;
            out.push(order);
        }
        Ok(out)
    }

    /// Orders not yet in a terminal status. Used by the coordinator's
    /// startup crash-recovery scan (§4.7).
    pub fn iter_non_terminal_orders(&self) -> Result<Vec<Order>, AtlockError> {
        Ok(self
            .iter_all_orders()?
            .into_iter()
            .filter(|o| !o.status.is_terminal())
            .collect())
    }

    /// Delete a terminal order past its retention window. Callers are
    /// responsible for checking `order_retention_ms` before calling this.
    pub fn delete_order(&self, order_id: &OrderId) -> Result<(), AtlockError> {
        self.orders
            .remove(order_id.0)
            .map_err(|e| AtlockError::Storage(e.to_string()))?;
        Ok(())
    }

    pub fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), AtlockError> {
        self.meta
            .insert(key.as_bytes(), value)
            .map_err(|e| AtlockError::Storage(e.to_string()))?;
        Ok(())
    }

    pub fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, AtlockError> {
        self.meta
            .get(key.as_bytes())
            .map(|v| v.map(|iv| iv.to_vec()))
            .map_err(|e| AtlockError::Storage(e.to_string()))
    }

    pub fn flush(&self) -> Result<(), AtlockError> {
        self._db
            .flush()
            .map_err(|e| AtlockError::Storage(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlock_core::transaction::{OrderSide, OrderStatus};
    use atlock_core::types::{Address, HashAlgorithm, LedgerKind, SecretHash, TokenId};

    fn sample_order(id: [u8; 32]) -> Order {
        let side = OrderSide::new(
            LedgerKind::Simulated,
            Address("init".into()),
            Address("redeem".into()),
            TokenId("TOK".into()),
            1_000,
            10_000,
        );
        Order {
            schema_version: 1,
            order_id: OrderId(id),
            secret: None,
            secret_hash: SecretHash([0u8; 32]),
            hash_algorithm: HashAlgorithm::Sha256,
            side_a: side.clone(),
            side_b: side,
            partial_fills_allowed: false,
            created_at: 0,
            expires_at: 100_000,
            status: OrderStatus::Created,
        }
    }

    #[test]
    fn round_trip_is_byte_identical() {
        let dir = tempdir();
        let store = OrderStore::open(&dir).unwrap();
        let order = sample_order([1u8; 32]);
        store.put_order(&order).unwrap();
        let loaded = store.get_order(&order.order_id).unwrap().unwrap();
        assert_eq!(
            bincode::serialize(&order).unwrap(),
            bincode::serialize(&loaded).unwrap()
        );
    }

    #[test]
    fn non_terminal_filter_excludes_completed() {
        let dir = tempdir();
        let store = OrderStore::open(&dir).unwrap();
        let mut a = sample_order([2u8; 32]);
        a.status = OrderStatus::Completed;
        let b = sample_order([3u8; 32]);
        store.put_order(&a).unwrap();
        store.put_order(&b).unwrap();
        let non_terminal = store.iter_non_terminal_orders().unwrap();
        assert_eq!(non_terminal.len(), 1);
        assert_eq!(non_terminal[0].order_id, b.order_id);
    }

    fn tempdir() -> std::path::PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push(format!("atlock-store-test-{}", rand_suffix()));
        dir
    }

    fn rand_suffix() -> u64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .subsec_nanos() as u64
    }
}
