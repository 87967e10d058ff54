use std::collections::HashMap;
use std::sync::Mutex;

use atlock_core::types::{OrderId, Timestamp};
use tokio::sync::broadcast;
use tracing::debug;

use crate::event::{Envelope, ProgressEvent};

/// In-process progress/receipt stream (C8). Publishers push `ProgressEvent`s
/// per order; subscribers (the RPC layer's WebSocket handlers, or a
/// development CLI) receive every event published after they subscribed.
///
/// Delivery is at-least-once: a slow subscriber that lags past the
/// channel's capacity misses events rather than blocking the publisher, so
/// subscribers must dedup and tolerate gaps by re-querying order status.
pub struct EventBus {
    sender: broadcast::Sender<Envelope>,
    next_seq: Mutex<HashMap<OrderId, u64>>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            next_seq: Mutex::new(HashMap::new()),
        }
    }

    /// Publish `event` for `order_id`, assigning the next per-order `seq`.
    pub fn publish(&self, order_id: OrderId, ts: Timestamp, event: ProgressEvent) {
        let seq = {
            let mut next = self.next_seq.lock().expect("event bus lock poisoned");
            let entry = next.entry(order_id.clone()).or_insert(0);
            let seq = *entry;
            *entry += 1;
            seq
        };
        let envelope = Envelope {
            order_id,
            seq,
            ts,
            event,
        };
        debug!(order_id = %envelope.order_id, seq = envelope.seq, "publishing progress event");
        // No active subscribers is not an error; the event is simply dropped.
        let _ = self.sender.send(envelope);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlock_core::types::LedgerSide;

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        bus.publish(OrderId([1u8; 32]), 100, ProgressEvent::Created);
        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.seq, 0);
        assert_eq!(envelope.event, ProgressEvent::Created);
    }

    #[tokio::test]
    async fn sequence_numbers_increase_per_order() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let order_id = OrderId([2u8; 32]);
        bus.publish(order_id.clone(), 100, ProgressEvent::Created);
        bus.publish(
            order_id,
            101,
            ProgressEvent::Deposited {
                side: LedgerSide::A,
                tx_id: atlock_core::types::LedgerTxId("tx".into()),
            },
        );
        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.seq, 0);
        assert_eq!(second.seq, 1);
    }
}
