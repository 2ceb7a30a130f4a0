//! In-process change feed for order rows.
//!
//! Every committed mutation publishes an [`OrderChanged`] event; the
//! server-sent-events endpoint subscribes on connect and forwards events for
//! the requested user. Receivers are dropped with the response stream, so
//! disconnects leave no orphaned subscriptions. Events are invalidation
//! hints: clients re-fetch the row rather than trusting deltas, and a lagged
//! receiver simply misses hints.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::order::{OrderView, PaymentStatus, ShippingStatus};

const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Serialize)]
pub struct OrderChanged {
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub payment_status: PaymentStatus,
    pub shipping_status: ShippingStatus,
}

impl OrderChanged {
    pub fn from_view(order: &OrderView) -> Self {
        Self {
            order_id: order.id,
            user_id: order.user_id,
            payment_status: order.payment_status,
            shipping_status: order.shipping_status,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderEvents {
    tx: broadcast::Sender<OrderChanged>,
}

impl OrderEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event. Having no live subscribers is not an error.
    pub fn publish(&self, event: OrderChanged) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrderChanged> {
        self.tx.subscribe()
    }
}

impl Default for OrderEvents {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(user_id: Uuid) -> OrderChanged {
        OrderChanged {
            order_id: Uuid::new_v4(),
            user_id,
            payment_status: PaymentStatus::Completed,
            shipping_status: ShippingStatus::Preparing,
        }
    }

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let events = OrderEvents::default();
        let mut rx = events.subscribe();
        let user_id = Uuid::new_v4();

        events.publish(event(user_id));

        let received = rx.recv().await.expect("event");
        assert_eq!(received.user_id, user_id);
        assert_eq!(received.payment_status, PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn publishing_without_subscribers_is_fine() {
        let events = OrderEvents::default();
        events.publish(event(Uuid::new_v4()));
    }

    #[tokio::test]
    async fn dropped_receivers_detach_cleanly() {
        let events = OrderEvents::default();
        let rx = events.subscribe();
        drop(rx);
        events.publish(event(Uuid::new_v4()));

        let mut rx2 = events.subscribe();
        events.publish(event(Uuid::new_v4()));
        assert!(rx2.recv().await.is_ok());
    }
}
