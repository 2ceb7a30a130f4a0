use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use super::errors::{DomainError, MailError};
use super::order::{
    ListResult, NewOrder, OrderView, PaymentStatus, ShippingUpdate, StatusChange,
};

pub trait OrderRepository: Send + Sync + 'static {
    fn create(&self, order: NewOrder) -> Result<Uuid, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError>;
    fn list(
        &self,
        user_id: Option<Uuid>,
        page: i64,
        limit: i64,
    ) -> Result<ListResult, DomainError>;
    /// Apply a payment-status transition, optionally storing a receipt URL.
    /// Implementations must validate the transition against the current row
    /// state so monotonicity holds regardless of caller.
    fn update_payment_status(
        &self,
        id: Uuid,
        to: PaymentStatus,
        receipt_image_url: Option<String>,
    ) -> Result<StatusChange, DomainError>;
    fn update_shipping(&self, id: Uuid, update: ShippingUpdate) -> Result<OrderView, DomainError>;
}

/// Admin notification for a freshly uploaded payment receipt. The mailer
/// renders the order details and embeds the confirm/reject action links.
#[derive(Debug, Clone)]
pub struct ReceiptNotification {
    pub order: OrderView,
    /// `data:image/...;base64,<content>` payload of the uploaded receipt.
    pub receipt_data_url: String,
}

#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send_receipt_notification(
        &self,
        notification: ReceiptNotification,
    ) -> Result<(), MailError>;
    async fn send_customer_confirmation(&self, to: &str, order_id: &str)
        -> Result<(), MailError>;
    async fn send_customer_rejection(&self, to: &str, order_id: &str) -> Result<(), MailError>;
}

#[async_trait]
impl<T: Mailer> Mailer for std::sync::Arc<T> {
    async fn send_receipt_notification(
        &self,
        notification: ReceiptNotification,
    ) -> Result<(), MailError> {
        (**self).send_receipt_notification(notification).await
    }

    async fn send_customer_confirmation(
        &self,
        to: &str,
        order_id: &str,
    ) -> Result<(), MailError> {
        (**self).send_customer_confirmation(to, order_id).await
    }

    async fn send_customer_rejection(&self, to: &str, order_id: &str) -> Result<(), MailError> {
        (**self).send_customer_rejection(to, order_id).await
    }
}

/// Best-effort fallback map of `{order id → payment status}` used as a
/// display hint for clients the realtime feed did not reach. Never a source
/// of truth; entries are consumed on read.
pub trait StatusCache: Send + Sync + 'static {
    /// Record a hint. Returns false when the storage medium is unavailable;
    /// callers log and move on.
    fn record(&self, order_id: &str, status: PaymentStatus) -> bool;
    /// Remove and return the hints matching `order_ids`. A second drain over
    /// the same ids yields nothing.
    fn drain(&self, order_ids: &[String]) -> HashMap<String, PaymentStatus>;
}

impl<T: StatusCache> StatusCache for std::sync::Arc<T> {
    fn record(&self, order_id: &str, status: PaymentStatus) -> bool {
        (**self).record(order_id, status)
    }

    fn drain(&self, order_ids: &[String]) -> HashMap<String, PaymentStatus> {
        (**self).drain(order_ids)
    }
}
