//! Order lifecycle orchestration: checkout, receipt upload, admin action
//! links, shipping updates. Repository calls run on the blocking pool; email
//! and event publication happen after the store commit, with mail failures
//! reported as partial outcomes instead of rolled back.

use std::sync::Arc;

use log::warn;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::action_link::{self, ActionKind, ActionLinkError, OrderRef};
use crate::domain::errors::{DomainError, MailError};
use crate::domain::order::{
    ListResult, NewOrder, OrderView, ShippingUpdate,
};
use crate::domain::ports::{Mailer, OrderRepository, ReceiptNotification, StatusCache};
use crate::realtime::{OrderChanged, OrderEvents};

#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    InvalidLink(#[from] ActionLinkError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Whether the follow-up email for a state change went out. The state change
/// itself has succeeded in every variant; `Failed` is the partial-success
/// case operators must be able to tell apart from total failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Sent,
    Failed(String),
    /// Mail is not configured in this deployment; the change went through and
    /// a warning was logged.
    Skipped(String),
}

impl Notification {
    pub fn is_sent(&self) -> bool {
        matches!(self, Notification::Sent)
    }
}

#[derive(Debug)]
pub struct LinkOutcome {
    pub order: OrderView,
    pub notification: Notification,
}

#[derive(Debug)]
pub struct ReceiptOutcome {
    pub order: OrderView,
    pub notification: Notification,
}

pub struct OrderService<R, M, C> {
    repo: Arc<R>,
    mailer: M,
    cache: C,
    events: OrderEvents,
}

impl<R, M, C> OrderService<R, M, C>
where
    R: OrderRepository,
    M: Mailer,
    C: StatusCache,
{
    pub fn new(repo: R, mailer: M, cache: C, events: OrderEvents) -> Self {
        Self {
            repo: Arc::new(repo),
            mailer,
            cache,
            events,
        }
    }

    /// Run a repository call on the blocking pool.
    async fn with_repo<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        T: Send + 'static,
        F: FnOnce(&R) -> Result<T, DomainError> + Send + 'static,
    {
        let repo = Arc::clone(&self.repo);
        tokio::task::spawn_blocking(move || f(&repo))
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?
    }

    /// Checkout: validate and persist a new order with `pending` payment
    /// status. Exactly one order per submission.
    pub async fn create_order(&self, order: NewOrder) -> Result<Uuid, DomainError> {
        order.validate()?;
        self.with_repo(move |repo| repo.create(order)).await
    }

    pub async fn get_order(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        self.with_repo(move |repo| repo.find_by_id(id)).await
    }

    /// List orders, newest first. When listing a customer's history, fallback
    /// status hints for the returned orders are consumed: a hint that is
    /// still ahead of its row is applied to the response, everything else is
    /// discarded. The rows remain authoritative either way.
    pub async fn list_orders(
        &self,
        user_id: Option<Uuid>,
        page: i64,
        limit: i64,
    ) -> Result<ListResult, DomainError> {
        let mut result = self
            .with_repo(move |repo| repo.list(user_id, page, limit))
            .await?;

        // Only the customer history view consumes hints; an admin-wide
        // listing must leave them for the customer to pick up.
        if user_id.is_none() {
            return Ok(result);
        }
        let ids: Vec<String> = result.items.iter().map(|o| o.id.to_string()).collect();
        let hints = self.cache.drain(&ids);
        if !hints.is_empty() {
            for order in &mut result.items {
                let Some(&hinted) = hints.get(&order.id.to_string()) else {
                    continue;
                };
                match order.payment_status.transition_to(hinted) {
                    Ok(t) if !t.is_noop() => order.payment_status = hinted,
                    _ => {}
                }
            }
        }
        Ok(result)
    }

    /// Customer uploads a proof-of-payment image: store the receipt URL, move
    /// the order to `processing`, then notify the admin with the confirm and
    /// reject links. A missing mail configuration degrades to a logged
    /// warning; the status change stands.
    pub async fn upload_receipt(
        &self,
        id: Uuid,
        receipt_image_url: String,
        receipt_data_url: String,
    ) -> Result<ReceiptOutcome, DomainError> {
        let change = self
            .with_repo(move |repo| {
                repo.update_payment_status(
                    id,
                    crate::domain::order::PaymentStatus::Processing,
                    Some(receipt_image_url),
                )
            })
            .await?;
        let order = change.order;
        self.events.publish(OrderChanged::from_view(&order));

        let notification = ReceiptNotification {
            order: order.clone(),
            receipt_data_url,
        };
        let notification = match self.mailer.send_receipt_notification(notification).await {
            Ok(()) => Notification::Sent,
            Err(MailError::NotConfigured(msg)) => {
                warn!("receipt notification for order {id} skipped: {msg}");
                Notification::Skipped(msg)
            }
            Err(e) => {
                warn!("receipt notification for order {id} failed: {e}");
                Notification::Failed(e.to_string())
            }
        };
        Ok(ReceiptOutcome {
            order,
            notification,
        })
    }

    /// Process a clicked admin action link.
    ///
    /// The link is validated before the store is touched; an invalid link
    /// never mutates anything. On success the matching customer email goes to
    /// the decoded address, and the new status is mirrored into the fallback
    /// cache. Re-clicking a link whose status is already applied is a no-op
    /// transition that still reports success; the customer email is re-sent
    /// on every click, deliberately.
    pub async fn handle_action_link(
        &self,
        kind: ActionKind,
        order_id: Option<&str>,
        user_email: Option<&str>,
    ) -> Result<LinkOutcome, ActionError> {
        let link = action_link::parse(order_id, user_email)?;
        let id = match link.order {
            OrderRef::Id(id) => id,
            // Legacy ids satisfy the link contract but were never persisted
            // server-side, so there is no row to update.
            OrderRef::Legacy(_) => return Err(DomainError::NotFound.into()),
        };

        let target = kind.target_status();
        let change = self
            .with_repo(move |repo| repo.update_payment_status(id, target, None))
            .await?;
        let order = change.order;
        if !change.transition.is_noop() {
            self.events.publish(OrderChanged::from_view(&order));
        }

        let order_ref = id.to_string();
        let sent = match kind {
            ActionKind::Confirm => {
                self.mailer
                    .send_customer_confirmation(&link.customer_email, &order_ref)
                    .await
            }
            ActionKind::Reject => {
                self.mailer
                    .send_customer_rejection(&link.customer_email, &order_ref)
                    .await
            }
        };
        let notification = match sent {
            Ok(()) => {
                if !self.cache.record(&order_ref, target) {
                    warn!("could not record fallback status hint for order {order_ref}");
                }
                Notification::Sent
            }
            Err(e) => {
                warn!("customer notification for order {order_ref} failed: {e}");
                Notification::Failed(e.to_string())
            }
        };

        Ok(LinkOutcome {
            order,
            notification,
        })
    }

    /// Admin dashboard shipment update. Leaves payment status untouched.
    pub async fn update_shipping(
        &self,
        id: Uuid,
        update: ShippingUpdate,
    ) -> Result<OrderView, DomainError> {
        let order = self
            .with_repo(move |repo| repo.update_shipping(id, update))
            .await?;
        self.events.publish(OrderChanged::from_view(&order));
        Ok(order)
    }
}
