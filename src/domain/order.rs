use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::action_link::is_valid_email;
use super::errors::DomainError;
use super::pricing;

/// Payment approval lifecycle of an order.
///
/// The status only ever moves forward: `pending → processing → {completed,
/// rejected}`, with a direct `pending → completed/rejected` shortcut when an
/// administrator acts before the customer uploads a receipt. Once a terminal
/// state is reached, nothing moves it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Completed,
    Rejected,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Processing => "processing",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PaymentStatus::Completed | PaymentStatus::Rejected)
    }

    /// Validate a move from `self` to `to`.
    ///
    /// Re-applying the status an order already holds is reported as a no-op
    /// rather than an error, so repeated admin action-link clicks stay
    /// harmless. Everything outside the transition table is rejected.
    pub fn transition_to(self, to: PaymentStatus) -> Result<Transition, DomainError> {
        use PaymentStatus::*;

        if self == to {
            return Ok(Transition::NoOp(self));
        }
        match (self, to) {
            (Pending, Processing)
            | (Pending, Completed)
            | (Pending, Rejected)
            | (Processing, Completed)
            | (Processing, Rejected) => Ok(Transition::Applied(to)),
            _ => Err(DomainError::InvalidTransition { from: self, to }),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "processing" => Ok(PaymentStatus::Processing),
            "completed" => Ok(PaymentStatus::Completed),
            "rejected" => Ok(PaymentStatus::Rejected),
            other => Err(format!("unknown payment status '{other}'")),
        }
    }
}

/// Outcome of a validated status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied(PaymentStatus),
    NoOp(PaymentStatus),
}

impl Transition {
    pub fn status(self) -> PaymentStatus {
        match self {
            Transition::Applied(s) | Transition::NoOp(s) => s,
        }
    }

    pub fn is_noop(self) -> bool {
        matches!(self, Transition::NoOp(_))
    }
}

/// Fulfillment lifecycle, independent of payment approval. Set by operational
/// processes; this service persists and serves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingStatus {
    Preparing,
    Shipped,
    InTransit,
    Delivered,
    Cancelled,
}

impl ShippingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ShippingStatus::Preparing => "preparing",
            ShippingStatus::Shipped => "shipped",
            ShippingStatus::InTransit => "in_transit",
            ShippingStatus::Delivered => "delivered",
            ShippingStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ShippingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShippingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preparing" => Ok(ShippingStatus::Preparing),
            "shipped" => Ok(ShippingStatus::Shipped),
            "in_transit" => Ok(ShippingStatus::InTransit),
            "delivered" => Ok(ShippingStatus::Delivered),
            "cancelled" => Ok(ShippingStatus::Cancelled),
            other => Err(format!("unknown shipping status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub zip: String,
    pub country: String,
}

/// A line item as frozen into the order at checkout. Product names carry the
/// three storefront locale variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub name_fr: String,
    pub name_en: String,
    pub price: BigDecimal,
    pub quantity: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub image: String,
}

/// A checkout submission, before persistence.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub shipping_info: ShippingInfo,
    pub items: Vec<OrderItem>,
    pub subtotal: BigDecimal,
    pub shipping: BigDecimal,
    pub taxes: BigDecimal,
    pub total_amount: BigDecimal,
}

impl NewOrder {
    /// Checkout validation: a non-empty cart, a deliverable email, and totals
    /// that reconcile with the quote for the destination country. The figures
    /// are frozen at creation and never recomputed afterwards.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.items.is_empty() {
            return Err(DomainError::InvalidInput(
                "order must contain at least one item".to_string(),
            ));
        }
        if let Some(item) = self.items.iter().find(|i| i.quantity < 1) {
            return Err(DomainError::InvalidInput(format!(
                "item '{}' has a non-positive quantity",
                item.product_id
            )));
        }
        if !is_valid_email(&self.shipping_info.email) {
            return Err(DomainError::InvalidInput(
                "shipping email address is invalid".to_string(),
            ));
        }

        let quote = pricing::quote(&self.subtotal, &self.shipping_info.country);
        if self.shipping != quote.shipping {
            return Err(DomainError::InvalidInput(format!(
                "shipping cost {} does not match the expected {} for {}",
                self.shipping, quote.shipping, self.shipping_info.country
            )));
        }
        if self.taxes != quote.taxes {
            return Err(DomainError::InvalidInput(format!(
                "taxes {} do not match the expected {}",
                self.taxes, quote.taxes
            )));
        }
        let sum = &self.subtotal + &self.shipping + &self.taxes;
        if self.total_amount != sum {
            return Err(DomainError::InvalidInput(format!(
                "total amount {} does not equal subtotal + shipping + taxes ({})",
                self.total_amount, sum
            )));
        }
        Ok(())
    }
}

/// An order as read back from the store.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub shipping_info: ShippingInfo,
    pub items: Vec<OrderItem>,
    pub subtotal: BigDecimal,
    pub shipping: BigDecimal,
    pub taxes: BigDecimal,
    pub total_amount: BigDecimal,
    pub payment_status: PaymentStatus,
    pub receipt_image_url: Option<String>,
    pub shipping_status: ShippingStatus,
    pub tracking_number: Option<String>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub order_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<OrderView>,
    pub total: i64,
}

/// Result of applying a payment-status transition in the store.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub order: OrderView,
    pub transition: Transition,
}

/// Shipment metadata update from the admin dashboard.
#[derive(Debug, Clone)]
pub struct ShippingUpdate {
    pub shipping_status: ShippingStatus,
    pub tracking_number: Option<String>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}
