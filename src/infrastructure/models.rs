use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, OrderView};
use crate::schema::orders;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub shipping_info: Value,
    pub items: Value,
    pub subtotal: BigDecimal,
    pub shipping: BigDecimal,
    pub taxes: BigDecimal,
    pub total_amount: BigDecimal,
    pub payment_status: String,
    pub receipt_image_url: Option<String>,
    pub shipping_status: String,
    pub tracking_number: Option<String>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub order_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub shipping_info: Value,
    pub items: Value,
    pub subtotal: BigDecimal,
    pub shipping: BigDecimal,
    pub taxes: BigDecimal,
    pub total_amount: BigDecimal,
    pub payment_status: String,
    pub shipping_status: String,
}

impl NewOrderRow {
    pub fn from_domain(id: Uuid, order: NewOrder) -> Result<Self, DomainError> {
        let shipping_info = serde_json::to_value(&order.shipping_info)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        let items = serde_json::to_value(&order.items)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        Ok(Self {
            id,
            user_id: order.user_id,
            shipping_info,
            items,
            subtotal: order.subtotal,
            shipping: order.shipping,
            taxes: order.taxes,
            total_amount: order.total_amount,
            payment_status: crate::domain::order::PaymentStatus::Pending
                .as_str()
                .to_string(),
            shipping_status: crate::domain::order::ShippingStatus::Preparing
                .as_str()
                .to_string(),
        })
    }
}

impl TryFrom<OrderRow> for OrderView {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = move |what: &str, detail: String| {
            DomainError::Internal(format!("order {id} has corrupt {what}: {detail}"))
        };
        Ok(OrderView {
            payment_status: row
                .payment_status
                .parse()
                .map_err(|e| corrupt("payment_status", e))?,
            shipping_status: row
                .shipping_status
                .parse()
                .map_err(|e| corrupt("shipping_status", e))?,
            shipping_info: serde_json::from_value(row.shipping_info)
                .map_err(|e| corrupt("shipping_info", e.to_string()))?,
            items: serde_json::from_value(row.items)
                .map_err(|e| corrupt("items", e.to_string()))?,
            id,
            user_id: row.user_id,
            subtotal: row.subtotal,
            shipping: row.shipping,
            taxes: row.taxes,
            total_amount: row.total_amount,
            receipt_image_url: row.receipt_image_url,
            tracking_number: row.tracking_number,
            shipped_at: row.shipped_at,
            delivered_at: row.delivered_at,
            order_date: row.order_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
