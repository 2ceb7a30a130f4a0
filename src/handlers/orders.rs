use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::Notification;
use crate::domain::order::{
    NewOrder, OrderItem, OrderView, ShippingInfo, ShippingStatus, ShippingUpdate,
};
use crate::errors::AppError;
use crate::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShippingInfoDto {
    pub name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub zip: String,
    pub country: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItemDto {
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub name_fr: String,
    pub name_en: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
    pub quantity: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub image: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub user_id: Uuid,
    pub shipping_info: ShippingInfoDto,
    pub items: Vec<OrderItemDto>,
    pub subtotal: String,
    pub shipping: String,
    pub taxes: String,
    pub total_amount: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrderResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub shipping_info: ShippingInfoDto,
    pub items: Vec<OrderItemDto>,
    pub subtotal: String,
    pub shipping: String,
    pub taxes: String,
    pub total_amount: String,
    pub payment_status: String,
    pub receipt_image_url: Option<String>,
    pub shipping_status: String,
    pub tracking_number: Option<String>,
    pub shipped_at: Option<String>,
    pub delivered_at: Option<String>,
    pub order_date: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<OrderView> for OrderResponse {
    fn from(order: OrderView) -> Self {
        OrderResponse {
            id: order.id,
            user_id: order.user_id,
            shipping_info: ShippingInfoDto {
                name: order.shipping_info.name,
                email: order.shipping_info.email,
                address: order.shipping_info.address,
                city: order.shipping_info.city,
                zip: order.shipping_info.zip,
                country: order.shipping_info.country,
            },
            items: order
                .items
                .into_iter()
                .map(|i| OrderItemDto {
                    id: i.id,
                    product_id: i.product_id,
                    name: i.name,
                    name_fr: i.name_fr,
                    name_en: i.name_en,
                    price: i.price.to_string(),
                    quantity: i.quantity,
                    size: i.size,
                    color: i.color,
                    image: i.image,
                })
                .collect(),
            subtotal: order.subtotal.to_string(),
            shipping: order.shipping.to_string(),
            taxes: order.taxes.to_string(),
            total_amount: order.total_amount.to_string(),
            payment_status: order.payment_status.to_string(),
            receipt_image_url: order.receipt_image_url,
            shipping_status: order.shipping_status.to_string(),
            tracking_number: order.tracking_number,
            shipped_at: order.shipped_at.map(|t| t.to_rfc3339()),
            delivered_at: order.delivered_at.map(|t| t.to_rfc3339()),
            order_date: order.order_date.to_rfc3339(),
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Restrict to one customer's order history.
    pub user_id: Option<Uuid>,
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadReceiptRequest {
    /// Where the uploaded receipt image is stored.
    pub receipt_image_url: String,
    /// `data:image/...;base64,<content>` payload, attached to the admin mail.
    pub receipt_data_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadReceiptResponse {
    pub order: OrderResponse,
    pub notification_sent: bool,
    pub notification_error: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateShippingRequest {
    pub shipping_status: String,
    pub tracking_number: Option<String>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

fn parse_amount(field: &str, value: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(value)
        .map_err(|e| AppError::Validation(format!("Invalid {field} '{value}': {e}")))
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Checkout: persists exactly one order per submission, with the payment
/// status starting at `pending`. The submitted totals must reconcile with
/// the quote for the destination country; the figures are frozen afterwards.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = CreateOrderResponse),
        (status = 400, description = "Validation failed (empty cart, totals mismatch)"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    state: web::Data<AppState>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let items = body
        .items
        .into_iter()
        .map(|i| {
            Ok(OrderItem {
                price: parse_amount("price", &i.price)?,
                id: i.id,
                product_id: i.product_id,
                name: i.name,
                name_fr: i.name_fr,
                name_en: i.name_en,
                quantity: i.quantity,
                size: i.size,
                color: i.color,
                image: i.image,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    let order = NewOrder {
        user_id: body.user_id,
        shipping_info: ShippingInfo {
            name: body.shipping_info.name,
            email: body.shipping_info.email,
            address: body.shipping_info.address,
            city: body.shipping_info.city,
            zip: body.shipping_info.zip,
            country: body.shipping_info.country,
        },
        items,
        subtotal: parse_amount("subtotal", &body.subtotal)?,
        shipping: parse_amount("shipping", &body.shipping)?,
        taxes: parse_amount("taxes", &body.taxes)?,
        total_amount: parse_amount("total_amount", &body.total_amount)?,
    };

    let id = state.service.create_order(order).await?;
    Ok(HttpResponse::Created().json(json!({ "id": id })))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order = state.service.get_order(path.into_inner()).await?;
    match order {
        Some(order) => Ok(HttpResponse::Ok().json(OrderResponse::from(order))),
        None => Err(AppError::NotFound),
    }
}

/// GET /orders
///
/// Paginated list, newest first. With `user_id` this is the customer order
/// history; serving it also consumes any pending fallback status hints for
/// the returned orders.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("user_id" = Option<Uuid>, Query, description = "Restrict to one customer"),
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    state: web::Data<AppState>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, 100);

    let result = state
        .service
        .list_orders(params.user_id, page, limit)
        .await?;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: result.items.into_iter().map(OrderResponse::from).collect(),
        total: result.total,
        page,
        limit,
    }))
}

/// POST /orders/{id}/receipt
///
/// Customer uploads a proof-of-payment image. The order moves to
/// `processing` and the admin receives the notification email with the
/// one-click confirm/reject links. A failed or skipped notification is
/// reported alongside the updated order, not as an operation failure.
#[utoipa::path(
    post,
    path = "/orders/{id}/receipt",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = UploadReceiptRequest,
    responses(
        (status = 200, description = "Receipt stored", body = UploadReceiptResponse),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order already decided"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn upload_receipt(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UploadReceiptRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let outcome = state
        .service
        .upload_receipt(path.into_inner(), body.receipt_image_url, body.receipt_data_url)
        .await?;

    let (sent, error) = match outcome.notification {
        Notification::Sent => (true, None),
        Notification::Skipped(msg) | Notification::Failed(msg) => (false, Some(msg)),
    };
    Ok(HttpResponse::Ok().json(UploadReceiptResponse {
        order: outcome.order.into(),
        notification_sent: sent,
        notification_error: error,
    }))
}

/// PUT /orders/{id}/shipping
///
/// Admin dashboard: update the fulfillment lifecycle. Payment status is
/// untouched.
#[utoipa::path(
    put,
    path = "/orders/{id}/shipping",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = UpdateShippingRequest,
    responses(
        (status = 200, description = "Shipping updated", body = OrderResponse),
        (status = 400, description = "Unknown shipping status"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn update_shipping(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateShippingRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let shipping_status = ShippingStatus::from_str(&body.shipping_status)
        .map_err(AppError::Validation)?;

    let order = state
        .service
        .update_shipping(
            path.into_inner(),
            ShippingUpdate {
                shipping_status,
                tracking_number: body.tracking_number,
                shipped_at: body.shipped_at,
                delivered_at: body.delivered_at,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}
