//! Admin action links clicked straight from the notification email, without
//! a dashboard session. Responses distinguish four operator-facing outcomes:
//! success, partial success (status updated, customer email failed), invalid
//! link, and error.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::order_service::{ActionError, Notification};
use crate::domain::action_link::ActionKind;
use crate::domain::errors::DomainError;
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ActionLinkParams {
    #[serde(rename = "orderId")]
    pub order_id: Option<String>,
    /// Base64-encoded customer email address.
    #[serde(rename = "userEmail")]
    pub user_email: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActionLinkResponse {
    /// One of `success`, `partial`, `invalid`, `error`.
    pub status: String,
    pub message: String,
}

/// GET /order-status/customer-confirm
#[utoipa::path(
    get,
    path = "/order-status/customer-confirm",
    params(
        ("orderId" = Option<String>, Query, description = "Order id from the mailed link"),
        ("userEmail" = Option<String>, Query, description = "Base64-encoded customer email"),
    ),
    responses(
        (status = 200, description = "Order confirmed (or already confirmed)", body = ActionLinkResponse),
        (status = 400, description = "Invalid link", body = ActionLinkResponse),
        (status = 404, description = "Order not found", body = ActionLinkResponse),
        (status = 409, description = "Order already decided differently", body = ActionLinkResponse),
    ),
    tag = "order-status"
)]
pub async fn customer_confirm(
    state: web::Data<AppState>,
    query: web::Query<ActionLinkParams>,
) -> HttpResponse {
    respond(state, ActionKind::Confirm, query.into_inner()).await
}

/// GET /order-status/customer-reject
#[utoipa::path(
    get,
    path = "/order-status/customer-reject",
    params(
        ("orderId" = Option<String>, Query, description = "Order id from the mailed link"),
        ("userEmail" = Option<String>, Query, description = "Base64-encoded customer email"),
    ),
    responses(
        (status = 200, description = "Order rejected (or already rejected)", body = ActionLinkResponse),
        (status = 400, description = "Invalid link", body = ActionLinkResponse),
        (status = 404, description = "Order not found", body = ActionLinkResponse),
        (status = 409, description = "Order already decided differently", body = ActionLinkResponse),
    ),
    tag = "order-status"
)]
pub async fn customer_reject(
    state: web::Data<AppState>,
    query: web::Query<ActionLinkParams>,
) -> HttpResponse {
    respond(state, ActionKind::Reject, query.into_inner()).await
}

async fn respond(
    state: web::Data<AppState>,
    kind: ActionKind,
    params: ActionLinkParams,
) -> HttpResponse {
    let result = state
        .service
        .handle_action_link(kind, params.order_id.as_deref(), params.user_email.as_deref())
        .await;

    match result {
        Ok(outcome) => {
            let order_id = outcome.order.id;
            let status = outcome.order.payment_status;
            match outcome.notification {
                Notification::Sent => HttpResponse::Ok().json(ActionLinkResponse {
                    status: "success".to_string(),
                    message: format!(
                        "Order {order_id} has been marked as \"{status}\". \
                         The customer has been notified by email."
                    ),
                }),
                // Status updated, notification failed: partial success, a
                // different operator-facing condition than total failure.
                Notification::Failed(_) | Notification::Skipped(_) => {
                    HttpResponse::Ok().json(ActionLinkResponse {
                        status: "partial".to_string(),
                        message: format!(
                            "Order {order_id} has been marked as \"{status}\", but the \
                             customer notification email could not be sent."
                        ),
                    })
                }
            }
        }
        Err(ActionError::InvalidLink(e)) => HttpResponse::BadRequest().json(ActionLinkResponse {
            status: "invalid".to_string(),
            message: e.to_string(),
        }),
        Err(ActionError::Domain(DomainError::NotFound)) => {
            HttpResponse::NotFound().json(ActionLinkResponse {
                status: "error".to_string(),
                message: "Order not found.".to_string(),
            })
        }
        Err(ActionError::Domain(e @ DomainError::InvalidTransition { .. })) => {
            HttpResponse::Conflict().json(ActionLinkResponse {
                status: "error".to_string(),
                message: e.to_string(),
            })
        }
        Err(ActionError::Domain(e)) => {
            log::error!("action link processing failed: {e}");
            HttpResponse::InternalServerError().json(ActionLinkResponse {
                status: "error".to_string(),
                message: "Could not update the order status.".to_string(),
            })
        }
    }
}
