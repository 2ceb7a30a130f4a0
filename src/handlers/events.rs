//! Server-sent-events feed of order changes, the realtime half of the
//! cross-surface synchronization. Clients subscribe per user and re-fetch
//! their order list on every event; the rows stay authoritative.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct EventsParams {
    pub user_id: Uuid,
}

/// GET /orders/events
///
/// Streams `data: {order_id, user_id, payment_status, shipping_status}`
/// frames for the given user until the client disconnects. Dropping the
/// response drops the subscription; nothing is left behind.
#[utoipa::path(
    get,
    path = "/orders/events",
    params(
        ("user_id" = Uuid, Query, description = "Customer whose orders to watch"),
    ),
    responses(
        (status = 200, description = "text/event-stream of order changes"),
    ),
    tag = "orders"
)]
pub async fn order_events(
    state: web::Data<AppState>,
    query: web::Query<EventsParams>,
) -> HttpResponse {
    let user_id = query.into_inner().user_id;
    let rx = state.events.subscribe();

    let stream = futures::stream::unfold(rx, move |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) if event.user_id == user_id => {
                    let data = match serde_json::to_string(&event) {
                        Ok(data) => data,
                        Err(_) => continue,
                    };
                    let frame = web::Bytes::from(format!("data: {data}\n\n"));
                    return Some((Ok::<_, actix_web::Error>(frame), rx));
                }
                // Not ours, or we fell behind: events are only invalidation
                // hints, so skipping is safe.
                Ok(_) | Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return None,
            }
        }
    });

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(stream)
}
