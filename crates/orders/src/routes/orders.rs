//! Order endpoints.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde::Serialize;
use serde_json::Value;

use tech_commerce_core::Order;

use crate::error::Result;
use crate::middleware::auth::authenticate;
use crate::middleware::{BearerAuth, RequireAdmin, header_token};
use crate::models::SubmittedOrder;
use crate::services::{OrderDraft, ValidationError};
use crate::state::AppState;

/// Response body of a successful order placement.
#[derive(Debug, Serialize)]
pub struct PlacedOrder {
    pub message: &'static str,
    pub order: Order,
}

/// Response body of the listing endpoints.
#[derive(Debug, Serialize)]
pub struct OrderList<T> {
    pub orders: Vec<T>,
}

/// `POST /api/order`
///
/// Body: `{token?, items, address, total}`. The checkout client sends its
/// credential as the body `token`; an `Authorization` header is also accepted
/// and wins when both are present. The credential is checked before the
/// payload, so an anonymous request is `401` even when its body is garbage.
pub async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<PlacedOrder>)> {
    let body: Option<Value> = serde_json::from_slice(&body).ok();

    let token = header_token(&headers).or_else(|| {
        body.as_ref()
            .and_then(|b| b.get("token"))
            .and_then(Value::as_str)
    });
    let claims = authenticate(&state, token)?;

    let body = body.ok_or_else(|| ValidationError::Malformed("body is not valid JSON".to_owned()))?;
    let draft = OrderDraft::from_json(body)?;

    let order = state.order_service().place(claims.user_id, draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(PlacedOrder {
            message: "Order placed successfully",
            order,
        }),
    ))
}

/// `GET /api/my-orders`
///
/// The caller's own orders, newest first.
pub async fn my_orders(
    State(state): State<AppState>,
    BearerAuth(claims): BearerAuth,
) -> Result<Json<OrderList<Order>>> {
    let orders = state.order_service().orders_of(claims.user_id).await?;
    Ok(Json(OrderList { orders }))
}

/// `GET /api/orders`
///
/// Every order with its submitter's name, email and role. Admin only.
pub async fn all_orders(
    State(state): State<AppState>,
    RequireAdmin(claims): RequireAdmin,
) -> Result<Json<OrderList<SubmittedOrder>>> {
    tracing::info!(user_id = %claims.user_id, "Listing all orders");
    let orders = state.order_service().all_orders().await?;
    Ok(Json(OrderList { orders }))
}
