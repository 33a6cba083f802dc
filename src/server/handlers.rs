//! HTTP handlers for order operations
//!
//! Handlers are thin: they unwrap the request, hand it to [`OrderService`] with
//! the caller stored by the auth middleware, and shape the response.

use crate::core::auth::{AuthContext, AuthProvider};
use crate::core::error::{LontongError, LontongResult, OrderError};
use crate::core::notification::Notification;
use crate::core::order::{NewOrder, OrderPatch, OrderView};
use crate::core::query::{PaginatedResponse, QueryParams};
use crate::core::service::OrderService;
use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::{Value, json};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<OrderService>,
    pub auth: Arc<dyn AuthProvider>,
}

/// POST /orders
pub async fn create_order(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    payload: Result<Json<NewOrder>, JsonRejection>,
) -> LontongResult<impl IntoResponse> {
    let Json(input) = payload?;
    let order = state.service.create(&caller, input).await?;
    Ok((StatusCode::CREATED, Json(state.service.view(order))))
}

/// GET /orders
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> LontongResult<Json<PaginatedResponse<OrderView>>> {
    let Query(params) = params?;
    let page = state.service.list(&caller, &params).await?;
    Ok(Json(page.map(|order| state.service.view(order))))
}

/// GET /orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    id: Result<Path<String>, PathRejection>,
) -> LontongResult<Json<OrderView>> {
    let id = order_id(id)?;
    let order = state.service.get(&caller, id).await?;
    Ok(Json(state.service.view(order)))
}

/// PATCH or PUT /orders/{id}
///
/// Both verbs merge: absent fields keep their stored value.
pub async fn update_order(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<OrderPatch>, JsonRejection>,
) -> LontongResult<Json<OrderView>> {
    let id = order_id(id)?;
    let Json(patch) = payload?;
    let order = state.service.update(&caller, id, patch).await?;
    Ok(Json(state.service.view(order)))
}

/// DELETE /orders/{id}
pub async fn delete_order(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    id: Result<Path<String>, PathRejection>,
) -> LontongResult<StatusCode> {
    let id = order_id(id)?;
    state.service.delete(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /orders/{id}/notify and POST /orders/{id}/send_whatsapp
pub async fn notify_order(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    id: Result<Path<String>, PathRejection>,
) -> LontongResult<Json<Notification>> {
    let id = order_id(id)?;
    Ok(Json(state.service.notify(&caller, id).await?))
}

/// Numeric order id from the path; any other segment cannot name an order
fn order_id(id: Result<Path<String>, PathRejection>) -> LontongResult<u64> {
    let Path(raw) = id?;
    raw.parse()
        .map_err(|_| OrderError::InvalidId { id: raw }.into())
}

/// GET /health and GET /healthz
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME")
    }))
}
