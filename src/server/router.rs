//! Route tables

use super::handlers::{
    AppState, create_order, delete_order, get_order, health_check, list_orders, notify_order,
    update_order,
};
use super::middleware::authorize_request;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Build order routes
///
/// - POST /orders - Create an order (public)
/// - GET /orders - List orders
/// - GET /orders/{id} - Get one order
/// - PATCH, PUT /orders/{id} - Update an order
/// - DELETE /orders/{id} - Delete an order
/// - POST /orders/{id}/notify - Render the WhatsApp message and link
/// - POST /orders/{id}/send_whatsapp - Alias of notify
pub fn build_order_routes(state: AppState) -> Router {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route(
            "/orders/{id}",
            get(get_order)
                .patch(update_order)
                .put(update_order)
                .delete(delete_order),
        )
        .route("/orders/{id}/notify", post(notify_order))
        .route("/orders/{id}/send_whatsapp", post(notify_order))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authorize_request,
        ))
        .with_state(state)
}

/// Build health check routes
pub fn build_health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}
