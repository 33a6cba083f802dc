//! Authentication and access control for the order routes
//!
//! Runs as a `route_layer`, after routing but before any handler extractor,
//! so credential failures win over malformed bodies.

use super::handlers::AppState;
use crate::core::auth::{Operation, authorize};
use crate::core::error::LontongError;
use axum::{
    extract::{MatchedPath, Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};

/// Resolve the caller, apply the policy for the matched route and store the
/// caller in the request extensions
pub async fn authorize_request(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, LontongError> {
    let caller = state.auth.extract_context(request.headers()).await?;

    let operation = request
        .extensions()
        .get::<MatchedPath>()
        .and_then(|path| classify(request.method(), path.as_str()));

    if let Some(operation) = operation {
        if let Err(err) = authorize(operation, &caller) {
            tracing::debug!(
                %operation,
                user = caller.username().unwrap_or("anonymous"),
                "request rejected"
            );
            return Err(err.into());
        }
    }

    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}

/// Map a method and route template to the order operation it performs
pub fn classify(method: &Method, path: &str) -> Option<Operation> {
    match (method, path) {
        (&Method::POST, "/orders") => Some(Operation::Create),
        (&Method::GET, "/orders") | (&Method::GET, "/orders/{id}") => Some(Operation::Read),
        (&Method::PATCH, "/orders/{id}") | (&Method::PUT, "/orders/{id}") => {
            Some(Operation::Update)
        }
        (&Method::DELETE, "/orders/{id}") => Some(Operation::Delete),
        (&Method::POST, "/orders/{id}/notify") | (&Method::POST, "/orders/{id}/send_whatsapp") => {
            Some(Operation::Notify)
        }
        _ => None,
    }
}
