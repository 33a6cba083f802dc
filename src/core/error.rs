//! Typed error handling for the order backend
//!
//! Every failure a handler can produce is a [`LontongError`]. Each category
//! knows its HTTP status and a stable machine-readable code, so clients can
//! branch on `code` instead of parsing messages.
//!
//! # Error Categories
//!
//! - [`ValidationError`]: malformed input (bad phone number, missing name, ...)
//! - [`AccessError`]: missing/invalid credentials or insufficient privilege
//! - [`OrderError`]: lookups of orders that do not exist
//! - [`StorageError`]: failures reported by the store
//! - [`ConfigError`]: configuration that cannot be loaded or is inconsistent
//!
//! None of these are transient: nothing in the crate retries automatically.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The main error type of the crate
#[derive(Debug)]
pub enum LontongError {
    /// Input validation errors
    Validation(ValidationError),

    /// Authentication / authorization failures
    Access(AccessError),

    /// Order lookup errors
    Order(OrderError),

    /// Storage backend errors
    Storage(StorageError),

    /// Configuration errors
    Config(ConfigError),
}

impl fmt::Display for LontongError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LontongError::Validation(e) => write!(f, "{}", e),
            LontongError::Access(e) => write!(f, "{}", e),
            LontongError::Order(e) => write!(f, "{}", e),
            LontongError::Storage(e) => write!(f, "{}", e),
            LontongError::Config(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for LontongError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LontongError::Validation(e) => Some(e),
            LontongError::Access(e) => Some(e),
            LontongError::Order(e) => Some(e),
            LontongError::Storage(e) => Some(e),
            LontongError::Config(e) => Some(e),
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl LontongError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            LontongError::Validation(_) => StatusCode::BAD_REQUEST,
            LontongError::Access(e) => e.status_code(),
            LontongError::Order(e) => e.status_code(),
            LontongError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LontongError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            LontongError::Validation(_) => "VALIDATION_ERROR",
            LontongError::Access(e) => e.error_code(),
            LontongError::Order(e) => e.error_code(),
            LontongError::Storage(_) => "STORAGE_ERROR",
            LontongError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    /// Field-level detail for validation failures, the id for lookups
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            LontongError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            LontongError::Validation(ValidationError::FieldError { field, message }) => {
                Some(serde_json::json!({
                    "fields": [FieldValidationError::new(field.clone(), message.clone())]
                }))
            }
            LontongError::Order(OrderError::NotFound { id }) => {
                Some(serde_json::json!({ "id": id }))
            }
            LontongError::Order(OrderError::InvalidId { id }) => {
                Some(serde_json::json!({ "id": id }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for LontongError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        let mut response = (status, body).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer realm=\"api\""),
            );
        }

        response
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Single field validation error
    #[error("Validation error for field '{field}': {message}")]
    FieldError { field: String, message: String },

    /// Multiple field validation errors
    #[error("Validation errors: {}", join_field_errors(.0))]
    FieldErrors(Vec<FieldValidationError>),

    /// Body could not be parsed into the expected shape
    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },
}

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl FieldValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn join_field_errors(errors: &[FieldValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    /// Names of all fields this error refers to
    pub fn fields(&self) -> Vec<&str> {
        match self {
            ValidationError::FieldError { field, .. } => vec![field.as_str()],
            ValidationError::FieldErrors(errors) => errors.iter().map(|e| e.field.as_str()).collect(),
            ValidationError::InvalidJson { .. } => Vec::new(),
        }
    }

    /// Per-field entries; an unparseable body has none
    pub fn into_field_errors(self) -> Vec<FieldValidationError> {
        match self {
            ValidationError::FieldError { field, message } => {
                vec![FieldValidationError { field, message }]
            }
            ValidationError::FieldErrors(errors) => errors,
            ValidationError::InvalidJson { .. } => Vec::new(),
        }
    }
}

/// Collapse `validator`'s nested error map into flat, field-sorted entries
impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut flat: Vec<FieldValidationError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, field_errors)| {
                field_errors.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    FieldValidationError::new(field.to_string(), message)
                })
            })
            .collect();
        flat.sort_by(|a, b| a.field.cmp(&b.field));
        ValidationError::FieldErrors(flat)
    }
}

impl From<ValidationError> for LontongError {
    fn from(err: ValidationError) -> Self {
        LontongError::Validation(err)
    }
}

impl From<axum::extract::rejection::JsonRejection> for LontongError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        LontongError::Validation(ValidationError::InvalidJson {
            message: err.body_text(),
        })
    }
}

impl From<axum::extract::rejection::PathRejection> for LontongError {
    fn from(err: axum::extract::rejection::PathRejection) -> Self {
        LontongError::Validation(ValidationError::FieldError {
            field: "id".to_string(),
            message: err.body_text(),
        })
    }
}

impl From<axum::extract::rejection::QueryRejection> for LontongError {
    fn from(err: axum::extract::rejection::QueryRejection) -> Self {
        LontongError::Validation(ValidationError::FieldError {
            field: "query".to_string(),
            message: err.body_text(),
        })
    }
}

// =============================================================================
// Access Errors
// =============================================================================

/// Errors raised by identity resolution and the access policy
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// Anonymous caller on a restricted operation
    #[error("Authentication credentials were not provided")]
    AuthenticationRequired,

    /// A bearer token was presented but could not be resolved
    #[error("Given token not valid: {reason}")]
    InvalidToken { reason: String },

    /// Authenticated caller lacking the required privilege
    #[error("You do not have permission to {operation} orders")]
    PermissionDenied { operation: String },
}

impl AccessError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AccessError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            AccessError::InvalidToken { .. } => StatusCode::UNAUTHORIZED,
            AccessError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AccessError::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            AccessError::InvalidToken { .. } => "INVALID_TOKEN",
            AccessError::PermissionDenied { .. } => "PERMISSION_DENIED",
        }
    }
}

impl From<AccessError> for LontongError {
    fn from(err: AccessError) -> Self {
        LontongError::Access(err)
    }
}

// =============================================================================
// Order Errors
// =============================================================================

/// Errors related to order lookups
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("Order with id '{id}' not found")]
    NotFound { id: u64 },

    /// Path segment that cannot name any order
    #[error("Order with id '{id}' not found")]
    InvalidId { id: String },
}

impl OrderError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            OrderError::NotFound { .. } | OrderError::InvalidId { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            OrderError::NotFound { .. } | OrderError::InvalidId { .. } => "ORDER_NOT_FOUND",
        }
    }
}

impl From<OrderError> for LontongError {
    fn from(err: OrderError) -> Self {
        LontongError::Order(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors reported by an [`OrderStore`](crate::core::store::OrderStore)
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to {operation} order: {message}")]
    OperationFailed { operation: String, message: String },
}

impl StorageError {
    /// Wrap a store failure for the named operation
    pub fn operation(operation: &str, err: anyhow::Error) -> Self {
        StorageError::OperationFailed {
            operation: operation.to_string(),
            message: err.to_string(),
        }
    }
}

impl From<StorageError> for LontongError {
    fn from(err: StorageError) -> Self {
        LontongError::Storage(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Invalid value in configuration
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<ConfigError> for LontongError {
    fn from(err: ConfigError) -> Self {
        LontongError::Config(err)
    }
}

/// A specialized Result type for order operations
pub type LontongResult<T> = Result<T, LontongError>;
