//! # Lontong Orders
//!
//! Order-taking backend for a lontong vendor.
//!
//! ## Features
//!
//! - **Exact Pricing**: `total_price` is recomputed from configured unit prices on every save
//! - **Validated Input**: phone numbers, names and quantities checked before anything is stored
//! - **Access Policy**: anyone may place an order; reading and managing orders is admin-only
//! - **WhatsApp Links**: each order renders a customer summary and a `wa.me` deep link
//! - **Configuration-Based**: prices, listener and bearer tokens from YAML plus environment
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use lontong::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     ServerBuilder::new()
//!         .with_config(AppConfig::load()?)
//!         .with_store(InMemoryOrderStore::new())
//!         .serve()
//!         .await
//! }
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        auth::{AuthContext, AuthPolicy, AuthProvider, Operation, TokenAuthProvider},
        error::{LontongError, LontongResult},
        notification::{Notification, build_contact_link, render_notification},
        order::{NewOrder, Order, OrderDraft, OrderPatch, OrderView},
        pricing::UnitPrices,
        query::{PaginatedResponse, PaginationMeta, QueryParams},
        service::OrderService,
        store::OrderStore,
    };

    // === Storage ===
    pub use crate::storage::InMemoryOrderStore;

    // === Config ===
    pub use crate::config::{AppConfig, AuthConfig, ServerConfig, TokenConfig};

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use rust_decimal::Decimal;
    pub use serde::{Deserialize, Serialize};
}
