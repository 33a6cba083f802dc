//! Core domain: the order entity, pricing, access policy and use cases

pub mod auth;
pub mod error;
pub mod notification;
pub mod order;
pub mod pricing;
pub mod query;
pub mod service;
pub mod store;

pub use auth::{AuthContext, AuthPolicy, AuthProvider, Operation, TokenAuthProvider};
pub use error::{LontongError, LontongResult};
pub use notification::{Notification, build_contact_link, render_notification};
pub use order::{NewOrder, Order, OrderDraft, OrderPatch, OrderView};
pub use pricing::UnitPrices;
pub use query::{PaginatedResponse, PaginationMeta, QueryParams};
pub use service::OrderService;
pub use store::OrderStore;
