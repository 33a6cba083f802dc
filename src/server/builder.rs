//! ServerBuilder for fluent API to build HTTP servers

use super::handlers::AppState;
use super::router::{build_health_routes, build_order_routes};
use crate::config::AppConfig;
use crate::core::auth::AuthProvider;
use crate::core::service::OrderService;
use crate::core::store::OrderStore;
use crate::storage::InMemoryOrderStore;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builder for the order API
///
/// The store defaults to an empty [`InMemoryOrderStore`] and the auth
/// provider to the token table of the configuration.
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_config(AppConfig::load()?)
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: AppConfig,
    store: Option<Arc<dyn OrderStore>>,
    auth_provider: Option<Arc<dyn AuthProvider>>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder with default configuration
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            store: None,
            auth_provider: None,
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a specific order store
    pub fn with_store(mut self, store: impl OrderStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Replace the configured token table
    pub fn with_auth_provider(mut self, provider: impl AuthProvider + 'static) -> Self {
        self.auth_provider = Some(Arc::new(provider));
        self
    }

    /// Shared state for the order handlers
    pub fn build_state(&mut self) -> Result<AppState> {
        self.config.validate()?;

        let store: Arc<dyn OrderStore> = match self.store.take() {
            Some(store) => store,
            None => Arc::new(InMemoryOrderStore::new()),
        };
        let auth: Arc<dyn AuthProvider> = match self.auth_provider.take() {
            Some(provider) => provider,
            None => Arc::new(self.config.auth_provider()),
        };

        Ok(AppState {
            service: Arc::new(OrderService::new(store, self.config.pricing)),
            auth,
        })
    }

    /// Build the final router
    ///
    /// Order routes, health routes, request tracing and (when enabled) CORS.
    pub fn build(mut self) -> Result<Router> {
        let state = self.build_state()?;

        let app = build_health_routes()
            .merge(build_order_routes(state))
            .layer(TraceLayer::new_for_http());

        let app = if self.config.server.cors {
            app.layer(CorsLayer::permissive())
        } else {
            app
        };

        Ok(app)
    }

    /// Serve the application with graceful shutdown
    ///
    /// Binds to `server.host:server.port` and stops on SIGTERM or Ctrl+C.
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.server.addr();
        let app = self.build()?;
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for a shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenConfig;

    #[test]
    fn test_build_with_defaults() {
        assert!(ServerBuilder::new().build().is_ok());
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let mut config = AppConfig::default();
        config.auth.tokens = vec![
            TokenConfig {
                token: "dup".to_string(),
                username: "a".to_string(),
                admin: true,
            },
            TokenConfig {
                token: "dup".to_string(),
                username: "b".to_string(),
                admin: false,
            },
        ];
        assert!(ServerBuilder::new().with_config(config).build().is_err());
    }

    #[test]
    fn test_state_uses_configured_prices() {
        let mut config = AppConfig::default();
        config.pricing.large_unit_price = rust_decimal::Decimal::from(12_000);
        let state = ServerBuilder::new()
            .with_config(config)
            .build_state()
            .unwrap();
        assert_eq!(
            state.service.prices().large_unit_price,
            rust_decimal::Decimal::from(12_000)
        );
    }

    #[tokio::test]
    async fn test_configured_tokens_back_the_default_provider() {
        let mut config = AppConfig::default();
        config.auth.tokens = vec![TokenConfig {
            token: "t".to_string(),
            username: "siti".to_string(),
            admin: true,
        }];
        let state = ServerBuilder::new()
            .with_config(config)
            .build_state()
            .unwrap();

        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            axum::http::HeaderValue::from_static("Bearer t"),
        );
        let caller = state.auth.extract_context(&headers).await.unwrap();
        assert!(caller.is_admin());
    }
}
