//! Order API server
//!
//! ```bash
//! LONTONG_CONFIG=config/lontong.yaml RUST_LOG=debug cargo run
//! ```

use lontong::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = AppConfig::load()?;

    tracing::info!(
        large_unit_price = %config.pricing.large_unit_price,
        small_unit_price = %config.pricing.small_unit_price,
        tokens = config.auth.tokens.len(),
        "configuration loaded"
    );
    if !config.auth.has_admin() {
        tracing::warn!("no admin token configured; set LONTONG_ADMIN_TOKEN to manage orders");
    }

    ServerBuilder::new()
        .with_config(config)
        .with_store(InMemoryOrderStore::new())
        .serve()
        .await
}
