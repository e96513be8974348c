mod api;
mod config;
mod engine;
mod error;
mod provider;
mod ratelimit;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::provider::MoralisClient;
use crate::ratelimit::RateLimiter;

pub use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct AppState {
    pub provider: MoralisClient,
    pub rate_limiter: RateLimiter,
    pub config: Arc<AppConfig>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing with pretty format
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aura=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .init();

    println!("================================================");
    println!("        AURASCORE ENGINE - Starting Up          ");
    println!("================================================");

    // Load configuration
    let config = AppConfig::load().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    println!("[CONFIG] Server: {}:{}", config.server.host, config.server.port);
    println!("[CONFIG] Provider: {}", config.moralis.base_url);
    if config.moralis.api_key.is_empty() {
        println!("[CONFIG] Moralis API Key: *** EMPTY - PLEASE SET AURA__MORALIS__API_KEY ***");
    } else {
        println!(
            "[CONFIG] Moralis API Key: {}...{} (length: {})",
            &config.moralis.api_key[..4.min(config.moralis.api_key.len())],
            &config.moralis.api_key[config.moralis.api_key.len().saturating_sub(4)..],
            config.moralis.api_key.len()
        );
    }

    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        "Starting AuraScore engine"
    );

    // A missing credential is fatal before any network call
    let provider = MoralisClient::new(&config.moralis)
        .map_err(|e| anyhow::anyhow!("Provider setup failed: {}", e))?;

    let state = AppState {
        provider,
        rate_limiter: RateLimiter::new(),
        config: Arc::new(config.clone()),
    };

    // Build router
    println!("[ROUTER] Setting up API routes...");
    let app = Router::new()
        .merge(api::create_router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);
    println!("[ROUTER] Routes configured: /health, /api/v1/wallet/{{wallet}}/score, /api/v1/resolve");

    // Start server
    let addr: SocketAddr = config.server_addr().parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    println!("================================================");
    println!("  Server listening on http://{}", addr);
    println!("================================================");
    println!();

    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
