//! Horizon - Personal Finance Dashboard Backend
//!
//! Thin orchestration service over three hosted platforms: an identity/
//! document store, a bank-data aggregator, and an ACH payments provider.
//! Users sign up, link bank accounts, view balances and transactions, and
//! move money between linked accounts.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use horizon::api::{self, AppState};
use horizon::providers::{
    HostedAggregationClient, HostedIdentityClient, HostedPaymentsClient,
};
use horizon::Config;

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "horizon=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the application router
fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check (no auth)
        .route("/health", axum::routing::get(health_check))
        // API routes (session middleware applied inside)
        .merge(api::routes::create_router(state))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = Arc::new(Config::from_env()?);
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("Starting Horizon server");

    // Provider clients share the configured bounded timeout
    let identity = HostedIdentityClient::from_config(&config)
        .map_err(|e| anyhow::anyhow!("identity client: {}", e))?;
    let aggregation = HostedAggregationClient::from_config(&config)
        .map_err(|e| anyhow::anyhow!("aggregation client: {}", e))?;
    let payments = HostedPaymentsClient::from_config(&config)
        .map_err(|e| anyhow::anyhow!("payments client: {}", e))?;

    let state = AppState::new(
        config.clone(),
        Arc::new(identity),
        Arc::new(aggregation),
        Arc::new(payments),
    );

    tracing::info!("Listening on http://{}", addr);

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutting down. Goodbye!");

    Ok(())
}

/// Shutdown signal handler for graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}
