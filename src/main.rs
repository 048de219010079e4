//! keygate - API key issuance and validation service.
//!
//! A small REST backend that issues API keys, validates them on behalf of
//! protected routes, and revokes them. The server hands a caller the key
//! plaintext exactly once at creation; only a salted-lookup SHA-512 verifier
//! is ever stored.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Key scheme**: `sk_<salt>.<secret>` plaintext, `salt.hash` at rest
//! - **Format**: JSON requests/responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool and run migrations
//! 3. Wire the key store, secret generator, and key service
//! 4. Build the HTTP router; revocation sits behind the auth gate
//! 5. Serve until ctrl-c, then drain

mod config;
mod db;
mod error;
mod handlers;
mod keygen;
mod middleware;
mod models;
mod publicid;
mod repository;
mod services;

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::{
    db::DbPool, keygen::OsSecretGenerator, repository::api_keys::PostgresApiKeyStore,
    services::api_key_service::ApiKeyService,
};

/// Shared state handed to handlers via Axum's State extractor.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub api_keys: ApiKeyService,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads RUST_LOG, defaults to "info".
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    let pool = db::create_pool(&config.database_url, config.database_max_connections).await?;
    tracing::info!("Database pool created");

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let api_keys = ApiKeyService::new(
        Arc::new(PostgresApiKeyStore::new(pool.clone())),
        Arc::new(OsSecretGenerator),
    );

    let state = AppState {
        pool,
        api_keys: api_keys.clone(),
    };

    // Revocation requires presenting a currently valid key. Issuance stays
    // open: the service is deployed behind an operator boundary and the
    // first key could not be created otherwise.
    let protected_routes = Router::new()
        .route(
            "/api/v1/api-keys/{public_id}",
            delete(handlers::api_keys::revoke_api_key),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            api_keys,
            middleware::auth::auth_middleware,
        ));

    let app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/v1/api-keys", post(handlers::api_keys::create_api_key))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolve when the process receives ctrl-c.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {err}");
    }

    tracing::info!("Shutdown signal received");
}
