//! # DueBot API
//!
//! The web surface of DueBot. It serves the one-time credential link page,
//! so that users never paste their Canvas token into a chat window, plus
//! health and version endpoints for the deployment.
//!
//! ## Architecture
//!
//! - **Routes**: URL structure
//! - **Handlers**: request processing
//! - **Middleware**: error mapping and security headers
//! - **Pages**: the static HTML served to browsers
//! - **Config**: environment configuration

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Error mapping and response headers
pub mod middleware;
/// HTML templates for the link flow
pub mod pages;
/// Route definitions
pub mod routes;

use std::{sync::Arc, time::Duration};

use axum::Router;
use duebot_core::link::{LinkTokens, Linker};
use eyre::Result;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

/// Largest request body the server accepts.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared application state that is accessible to all request handlers.
pub struct ApiState {
    /// Outstanding one-time link tokens, shared with the chat transport that issues them
    pub link_tokens: Arc<LinkTokens>,
    /// Validates and stores submitted credentials
    pub linker: Arc<Linker>,
}

/// Builds the router with every route and layer attached.
///
/// Kept separate from [`start_server`] so tests can drive it in-process.
pub fn build_router(state: Arc<ApiState>, request_timeout: Duration) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .merge(routes::link::routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .layer(axum::middleware::from_fn(middleware::security::security_headers))
}

/// Starts the API server and runs until the listener fails.
///
/// Logging is installed by the binary before this is called.
pub async fn start_server(config: config::ApiConfig, state: Arc<ApiState>) -> Result<()> {
    let app = build_router(state, Duration::from_secs(config.request_timeout));

    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Link server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
