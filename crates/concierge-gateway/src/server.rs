// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use concierge_core::{Backend, ConciergeError};
use concierge_desk::Desk;

use crate::auth::{AuthConfig, identity_middleware};
use crate::handlers;
use crate::ws;

/// State for the unauthenticated health endpoint.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
    /// Backends probed by `GET /health`.
    pub backends: Arc<Vec<Arc<dyn Backend>>>,
}

impl HealthState {
    pub fn new(backends: Vec<Arc<dyn Backend>>) -> Self {
        Self {
            start_time: std::time::Instant::now(),
            backends: Arc::new(backends),
        }
    }
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub desk: Desk,
    pub auth: AuthConfig,
    pub health: HealthState,
}

/// Gateway server configuration (mirrors `GatewayConfig` from concierge-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Build the full route table.
///
/// - `GET /health` (public)
/// - `/v1/requests...`, `/v1/inbox`, `/v1/roles...` (identity required)
/// - `GET /v1/requests/{id}/live` (WebSocket, identity required)
pub fn router(state: GatewayState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route(
            "/v1/requests",
            post(handlers::create_request).get(handlers::list_requests),
        )
        .route("/v1/requests/{id}", get(handlers::get_request))
        .route("/v1/requests/{id}/status", post(handlers::transition_request))
        .route("/v1/requests/{id}/notes", put(handlers::set_notes))
        .route("/v1/requests/{id}/assignee", put(handlers::set_assignee))
        .route(
            "/v1/requests/{id}/messages",
            get(handlers::list_messages).post(handlers::send_message),
        )
        .route("/v1/requests/{id}/unread", get(handlers::unread_count))
        .route("/v1/requests/{id}/read", post(handlers::mark_read))
        .route("/v1/requests/{id}/live", get(ws::live_handler))
        .route("/v1/inbox", get(handlers::inbox))
        .route("/v1/catalog", get(handlers::catalog))
        .route("/v1/roles", get(handlers::list_roles))
        .route(
            "/v1/roles/{user_id}/{role}",
            put(handlers::grant_role).delete(handlers::revoke_role),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            identity_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind and serve until `shutdown` is cancelled.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), ConciergeError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ConciergeError::Config(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| ConciergeError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("Gateway server stopped");
    Ok(())
}
