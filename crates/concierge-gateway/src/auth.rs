// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity middleware for the gateway.
//!
//! An upstream auth proxy authenticates the user and forwards the identity
//! in the `x-user-id` header. When a proxy token is configured, the proxy
//! must also present it as `Authorization: Bearer <token>`.
//!
//! Requests without an identity are rejected (fail-closed).

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authentication configuration for the gateway.
#[derive(Clone, Default)]
pub struct AuthConfig {
    /// Shared secret expected from the auth proxy. `None` trusts any caller
    /// that can reach the listener.
    pub proxy_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("proxy_token", &self.proxy_token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

impl AuthConfig {
    fn proxy_verified(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = &self.proxy_token else {
            return true;
        };
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| token == expected)
    }
}

/// The forwarded user id, if present and non-blank.
pub fn user_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
}

/// Resolve the caller into an [`Actor`](concierge_core::Actor) and store it
/// in the request extensions.
pub async fn identity_middleware(
    State(state): State<GatewayState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.auth.proxy_verified(request.headers()) {
        tracing::warn!("rejecting request without valid proxy token");
        return Err(ApiError::Unauthenticated);
    }
    let Some(user_id) = user_id(request.headers()) else {
        return Err(ApiError::Unauthenticated);
    };

    let actor = state.desk.resolve_actor(user_id).await?;
    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}
