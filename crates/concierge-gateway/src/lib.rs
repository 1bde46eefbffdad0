// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP/WebSocket gateway for the Concierge desk.
//!
//! Every `/v1` route runs behind the identity middleware, which turns the
//! proxy-forwarded `x-user-id` into an [`Actor`](concierge_core::Actor).
//! Domain errors are rendered as `{"error", "code"}` JSON bodies.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;
pub mod ws;

pub use auth::AuthConfig;
pub use error::{ApiError, ErrorResponse};
pub use server::{GatewayState, HealthState, ServerConfig, router, start_server};
