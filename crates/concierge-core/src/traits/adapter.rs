// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait for backends with identity, health and shutdown.

use async_trait::async_trait;

use crate::error::ConciergeError;
use crate::types::HealthStatus;

/// Identity and lifecycle shared by every backend (storage, feed).
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    /// Human-readable name of this backend instance.
    fn name(&self) -> &str;

    fn version(&self) -> semver::Version;

    /// Performs a health check and returns the backend's current status.
    async fn health_check(&self) -> Result<HealthStatus, ConciergeError>;

    /// Gracefully shuts down, releasing held resources.
    async fn shutdown(&self) -> Result<(), ConciergeError>;
}
