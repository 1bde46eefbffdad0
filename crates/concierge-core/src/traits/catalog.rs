// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only view of the category/service catalog.

use async_trait::async_trait;

use crate::error::ConciergeError;
use crate::types::{Category, Service};

/// Reference data consumed when a request is created.
///
/// Lookups accept either the row id or the slug.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn find_category(&self, key: &str) -> Result<Option<Category>, ConciergeError>;

    async fn find_service(&self, key: &str) -> Result<Option<Service>, ConciergeError>;

    /// Active categories ordered by `display_order`.
    async fn active_categories(&self) -> Result<Vec<Category>, ConciergeError>;

    /// Active services of one category ordered by `display_order`.
    async fn active_services(&self, category_id: &str) -> Result<Vec<Service>, ConciergeError>;
}
