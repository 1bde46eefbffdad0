// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Role assignments (`user_roles`).

use async_trait::async_trait;

use crate::error::ConciergeError;
use crate::role::{Role, RoleSet};
use crate::types::RoleAssignment;

#[async_trait]
pub trait RoleDirectory: Send + Sync {
    /// Roles recorded for a user; empty when the user has none.
    async fn roles_for(&self, user_id: &str) -> Result<RoleSet, ConciergeError>;

    /// Grant a role. Returns `false` if the user already held it.
    async fn grant(&self, user_id: &str, role: Role) -> Result<bool, ConciergeError>;

    /// Revoke a role. Returns `false` if the user did not hold it.
    async fn revoke(&self, user_id: &str, role: Role) -> Result<bool, ConciergeError>;

    /// Every assignment, optionally limited to one role, oldest first.
    async fn assignments(&self, role: Option<Role>)
    -> Result<Vec<RoleAssignment>, ConciergeError>;
}
