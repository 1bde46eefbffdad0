// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity resolution and admin role management.

use tracing::{info, warn};

use concierge_core::policy;
use concierge_core::{Actor, Capability, ConciergeError, Role, RoleAssignment, RoleSet};

use crate::Desk;

impl Desk {
    /// Build the [`Actor`] for an authenticated user.
    ///
    /// A user with no recorded role is a player.
    pub async fn resolve_actor(&self, user_id: &str) -> Result<Actor, ConciergeError> {
        if user_id.trim().is_empty() {
            return Err(ConciergeError::Validation("user id is empty".into()));
        }
        let mut roles = self.roles.roles_for(user_id).await?;
        if roles.is_empty() {
            roles = RoleSet::of(&[Role::Player]);
        }
        Ok(Actor::new(user_id, roles))
    }

    pub async fn grant_role(
        &self,
        actor: &Actor,
        user_id: &str,
        role: Role,
    ) -> Result<bool, ConciergeError> {
        policy::require(actor, Capability::ManageRoles)?;
        if user_id.trim().is_empty() {
            return Err(ConciergeError::Validation("user id is empty".into()));
        }
        let granted = self.roles.grant(user_id, role).await?;
        if granted {
            info!(user_id, %role, by = %actor.user_id, "role granted");
        }
        Ok(granted)
    }

    pub async fn revoke_role(
        &self,
        actor: &Actor,
        user_id: &str,
        role: Role,
    ) -> Result<bool, ConciergeError> {
        policy::require(actor, Capability::ManageRoles)?;
        if user_id == actor.user_id && role == Role::Admin {
            warn!(user_id, "admin revoking their own admin role");
        }
        let revoked = self.roles.revoke(user_id, role).await?;
        if revoked {
            info!(user_id, %role, by = %actor.user_id, "role revoked");
        }
        Ok(revoked)
    }

    pub async fn list_role_assignments(
        &self,
        actor: &Actor,
        role: Option<Role>,
    ) -> Result<Vec<RoleAssignment>, ConciergeError> {
        policy::require(actor, Capability::ManageRoles)?;
        self.roles.assignments(role).await
    }
}
