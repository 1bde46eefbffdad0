// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator commands: `concierge roles ...` and `concierge config show`.
//!
//! These run with direct database access, so they bypass the `ManageRoles`
//! capability. This is how the first admin is created.

use concierge_config::ConciergeConfig;
use concierge_core::{Backend, ConciergeError, Role, RoleDirectory};
use concierge_storage::SqliteStore;

async fn open_store(config: &ConciergeConfig) -> Result<SqliteStore, ConciergeError> {
    SqliteStore::open(config.storage.clone()).await
}

pub async fn grant(config: &ConciergeConfig, user_id: &str, role: Role) -> Result<(), ConciergeError> {
    let store = open_store(config).await?;
    if store.grant(user_id, role).await? {
        println!("granted {role} to {user_id}");
    } else {
        println!("{user_id} already has {role}");
    }
    store.shutdown().await
}

pub async fn revoke(config: &ConciergeConfig, user_id: &str, role: Role) -> Result<(), ConciergeError> {
    let store = open_store(config).await?;
    if store.revoke(user_id, role).await? {
        println!("revoked {role} from {user_id}");
    } else {
        println!("{user_id} does not have {role}");
    }
    store.shutdown().await
}

pub async fn list(config: &ConciergeConfig, role: Option<Role>) -> Result<(), ConciergeError> {
    let store = open_store(config).await?;
    let assignments = store.assignments(role).await?;
    if assignments.is_empty() {
        println!("no role assignments");
    }
    for assignment in assignments {
        println!(
            "{:<36}  {:<10}  {}",
            assignment.user_id, assignment.role, assignment.created_at
        );
    }
    store.shutdown().await
}

/// Render the effective configuration, with secrets redacted.
pub fn render_config(config: &ConciergeConfig) -> Result<String, ConciergeError> {
    let mut shown = config.clone();
    if shown.gateway.proxy_token.is_some() {
        shown.gateway.proxy_token = Some("[redacted]".to_string());
    }
    toml::to_string_pretty(&shown).map_err(|e| ConciergeError::Internal(e.to_string()))
}

pub fn show_config(config: &ConciergeConfig) -> Result<(), ConciergeError> {
    print!("{}", render_config(config)?);
    Ok(())
}
