// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `user_roles` reads and writes.

use concierge_core::clock;
use concierge_core::{ConciergeError, Role, RoleAssignment, RoleSet};
use rusqlite::params;

use crate::database::{Database, TxError, map_tr_err};
use crate::queries::parse_column;

pub async fn roles_for(db: &Database, user_id: &str) -> Result<RoleSet, ConciergeError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| -> Result<_, TxError> {
            let mut stmt = conn.prepare("SELECT role FROM user_roles WHERE user_id = ?1")?;
            let roles = stmt
                .query_map(params![user_id], |row| parse_column::<Role>(row, 0))?
                .collect::<Result<RoleSet, _>>()?;
            Ok(roles)
        })
        .await
        .map_err(map_tr_err)
}

/// Returns `false` when the assignment already existed.
pub async fn grant(db: &Database, user_id: &str, role: Role) -> Result<bool, ConciergeError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| -> Result<_, TxError> {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO user_roles (id, user_id, role, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    uuid::Uuid::new_v4().to_string(),
                    user_id,
                    role.as_str(),
                    clock::now()
                ],
            )?;
            Ok(inserted == 1)
        })
        .await
        .map_err(map_tr_err)
}

/// Returns `false` when there was nothing to revoke.
pub async fn revoke(db: &Database, user_id: &str, role: Role) -> Result<bool, ConciergeError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| -> Result<_, TxError> {
            let deleted = conn.execute(
                "DELETE FROM user_roles WHERE user_id = ?1 AND role = ?2",
                params![user_id, role.as_str()],
            )?;
            Ok(deleted == 1)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn assignments(
    db: &Database,
    role: Option<Role>,
) -> Result<Vec<RoleAssignment>, ConciergeError> {
    let role = role.map(Role::as_str);
    db.connection()
        .call(move |conn| -> Result<_, TxError> {
            let mut stmt = conn.prepare(
                "SELECT user_id, role, created_at FROM user_roles
                 WHERE (?1 IS NULL OR role = ?1)
                 ORDER BY created_at, rowid",
            )?;
            let rows = stmt
                .query_map(params![role], |row| {
                    Ok(RoleAssignment {
                        user_id: row.get(0)?,
                        role: parse_column(row, 1)?,
                        created_at: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(map_tr_err)
}
