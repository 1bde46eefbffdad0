// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request CRUD. Every read takes a [`RowScope`] bound straight into SQL.

use concierge_core::clock;
use concierge_core::{
    ConciergeError, Request, RequestChange, RequestFilter, RequestUpdate, RowScope,
};
use rusqlite::{OptionalExtension, Row, params};

use crate::database::{Database, TxError, map_tr_err};
use crate::queries::parse_column;

pub(crate) const REQUEST_COLUMNS: &str = "id, player_id, service_id, category_id, \
     assigned_concierge_id, status, title, description, priority, internal_notes, \
     created_at, updated_at";

/// Map the first twelve columns (in [`REQUEST_COLUMNS`] order) to a [`Request`].
pub(crate) fn request_from_row(row: &Row<'_>) -> rusqlite::Result<Request> {
    Ok(Request {
        id: row.get(0)?,
        player_id: row.get(1)?,
        service_id: row.get(2)?,
        category_id: row.get(3)?,
        assigned_concierge_id: row.get(4)?,
        status: parse_column(row, 5)?,
        title: row.get(6)?,
        description: row.get(7)?,
        priority: row.get(8)?,
        internal_notes: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn select_scoped(
    conn: &rusqlite::Connection,
    id: &str,
    owner: Option<&str>,
) -> rusqlite::Result<Option<Request>> {
    conn.query_row(
        &format!(
            "SELECT {REQUEST_COLUMNS} FROM requests
             WHERE id = ?1 AND (?2 IS NULL OR player_id = ?2)"
        ),
        params![id, owner],
        request_from_row,
    )
    .optional()
}

pub async fn insert_request(db: &Database, request: &Request) -> Result<(), ConciergeError> {
    let r = request.clone();
    db.connection()
        .call(move |conn| -> Result<(), TxError> {
            conn.execute(
                &format!(
                    "INSERT INTO requests ({REQUEST_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
                ),
                params![
                    r.id,
                    r.player_id,
                    r.service_id,
                    r.category_id,
                    r.assigned_concierge_id,
                    r.status.as_str(),
                    r.title,
                    r.description,
                    r.priority,
                    r.internal_notes,
                    r.created_at,
                    r.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_request(
    db: &Database,
    id: &str,
    scope: &RowScope,
) -> Result<Option<Request>, ConciergeError> {
    let id = id.to_string();
    let owner = scope.owner().map(str::to_string);
    db.connection()
        .call(move |conn| -> Result<_, TxError> {
            Ok(select_scoped(conn, &id, owner.as_deref())?)
        })
        .await
        .map_err(map_tr_err)
}

/// Newest first. Status narrows in SQL; bucket and title search are applied
/// to the scoped rows so case folding covers accented titles.
pub async fn list_requests(
    db: &Database,
    scope: &RowScope,
    filter: &RequestFilter,
) -> Result<Vec<Request>, ConciergeError> {
    let owner = scope.owner().map(str::to_string);
    let status = filter.status.map(|s| s.as_str());
    let rows = db
        .connection()
        .call(move |conn| -> Result<_, TxError> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REQUEST_COLUMNS} FROM requests
                 WHERE (?1 IS NULL OR player_id = ?1)
                   AND (?2 IS NULL OR status = ?2)
                 ORDER BY created_at DESC, rowid DESC"
            ))?;
            let rows = stmt
                .query_map(params![owner, status], request_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(map_tr_err)?;

    let needle = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    Ok(rows
        .into_iter()
        .filter(|r| filter.bucket.is_none_or(|b| b.contains(r.status)))
        .filter(|r| {
            needle
                .as_deref()
                .is_none_or(|q| r.title.to_lowercase().contains(q))
        })
        .collect())
}

/// Apply one change in a single transaction: scoped read, precondition,
/// status policy, write, re-read.
pub async fn update_request(
    db: &Database,
    id: &str,
    scope: &RowScope,
    update: RequestUpdate,
) -> Result<Request, ConciergeError> {
    let id = id.to_string();
    let owner = scope.owner().map(str::to_string);
    db.connection()
        .call(move |conn| -> Result<Request, TxError> {
            let tx = conn.transaction()?;
            let current = select_scoped(&tx, &id, owner.as_deref())?
                .ok_or_else(|| ConciergeError::request_not_found(&id))?;

            if let Some(expected) = &update.expected_updated_at
                && *expected != current.updated_at
            {
                return Err(ConciergeError::Conflict {
                    entity: "request",
                    id: id.clone(),
                }
                .into());
            }

            let updated_at = clock::advance(&current.updated_at);
            match update.change {
                RequestChange::Status { to, policy } => {
                    policy.check(current.status, to)?;
                    tx.execute(
                        "UPDATE requests SET status = ?1, updated_at = ?2 WHERE id = ?3",
                        params![to.as_str(), updated_at, id],
                    )?;
                }
                RequestChange::InternalNotes(notes) => {
                    tx.execute(
                        "UPDATE requests SET internal_notes = ?1, updated_at = ?2 WHERE id = ?3",
                        params![notes, updated_at, id],
                    )?;
                }
                RequestChange::Assignee(assignee) => {
                    tx.execute(
                        "UPDATE requests SET assigned_concierge_id = ?1, updated_at = ?2
                         WHERE id = ?3",
                        params![assignee, updated_at, id],
                    )?;
                }
            }

            let updated = select_scoped(&tx, &id, None)?
                .ok_or_else(|| ConciergeError::request_not_found(&id))?;
            tx.commit()?;
            Ok(updated)
        })
        .await
        .map_err(map_tr_err)
}
