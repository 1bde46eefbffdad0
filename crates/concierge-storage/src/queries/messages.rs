// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message CRUD, unread counting and the inbox summary query.

use concierge_core::clock;
use concierge_core::{
    ConciergeError, ConversationSummary, Message, NewMessage, RequestStatus, RowScope, SenderType,
};
use rusqlite::{OptionalExtension, Row, params};

use crate::database::{Database, TxError, map_tr_err};
use crate::queries::parse_column;
use crate::queries::requests::{REQUEST_COLUMNS, request_from_row};

const MESSAGE_COLUMNS: &str = "id, request_id, sender_id, sender_type, content, is_read, created_at";

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        request_id: row.get(1)?,
        sender_id: row.get(2)?,
        sender_type: parse_column(row, 3)?,
        content: row.get(4)?,
        is_read: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn count(n: i64) -> u64 {
    u64::try_from(n).unwrap_or_default()
}

/// Insert a message (content stored trimmed) and advance the request's
/// `updated_at`, in one transaction. With `require_open` the request's status
/// is checked inside the same transaction.
///
/// `created_at` never sorts before the request's previous message, so the
/// listing order matches insertion order even if the wall clock steps back.
pub async fn insert_message(db: &Database, message: &NewMessage) -> Result<Message, ConciergeError> {
    let msg = message.clone();
    db.connection()
        .call(move |conn| -> Result<Message, TxError> {
            let content = msg.content.trim().to_string();
            if content.is_empty() {
                return Err(ConciergeError::Validation("message content is empty".into()).into());
            }

            let tx = conn.transaction()?;
            let (request_updated_at, status): (String, RequestStatus) = tx
                .query_row(
                    "SELECT updated_at, status FROM requests WHERE id = ?1",
                    params![msg.request_id],
                    |row| Ok((row.get(0)?, parse_column(row, 1)?)),
                )
                .optional()?
                .ok_or_else(|| ConciergeError::request_not_found(&msg.request_id))?;
            if msg.require_open && status.is_terminal() {
                return Err(ConciergeError::Validation(format!("request is {status}")).into());
            }

            let last: Option<String> = tx.query_row(
                "SELECT MAX(created_at) FROM messages WHERE request_id = ?1",
                params![msg.request_id],
                |row| row.get(0),
            )?;
            let created_at = clock::not_before(last.as_deref());

            tx.execute(
                &format!(
                    "INSERT INTO messages ({MESSAGE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)"
                ),
                params![
                    msg.id,
                    msg.request_id,
                    msg.sender_id,
                    msg.sender_type.as_str(),
                    content,
                    created_at,
                ],
            )?;
            tx.execute(
                "UPDATE requests SET updated_at = ?1 WHERE id = ?2",
                params![clock::advance(&request_updated_at), msg.request_id],
            )?;
            tx.commit()?;

            Ok(Message {
                id: msg.id,
                request_id: msg.request_id,
                sender_id: msg.sender_id,
                sender_type: msg.sender_type,
                content,
                is_read: false,
                created_at,
            })
        })
        .await
        .map_err(map_tr_err)
}

/// Every message of a request, oldest first; ties keep insertion order.
pub async fn list_messages(db: &Database, request_id: &str) -> Result<Vec<Message>, ConciergeError> {
    let request_id = request_id.to_string();
    db.connection()
        .call(move |conn| -> Result<_, TxError> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE request_id = ?1
                 ORDER BY created_at ASC, rowid ASC"
            ))?;
            let messages = stmt
                .query_map(params![request_id], message_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn count_unread(
    db: &Database,
    request_id: &str,
    from: SenderType,
) -> Result<u64, ConciergeError> {
    let request_id = request_id.to_string();
    let n: i64 = db
        .connection()
        .call(move |conn| -> Result<_, TxError> {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM messages
                 WHERE request_id = ?1 AND sender_type = ?2 AND is_read = 0",
                params![request_id, from.as_str()],
                |row| row.get(0),
            )?)
        })
        .await
        .map_err(map_tr_err)?;
    Ok(count(n))
}

/// Flip `is_read` on unread messages authored by `from`. Returns rows changed.
pub async fn mark_read(
    db: &Database,
    request_id: &str,
    from: SenderType,
) -> Result<u64, ConciergeError> {
    let request_id = request_id.to_string();
    let changed = db
        .connection()
        .call(move |conn| -> Result<_, TxError> {
            Ok(conn.execute(
                "UPDATE messages SET is_read = 1
                 WHERE request_id = ?1 AND sender_type = ?2 AND is_read = 0",
                params![request_id, from.as_str()],
            )?)
        })
        .await
        .map_err(map_tr_err)?;
    Ok(changed as u64)
}

/// Scoped requests that have at least one message, most recently updated first.
pub async fn conversation_summaries(
    db: &Database,
    scope: &RowScope,
    unread_from: SenderType,
) -> Result<Vec<ConversationSummary>, ConciergeError> {
    let owner = scope.owner().map(str::to_string);
    db.connection()
        .call(move |conn| -> Result<_, TxError> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REQUEST_COLUMNS},
                    (SELECT m.content FROM messages m WHERE m.request_id = requests.id
                     ORDER BY m.created_at DESC, m.rowid DESC LIMIT 1),
                    (SELECT MAX(m.created_at) FROM messages m WHERE m.request_id = requests.id),
                    (SELECT COUNT(*) FROM messages m WHERE m.request_id = requests.id),
                    (SELECT COUNT(*) FROM messages m WHERE m.request_id = requests.id
                     AND m.sender_type = ?2 AND m.is_read = 0)
                 FROM requests
                 WHERE (?1 IS NULL OR player_id = ?1)
                   AND EXISTS (SELECT 1 FROM messages m WHERE m.request_id = requests.id)
                 ORDER BY updated_at DESC, rowid DESC"
            ))?;
            let rows = stmt
                .query_map(params![owner, unread_from.as_str()], |row| {
                    Ok(ConversationSummary {
                        request: request_from_row(row)?,
                        last_message: row.get(12)?,
                        last_message_at: row.get(13)?,
                        message_count: count(row.get(14)?),
                        unread_count: count(row.get(15)?),
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(map_tr_err)
}
