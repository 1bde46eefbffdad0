// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection management: PRAGMA setup, migrations and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT open additional connections for writes.

use std::path::Path;

use concierge_config::StorageConfig;
use concierge_core::ConciergeError;
use tracing::{debug, info};

use crate::migrations;

/// Error raised inside a `Connection::call` closure.
///
/// Domain failures detected mid-transaction travel as [`TxError::Domain`]
/// so they reach the caller unchanged; everything else is a backend fault.
#[derive(Debug, thiserror::Error)]
pub enum TxError {
    #[error(transparent)]
    Sql(#[from] rusqlite::Error),

    #[error(transparent)]
    Migration(#[from] refinery::Error),

    #[error(transparent)]
    Domain(ConciergeError),
}

impl From<ConciergeError> for TxError {
    fn from(err: ConciergeError) -> Self {
        TxError::Domain(err)
    }
}

/// Convert a tokio-rusqlite error into a [`ConciergeError`].
pub fn map_tr_err(e: tokio_rusqlite::Error<TxError>) -> ConciergeError {
    match e {
        tokio_rusqlite::Error::Error(TxError::Domain(err)) => err,
        other => ConciergeError::Transient {
            source: Box::new(other),
        },
    }
}

/// Handle to the SQLite database. Cloning shares the same writer thread.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
    path: String,
}

impl Database {
    /// Open (or create) the database at `config.database_path`, apply
    /// PRAGMAs and run pending migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, ConciergeError> {
        let path = config.database_path.clone();
        if let Some(parent) = Path::new(&path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConciergeError::Transient {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(&path)
            .await
            .map_err(|e| ConciergeError::Transient {
                source: Box::new(e),
            })?;

        let wal_mode = config.wal_mode;
        let busy_timeout_ms = config.busy_timeout_ms;
        conn.call(move |conn| -> Result<(), TxError> {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
                conn.pragma_update(None, "synchronous", "NORMAL")?;
            }
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.busy_timeout(std::time::Duration::from_millis(busy_timeout_ms))?;
            migrations::run_migrations(conn)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        info!(path = %path, wal_mode, "database opened");
        Ok(Self { conn, path })
    }

    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Fold the WAL back into the main file.
    pub async fn checkpoint(&self) -> Result<(), ConciergeError> {
        self.conn
            .call(|conn| -> Result<(), TxError> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!(path = %self.path, "WAL checkpoint complete");
        Ok(())
    }
}
