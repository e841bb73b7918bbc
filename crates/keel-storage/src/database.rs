// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All statements are serialized through tokio-rusqlite's single background
//! thread. A [`Database`] is cheap to clone; clones share that thread.

use std::path::Path;
use std::time::Duration;

use keel_config::ClientConfig;
use keel_core::KeelError;
use tracing::debug;

use crate::migrations;

/// An open SQLite database with the schema applied.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open the database at `path` with default client settings.
    pub async fn open(path: &str) -> Result<Self, KeelError> {
        Self::open_with(&ClientConfig::at_path(path)).await
    }

    /// Open the database described by `config`.
    ///
    /// Creates the parent directory, applies PRAGMAs, and runs the embedded
    /// schema files before returning.
    pub async fn open_with(config: &ClientConfig) -> Result<Self, KeelError> {
        let path = config.database_path.clone();
        if path != ":memory:"
            && let Some(parent) = Path::new(&path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| KeelError::Connection {
                message: format!("cannot create directory {}", parent.display()),
                source: Some(Box::new(e)),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(&path)
            .await
            .map_err(|e| KeelError::Connection {
                message: format!("cannot open {path}"),
                source: Some(Box::new(e)),
            })?;

        let wal_mode = config.wal_mode;
        let busy_timeout = Duration::from_millis(config.busy_timeout_ms);
        let journal_mode = conn
            .call(move |conn| -> Result<Result<String, KeelError>, rusqlite::Error> {
                conn.busy_timeout(busy_timeout)?;
                conn.pragma_update(None, "foreign_keys", "ON")?;
                let journal_mode = if wal_mode {
                    conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                        row.get::<_, String>(0)
                    })?
                } else {
                    conn.query_row("PRAGMA journal_mode", [], |row| row.get::<_, String>(0))?
                };
                Ok(migrations::run_migrations(conn).map(|()| journal_mode))
            })
            .await
            .map_err(map_tr_err)??;

        debug!(path = %path, journal_mode = %journal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL and close the background connection.
    pub async fn close(self) -> Result<(), KeelError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        self.conn.close().await.map_err(map_tr_err)?;
        debug!("database closed");
        Ok(())
    }
}

/// Map a tokio-rusqlite error into the crate-wide error type.
pub(crate) fn map_tr_err(err: tokio_rusqlite::Error) -> KeelError {
    KeelError::storage(err)
}
