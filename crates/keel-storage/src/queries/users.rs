// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User record queries.
//!
//! The SQL text is exported so the client can log exactly what it runs.

use keel_core::{KeelError, NewUser, User, UserId};
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};

pub const FIND_UNIQUE_SQL: &str =
    "SELECT id, email, name, created_at FROM users WHERE id = ?1 LIMIT 1";

pub const INSERT_SQL: &str = "INSERT INTO users (id, email, name) VALUES (?1, ?2, ?3)";

pub const COUNT_SQL: &str = "SELECT COUNT(*) FROM users";

/// Look up a user by id. Returns `None` when no row matches.
pub async fn find_unique(db: &Database, id: UserId) -> Result<Option<User>, KeelError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare_cached(FIND_UNIQUE_SQL)?;
            stmt.query_row(params![id.0], |row| {
                Ok(User {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    name: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a user. Returns the id of the new row.
pub async fn insert(db: &Database, user: &NewUser) -> Result<i64, KeelError> {
    let user = user.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(INSERT_SQL, params![user.id, user.email, user.name])?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Count all users.
pub async fn count(db: &Database) -> Result<i64, KeelError> {
    db.connection()
        .call(|conn| conn.query_row(COUNT_SQL, [], |row| row.get(0)))
        .await
        .map_err(map_tr_err)
}
