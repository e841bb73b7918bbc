// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded schema bootstrap using refinery.
//!
//! SQL files under `migrations/` are compiled into the binary at build time
//! via `embed_migrations!` and applied whenever the client opens a database.

use keel_core::KeelError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Apply all pending schema files to the given connection.
///
/// Refinery tracks applied files in its own `refinery_schema_history` table.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), KeelError> {
    embedded::migrations::runner()
        .run(conn)
        .map_err(KeelError::storage)?;
    Ok(())
}
