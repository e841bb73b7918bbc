// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Real clients on throwaway databases.

use std::sync::Arc;

use keel_config::{ClientConfig, LogDefinition};
use keel_core::{KeelError, NewUser};
use keel_storage::Client;

/// A temp directory holding a database that already contains some users.
///
/// The directory is removed when this value is dropped.
pub struct SeededDatabase {
    dir: tempfile::TempDir,
    config: ClientConfig,
}

impl SeededDatabase {
    /// Create a database and insert `users` through a short-lived client.
    pub async fn with_users(users: &[NewUser]) -> Result<Self, KeelError> {
        let dir = tempfile::TempDir::new().map_err(KeelError::storage)?;
        let path = dir.path().join("seeded.db");
        let config = ClientConfig::at_path(path.to_string_lossy().into_owned()).with_log(vec![]);

        let seeder = Client::new(config.clone());
        for user in users {
            seeder.create_user(user).await?;
        }
        keel_core::DatabaseClient::disconnect(&seeder).await?;

        Ok(Self { dir, config })
    }

    /// Client configuration pointing at the seeded database.
    pub fn config(&self) -> ClientConfig {
        self.config.clone()
    }

    /// A fresh client on the seeded database with the given log definitions.
    pub fn client(&self, log: Vec<LogDefinition>) -> Arc<Client> {
        Arc::new(Client::new(self.config.clone().with_log(log)))
    }

    pub fn path(&self) -> &std::path::Path {
        self.dir.path()
    }
}
