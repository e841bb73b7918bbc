// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Owner of the shared client handle.

use std::sync::{Arc, OnceLock};

use keel_config::ClientConfig;
use tracing::debug;

use crate::client::Client;

/// Constructs one [`Client`] on first use and hands out clones of the same
/// `Arc` afterwards.
///
/// The binary owns a single provider, so a process has at most one client.
pub struct ClientProvider {
    config: ClientConfig,
    client: OnceLock<Arc<Client>>,
}

impl ClientProvider {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            client: OnceLock::new(),
        }
    }

    /// Returns the shared client, constructing it on the first call.
    ///
    /// Never fails: construction only stores configuration, the database
    /// is opened by the first query.
    pub fn get_client(&self) -> Arc<Client> {
        Arc::clone(self.client.get_or_init(|| {
            debug!(path = %self.config.database_path, "constructing database client");
            Arc::new(Client::new(self.config.clone()))
        }))
    }

    pub fn is_initialized(&self) -> bool {
        self.client.get().is_some()
    }
}
