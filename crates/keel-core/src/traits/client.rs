// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database client trait implemented by the SQLite client and test doubles.

use async_trait::async_trait;

use crate::error::KeelError;
use crate::types::{HealthStatus, User, UserId};

/// A handle to a database session.
///
/// Implementations connect lazily: the first query opens the underlying
/// connection if [`connect`](DatabaseClient::connect) was never called.
#[async_trait]
pub trait DatabaseClient: Send + Sync + 'static {
    /// Opens the connection if it is not already open.
    async fn connect(&self) -> Result<(), KeelError>;

    /// Looks up at most one user by its unique id.
    ///
    /// An absent record is `Ok(None)`, never an error.
    async fn find_unique_user(&self, id: UserId) -> Result<Option<User>, KeelError>;

    /// Releases the connection. Calling it while disconnected is a no-op.
    async fn disconnect(&self) -> Result<(), KeelError>;

    /// Performs a health check and returns the client's current status.
    async fn health_check(&self) -> Result<HealthStatus, KeelError>;
}
