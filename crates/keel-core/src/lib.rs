// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Keel database client.
//!
//! Provides the error type, the domain types shared across the workspace,
//! and the [`DatabaseClient`] trait that the SQLite client and the test
//! doubles implement.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::KeelError;
pub use traits::DatabaseClient;
pub use types::{
    ClientEvent, HealthStatus, LogEmit, LogEvent, LogLevel, NewUser, QueryEvent, User, UserId,
};
