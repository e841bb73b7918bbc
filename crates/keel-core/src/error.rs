// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Keel database client.

use thiserror::Error;

/// The error type returned by every client operation.
///
/// Lookup failures of any kind (connectivity, SQL, row decoding) surface as
/// [`KeelError::Storage`]; callers that only care whether an operation
/// failed can treat all variants alike.
#[derive(Debug, Error)]
pub enum KeelError {
    /// Configuration errors (invalid values, unusable paths).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (query failure, schema bootstrap, row decoding).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Opening or closing the database connection failed.
    #[error("connection error: {message}")]
    Connection {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl KeelError {
    /// Wraps any error as a storage failure.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage {
            source: Box::new(err),
        }
    }
}
