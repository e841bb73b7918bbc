// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that serde attributes cannot express.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::KeelConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &KeelConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.client.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "client.database_path must not be empty".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for def in &config.client.log {
        if !seen.insert(def.level()) {
            errors.push(ConfigError::Validation {
                message: format!("client.log lists level `{}` more than once", def.level()),
            });
        }
    }

    let level = config.logging.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
