// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Keel database client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use keel_core::{LogEmit, LogLevel};
use serde::{Deserialize, Serialize};

/// Top-level Keel configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KeelConfig {
    /// Database client settings.
    #[serde(default)]
    pub client: ClientConfig,

    /// Settings for the bundled example lookup.
    #[serde(default)]
    pub example: ExampleConfig,

    /// Process-wide tracing settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// How long SQLite waits on a locked database before failing, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Which client events are logged, and where.
    ///
    /// Accepts bare level names (`log = ["query"]`) or tables
    /// (`log = [{ level = "query", emit = "event" }]`).
    #[serde(default = "default_log")]
    pub log: Vec<LogDefinition>,

    /// Statements slower than this many milliseconds also emit a `warn` log.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slow_query_ms: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            busy_timeout_ms: default_busy_timeout_ms(),
            log: default_log(),
            slow_query_ms: None,
        }
    }
}

impl ClientConfig {
    /// Configuration for a database at `path` with default settings otherwise.
    pub fn at_path(path: impl Into<String>) -> Self {
        Self {
            database_path: path.into(),
            ..Self::default()
        }
    }

    /// Replaces the log definitions.
    pub fn with_log(mut self, log: Vec<LogDefinition>) -> Self {
        self.log = log;
        self
    }

    /// Sets the slow-query warning threshold.
    pub fn with_slow_query_ms(mut self, threshold_ms: u64) -> Self {
        self.slow_query_ms = Some(threshold_ms);
        self
    }

    /// Returns the emit target configured for `level`, if that level is logged.
    ///
    /// When a level is listed more than once the first definition wins.
    pub fn emit_for(&self, level: LogLevel) -> Option<LogEmit> {
        self.log
            .iter()
            .find(|def| def.level() == level)
            .map(LogDefinition::emit)
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("keel").join("keel.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("keel.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_log() -> Vec<LogDefinition> {
    vec![LogDefinition::Level(LogLevel::Query)]
}

/// One entry of `client.log`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum LogDefinition {
    /// A bare level name, emitted to stdout.
    Level(LogLevel),
    /// A level with an explicit emit target.
    Detailed { level: LogLevel, emit: LogEmit },
}

impl LogDefinition {
    pub fn level(&self) -> LogLevel {
        match self {
            LogDefinition::Level(level) => *level,
            LogDefinition::Detailed { level, .. } => *level,
        }
    }

    pub fn emit(&self) -> LogEmit {
        match self {
            LogDefinition::Level(_) => LogEmit::Stdout,
            LogDefinition::Detailed { emit, .. } => *emit,
        }
    }

    /// Shorthand for `{ level, emit = "event" }`.
    pub fn event(level: LogLevel) -> Self {
        LogDefinition::Detailed {
            level,
            emit: LogEmit::Event,
        }
    }
}

/// Settings for the bundled example lookup.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExampleConfig {
    /// Id of the user the example looks up.
    #[serde(default = "default_user_id")]
    pub user_id: i64,
}

impl Default for ExampleConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
        }
    }
}

fn default_user_id() -> i64 {
    1
}

/// Process-wide tracing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
