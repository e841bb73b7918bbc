// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the client, its configuration, and its consumers.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier of a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A user record as stored in the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub created_at: String,
}

/// Fields required to insert a new user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    /// Explicit id; `None` lets SQLite assign the next rowid.
    pub id: Option<i64>,
    pub email: String,
    pub name: Option<String>,
}

impl NewUser {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: None,
            email: email.into(),
            name: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Health status reported by client health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Connected and answering queries.
    Healthy,
    /// Operational but experiencing issues.
    Degraded(String),
    /// Not operational (for example, never connected).
    Unhealthy(String),
}

/// Kinds of client events that can be logged.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogLevel {
    /// Every SQL statement the client executes.
    Query,
    Info,
    Warn,
    Error,
}

/// Where a logged client event is delivered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogEmit {
    /// Written through the process's `tracing` subscriber.
    #[default]
    Stdout,
    /// Broadcast to subscribers of the client's event channel.
    Event,
}

/// Emitted once for every SQL statement the client issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryEvent {
    pub timestamp: DateTime<Utc>,
    pub query: String,
    /// Bound parameters rendered as a JSON array.
    pub params: String,
    pub duration: Duration,
    pub target: String,
}

impl QueryEvent {
    pub const TARGET: &'static str = "keel::query";

    pub fn new(query: impl Into<String>, params: impl Into<String>, duration: Duration) -> Self {
        Self {
            timestamp: Utc::now(),
            query: query.into(),
            params: params.into(),
            duration,
            target: Self::TARGET.to_string(),
        }
    }
}

/// An informational, warning, or error event raised by the client itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub target: String,
}

impl LogEvent {
    pub fn new(message: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
            target: target.into(),
        }
    }
}

/// Any event delivered to subscribers of a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Query(QueryEvent),
    Log { level: LogLevel, event: LogEvent },
}

impl ClientEvent {
    pub fn level(&self) -> LogLevel {
        match self {
            ClientEvent::Query(_) => LogLevel::Query,
            ClientEvent::Log { level, .. } => *level,
        }
    }
}
