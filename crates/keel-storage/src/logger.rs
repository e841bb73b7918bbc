// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client event logging.
//!
//! Each configured level is routed either to `tracing` (stdout emit) or to a
//! broadcast channel that callers subscribe to (event emit). Levels that are
//! not configured are dropped.

use keel_config::ClientConfig;
use keel_core::{ClientEvent, LogEmit, LogEvent, LogLevel, QueryEvent};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

/// Capacity of the event channel. Slow subscribers observe `Lagged`.
const EVENT_CAPACITY: usize = 256;

/// Routes client events according to the configured log definitions.
pub struct QueryLogger {
    query: Option<LogEmit>,
    info: Option<LogEmit>,
    warn: Option<LogEmit>,
    error: Option<LogEmit>,
    events: broadcast::Sender<ClientEvent>,
}

impl QueryLogger {
    pub fn from_config(config: &ClientConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            query: config.emit_for(LogLevel::Query),
            info: config.emit_for(LogLevel::Info),
            warn: config.emit_for(LogLevel::Warn),
            error: config.emit_for(LogLevel::Error),
            events,
        }
    }

    /// Receive every event whose level is configured with `emit = "event"`.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.emit_for(level).is_some()
    }

    fn emit_for(&self, level: LogLevel) -> Option<LogEmit> {
        match level {
            LogLevel::Query => self.query,
            LogLevel::Info => self.info,
            LogLevel::Warn => self.warn,
            LogLevel::Error => self.error,
        }
    }

    /// Record one executed statement.
    pub fn query(&self, event: QueryEvent) {
        match self.query {
            None => {}
            Some(LogEmit::Stdout) => info!(
                target: QueryEvent::TARGET,
                params = %event.params,
                duration_ms = event.duration.as_secs_f64() * 1000.0,
                "{}",
                event.query
            ),
            Some(LogEmit::Event) => self.publish(ClientEvent::Query(event)),
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message.into());
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message.into());
    }

    fn log(&self, level: LogLevel, message: String) {
        match self.emit_for(level) {
            None => {}
            Some(LogEmit::Stdout) => match level {
                LogLevel::Warn => warn!(target: "keel::warn", "{message}"),
                LogLevel::Error => error!(target: "keel::error", "{message}"),
                _ => info!(target: "keel::info", "{message}"),
            },
            Some(LogEmit::Event) => {
                let target = format!("keel::{level}");
                self.publish(ClientEvent::Log {
                    level,
                    event: LogEvent::new(message, target),
                });
            }
        }
    }

    fn publish(&self, event: ClientEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }
}
