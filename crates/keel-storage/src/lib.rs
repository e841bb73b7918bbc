// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed database client for Keel.
//!
//! Provides a lazily-connecting [`Client`] with configurable query logging,
//! a [`ClientProvider`] that shares one client per owner, and the typed user
//! queries the client runs. All statements go through `tokio-rusqlite`'s
//! single background thread.

pub mod client;
pub mod database;
pub mod logger;
pub mod migrations;
pub mod provider;
pub mod queries;

pub use client::Client;
pub use database::Database;
pub use keel_core::DatabaseClient;
pub use logger::QueryLogger;
pub use provider::ClientProvider;
