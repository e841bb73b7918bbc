// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the client implementation and its consumers.

pub mod client;

pub use client::DatabaseClient;
