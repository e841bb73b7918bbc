// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Keel integration tests.
//!
//! # Components
//!
//! - [`MockClient`] - scripted `DatabaseClient` that journals every call
//! - [`SeededDatabase`] - a real client on a temp database with users inserted

pub mod mock_client;
pub mod seeded;

pub use mock_client::{user, Call, MockClient};
pub use seeded::SeededDatabase;
