// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock database client for deterministic testing.
//!
//! `MockClient` implements `DatabaseClient` over an in-memory user map and
//! records each call in order, so tests can assert what ran and when.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use keel_core::{DatabaseClient, HealthStatus, KeelError, User, UserId};

/// One recorded call against a [`MockClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect,
    FindUniqueUser(UserId),
    Disconnect,
    HealthCheck,
}

#[derive(Default)]
struct State {
    users: HashMap<i64, User>,
    lookup_error: Option<String>,
    disconnect_error: Option<String>,
    connected: bool,
    calls: Vec<Call>,
}

/// A scripted client. Lookups read from an in-memory map unless a lookup
/// failure has been scripted.
#[derive(Clone, Default)]
pub struct MockClient {
    state: Arc<Mutex<State>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that already holds `users`.
    pub fn with_users(users: Vec<User>) -> Self {
        let state = State {
            users: users.into_iter().map(|u| (u.id, u)).collect(),
            ..State::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Make every subsequent lookup fail with `message`.
    pub async fn fail_lookups(&self, message: impl Into<String>) {
        self.state.lock().await.lookup_error = Some(message.into());
    }

    /// Make every subsequent disconnect fail with `message`.
    pub async fn fail_disconnects(&self, message: impl Into<String>) {
        self.state.lock().await.disconnect_error = Some(message.into());
    }

    /// All calls made so far, in order.
    pub async fn calls(&self) -> Vec<Call> {
        self.state.lock().await.calls.clone()
    }

    /// Number of recorded calls equal to `call`.
    pub async fn count(&self, call: &Call) -> usize {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| *c == call)
            .count()
    }

    pub async fn is_connected(&self) -> bool {
        self.state.lock().await.connected
    }
}

/// A plain user record for tests.
pub fn user(id: i64, email: &str) -> User {
    User {
        id,
        email: email.to_string(),
        name: None,
        created_at: "2026-01-01T00:00:00.000Z".to_string(),
    }
}

#[async_trait]
impl DatabaseClient for MockClient {
    async fn connect(&self) -> Result<(), KeelError> {
        let mut state = self.state.lock().await;
        state.calls.push(Call::Connect);
        state.connected = true;
        Ok(())
    }

    async fn find_unique_user(&self, id: UserId) -> Result<Option<User>, KeelError> {
        let mut state = self.state.lock().await;
        state.calls.push(Call::FindUniqueUser(id));
        if let Some(message) = &state.lookup_error {
            return Err(KeelError::storage(std::io::Error::other(message.clone())));
        }
        state.connected = true;
        Ok(state.users.get(&id.0).cloned())
    }

    async fn disconnect(&self) -> Result<(), KeelError> {
        let mut state = self.state.lock().await;
        state.calls.push(Call::Disconnect);
        state.connected = false;
        match &state.disconnect_error {
            Some(message) => Err(KeelError::Connection {
                message: message.clone(),
                source: None,
            }),
            None => Ok(()),
        }
    }

    async fn health_check(&self) -> Result<HealthStatus, KeelError> {
        let mut state = self.state.lock().await;
        state.calls.push(Call::HealthCheck);
        Ok(if state.connected {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy("not connected".into())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookups_read_from_seeded_users() {
        let mock = MockClient::with_users(vec![user(1, "a@example.com")]);
        assert_eq!(
            mock.find_unique_user(UserId(1)).await.unwrap().unwrap().email,
            "a@example.com"
        );
        assert!(mock.find_unique_user(UserId(2)).await.unwrap().is_none());
        assert_eq!(
            mock.calls().await,
            vec![Call::FindUniqueUser(UserId(1)), Call::FindUniqueUser(UserId(2))]
        );
    }

    #[tokio::test]
    async fn scripted_failures_are_returned() {
        let mock = MockClient::new();
        mock.fail_lookups("connection refused").await;
        mock.fail_disconnects("socket gone").await;

        let err = mock.find_unique_user(UserId(1)).await.unwrap_err();
        assert!(err.to_string().contains("connection refused"));
        assert!(mock.disconnect().await.is_err());
        assert_eq!(mock.count(&Call::Disconnect).await, 1);
    }
}
