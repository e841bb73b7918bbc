// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the `DatabaseClient` trait.

use std::future::Future;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex};
use tracing::debug;

use keel_config::ClientConfig;
use keel_core::{
    ClientEvent, DatabaseClient, HealthStatus, KeelError, NewUser, QueryEvent, User, UserId,
};

use crate::database::{map_tr_err, Database};
use crate::logger::QueryLogger;
use crate::queries;

/// A lazily-connecting handle to the SQLite database.
///
/// Construction never touches the filesystem. The first query (or an explicit
/// [`DatabaseClient::connect`]) opens the database; [`DatabaseClient::disconnect`]
/// closes it, and the next query opens it again.
pub struct Client {
    config: ClientConfig,
    logger: QueryLogger,
    db: Mutex<Option<Database>>,
}

impl Client {
    /// Create a client. The database is not opened until it is first used.
    pub fn new(config: ClientConfig) -> Self {
        let logger = QueryLogger::from_config(&config);
        Self {
            config,
            logger,
            db: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Receive events for every level configured with `emit = "event"`.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.logger.subscribe()
    }

    pub async fn is_connected(&self) -> bool {
        self.db.lock().await.is_some()
    }

    /// Insert a user and read it back.
    pub async fn create_user(&self, user: &NewUser) -> Result<User, KeelError> {
        let db = self.database().await?;
        let params = serde_json::json!([user.id, user.email, user.name]).to_string();
        let id = self
            .instrument(queries::users::INSERT_SQL, params, queries::users::insert(&db, user))
            .await?;
        self.instrument(
            queries::users::FIND_UNIQUE_SQL,
            serde_json::json!([id]).to_string(),
            queries::users::find_unique(&db, UserId(id)),
        )
        .await?
        .ok_or_else(|| KeelError::Internal(format!("user {id} missing right after insert")))
    }

    pub async fn count_users(&self) -> Result<i64, KeelError> {
        let db = self.database().await?;
        self.instrument(
            queries::users::COUNT_SQL,
            "[]".to_string(),
            queries::users::count(&db),
        )
        .await
    }

    /// Returns the open database, opening it first if needed.
    async fn database(&self) -> Result<Database, KeelError> {
        let mut slot = self.db.lock().await;
        if let Some(db) = slot.as_ref() {
            return Ok(db.clone());
        }

        let db = match Database::open_with(&self.config).await {
            Ok(db) => db,
            Err(e) => {
                self.logger.error(format!("connect failed: {e}"));
                return Err(e);
            }
        };
        self.logger
            .info(format!("connected to {}", self.config.database_path));
        *slot = Some(db.clone());
        Ok(db)
    }

    /// Run one statement, logging it whether or not it succeeded.
    ///
    /// A statement at or above `slow_query_ms` adds a `warn` log; a failed
    /// one adds an `error` log.
    async fn instrument<T>(
        &self,
        sql: &str,
        params: String,
        query: impl Future<Output = Result<T, KeelError>>,
    ) -> Result<T, KeelError> {
        let started = Instant::now();
        let result = query.await;
        let elapsed = started.elapsed();
        self.logger.query(QueryEvent::new(sql, params, elapsed));
        if let Some(threshold_ms) = self.config.slow_query_ms
            && elapsed >= Duration::from_millis(threshold_ms)
        {
            self.logger
                .warn(format!("slow query ({} ms): {sql}", elapsed.as_millis()));
        }
        if let Err(e) = &result {
            self.logger.error(format!("query failed: {e}"));
        }
        result
    }
}

#[async_trait]
impl DatabaseClient for Client {
    async fn connect(&self) -> Result<(), KeelError> {
        self.database().await.map(|_| ())
    }

    async fn find_unique_user(&self, id: UserId) -> Result<Option<User>, KeelError> {
        let db = self.database().await?;
        self.instrument(
            queries::users::FIND_UNIQUE_SQL,
            serde_json::json!([id.0]).to_string(),
            queries::users::find_unique(&db, id),
        )
        .await
    }

    async fn disconnect(&self) -> Result<(), KeelError> {
        let Some(db) = self.db.lock().await.take() else {
            debug!("disconnect: not connected");
            return Ok(());
        };
        match db.close().await {
            Ok(()) => {
                self.logger.info("disconnected");
                Ok(())
            }
            Err(e) => {
                self.logger.error(format!("disconnect failed: {e}"));
                Err(e)
            }
        }
    }

    async fn health_check(&self) -> Result<HealthStatus, KeelError> {
        let Some(db) = self.db.lock().await.clone() else {
            return Ok(HealthStatus::Unhealthy("not connected".into()));
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_config::LogDefinition;
    use keel_core::LogLevel;
    use tempfile::tempdir;
    use tracing_test::traced_test;

    fn config_in(dir: &tempfile::TempDir, log: Vec<LogDefinition>) -> ClientConfig {
        ClientConfig::at_path(dir.path().join("client.db").to_str().unwrap()).with_log(log)
    }

    fn drain(rx: &mut broadcast::Receiver<ClientEvent>) -> Vec<ClientEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn construction_is_lazy() {
        let dir = tempdir().unwrap();
        let config = config_in(&dir, vec![]);
        let path = std::path::PathBuf::from(&config.database_path);
        let client = Client::new(config);

        assert!(!client.is_connected().await);
        assert!(!path.exists(), "new() must not open the database");

        client.connect().await.unwrap();
        assert!(client.is_connected().await);
        assert!(path.exists());
        client.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn lookup_returns_matching_record_or_none() {
        let dir = tempdir().unwrap();
        let client = Client::new(config_in(&dir, vec![]));
        let created = client
            .create_user(&NewUser::new("ada@example.com").with_id(1).with_name("Ada"))
            .await
            .unwrap();

        let found = client.find_unique_user(UserId(1)).await.unwrap().unwrap();
        assert_eq!(found.id, 1);
        assert_eq!(found, created);

        assert!(client.find_unique_user(UserId(2)).await.unwrap().is_none());
        client.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn one_query_event_per_statement() {
        let dir = tempdir().unwrap();
        let client = Client::new(config_in(&dir, vec![LogDefinition::event(LogLevel::Query)]));
        let mut rx = client.subscribe();

        client
            .create_user(&NewUser::new("a@example.com").with_id(1))
            .await
            .unwrap(); // insert + read back
        client.find_unique_user(UserId(1)).await.unwrap();
        client.find_unique_user(UserId(99)).await.unwrap();
        client.count_users().await.unwrap();

        let events = drain(&mut rx);
        assert_eq!(events.len(), 5);
        assert!(events.iter().all(|e| e.level() == LogLevel::Query));
        match &events[2] {
            ClientEvent::Query(event) => {
                assert_eq!(event.query, queries::users::FIND_UNIQUE_SQL);
                assert_eq!(event.params, "[1]");
            }
            other => panic!("expected query event, got {other:?}"),
        }
        client.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn disabled_query_logging_emits_nothing() {
        let dir = tempdir().unwrap();
        let client = Client::new(config_in(&dir, vec![LogDefinition::event(LogLevel::Info)]));
        let mut rx = client.subscribe();

        client.find_unique_user(UserId(1)).await.unwrap();
        client.disconnect().await.unwrap();

        let levels: Vec<LogLevel> = drain(&mut rx).iter().map(ClientEvent::level).collect();
        assert_eq!(levels, vec![LogLevel::Info, LogLevel::Info]);
    }

    #[tokio::test]
    async fn info_events_fire_on_connect_and_disconnect() {
        let dir = tempdir().unwrap();
        let client = Client::new(config_in(&dir, vec![LogDefinition::event(LogLevel::Info)]));
        let mut rx = client.subscribe();

        client.connect().await.unwrap();
        client.connect().await.unwrap();
        client.disconnect().await.unwrap();

        let messages: Vec<String> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                ClientEvent::Log { event, .. } => Some(event.message),
                ClientEvent::Query(_) => None,
            })
            .collect();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].starts_with("connected to "));
        assert_eq!(messages[1], "disconnected");
    }

    #[tokio::test]
    async fn disconnect_is_idempotent_and_client_reconnects() {
        let dir = tempdir().unwrap();
        let client = Client::new(config_in(&dir, vec![]));
        client
            .create_user(&NewUser::new("b@example.com").with_id(5))
            .await
            .unwrap();

        client.disconnect().await.unwrap();
        client.disconnect().await.unwrap();
        assert!(!client.is_connected().await);

        let user = client.find_unique_user(UserId(5)).await.unwrap();
        assert!(user.is_some(), "data survives a disconnect/reconnect cycle");
        assert!(client.is_connected().await);
        client.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn health_reflects_connection_state() {
        let dir = tempdir().unwrap();
        let client = Client::new(config_in(&dir, vec![]));
        assert!(matches!(
            client.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
        client.connect().await.unwrap();
        assert_eq!(client.health_check().await.unwrap(), HealthStatus::Healthy);
        client.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn connect_failure_is_reported_and_logged() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();
        let config = ClientConfig::at_path(blocker.join("x.db").to_str().unwrap())
            .with_log(vec![LogDefinition::event(LogLevel::Error)]);
        let client = Client::new(config);
        let mut rx = client.subscribe();

        let err = client.find_unique_user(UserId(1)).await.unwrap_err();
        assert!(matches!(err, KeelError::Connection { .. }));
        assert!(!client.is_connected().await);
        assert_eq!(drain(&mut rx).len(), 1);

        client.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn failed_statement_logs_one_query_then_one_error() {
        let dir = tempdir().unwrap();
        let client = Client::new(config_in(
            &dir,
            vec![
                LogDefinition::event(LogLevel::Query),
                LogDefinition::event(LogLevel::Error),
            ],
        ));
        client.connect().await.unwrap();
        let db = client.db.lock().await.clone().unwrap();
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("DROP TABLE users;")?;
                Ok(())
            })
            .await
            .unwrap();
        let mut rx = client.subscribe();

        let err = client.find_unique_user(UserId(1)).await.unwrap_err();
        assert!(matches!(err, KeelError::Storage { .. }));

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2, "{events:?}");
        match &events[0] {
            ClientEvent::Query(event) => {
                assert_eq!(event.query, queries::users::FIND_UNIQUE_SQL);
            }
            other => panic!("expected query event, got {other:?}"),
        }
        match &events[1] {
            ClientEvent::Log {
                level: LogLevel::Error,
                event,
            } => assert!(event.message.starts_with("query failed"), "{}", event.message),
            other => panic!("expected error log, got {other:?}"),
        }
        client.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn slow_statements_emit_a_warning() {
        let dir = tempdir().unwrap();
        let config =
            config_in(&dir, vec![LogDefinition::event(LogLevel::Warn)]).with_slow_query_ms(0);
        let client = Client::new(config);
        let mut rx = client.subscribe();

        client.find_unique_user(UserId(1)).await.unwrap();
        client.disconnect().await.unwrap();

        let warnings: Vec<String> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                ClientEvent::Log {
                    level: LogLevel::Warn,
                    event,
                } => Some(event.message),
                _ => None,
            })
            .collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("slow query ("));
        assert!(warnings[0].contains("FROM users WHERE id = ?1"));
    }

    #[tokio::test]
    async fn fast_statements_do_not_warn() {
        let dir = tempdir().unwrap();
        let config =
            config_in(&dir, vec![LogDefinition::event(LogLevel::Warn)]).with_slow_query_ms(60_000);
        let client = Client::new(config);
        let mut rx = client.subscribe();

        client.find_unique_user(UserId(1)).await.unwrap();
        client.disconnect().await.unwrap();

        assert!(drain(&mut rx).is_empty());
    }

    #[traced_test]
    #[tokio::test]
    async fn default_config_logs_queries_to_stdout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stdout.db");
        let client = Client::new(ClientConfig::at_path(path.to_str().unwrap()));

        client.find_unique_user(UserId(1)).await.unwrap();
        client.disconnect().await.unwrap();

        assert!(logs_contain("FROM users WHERE id = ?1"));
    }
}
