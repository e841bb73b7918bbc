// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `keel doctor` command implementation.
//!
//! Checks that the database can be opened, answers queries, and carries the
//! expected schema. Always disconnects the client before returning.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use keel_core::{DatabaseClient, HealthStatus, KeelError};
use keel_storage::Client;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `keel doctor` command.
///
/// Returns an error when any check failed so the process can exit non-zero.
pub async fn run_doctor(client: &Client, plain: bool) -> Result<(), KeelError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let results = run_checks(client).await;

    print!("{}", render_results(&results, use_color));

    let failed = results
        .iter()
        .filter(|r| r.status == CheckStatus::Fail)
        .count();
    if failed > 0 {
        return Err(KeelError::Internal(format!("{failed} check(s) failed")));
    }
    Ok(())
}

/// Run every check in order, then disconnect.
pub async fn run_checks(client: &Client) -> Vec<CheckResult> {
    let mut results = vec![check_file(&client.config().database_path)];
    results.push(check_connect(client).await);
    if client.is_connected().await {
        results.push(check_schema(client).await);
    }

    let start = Instant::now();
    let disconnect = match client.disconnect().await {
        Ok(()) => CheckResult::new("Disconnect", CheckStatus::Pass, "clean", start),
        Err(e) => CheckResult::new("Disconnect", CheckStatus::Fail, e.to_string(), start),
    };
    results.push(disconnect);
    results
}

fn check_file(db_path: &str) -> CheckResult {
    let start = Instant::now();
    if db_path == ":memory:" || std::path::Path::new(db_path).exists() {
        CheckResult::new("Database file", CheckStatus::Pass, db_path, start)
    } else {
        CheckResult::new(
            "Database file",
            CheckStatus::Warn,
            format!("not found: {db_path} (created on first connect)"),
            start,
        )
    }
}

async fn check_connect(client: &Client) -> CheckResult {
    let start = Instant::now();
    if let Err(e) = client.connect().await {
        return CheckResult::new(
            "Connection",
            CheckStatus::Fail,
            format!("open failed: {e}"),
            start,
        );
    }
    match client.health_check().await {
        Ok(HealthStatus::Healthy) => {
            CheckResult::new("Connection", CheckStatus::Pass, "connected", start)
        }
        Ok(HealthStatus::Degraded(reason)) => {
            CheckResult::new("Connection", CheckStatus::Warn, reason, start)
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            CheckResult::new("Connection", CheckStatus::Fail, reason, start)
        }
        Err(e) => CheckResult::new(
            "Connection",
            CheckStatus::Fail,
            format!("query failed: {e}"),
            start,
        ),
    }
}

async fn check_schema(client: &Client) -> CheckResult {
    let start = Instant::now();
    match client.count_users().await {
        Ok(count) => {
            CheckResult::new("Schema", CheckStatus::Pass, format!("{count} user(s)"), start)
        }
        Err(e) => CheckResult::new("Schema", CheckStatus::Fail, e.to_string(), start),
    }
}

/// Format check results as the doctor report.
pub fn render_results(results: &[CheckResult], use_color: bool) -> String {
    use colored::Colorize;

    let mut report = String::from("\n  keel doctor\n");
    report.push_str(&format!("  {}\n", "-".repeat(50)));

    let mut issues = 0;
    for result in results {
        let duration_ms = result.duration.as_millis();
        let (symbol, message) = match (&result.status, use_color) {
            (CheckStatus::Pass, true) => (
                "✓".green().to_string(),
                result.message.normal().to_string(),
            ),
            (CheckStatus::Warn, true) => (
                "!".yellow().to_string(),
                result.message.yellow().to_string(),
            ),
            (CheckStatus::Fail, true) => {
                ("✗".red().to_string(), result.message.red().to_string())
            }
            (CheckStatus::Pass, false) => ("[OK]  ".to_string(), result.message.clone()),
            (CheckStatus::Warn, false) => ("[WARN]".to_string(), result.message.clone()),
            (CheckStatus::Fail, false) => ("[FAIL]".to_string(), result.message.clone()),
        };
        if result.status != CheckStatus::Pass {
            issues += 1;
        }
        report.push_str(&format!(
            "    {symbol} {:<16} {message} ({duration_ms}ms)\n",
            result.name
        ));
    }

    report.push('\n');
    match issues {
        0 => report.push_str("  All checks passed.\n"),
        1 => report.push_str("  1 issue found.\n"),
        n => report.push_str(&format!("  {n} issues found.\n")),
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_config::ClientConfig;

    #[tokio::test]
    async fn fresh_database_passes_after_first_connect() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doctor.db");
        let client = Client::new(ClientConfig::at_path(path.to_str().unwrap()).with_log(vec![]));

        let results = run_checks(&client).await;
        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Database file", "Connection", "Schema", "Disconnect"]);
        assert_eq!(results[0].status, CheckStatus::Warn);
        assert!(results[1..].iter().all(|r| r.status == CheckStatus::Pass));
        assert_eq!(results[2].message, "0 user(s)");
        assert!(!client.is_connected().await);
    }

    #[tokio::test]
    async fn unopenable_database_fails_and_skips_schema() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();
        let path = blocker.join("doctor.db");
        let client = Client::new(ClientConfig::at_path(path.to_str().unwrap()).with_log(vec![]));

        let results = run_checks(&client).await;
        assert_eq!(results[1].status, CheckStatus::Fail);
        assert!(results.iter().all(|r| r.name != "Schema"));
    }

    #[test]
    fn plain_report_counts_issues() {
        let start = Instant::now();
        let results = vec![
            CheckResult::new("Database file", CheckStatus::Warn, "missing", start),
            CheckResult::new("Connection", CheckStatus::Pass, "connected", start),
        ];
        let report = render_results(&results, false);
        assert!(report.contains("[WARN] Database file"));
        assert!(report.contains("[OK]   Connection"));
        assert!(report.contains("1 issue found."));
    }
}
