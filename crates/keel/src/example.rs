// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `keel example` and `keel lookup` command implementations.
//!
//! Both look up one user and always disconnect afterwards. `example` catches
//! a failed lookup and reports it on the error stream; `lookup` hands the
//! error back to the caller.

use std::io::Write;

use keel_core::{DatabaseClient, KeelError, User, UserId};
use tracing::{error, warn};

/// Outcome of one example run.
///
/// The lookup and the disconnect are recorded separately: a failed
/// disconnect never hides a failed lookup.
#[derive(Debug)]
pub struct ExampleReport {
    pub lookup: Result<Option<User>, KeelError>,
    pub disconnect: Result<(), KeelError>,
}

impl ExampleReport {
    pub fn is_success(&self) -> bool {
        self.lookup.is_ok() && self.disconnect.is_ok()
    }
}

/// Look up `user_id`, print the record (or `null`) to `out`, then disconnect.
///
/// Failures are written to `err` and returned in the report; this function
/// itself never fails. The disconnect runs exactly once, after the lookup
/// has settled, on every path.
pub async fn run_example<C, O, E>(
    client: &C,
    user_id: UserId,
    out: &mut O,
    err: &mut E,
) -> ExampleReport
where
    C: DatabaseClient + ?Sized,
    O: Write,
    E: Write,
{
    let lookup = client.find_unique_user(user_id).await;
    match &lookup {
        Ok(user) => {
            if let Err(e) = write_user(out, user.as_ref()) {
                warn!(error = %e, "failed to write lookup result");
            }
        }
        Err(e) => {
            error!(user_id = %user_id, error = %e, "example lookup failed");
            report(err, &format!("error: {e}"));
        }
    }

    let disconnect = client.disconnect().await;
    if let Err(e) = &disconnect {
        error!(error = %e, "disconnect failed");
        report(err, &format!("error: disconnect failed: {e}"));
    }

    ExampleReport { lookup, disconnect }
}

/// Look up `user_id` and disconnect, propagating the first failure.
///
/// A lookup error takes precedence over a disconnect error.
pub async fn run_lookup<C, O>(
    client: &C,
    user_id: UserId,
    out: &mut O,
) -> Result<Option<User>, KeelError>
where
    C: DatabaseClient + ?Sized,
    O: Write,
{
    let lookup = client.find_unique_user(user_id).await;
    let disconnect = client.disconnect().await;
    let user = lookup?;
    disconnect?;
    write_user(out, user.as_ref()).map_err(KeelError::storage)?;
    Ok(user)
}

/// Pretty JSON for a record, `null` when absent.
fn write_user<O: Write>(out: &mut O, user: Option<&User>) -> std::io::Result<()> {
    let rendered = serde_json::to_string_pretty(&user).map_err(std::io::Error::other)?;
    writeln!(out, "{rendered}")
}

fn report<E: Write>(err: &mut E, line: &str) {
    if let Err(e) = writeln!(err, "{line}") {
        warn!(error = %e, "failed to write to error stream");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_test_utils::{user, Call, MockClient};

    async fn run(mock: &MockClient, id: i64) -> (ExampleReport, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let report = run_example(mock, UserId(id), &mut out, &mut err).await;
        (
            report,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[tokio::test]
    async fn found_user_is_printed_then_disconnected() {
        let mock = MockClient::with_users(vec![user(1, "ada@example.com")]);
        let (report, out, err) = run(&mock, 1).await;

        assert!(report.is_success());
        assert_eq!(report.lookup.unwrap().unwrap().id, 1);
        assert!(out.contains("\"email\": \"ada@example.com\""));
        assert!(err.is_empty());
        assert_eq!(
            mock.calls().await,
            vec![Call::FindUniqueUser(UserId(1)), Call::Disconnect]
        );
    }

    #[tokio::test]
    async fn absent_user_prints_null() {
        let mock = MockClient::new();
        let (report, out, err) = run(&mock, 1).await;

        assert!(report.is_success());
        assert!(report.lookup.unwrap().is_none());
        assert_eq!(out.trim(), "null");
        assert!(err.is_empty());
    }

    #[tokio::test]
    async fn lookup_failure_goes_to_error_stream_and_still_disconnects() {
        let mock = MockClient::new();
        mock.fail_lookups("connection refused").await;
        let (report, out, err) = run(&mock, 1).await;

        assert!(!report.is_success());
        assert!(report.lookup.is_err());
        assert!(report.disconnect.is_ok());
        assert!(out.is_empty(), "nothing is printed to stdout on failure");
        assert!(err.starts_with("error: "));
        assert!(err.contains("connection refused"));
        assert_eq!(mock.count(&Call::Disconnect).await, 1);
        assert_eq!(mock.calls().await.last(), Some(&Call::Disconnect));
    }

    #[tokio::test]
    async fn disconnect_failure_after_lookup_failure_reports_both_in_order() {
        let mock = MockClient::new();
        mock.fail_lookups("query failed").await;
        mock.fail_disconnects("socket gone").await;
        let (report, _out, err) = run(&mock, 1).await;

        assert!(report.lookup.is_err());
        assert!(report.disconnect.is_err());
        let lines: Vec<&str> = err.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("query failed"));
        assert!(lines[1].contains("disconnect failed"));
        assert_eq!(mock.count(&Call::Disconnect).await, 1);
    }

    #[tokio::test]
    async fn lookup_command_propagates_errors_after_disconnecting() {
        let mock = MockClient::new();
        mock.fail_lookups("boom").await;
        let mut out = Vec::new();

        let result = run_lookup(&mock, UserId(3), &mut out).await;
        assert!(result.is_err());
        assert!(out.is_empty());
        assert_eq!(
            mock.calls().await,
            vec![Call::FindUniqueUser(UserId(3)), Call::Disconnect]
        );
    }

    #[tokio::test]
    async fn lookup_command_surfaces_disconnect_errors() {
        let mock = MockClient::with_users(vec![user(3, "c@example.com")]);
        mock.fail_disconnects("socket gone").await;
        let mut out = Vec::new();

        let err = run_lookup(&mock, UserId(3), &mut out).await.unwrap_err();
        assert!(err.to_string().contains("socket gone"));
    }
}
