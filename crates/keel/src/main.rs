// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keel - a shared database client with query logging.
//!
//! This is the binary entry point. It owns the process's single
//! [`ClientProvider`] and runs one command against the shared client.

mod doctor;
mod example;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use keel_config::KeelConfig;
use keel_core::{QueryEvent, UserId};
use keel_storage::ClientProvider;
use tracing::{error, info};

/// Keel - a shared database client with query logging.
#[derive(Parser, Debug)]
#[command(name = "keel", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Exit non-zero when the example lookup or disconnect fails.
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Look up the example user, print it, and disconnect (default).
    Example {
        /// User id to look up instead of `example.user_id`.
        #[arg(long)]
        user_id: Option<i64>,
    },
    /// Look up one user; errors are returned as a failing exit status.
    Lookup {
        /// User id to look up.
        id: i64,
    },
    /// Check that the configured database can be opened and queried.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => keel_config::load_and_validate_path(path),
        None => keel_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            keel_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.logging.level);

    run(cli, config).await
}

async fn run(cli: Cli, config: KeelConfig) -> ExitCode {
    let provider = ClientProvider::new(config.client.clone());

    match cli.command.unwrap_or(Commands::Example { user_id: None }) {
        Commands::Example { user_id } => {
            let user_id = UserId(user_id.unwrap_or(config.example.user_id));
            let client = provider.get_client();
            let report = example::run_example(
                client.as_ref(),
                user_id,
                &mut std::io::stdout(),
                &mut std::io::stderr(),
            )
            .await;
            info!(user_id = %user_id, success = report.is_success(), "example finished");
            if cli.strict && !report.is_success() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Commands::Lookup { id } => {
            let client = provider.get_client();
            match example::run_lookup(client.as_ref(), UserId(id), &mut std::io::stdout())
                .await
            {
                Ok(_) => ExitCode::SUCCESS,
                Err(e) => {
                    error!(error = %e, "lookup failed");
                    eprintln!("error: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Doctor { plain } => {
            let client = provider.get_client();
            match doctor::run_doctor(&client, plain).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(_) => ExitCode::FAILURE,
            }
        }
        Commands::Config => match toml::to_string_pretty(&config) {
            Ok(rendered) => {
                print!("{rendered}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: cannot render configuration: {e}");
                ExitCode::FAILURE
            }
        },
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// Client query logs are written to stdout next to the command output. All
/// other events, failures included, are written to stderr.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt::writer::MakeWriterExt;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("keel={log_level},warn")));

    let writer = std::io::stdout
        .with_filter(|meta: &tracing::Metadata<'_>| writes_to_stdout(meta.target()))
        .or_else(std::io::stderr);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

/// Whether events for `target` belong on stdout.
fn writes_to_stdout(target: &str) -> bool {
    target == QueryEvent::TARGET
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_example() {
        let cli = Cli::try_parse_from(["keel", "--strict"]).unwrap();
        assert!(cli.strict);
        assert!(cli.command.is_none());
    }

    #[test]
    fn lookup_takes_a_positional_id() {
        let cli = Cli::try_parse_from(["keel", "lookup", "42"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Lookup { id: 42 })));
    }

    #[test]
    fn only_query_logs_are_routed_to_stdout() {
        assert!(writes_to_stdout("keel::query"));
        assert!(!writes_to_stdout("keel::error"));
        assert!(!writes_to_stdout("keel::info"));
        assert!(!writes_to_stdout("keel::example"));
        assert!(!writes_to_stdout("keel"));
    }

    #[tokio::test]
    async fn example_on_empty_database_succeeds_even_when_strict() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = KeelConfig::default();
        config.client.database_path = dir.path().join("main.db").to_string_lossy().into_owned();
        config.client.log = vec![];
        let cli = Cli::try_parse_from(["keel", "--strict", "example", "--user-id", "7"]).unwrap();

        assert_eq!(run(cli, config).await, ExitCode::SUCCESS);
    }
}
