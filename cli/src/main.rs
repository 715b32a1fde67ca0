//! # The Jira Board Synchronisation Utility
//!
//! Copies the column layout and the issues of a Jira Agile board into two tables,
//! `jira_board_columns` and `jira_issues_board`, of a PostgreSQL or SQLite database.
//!
//! ## Configuration
//! Set the variables in the environment or put them in a `.env` file:
//! ```bash
//! JIRA_BASE_URL=https://yourcompany.atlassian.net
//! JIRA_EMAIL=your.email@company.com
//! JIRA_API_TOKEN=YOUR_API_TOKEN
//! BOARD_ID=2
//! SQL_SERVER=reporting.company.com
//! SQL_AUTH=sql
//! SQL_USERNAME=reporting
//! SQL_PASSWORD=secret
//! ```
//!
//! ## Usage Examples
//!
//! Synchronise the board:
//! ```bash
//! jira-board-sync
//! ```
//!
//! Verify access to another board:
//! ```bash
//! jira-board-sync check --board 7
//! ```
//!
//! Show the effective configuration:
//! ```bash
//! jira-board-sync config --env-file prod.env
//! ```
use board_sync::config::SyncConfiguration;
use board_sync::error::SyncError;
use board_sync::{ApplicationRuntime, Operation, OperationResult};
use clap::Parser;
use cli::{Command, LogLevel, Opts};
use env_logger::Env;
use log::{debug, error};
use std::process::exit;

mod cli;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let opts: Opts = Opts::parse();

    configure_logging(&opts); // Handles the -v option

    if let Err(err) = run(&opts).await {
        error!("{err}");
        eprintln!("Error: {err}");
        exit(err.exit_code());
    }
}

async fn run(opts: &Opts) -> Result<(), SyncError> {
    let config = SyncConfiguration::load(opts.env_file.as_deref(), opts.board)?;
    debug!("Configuration {:?}", config);

    match opts.cmd.unwrap_or(Command::Sync) {
        Command::Config => {
            println!("{config}");
        }
        Command::Check => {
            let runtime = ApplicationRuntime::new(config)?;
            if let OperationResult::Checked(board) = runtime.execute(Operation::Check).await? {
                println!(
                    "Board {} '{}' ({}) is accessible",
                    board.id, board.name, board.board_type
                );
            }
        }
        Command::Sync => {
            let runtime = ApplicationRuntime::new(config)?;
            if let OperationResult::Synchronised(summary) = runtime.execute(Operation::Sync).await? {
                println!("{summary}");
            }
        }
    }
    Ok(())
}

fn configure_logging(opts: &Opts) {
    // If nothing else was specified in RUST_LOG, use 'warn'
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter(opts.verbosity)))
        .target(env_logger::Target::Stderr)
        .init();
    debug!("Logging started");
}

fn default_filter(verbosity: Option<LogLevel>) -> String {
    verbosity.map_or_else(|| LogLevel::Warn.to_string(), |lvl| lvl.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_follows_verbosity() {
        assert_eq!(default_filter(None), "warn");
        assert_eq!(default_filter(Some(LogLevel::Debug)), "debug");
        assert_eq!(default_filter(Some(LogLevel::Error)), "error");
    }
}
