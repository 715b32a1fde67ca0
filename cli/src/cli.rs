use std::fmt::{self, Formatter};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub(crate) enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Parser)]
/// Jira board synchronisation - copies the columns and issues of a Jira board into
/// the reporting database
///
/// Configuration is read from the environment, and from a `.env` file if one is found in the
/// current directory or above it. See `jira-board-sync config` for the effective values.
///
/// Exit codes: 2 configuration, 3 authentication, 4 other Jira errors, 5 database errors.
#[command(author, version, about)] // Read from Cargo.toml
pub(crate) struct Opts {
    #[command(subcommand)]
    pub cmd: Option<Command>,

    #[arg(global = true, short, long)]
    pub verbosity: Option<LogLevel>,

    /// Board to synchronise, overrides BOARD_ID
    #[arg(global = true, short, long)]
    pub board: Option<i64>,

    /// Read the environment from this file rather than searching for `.env`
    #[arg(global = true, short, long)]
    pub env_file: Option<PathBuf>,
}

#[derive(Subcommand, Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Command {
    /// Fetch the board from Jira and upsert it into the database (default)
    Sync,
    /// Verify the credentials and access to the board, the database is not touched
    Check,
    /// Write the effective configuration to standard output, secrets masked
    Config,
}
