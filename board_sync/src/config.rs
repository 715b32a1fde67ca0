//! Configuration of a synchronisation run.
//!
//! Everything is read from the environment, optionally seeded from a `.env` file, and
//! validated in one go before any network or database connection is attempted. The
//! resulting [`SyncConfiguration`] is immutable and handed to the runtime.
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jira::builder::MAX_PAGE_SIZE;
use jira::config::JiraClientConfiguration;
use jira::DEFAULT_PAGE_SIZE;
use log::debug;
use thiserror::Error;
use url::Url;

use crate::repository::database_manager::DatabaseConfig;

/// Names of the environment variables holding the configuration
pub struct EnvVars;

impl EnvVars {
    pub const JIRA_BASE_URL: &'static str = "JIRA_BASE_URL";
    pub const JIRA_EMAIL: &'static str = "JIRA_EMAIL";
    pub const JIRA_API_TOKEN: &'static str = "JIRA_API_TOKEN";
    pub const BOARD_ID: &'static str = "BOARD_ID";
    pub const JIRA_PAGE_SIZE: &'static str = "JIRA_PAGE_SIZE";
    pub const JIRA_TIMEOUT_SECS: &'static str = "JIRA_TIMEOUT_SECS";
    pub const SQL_DRIVER: &'static str = "SQL_DRIVER";
    pub const SQL_SERVER: &'static str = "SQL_SERVER";
    pub const SQL_PORT: &'static str = "SQL_PORT";
    pub const SQL_DATABASE: &'static str = "SQL_DATABASE";
    pub const SQL_AUTH: &'static str = "SQL_AUTH";
    pub const SQL_USERNAME: &'static str = "SQL_USERNAME";
    pub const SQL_PASSWORD: &'static str = "SQL_PASSWORD";
}

pub const DEFAULT_DATABASE: &str = "JiraReporting";
pub const DEFAULT_POSTGRES_PORT: u16 = 5432;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[allow(clippy::module_name_repetitions)]
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
    #[error("Unable to load environment file {path}: {reason}")]
    EnvFile { path: PathBuf, reason: String },
}

/// How to authenticate with the database server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlAuth {
    /// Trust the identity of the operating system user, no password
    Integrated,
    /// User name and password
    Sql,
}

impl SqlAuth {
    fn parse(value: &str) -> Result<Self, ConfigurationError> {
        match value.to_lowercase().as_str() {
            "integrated" | "windows" => Ok(SqlAuth::Integrated),
            "sql" | "password" => Ok(SqlAuth::Sql),
            other => Err(ConfigurationError::Invalid {
                name: EnvVars::SQL_AUTH,
                reason: format!("'{other}' is neither 'integrated' nor 'sql'"),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyncConfiguration {
    pub jira: JiraClientConfiguration,
    pub board_id: i64,
    pub page_size: u32,
    pub timeout: Duration,
    pub database: DatabaseConfig,
}

impl SyncConfiguration {
    /// Loads the configuration from the process environment.
    ///
    /// Values from `env_file`, or a `.env` file in the current directory or any of its
    /// parents, are added to the environment first. Variables already set take precedence.
    /// A `board_id` supplied here overrides `BOARD_ID`.
    ///
    /// # Errors
    /// If the environment file can not be read, or any value is missing or invalid
    pub fn load(env_file: Option<&Path>, board_id: Option<i64>) -> Result<Self, ConfigurationError> {
        match env_file {
            Some(path) => {
                dotenv::from_path(path).map_err(|e| ConfigurationError::EnvFile {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
            }
            None => discovered_env_file(dotenv::dotenv())?,
        }

        Self::from_lookup(|name| {
            if name == EnvVars::BOARD_ID {
                if let Some(id) = board_id {
                    return Some(id.to_string());
                }
            }
            std::env::var(name).ok()
        })
    }

    /// Builds the configuration from whatever `lookup` returns for each variable name.
    /// Blank values are treated as absent.
    ///
    /// # Errors
    /// The first missing or invalid value found
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |name: &'static str| get(name).ok_or(ConfigurationError::Missing(name));

        let jira_url = require(EnvVars::JIRA_BASE_URL)?
            .trim_end_matches('/')
            .to_string();
        validate_url(&jira_url)?;

        let user = require(EnvVars::JIRA_EMAIL)?;
        if !user.contains('@') {
            return Err(ConfigurationError::Invalid {
                name: EnvVars::JIRA_EMAIL,
                reason: format!("'{user}' is not an e-mail address"),
            });
        }

        let jira = JiraClientConfiguration {
            jira_url,
            user,
            token: require(EnvVars::JIRA_API_TOKEN)?,
        };
        if !jira.has_valid_jira_token() {
            return Err(ConfigurationError::Invalid {
                name: EnvVars::JIRA_API_TOKEN,
                reason: "looks like a placeholder rather than an API token".to_string(),
            });
        }

        let board_id = parse_number::<i64>(EnvVars::BOARD_ID, &require(EnvVars::BOARD_ID)?)?;
        if board_id <= 0 {
            return Err(ConfigurationError::Invalid {
                name: EnvVars::BOARD_ID,
                reason: "must be a positive integer".to_string(),
            });
        }

        let page_size = match get(EnvVars::JIRA_PAGE_SIZE) {
            Some(v) => parse_number::<u32>(EnvVars::JIRA_PAGE_SIZE, &v)?,
            None => DEFAULT_PAGE_SIZE,
        };
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ConfigurationError::Invalid {
                name: EnvVars::JIRA_PAGE_SIZE,
                reason: format!("must be between 1 and {MAX_PAGE_SIZE}"),
            });
        }

        let timeout = match get(EnvVars::JIRA_TIMEOUT_SECS) {
            Some(v) => match parse_number::<u64>(EnvVars::JIRA_TIMEOUT_SECS, &v)? {
                0 => {
                    return Err(ConfigurationError::Invalid {
                        name: EnvVars::JIRA_TIMEOUT_SECS,
                        reason: "must be at least one second".to_string(),
                    })
                }
                secs => Duration::from_secs(secs),
            },
            None => DEFAULT_TIMEOUT,
        };

        let database = database_config(&get)?;

        Ok(SyncConfiguration {
            jira,
            board_id,
            page_size,
            timeout,
            database,
        })
    }
}

/// A missing `.env` is fine, one that can not be read or parsed is not. dotenv applies the
/// lines preceding a bad one, so carrying on would run with half a configuration.
fn discovered_env_file(result: Result<PathBuf, dotenv::Error>) -> Result<(), ConfigurationError> {
    match result {
        Ok(path) => {
            debug!("Loaded environment from {}", path.display());
            Ok(())
        }
        Err(e) if e.not_found() => {
            debug!("No .env file found");
            Ok(())
        }
        Err(e) => Err(ConfigurationError::EnvFile {
            path: PathBuf::from(".env"),
            reason: e.to_string(),
        }),
    }
}

fn database_config<G>(get: &G) -> Result<DatabaseConfig, ConfigurationError>
where
    G: Fn(&str) -> Option<String>,
{
    let driver = get(EnvVars::SQL_DRIVER).unwrap_or_else(|| "postgres".to_string());
    match driver.to_lowercase().as_str() {
        "postgres" | "postgresql" => {
            let host = get(EnvVars::SQL_SERVER).ok_or(ConfigurationError::Missing(EnvVars::SQL_SERVER))?;
            let port = match get(EnvVars::SQL_PORT) {
                Some(v) => parse_number::<u16>(EnvVars::SQL_PORT, &v)?,
                None => DEFAULT_POSTGRES_PORT,
            };
            let database = get(EnvVars::SQL_DATABASE).unwrap_or_else(|| DEFAULT_DATABASE.to_string());
            let auth = match get(EnvVars::SQL_AUTH) {
                Some(v) => SqlAuth::parse(&v)?,
                None => SqlAuth::Integrated,
            };
            let (user, password) = match auth {
                SqlAuth::Sql => (
                    get(EnvVars::SQL_USERNAME).ok_or(ConfigurationError::Missing(EnvVars::SQL_USERNAME))?,
                    Some(get(EnvVars::SQL_PASSWORD).ok_or(ConfigurationError::Missing(EnvVars::SQL_PASSWORD))?),
                ),
                SqlAuth::Integrated => (
                    get(EnvVars::SQL_USERNAME)
                        .or_else(|| get("USER"))
                        .or_else(|| get("USERNAME"))
                        .ok_or(ConfigurationError::Missing(EnvVars::SQL_USERNAME))?,
                    None,
                ),
            };
            Ok(DatabaseConfig::Postgres {
                host,
                port,
                database,
                user,
                password,
            })
        }
        "sqlite" => {
            let path = get(EnvVars::SQL_DATABASE).ok_or(ConfigurationError::Missing(EnvVars::SQL_DATABASE))?;
            Ok(DatabaseConfig::SqliteOnDisk {
                path: PathBuf::from(path),
            })
        }
        other => Err(ConfigurationError::Invalid {
            name: EnvVars::SQL_DRIVER,
            reason: format!("'{other}' is not supported, use 'postgres' or 'sqlite'"),
        }),
    }
}

fn validate_url(value: &str) -> Result<(), ConfigurationError> {
    let url = Url::parse(value).map_err(|e| ConfigurationError::Invalid {
        name: EnvVars::JIRA_BASE_URL,
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigurationError::Invalid {
            name: EnvVars::JIRA_BASE_URL,
            reason: format!("unsupported scheme '{scheme}'"),
        }),
    }
}

fn parse_number<T>(name: &'static str, value: &str) -> Result<T, ConfigurationError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    value.parse::<T>().map_err(|e| ConfigurationError::Invalid {
        name,
        reason: format!("'{value}': {e}"),
    })
}

impl fmt::Display for SyncConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<18} {}", EnvVars::JIRA_BASE_URL, self.jira.jira_url)?;
        writeln!(f, "{:<18} {}", EnvVars::JIRA_EMAIL, self.jira.user)?;
        writeln!(f, "{:<18} {}", EnvVars::JIRA_API_TOKEN, self.jira.masked_token())?;
        writeln!(f, "{:<18} {}", EnvVars::BOARD_ID, self.board_id)?;
        writeln!(f, "{:<18} {}", EnvVars::JIRA_PAGE_SIZE, self.page_size)?;
        writeln!(f, "{:<18} {}", EnvVars::JIRA_TIMEOUT_SECS, self.timeout.as_secs())?;
        write!(f, "{:<18} {}", "database", self.database)
    }
}
