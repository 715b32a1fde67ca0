use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::SyncError;
use crate::repository::postgres::PostgresBoardRepository;
use crate::repository::sqlite::SqliteBoardRepository;
use crate::repository::{BoardRepository, RepositoryConnector};

/// Represents parameters for initializing the database connection
#[derive(Clone, PartialEq, Eq)]
pub enum DatabaseConfig {
    /// PostgreSQL server. Without a password the server must trust the user.
    Postgres {
        host: String,
        port: u16,
        database: String,
        user: String,
        password: Option<String>,
    },

    /// SQLite database with a specific file path. The file must already hold the tables.
    SqliteOnDisk { path: PathBuf },
}

impl fmt::Display for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseConfig::Postgres {
                host,
                port,
                database,
                user,
                password,
            } => {
                write!(f, "postgres://{user}")?;
                if password.is_some() {
                    write!(f, ":****")?;
                }
                write!(f, "@{host}:{port}/{database}")
            }
            DatabaseConfig::SqliteOnDisk { path } => write!(f, "sqlite:{}", path.display()),
        }
    }
}

// The password never ends up in log output
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DatabaseConfig({self})")
    }
}

pub struct DatabaseManager {
    config: DatabaseConfig,
}

impl DatabaseManager {
    #[must_use]
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl RepositoryConnector for DatabaseManager {
    async fn connect(&self) -> Result<Box<dyn BoardRepository>, SyncError> {
        match &self.config {
            DatabaseConfig::Postgres { .. } => {
                Ok(Box::new(PostgresBoardRepository::connect(&self.config).await?))
            }
            DatabaseConfig::SqliteOnDisk { path } => Ok(Box::new(SqliteBoardRepository::open(path)?)),
        }
    }

    fn target(&self) -> String {
        self.config.to_string()
    }
}
