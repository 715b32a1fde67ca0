//! Synchronises the columns and issues of a Jira Agile board into a relational database,
//! where they can be picked up by reporting tools.
//!
//! The [`ApplicationRuntime`] holds the configuration together with the Jira client and the
//! database connector; the use cases live in [`operation`].
use jira::models::board::Board;
use jira::Jira;
use log::debug;

use config::SyncConfiguration;
use error::SyncError;
use repository::database_manager::DatabaseManager;
use repository::RepositoryConnector;
use source::BoardSource;
use types::SyncSummary;

pub mod config;
pub mod error;
pub mod normalize;
pub mod operation;
pub mod repository;
pub mod source;
pub mod types;

pub struct ApplicationRuntime {
    config: SyncConfiguration,
    source: Box<dyn BoardSource>,
    database: Box<dyn RepositoryConnector>,
}

pub enum Operation {
    /// Copy the board into the database
    Sync,
    /// Verify access to the board
    Check,
}

#[derive(Debug)]
pub enum OperationResult {
    Synchronised(SyncSummary),
    Checked(Board),
}

impl ApplicationRuntime {
    /// Creates the runtime with a Jira client built from the configuration.
    ///
    /// No connection is made to either Jira or the database until an operation is executed.
    ///
    /// # Errors
    /// If the Jira client can not be created from the configuration
    pub fn new(config: SyncConfiguration) -> Result<Self, SyncError> {
        let client = Jira::builder()
            .configuration(&config.jira)
            .timeout(config.timeout)
            .page_size(config.page_size)
            .build()?;
        debug!("Created {:?}", client);

        let database = DatabaseManager::new(config.database.clone());
        Ok(Self::from_parts(config, Box::new(client), Box::new(database)))
    }

    /// Assembles a runtime from already created parts
    #[must_use]
    pub fn from_parts(
        config: SyncConfiguration,
        source: Box<dyn BoardSource>,
        database: Box<dyn RepositoryConnector>,
    ) -> Self {
        Self {
            config,
            source,
            database,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SyncConfiguration {
        &self.config
    }

    #[must_use]
    pub fn board_id(&self) -> i64 {
        self.config.board_id
    }

    pub fn source(&self) -> &dyn BoardSource {
        self.source.as_ref()
    }

    pub fn database(&self) -> &dyn RepositoryConnector {
        self.database.as_ref()
    }

    /// Executes the specified `Operation` and returns the result.
    ///
    /// # Errors
    ///
    /// - Configuration, authentication or request errors reported by Jira
    /// - Connection or write errors reported by the database, `Operation::Sync` only
    pub async fn execute(&self, operation: Operation) -> Result<OperationResult, SyncError> {
        match operation {
            Operation::Sync => {
                let summary = operation::sync::execute(self).await?;
                Ok(OperationResult::Synchronised(summary))
            }
            Operation::Check => {
                let board = operation::check::execute(self).await?;
                Ok(OperationResult::Checked(board))
            }
        }
    }
}
