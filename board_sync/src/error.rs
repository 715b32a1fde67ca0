use crate::config::{ConfigurationError, EnvVars};
use jira::{JiraBuilderError, JiraError};
use thiserror::Error;

/// Everything that can abort a synchronisation run.
///
/// None of these are recovered from locally; they travel up to the command line which
/// reports them and exits with [`SyncError::exit_code`].
#[allow(clippy::module_name_repetitions)]
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("Authentication with Jira failed: {0}")]
    Authentication(String),
    #[error("Jira request failed, try again later: {0}")]
    TransientApi(String),
    #[error("Jira rejected the request: {0}")]
    ClientRequest(String),
    #[error("Unable to decode the Jira response: {0}")]
    Decode(String),
    #[error("Unable to connect to database {target}: {reason}")]
    StorageConnection { target: String, reason: String },
    #[error("Unable to write to table {table}: {reason}")]
    StorageWrite { table: String, reason: String },
}

impl SyncError {
    /// Process exit code reported by the command line utility
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            SyncError::Configuration(_) => 2,
            SyncError::Authentication(_) => 3,
            SyncError::TransientApi(_) | SyncError::ClientRequest(_) | SyncError::Decode(_) => 4,
            SyncError::StorageConnection { .. } | SyncError::StorageWrite { .. } => 5,
        }
    }
}

impl From<JiraError> for SyncError {
    fn from(err: JiraError) -> Self {
        match err {
            JiraError::Unauthorized(_) => SyncError::Authentication(format!("{err}")),
            JiraError::ServerError { .. } | JiraError::RequestError(_) => {
                SyncError::TransientApi(format!("{err}"))
            }
            JiraError::Decode { .. } => SyncError::Decode(format!("{err}")),
            JiraError::ParseError(e) => SyncError::Configuration(ConfigurationError::Invalid {
                name: EnvVars::JIRA_BASE_URL,
                reason: e.to_string(),
            }),
            JiraError::NotFound(_) | JiraError::Fault { .. } | JiraError::UnexpectedStatus(_) => {
                SyncError::ClientRequest(format!("{err}"))
            }
        }
    }
}

impl From<JiraBuilderError> for SyncError {
    fn from(err: JiraBuilderError) -> Self {
        let name = match err {
            JiraBuilderError::InvalidPageSize(_) => EnvVars::JIRA_PAGE_SIZE,
            JiraBuilderError::InvalidTimeout => EnvVars::JIRA_TIMEOUT_SECS,
            JiraBuilderError::MissingCredentials => EnvVars::JIRA_API_TOKEN,
            JiraBuilderError::MissingHost
            | JiraBuilderError::InvalidUrl(_)
            | JiraBuilderError::ClientInitError(_) => EnvVars::JIRA_BASE_URL,
        };
        SyncError::Configuration(ConfigurationError::Invalid {
            name,
            reason: err.to_string(),
        })
    }
}
