//!
//! ```rust,ignore
//! // 1. Using the builder with explicit configuration
//! let jira = Jira::builder()
//!     .host("https://your-jira.atlassian.net")
//!     .basic_auth("username@example.com", "your_api_token")
//!     .timeout(Duration::from_secs(60))
//!     .page_size(100)
//!     .build()?;
//!
//! // 2. From an application configuration
//! let jira = Jira::builder().configuration(&cfg).build()?;
//! ```
use crate::config::JiraClientConfiguration;
use crate::{parse_host, Credentials, Jira, JiraError, AGILE_API, DEFAULT_PAGE_SIZE};
use log::debug;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Largest `maxResults` Jira honours on the board issue endpoint
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Error type for `JiraBuilder` operations
#[derive(Error, Debug)]
pub enum JiraBuilderError {
    #[error("No Jira host specified")]
    MissingHost,

    #[error("No Jira credentials specified")]
    MissingCredentials,

    #[error("Invalid Jira URL: {0}")]
    InvalidUrl(#[source] JiraError),

    #[error("Jira client initialization error: {0}")]
    ClientInitError(String),

    #[error("Timeout must be positive")]
    InvalidTimeout,

    #[error("Page size must be between 1 and {MAX_PAGE_SIZE}, not {0}")]
    InvalidPageSize(u32),
}

/// Builder for creating Jira client instances with flexible configuration options
#[derive(Default)]
pub struct JiraBuilder {
    host: Option<String>,
    credentials: Option<Credentials>,
    timeout: Option<Duration>,
    page_size: Option<u32>,
}

impl JiraBuilder {
    /// Creates a new `JiraBuilder` with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the Jira host URL
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets basic authentication credentials
    #[must_use]
    pub fn basic_auth(mut self, username: impl Into<String>, token: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::Basic(username.into(), token.into()));
        self
    }

    /// Takes host and basic auth credentials from the configuration
    #[must_use]
    pub fn configuration(self, cfg: &JiraClientConfiguration) -> Self {
        self.host(cfg.jira_url.clone())
            .basic_auth(cfg.user.clone(), cfg.token.clone())
    }

    /// Sets a request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Number of issues to request per page
    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Builds a Jira client instance with the configured parameters
    ///
    /// # Errors
    /// If the host or the credentials are missing, or any of the values are out of range
    pub fn build(self) -> Result<Jira, JiraBuilderError> {
        let host = self.host.ok_or(JiraBuilderError::MissingHost)?;
        let credentials = self
            .credentials
            .ok_or(JiraBuilderError::MissingCredentials)?;

        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(JiraBuilderError::InvalidPageSize(page_size));
        }

        let host_url = parse_host(&host).map_err(JiraBuilderError::InvalidUrl)?;

        let mut client_builder = Client::builder();
        if let Some(timeout) = self.timeout {
            if timeout.is_zero() {
                return Err(JiraBuilderError::InvalidTimeout);
            }
            client_builder = client_builder.timeout(timeout);
        }
        let client = client_builder
            .build()
            .map_err(|e| JiraBuilderError::ClientInitError(e.to_string()))?;

        let jira = Jira {
            host: host_url,
            api: AGILE_API.to_string(),
            credentials,
            page_size,
            client,
        };
        debug!("Created Jira client: {:?}", jira);

        Ok(jira)
    }
}
