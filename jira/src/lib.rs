//!
//! `jira` is a small client for the Jira Cloud Agile REST interface, covering what is
//! needed to copy the column layout and the issues of a board into a relational database.
//!
//! ```rust,ignore
//! let jira = Jira::builder()
//!     .host("https://yourcompany.atlassian.net")
//!     .basic_auth("user@yourcompany.com", "api-token")
//!     .build()?;
//! let configuration = jira.get_board_configuration(2).await?;
//! let issues = jira.get_board_issues(2).await?;
//! ```
use std::{
    collections::BTreeMap,
    fmt::{self, Formatter},
};

use log::debug;
use models::{
    board::{Board, BoardConfiguration},
    issue::{Issue, IssuesPage, BOARD_ISSUE_FIELDS},
};
use reqwest::{header::ACCEPT, Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub mod builder;
pub mod config;
pub mod models;

pub use builder::{JiraBuilder, JiraBuilderError};
pub use reqwest::StatusCode;

pub type Result<T> = std::result::Result<T, JiraError>;

/// Number of issues requested per page, same as the Jira default
pub const DEFAULT_PAGE_SIZE: u32 = 50;

const AGILE_API: &str = "agile/1.0";

/// Error document Jira returns along with 4xx responses
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct Errors {
    #[serde(rename = "errorMessages", default)]
    pub error_messages: Vec<String>,
    #[serde(default)]
    pub errors: BTreeMap<String, String>,
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.error_messages.clone();
        parts.extend(self.errors.iter().map(|(field, msg)| format!("{field}: {msg}")));
        if parts.is_empty() {
            write!(f, "no details supplied")
        } else {
            write!(f, "{}", parts.join("; "))
        }
    }
}

#[derive(Error, Debug)]
pub enum JiraError {
    #[error("Not authorized ({0}), check the account e-mail and API token")]
    Unauthorized(StatusCode),
    #[error("Not found: '{0}'")]
    NotFound(String),
    #[error("Jira rejected the request ({code}): {errors}")]
    Fault { code: StatusCode, errors: Errors },
    #[error("Jira responded with {code} for {url}")]
    ServerError { code: StatusCode, url: String },
    #[error("Unable to reach Jira: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Could not deserialize the response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },
    #[error("Invalid Jira URL: {0}")]
    ParseError(#[from] url::ParseError),
    #[error("Unexpected status {0}")]
    UnexpectedStatus(StatusCode),
}

impl JiraError {
    /// Errors caused by rejected credentials
    #[must_use]
    pub fn is_authentication(&self) -> bool {
        matches!(self, JiraError::Unauthorized(_))
    }

    /// Errors which might go away if the request is repeated later
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            JiraError::ServerError { .. } | JiraError::RequestError(_)
        )
    }
}

#[derive(Clone, Debug)]
pub enum Credentials {
    Anonymous,
    Basic(String, String),
}

impl Credentials {
    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Credentials::Anonymous => request,
            Credentials::Basic(ref user, ref pass) => {
                request.basic_auth(user.to_owned(), Some(pass.to_owned()))
            }
        }
    }
}

#[derive(Clone)]
pub struct Jira {
    host: Url,
    api: String,
    credentials: Credentials,
    page_size: u32,
    pub client: Client,
}

impl fmt::Debug for Jira {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Jira")
            .field("host", &self.host.as_str())
            .field("api", &self.api)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

/// Makes sure `Url::join` appends to the path of the site rather than replacing its last segment
pub(crate) fn parse_host(host: &str) -> Result<Url> {
    let mut host = host.trim().trim_end_matches('/').to_string();
    host.push('/');
    Ok(Url::parse(&host)?)
}

impl Jira {
    #[allow(clippy::missing_errors_doc)]
    pub fn new<H>(host: H, credentials: Credentials) -> Result<Jira>
    where
        H: Into<String>,
    {
        Ok(Jira {
            host: parse_host(&host.into())?,
            api: AGILE_API.to_string(),
            credentials,
            page_size: DEFAULT_PAGE_SIZE,
            client: Client::new(),
        })
    }

    /// Create a Jira client builder
    #[must_use]
    pub fn builder() -> JiraBuilder {
        JiraBuilder::new()
    }

    #[must_use]
    pub fn host(&self) -> &Url {
        &self.host
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn agile_url(&self, endpoint: &str) -> Result<Url> {
        Ok(self.host.join(&format!("rest/{}{endpoint}", self.api))?)
    }

    async fn request<D>(&self, method: Method, url: Url) -> Result<D>
    where
        D: DeserializeOwned,
    {
        let mut request = self
            .client
            .request(method, url.clone())
            .header(ACCEPT, "application/json");
        request = self.credentials.apply(request);
        debug!("request '{:?}'", request);

        let response = request.send().await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("status {:?} body {} bytes", status, body.len());
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(JiraError::Unauthorized(status)),
            StatusCode::NOT_FOUND => Err(JiraError::NotFound(url.to_string())),
            client_err if client_err.is_client_error() => Err(JiraError::Fault {
                code: status,
                // Some proxies answer with html, the status code says it all anyway
                errors: serde_json::from_str::<Errors>(&body).unwrap_or_default(),
            }),
            server_err if server_err.is_server_error() => Err(JiraError::ServerError {
                code: status,
                url: url.to_string(),
            }),
            ok if ok.is_success() => {
                let data = if body.is_empty() { "null" } else { &body };
                serde_json::from_str::<D>(data).map_err(|source| JiraError::Decode {
                    url: url.to_string(),
                    source,
                })
            }
            other => Err(JiraError::UnexpectedStatus(other)),
        }
    }

    async fn get<D>(&self, url: Url) -> Result<D>
    where
        D: DeserializeOwned,
    {
        self.request::<D>(Method::GET, url).await
    }

    /// Retrieves the board itself, handy to verify credentials and access rights
    #[allow(clippy::missing_errors_doc)]
    pub async fn get_board(&self, board_id: i64) -> Result<Board> {
        let url = self.agile_url(&format!("/board/{board_id}"))?;
        self.get::<Board>(url).await
    }

    /// Retrieves the column configuration of the board, i.e. which statuses are shown in
    /// which column.
    #[allow(clippy::missing_errors_doc)]
    pub async fn get_board_configuration(&self, board_id: i64) -> Result<BoardConfiguration> {
        let url = self.agile_url(&format!("/board/{board_id}/configuration"))?;
        self.get::<BoardConfiguration>(url).await
    }

    /// Retrieves every issue on the board, following the pagination until Jira
    /// reports there is nothing more to fetch.
    #[allow(clippy::missing_errors_doc, clippy::cast_possible_wrap)]
    pub async fn get_board_issues(&self, board_id: i64) -> Result<Vec<Issue>> {
        let page_size = i64::from(self.page_size);
        let mut start_at = 0_i64;
        let mut issues = Vec::<Issue>::new();

        loop {
            let url = self.board_issues_url(board_id, start_at)?;
            let mut issue_page = self.get::<IssuesPage>(url).await?;
            let has_more = issue_page.has_more(start_at, page_size);
            debug!(
                "Board {} page at {} holds {} issues, total {:?}",
                board_id,
                start_at,
                issue_page.issues.len(),
                issue_page.total
            );

            // issues.len() will be invalid once we move the contents of the issues into our result
            start_at += issue_page.issues.len() as i64;
            issues.append(&mut issue_page.issues);
            if !has_more {
                break;
            }
        }
        Ok(issues)
    }

    fn board_issues_url(&self, board_id: i64, start_at: i64) -> Result<Url> {
        let mut url = self.agile_url(&format!("/board/{board_id}/issue"))?;
        url.query_pairs_mut()
            .append_pair("startAt", &start_at.to_string())
            .append_pair("maxResults", &self.page_size.to_string())
            .append_pair("fields", BOARD_ISSUE_FIELDS);
        Ok(url)
    }
}
