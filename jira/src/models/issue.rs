use super::core::{IssueKey, StatusId};
use serde::{Deserialize, Serialize};

/// Represents a page of Jira issues retrieved from a board
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct IssuesPage {
    #[serde(rename = "startAt", default)]
    pub start_at: i64,
    #[serde(rename = "maxResults", default)]
    pub max_results: i64,
    #[serde(default)]
    pub total: Option<i64>,
    #[serde(rename = "isLast", default)]
    pub is_last: Option<bool>,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

impl IssuesPage {
    /// Decides whether another page must be requested after this one.
    ///
    /// `start_at` is the offset this page was requested with, which is not necessarily
    /// what the server echoes back.
    #[must_use]
    pub fn has_more(&self, start_at: i64, page_size: i64) -> bool {
        if self.issues.is_empty() || self.is_last == Some(true) {
            return false;
        }
        let fetched = start_at + self.issues.len() as i64;
        match self.total {
            Some(total) => fetched < total,
            None => {
                // The server may cap maxResults below what was asked for
                let limit = if self.max_results > 0 { self.max_results } else { page_size };
                self.issues.len() as i64 >= limit
            }
        }
    }
}

/// Represents a jira issue as listed on a board, before normalisation
#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct Issue {
    /// Numeric id of the jira issue
    #[serde(default)]
    pub id: String,
    /// The key of the jira issue, typically used and referenced by the user.
    pub key: IssueKey,
    #[serde(default)]
    pub fields: IssueFields,
}

/// Subset of the issue fields needed for board reporting.
///
/// Dates are kept as the raw strings Jira sent; interpreting them is left to the caller.
#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct IssueFields {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub status: Option<IssueStatus>,
    #[serde(default)]
    pub assignee: Option<Assignee>,
    #[serde(default)]
    pub duedate: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct IssueStatus {
    #[serde(default)]
    pub id: Option<StatusId>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct Assignee {
    #[serde(rename = "accountId", default)]
    pub account_id: Option<String>,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
}

/// The fields requested from the board issue endpoint
pub const BOARD_ISSUE_FIELDS: &str = "summary,status,assignee,duedate,created,updated";
