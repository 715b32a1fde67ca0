use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

/// One row of `jira_board_columns`: a status as it is placed on a board column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardColumnMapping {
    pub board_id: i64,
    pub column_name: String,
    pub status_id: String,
    pub status_name: Option<String>,
}

/// One row of `jira_issues_board`
#[derive(Debug, Clone, PartialEq)]
pub struct BoardIssue {
    pub board_id: i64,
    pub issue_key: String,
    pub summary: String,
    pub status_id: Option<String>,
    pub status_name: Option<String>,
    /// `None` when the status is not placed on any column of the board
    pub column_name: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

/// What a completed run wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    pub board_id: i64,
    pub columns: u64,
    pub issues: u64,
    pub unmapped_issues: usize,
    pub target: String,
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Board {}: upserted {} column mappings and {} issues into {}",
            self.board_id, self.columns, self.issues, self.target
        )?;
        if self.unmapped_issues > 0 {
            write!(
                f,
                " ({} issues have a status outside the board columns)",
                self.unmapped_issues
            )?;
        }
        Ok(())
    }
}
