use async_trait::async_trait;
use jira::models::board::Board;
use jira::models::issue::Issue;
use jira::{Jira, JiraError};
use log::debug;

use crate::normalize::flatten_configuration;
use crate::types::BoardColumnMapping;

/// What the synchronisation needs from Jira
#[async_trait]
pub trait BoardSource: Send + Sync {
    async fn fetch_board(&self, board_id: i64) -> Result<Board, JiraError>;
    async fn fetch_board_configuration(&self, board_id: i64) -> Result<Vec<BoardColumnMapping>, JiraError>;
    async fn fetch_board_issues(&self, board_id: i64) -> Result<Vec<Issue>, JiraError>;
}

#[async_trait]
impl BoardSource for Jira {
    async fn fetch_board(&self, board_id: i64) -> Result<Board, JiraError> {
        self.get_board(board_id).await
    }

    async fn fetch_board_configuration(&self, board_id: i64) -> Result<Vec<BoardColumnMapping>, JiraError> {
        let configuration = self.get_board_configuration(board_id).await?;
        debug!(
            "Board {} has {} columns",
            board_id,
            configuration.column_config.columns.len()
        );
        Ok(flatten_configuration(board_id, &configuration))
    }

    async fn fetch_board_issues(&self, board_id: i64) -> Result<Vec<Issue>, JiraError> {
        self.get_board_issues(board_id).await
    }
}
