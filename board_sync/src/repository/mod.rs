use std::collections::HashMap;
use std::hash::Hash;

use async_trait::async_trait;

use crate::error::SyncError;
use crate::types::{BoardColumnMapping, BoardIssue};

// Database-related utilities and managers.
pub mod database_manager;
pub(crate) mod postgres;
pub(crate) mod sqlite;

pub const BOARD_COLUMNS_TABLE: &str = "jira_board_columns";
pub const BOARD_ISSUES_TABLE: &str = "jira_issues_board";

/// Writes board data into the reporting tables.
///
/// Each call writes its rows in a single transaction; either every row is upserted or none.
/// The returned count is the number of distinct rows written.
#[async_trait]
pub trait BoardRepository: Send {
    async fn upsert_column_mappings(&mut self, mappings: &[BoardColumnMapping]) -> Result<u64, SyncError>;
    async fn upsert_issues(&mut self, issues: &[BoardIssue]) -> Result<u64, SyncError>;
}

/// Opens a connection to the reporting database
#[async_trait]
pub trait RepositoryConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn BoardRepository>, SyncError>;

    /// Human readable description of the database, without any secrets
    fn target(&self) -> String;
}

/// Removes rows sharing the same key, keeping the last one but preserving the order of
/// first appearance. A multi row upsert may not affect the same row twice.
pub(crate) fn distinct_by_key<'a, T, K, F>(rows: &'a [T], key: F) -> Vec<&'a T>
where
    K: Eq + Hash,
    F: Fn(&'a T) -> K,
{
    let mut position: HashMap<K, usize> = HashMap::new();
    let mut distinct: Vec<&T> = Vec::with_capacity(rows.len());
    for row in rows {
        match position.get(&key(row)) {
            Some(&i) => distinct[i] = row,
            None => {
                position.insert(key(row), distinct.len());
                distinct.push(row);
            }
        }
    }
    distinct
}

pub(crate) fn column_mapping_key(m: &BoardColumnMapping) -> (i64, &str) {
    (m.board_id, m.status_id.as_str())
}

pub(crate) fn issue_key(i: &BoardIssue) -> (i64, &str) {
    (i.board_id, i.issue_key.as_str())
}
