use std::path::Path;

use async_trait::async_trait;
use log::{debug, info};
use rusqlite::{params, Connection, ErrorCode, OpenFlags};

use crate::error::SyncError;
use crate::repository::{
    column_mapping_key, distinct_by_key, issue_key, BoardRepository, BOARD_COLUMNS_TABLE,
    BOARD_ISSUES_TABLE,
};
use crate::types::{BoardColumnMapping, BoardIssue};

#[cfg(test)]
pub(crate) mod tests;

const UPSERT_COLUMN_MAPPING_SQL: &str = r"
    INSERT INTO jira_board_columns (board_id, column_name, status_id, status_name)
    VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT (board_id, status_id) DO UPDATE SET
        column_name = excluded.column_name,
        status_name = excluded.status_name
";

const UPSERT_ISSUE_SQL: &str = r"
    INSERT INTO jira_issues_board (board_id, issue_key, summary, status_id, status_name,
        column_name, assignee, due_date, created, updated)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
    ON CONFLICT (board_id, issue_key) DO UPDATE SET
        summary = excluded.summary,
        status_id = excluded.status_id,
        status_name = excluded.status_name,
        column_name = excluded.column_name,
        assignee = excluded.assignee,
        due_date = excluded.due_date,
        created = excluded.created,
        updated = excluded.updated
";

pub(crate) struct SqliteBoardRepository {
    connection: Connection,
}

impl SqliteBoardRepository {
    /// Opens an existing database file. The file is never created.
    pub(crate) fn open(path: &Path) -> Result<Self, SyncError> {
        let target = format!("sqlite:{}", path.display());
        let connection_error = |e: rusqlite::Error| SyncError::StorageConnection {
            target: target.clone(),
            reason: e.to_string(),
        };

        debug!("Opening {}", target);
        let connection = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(connection_error)?;
        // Reading the schema catches files that are not databases at all
        connection
            .query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))
            .map_err(connection_error)?;

        Ok(Self { connection })
    }
}

fn storage_error(table: &str, err: &rusqlite::Error) -> SyncError {
    match err.sqlite_error_code() {
        Some(ErrorCode::CannotOpen | ErrorCode::NotADatabase) => SyncError::StorageConnection {
            target: table.to_string(),
            reason: err.to_string(),
        },
        _ => SyncError::StorageWrite {
            table: table.to_string(),
            reason: err.to_string(),
        },
    }
}

#[async_trait]
impl BoardRepository for SqliteBoardRepository {
    async fn upsert_column_mappings(&mut self, mappings: &[BoardColumnMapping]) -> Result<u64, SyncError> {
        let rows = distinct_by_key(mappings, column_mapping_key);
        let to_err = |e: rusqlite::Error| storage_error(BOARD_COLUMNS_TABLE, &e);

        let tx = self.connection.transaction().map_err(to_err)?;
        {
            let mut stmt = tx.prepare(UPSERT_COLUMN_MAPPING_SQL).map_err(to_err)?;
            for m in &rows {
                stmt.execute(params![m.board_id, m.column_name, m.status_id, m.status_name])
                    .map_err(to_err)?;
            }
        }
        tx.commit().map_err(to_err)?;
        info!("Committed {} rows into {}", rows.len(), BOARD_COLUMNS_TABLE);
        Ok(rows.len() as u64)
    }

    async fn upsert_issues(&mut self, issues: &[BoardIssue]) -> Result<u64, SyncError> {
        let rows = distinct_by_key(issues, issue_key);
        let to_err = |e: rusqlite::Error| storage_error(BOARD_ISSUES_TABLE, &e);

        let tx = self.connection.transaction().map_err(to_err)?;
        {
            let mut stmt = tx.prepare(UPSERT_ISSUE_SQL).map_err(to_err)?;
            for i in &rows {
                stmt.execute(params![
                    i.board_id,
                    i.issue_key,
                    i.summary,
                    i.status_id,
                    i.status_name,
                    i.column_name,
                    i.assignee,
                    i.due_date,
                    i.created,
                    i.updated
                ])
                .map_err(to_err)?;
            }
        }
        tx.commit().map_err(to_err)?;
        info!("Committed {} rows into {}", rows.len(), BOARD_ISSUES_TABLE);
        Ok(rows.len() as u64)
    }
}
