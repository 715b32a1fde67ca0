use super::*;
use chrono::{NaiveDate, TimeZone, Utc};
use tempfile::TempDir;

/// Creates a database file holding the reporting tables, the directory removes it on drop
pub fn test_database() -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reporting.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(include_str!("../../../../schema/sqlite.sql"))
        .unwrap();
    (dir, path)
}

fn count(path: &Path, table: &str) -> i64 {
    Connection::open(path)
        .unwrap()
        .query_row(&format!("select count(*) from {table}"), [], |row| row.get(0))
        .unwrap()
}

fn mapping(column: &str, status: &str) -> BoardColumnMapping {
    BoardColumnMapping {
        board_id: 2,
        column_name: column.to_string(),
        status_id: status.to_string(),
        status_name: None,
    }
}

fn issue(key: &str, column: Option<&str>) -> BoardIssue {
    BoardIssue {
        board_id: 2,
        issue_key: key.to_string(),
        summary: format!("Summary of {key}"),
        status_id: Some("3".to_string()),
        status_name: Some("In Progress".to_string()),
        column_name: column.map(ToString::to_string),
        assignee: None,
        due_date: NaiveDate::from_ymd_opt(2026, 3, 1),
        created: Some(Utc.with_ymd_and_hms(2026, 2, 7, 4, 52, 33).unwrap()),
        updated: None,
    }
}

#[tokio::test]
async fn test_upsert_is_idempotent() {
    let (_dir, path) = test_database();
    let mut repo = SqliteBoardRepository::open(&path).unwrap();
    let mappings = vec![mapping("To Do", "1"), mapping("In Progress", "3")];
    let issues = vec![issue("AB-1", Some("In Progress")), issue("AB-2", None)];

    for _ in 0..2 {
        assert_eq!(repo.upsert_column_mappings(&mappings).await.unwrap(), 2);
        assert_eq!(repo.upsert_issues(&issues).await.unwrap(), 2);
    }

    assert_eq!(count(&path, BOARD_COLUMNS_TABLE), 2);
    assert_eq!(count(&path, BOARD_ISSUES_TABLE), 2);
}

#[tokio::test]
async fn test_upsert_updates_existing_rows() {
    let (_dir, path) = test_database();
    let mut repo = SqliteBoardRepository::open(&path).unwrap();
    repo.upsert_issues(&[issue("AB-1", Some("In Progress"))])
        .await
        .unwrap();

    let mut moved = issue("AB-1", Some("Done"));
    moved.assignee = Some("Ann".to_string());
    repo.upsert_issues(&[moved]).await.unwrap();

    let (column, assignee): (String, String) = Connection::open(&path)
        .unwrap()
        .query_row(
            "select column_name, assignee from jira_issues_board where issue_key = 'AB-1'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(column, "Done");
    assert_eq!(assignee, "Ann");
}

#[tokio::test]
async fn test_duplicate_keys_are_written_once() {
    let (_dir, path) = test_database();
    let mut repo = SqliteBoardRepository::open(&path).unwrap();
    let written = repo
        .upsert_column_mappings(&[mapping("To Do", "1"), mapping("Backlog", "1")])
        .await
        .unwrap();
    assert_eq!(written, 1);

    let column: String = Connection::open(&path)
        .unwrap()
        .query_row("select column_name from jira_board_columns", [], |row| row.get(0))
        .unwrap();
    assert_eq!(column, "Backlog");
}

#[tokio::test]
async fn test_failing_row_rolls_back_the_table() {
    let (_dir, path) = test_database();
    let mut repo = SqliteBoardRepository::open(&path).unwrap();

    // The empty key violates a check constraint
    let result = repo
        .upsert_issues(&[issue("AB-1", None), issue("", None), issue("AB-3", None)])
        .await;

    match result {
        Err(SyncError::StorageWrite { table, .. }) => assert_eq!(table, BOARD_ISSUES_TABLE),
        other => panic!("Expected a write error, got {other:?}"),
    }
    assert_eq!(count(&path, BOARD_ISSUES_TABLE), 0);
}

#[test]
fn test_open_missing_file_is_a_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nowhere.db");
    assert!(matches!(
        SqliteBoardRepository::open(&path),
        Err(SyncError::StorageConnection { .. })
    ));
    assert!(!path.exists(), "the database file must not be created");
}

#[test]
fn test_open_garbage_file_is_a_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.db");
    std::fs::write(&path, "this is not a database, just some text that is long enough to fill the header of a sqlite file").unwrap();
    assert!(matches!(
        SqliteBoardRepository::open(&path),
        Err(SyncError::StorageConnection { .. })
    ));
}
