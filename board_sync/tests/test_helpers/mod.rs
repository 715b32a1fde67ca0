use std::collections::HashMap;
use std::path::{Path, PathBuf};

use board_sync::config::SyncConfiguration;
use mockito::{Matcher, Mock, ServerGuard};
use rusqlite::Connection;
use tempfile::TempDir;

pub const BOARD_PATH: &str = "/rest/agile/1.0/board/2";
pub const CONFIGURATION_PATH: &str = "/rest/agile/1.0/board/2/configuration";
pub const ISSUES_PATH: &str = "/rest/agile/1.0/board/2/issue";

/// A reporting database file with empty tables
pub fn reporting_database() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reporting.db");
    Connection::open(&path)
        .unwrap()
        .execute_batch(include_str!("../../schema/sqlite.sql"))
        .unwrap();
    (dir, path)
}

pub fn count_rows(path: &Path, table: &str) -> i64 {
    Connection::open(path)
        .unwrap()
        .query_row(&format!("select count(*) from {table}"), [], |row| row.get(0))
        .unwrap()
}

/// Configuration pointing at the mock server and the database file
pub fn configuration(jira_url: &str, database: &Path) -> SyncConfiguration {
    let vars: HashMap<&str, String> = HashMap::from([
        ("JIRA_BASE_URL", jira_url.to_string()),
        ("JIRA_EMAIL", "someone@example.com".to_string()),
        ("JIRA_API_TOKEN", "ATATT3xFfGF0abcd".to_string()),
        ("BOARD_ID", "2".to_string()),
        ("JIRA_PAGE_SIZE", "2".to_string()),
        ("SQL_DRIVER", "sqlite".to_string()),
        ("SQL_DATABASE", database.display().to_string()),
    ]);
    SyncConfiguration::from_lookup(|name| vars.get(name).cloned()).unwrap()
}

pub const CONFIGURATION_JSON: &str = r#"{
    "id": 2,
    "name": "AB board",
    "type": "kanban",
    "columnConfig": {
        "columns": [
            {"name": "To Do", "statuses": [{"id": "1", "self": "https://example/status/1"}]},
            {"name": "In Progress", "statuses": [{"id": "3", "self": "https://example/status/3"}]},
            {"name": "Done", "statuses": [{"id": "4", "self": "https://example/status/4"}]}
        ],
        "constraintType": "none"
    }
}"#;

fn issue_json(key: &str, status: &str, status_name: &str, assignee: Option<&str>) -> String {
    let assignee = assignee.map_or("null".to_string(), |name| {
        format!(r#"{{"accountId": "5b10a2844c20165700ede21g", "displayName": "{name}"}}"#)
    });
    format!(
        r#"{{"id": "10001", "key": "{key}", "fields": {{"summary": "Summary of {key}",
            "status": {{"id": "{status}", "name": "{status_name}"}}, "assignee": {assignee},
            "duedate": "2026-03-01", "created": "2026-02-07T10:22:33.123+0530",
            "updated": "2026-02-08T08:00:00.000+0000"}}}}"#
    )
}

pub async fn mock_configuration(server: &mut ServerGuard) -> Mock {
    server
        .mock("GET", CONFIGURATION_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(CONFIGURATION_JSON)
        .create_async()
        .await
}

/// Three issues spread over two pages of two
pub async fn mock_issues(server: &mut ServerGuard) -> (Mock, Mock) {
    let first = format!(
        r#"{{"startAt": 0, "maxResults": 2, "total": 3, "issues": [{}, {}]}}"#,
        issue_json("AB-1", "3", "In Progress", None),
        issue_json("AB-2", "4", "Done", Some("Ann")),
    );
    let second = format!(
        r#"{{"startAt": 2, "maxResults": 2, "total": 3, "issues": [{}]}}"#,
        issue_json("AB-3", "99", "Parked", None),
    );
    let page = |start_at: &str| {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("startAt".into(), start_at.into()),
            Matcher::UrlEncoded("maxResults".into(), "2".into()),
        ])
    };
    let m0 = server
        .mock("GET", ISSUES_PATH)
        .match_query(page("0"))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(first)
        .create_async()
        .await;
    let m2 = server
        .mock("GET", ISSUES_PATH)
        .match_query(page("2"))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(second)
        .create_async()
        .await;
    (m0, m2)
}
