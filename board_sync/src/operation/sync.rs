//! Copies the column layout and the issues of a Jira board into the reporting database.
//!
//! Everything is fetched from Jira before the database connection is opened, so a failing
//! request never leaves the tables half written. Each table is written in its own
//! transaction.
use log::info;

use crate::error::SyncError;
use crate::normalize::{backfill_status_names, normalize};
use crate::types::SyncSummary;
use crate::ApplicationRuntime;

/// Runs the synchronisation for the board of the runtime configuration.
///
/// # Errors
/// Whatever step fails first; nothing after it is attempted.
pub async fn execute(runtime: &ApplicationRuntime) -> Result<SyncSummary, SyncError> {
    let board_id = runtime.board_id();
    let source = runtime.source();

    progress(&format!("Fetching configuration of board {board_id}"));
    let mut mappings = source.fetch_board_configuration(board_id).await?;
    info!("Board {} maps {} statuses to columns", board_id, mappings.len());

    progress(&format!("Fetching issues of board {board_id}"));
    let raw_issues = source.fetch_board_issues(board_id).await?;
    info!("Board {} holds {} issues", board_id, raw_issues.len());

    let issues = normalize(board_id, &raw_issues, &mappings);
    backfill_status_names(&mut mappings, &issues);
    let unmapped_issues = issues.iter().filter(|i| i.column_name.is_none()).count();
    if unmapped_issues > 0 {
        info!("{unmapped_issues} issues have a status that is not on any column");
    }

    let target = runtime.database().target();
    progress(&format!("Connecting to {target}"));
    let mut repository = runtime.database().connect().await?;

    progress(&format!("Upserting {} column mappings", mappings.len()));
    let columns = repository.upsert_column_mappings(&mappings).await?;

    progress(&format!("Upserting {} issues", issues.len()));
    let issues = repository.upsert_issues(&issues).await?;

    Ok(SyncSummary {
        board_id,
        columns,
        issues,
        unmapped_issues,
        target,
    })
}

fn progress(step: &str) {
    info!("{step}");
    println!("{step}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncConfiguration;
    use crate::repository::database_manager::DatabaseConfig;
    use crate::repository::{BoardRepository, RepositoryConnector};
    use crate::source::BoardSource;
    use crate::types::{BoardColumnMapping, BoardIssue};
    use async_trait::async_trait;
    use jira::config::JiraClientConfiguration;
    use jira::models::board::Board;
    use jira::models::core::{IssueKey, StatusId};
    use jira::models::issue::{Issue, IssueFields, IssueStatus};
    use jira::{JiraError, StatusCode};
    use mockall::mock;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    mock! {
        pub Source {}

        #[async_trait]
        impl BoardSource for Source {
            async fn fetch_board(&self, board_id: i64) -> Result<Board, JiraError>;
            async fn fetch_board_configuration(&self, board_id: i64) -> Result<Vec<BoardColumnMapping>, JiraError>;
            async fn fetch_board_issues(&self, board_id: i64) -> Result<Vec<Issue>, JiraError>;
        }
    }

    type Tables = (
        BTreeMap<(i64, String), BoardColumnMapping>,
        BTreeMap<(i64, String), BoardIssue>,
    );

    /// Keeps the rows in memory, keyed like the real tables
    #[derive(Default, Clone)]
    struct InMemoryDatabase {
        tables: Arc<Mutex<Tables>>,
        connections: Arc<AtomicUsize>,
    }

    struct InMemoryRepository {
        tables: Arc<Mutex<Tables>>,
    }

    #[async_trait]
    impl BoardRepository for InMemoryRepository {
        async fn upsert_column_mappings(&mut self, mappings: &[BoardColumnMapping]) -> Result<u64, SyncError> {
            let mut tables = self.tables.lock().unwrap();
            for m in mappings {
                tables.0.insert((m.board_id, m.status_id.clone()), m.clone());
            }
            Ok(mappings.len() as u64)
        }

        async fn upsert_issues(&mut self, issues: &[BoardIssue]) -> Result<u64, SyncError> {
            let mut tables = self.tables.lock().unwrap();
            for i in issues {
                tables.1.insert((i.board_id, i.issue_key.clone()), i.clone());
            }
            Ok(issues.len() as u64)
        }
    }

    #[async_trait]
    impl RepositoryConnector for InMemoryDatabase {
        async fn connect(&self) -> Result<Box<dyn BoardRepository>, SyncError> {
            self.connections.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(InMemoryRepository {
                tables: self.tables.clone(),
            }))
        }

        fn target(&self) -> String {
            "memory".to_string()
        }
    }

    fn config() -> SyncConfiguration {
        SyncConfiguration {
            jira: JiraClientConfiguration {
                jira_url: "https://example.atlassian.net".to_string(),
                user: "someone@example.com".to_string(),
                token: "ATATT3xFfGF0abcd".to_string(),
            },
            board_id: 2,
            page_size: 50,
            timeout: Duration::from_secs(60),
            database: DatabaseConfig::SqliteOnDisk {
                path: "unused.db".into(),
            },
        }
    }

    fn mapping(column: &str, status: &str) -> BoardColumnMapping {
        BoardColumnMapping {
            board_id: 2,
            column_name: column.to_string(),
            status_id: status.to_string(),
            status_name: None,
        }
    }

    fn raw_issue(key: &str, status: &str, name: &str) -> Issue {
        Issue {
            id: "10000".to_string(),
            key: IssueKey::new(key),
            fields: IssueFields {
                summary: Some(format!("Summary of {key}")),
                status: Some(IssueStatus {
                    id: Some(StatusId::from(status)),
                    name: Some(name.to_string()),
                }),
                ..IssueFields::default()
            },
        }
    }

    fn board_source() -> MockSource {
        let mut source = MockSource::new();
        source
            .expect_fetch_board_configuration()
            .returning(|_| {
                Ok(vec![
                    mapping("To Do", "1"),
                    mapping("In Progress", "3"),
                    mapping("Done", "4"),
                ])
            });
        source.expect_fetch_board_issues().returning(|_| {
            Ok(vec![
                raw_issue("AB-1", "3", "In Progress"),
                raw_issue("AB-2", "4", "Done"),
                raw_issue("AB-3", "99", "Parked"),
            ])
        });
        source
    }

    #[tokio::test]
    async fn test_sync_writes_columns_and_issues() {
        let database = InMemoryDatabase::default();
        let runtime =
            ApplicationRuntime::from_parts(config(), Box::new(board_source()), Box::new(database.clone()));

        let summary = execute(&runtime).await.unwrap();

        assert_eq!(summary.board_id, 2);
        assert_eq!(summary.columns, 3);
        assert_eq!(summary.issues, 3);
        assert_eq!(summary.unmapped_issues, 1);
        assert_eq!(summary.target, "memory");

        let tables = database.tables.lock().unwrap();
        let ab1 = &tables.1[&(2, "AB-1".to_string())];
        assert_eq!(ab1.column_name.as_deref(), Some("In Progress"));
        let done = &tables.0[&(2, "4".to_string())];
        assert_eq!(done.status_name.as_deref(), Some("Done"));
    }

    #[tokio::test]
    async fn test_second_run_leaves_row_counts_unchanged() {
        let database = InMemoryDatabase::default();
        let runtime =
            ApplicationRuntime::from_parts(config(), Box::new(board_source()), Box::new(database.clone()));

        execute(&runtime).await.unwrap();
        let counts = |db: &InMemoryDatabase| {
            let tables = db.tables.lock().unwrap();
            (tables.0.len(), tables.1.len())
        };
        let first = counts(&database);
        execute(&runtime).await.unwrap();
        assert_eq!(counts(&database), first);
    }

    #[tokio::test]
    async fn test_unauthorized_aborts_before_connecting() {
        let mut source = MockSource::new();
        source
            .expect_fetch_board_configuration()
            .returning(|_| Err(JiraError::Unauthorized(StatusCode::UNAUTHORIZED)));
        source.expect_fetch_board_issues().never();

        let database = InMemoryDatabase::default();
        let runtime =
            ApplicationRuntime::from_parts(config(), Box::new(source), Box::new(database.clone()));

        let result = execute(&runtime).await;

        assert!(matches!(result, Err(SyncError::Authentication(_))));
        assert_eq!(database.connections.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failing_issue_fetch_never_reaches_the_database() {
        let mut source = MockSource::new();
        source
            .expect_fetch_board_configuration()
            .returning(|_| Ok(vec![mapping("To Do", "1")]));
        source.expect_fetch_board_issues().returning(|_| {
            Err(JiraError::ServerError {
                code: StatusCode::SERVICE_UNAVAILABLE,
                url: "https://example.atlassian.net/rest/agile/1.0/board/2/issue".to_string(),
            })
        });

        let database = InMemoryDatabase::default();
        let runtime =
            ApplicationRuntime::from_parts(config(), Box::new(source), Box::new(database.clone()));

        let result = execute(&runtime).await;

        assert!(matches!(result, Err(SyncError::TransientApi(_))));
        assert_eq!(database.connections.load(Ordering::SeqCst), 0);
    }
}
