use std::fmt::Write;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls};

use crate::error::SyncError;
use crate::repository::database_manager::DatabaseConfig;
use crate::repository::{
    column_mapping_key, distinct_by_key, issue_key, BoardRepository, BOARD_COLUMNS_TABLE,
    BOARD_ISSUES_TABLE,
};
use crate::types::{BoardColumnMapping, BoardIssue};

/// Rows per insert statement, keeps the bind parameters well below the 65535 allowed
const DBMS_CHUNK_SIZE: usize = 1000;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) struct PostgresBoardRepository {
    client: Client,
}

impl PostgresBoardRepository {
    pub(crate) async fn connect(config: &DatabaseConfig) -> Result<Self, SyncError> {
        let DatabaseConfig::Postgres {
            host,
            port,
            database,
            user,
            password,
        } = config
        else {
            return Err(SyncError::StorageConnection {
                target: config.to_string(),
                reason: "not a PostgreSQL configuration".to_string(),
            });
        };

        let mut pg_config = tokio_postgres::Config::new();
        pg_config
            .host(host)
            .port(*port)
            .dbname(database)
            .user(user)
            .application_name("jira-board-sync")
            .connect_timeout(CONNECT_TIMEOUT);
        if let Some(password) = password {
            pg_config.password(password);
        }

        debug!("Connecting to {}", config);
        let (client, connection) =
            pg_config
                .connect(NoTls)
                .await
                .map_err(|e| SyncError::StorageConnection {
                    target: config.to_string(),
                    reason: e.to_string(),
                })?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::error!("connection error: {}", e);
            }
        });
        Ok(Self { client })
    }
}

#[async_trait]
impl BoardRepository for PostgresBoardRepository {
    async fn upsert_column_mappings(&mut self, mappings: &[BoardColumnMapping]) -> Result<u64, SyncError> {
        let rows = distinct_by_key(mappings, column_mapping_key);
        let tx = self
            .client
            .transaction()
            .await
            .map_err(|e| storage_error(BOARD_COLUMNS_TABLE, &e))?;

        for chunk in rows.chunks(DBMS_CHUNK_SIZE) {
            let (sql, params) = compose_upsert_column_mappings_sql(chunk);
            tx.execute(sql.as_str(), &params[..])
                .await
                .map_err(|e| storage_error(BOARD_COLUMNS_TABLE, &e))?;
            debug!("Upserted {} rows into {}", chunk.len(), BOARD_COLUMNS_TABLE);
        }
        tx.commit()
            .await
            .map_err(|e| storage_error(BOARD_COLUMNS_TABLE, &e))?;
        info!("Committed {} rows into {}", rows.len(), BOARD_COLUMNS_TABLE);
        Ok(rows.len() as u64)
    }

    async fn upsert_issues(&mut self, issues: &[BoardIssue]) -> Result<u64, SyncError> {
        let rows = distinct_by_key(issues, issue_key);
        let tx = self
            .client
            .transaction()
            .await
            .map_err(|e| storage_error(BOARD_ISSUES_TABLE, &e))?;

        // Ten parameters per row, a statement may bind at most 65535
        for chunk in rows.chunks(DBMS_CHUNK_SIZE) {
            let (sql, params) = compose_upsert_issues_sql(chunk);
            tx.execute(sql.as_str(), &params[..])
                .await
                .map_err(|e| storage_error(BOARD_ISSUES_TABLE, &e))?;
            debug!("Upserted {} rows into {}", chunk.len(), BOARD_ISSUES_TABLE);
        }
        tx.commit()
            .await
            .map_err(|e| storage_error(BOARD_ISSUES_TABLE, &e))?;
        info!("Committed {} rows into {}", rows.len(), BOARD_ISSUES_TABLE);
        Ok(rows.len() as u64)
    }
}

fn storage_error(table: &str, err: &tokio_postgres::Error) -> SyncError {
    if err.is_closed() {
        SyncError::StorageConnection {
            target: table.to_string(),
            reason: err.to_string(),
        }
    } else {
        SyncError::StorageWrite {
            table: table.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Appends `($1, $2, ...)` groups for `rows` rows of `columns` placeholders each
fn write_values(sql: &mut String, rows: usize, columns: usize) {
    for row in 0..rows {
        if row > 0 {
            sql.push(',');
        }
        sql.push_str("\n(");
        for column in 0..columns {
            if column > 0 {
                sql.push_str(", ");
            }
            let _ = write!(sql, "${}", row * columns + column + 1);
        }
        sql.push(')');
    }
}

fn compose_upsert_column_mappings_sql<'a>(
    chunk: &[&'a BoardColumnMapping],
) -> (String, Vec<&'a (dyn ToSql + Sync)>) {
    let mut sql = format!(
        "insert into {BOARD_COLUMNS_TABLE} (board_id, column_name, status_id, status_name)\n    values"
    );
    write_values(&mut sql, chunk.len(), 4);
    sql.push_str(
        "\non conflict (board_id, status_id) do update set
    column_name = excluded.column_name,
    status_name = excluded.status_name",
    );

    let mut params = Vec::<&(dyn ToSql + Sync)>::with_capacity(chunk.len() * 4);
    for m in chunk {
        params.push(&m.board_id);
        params.push(&m.column_name);
        params.push(&m.status_id);
        params.push(&m.status_name);
    }
    (sql, params)
}

fn compose_upsert_issues_sql<'a>(chunk: &[&'a BoardIssue]) -> (String, Vec<&'a (dyn ToSql + Sync)>) {
    let mut sql = format!(
        "insert into {BOARD_ISSUES_TABLE} (board_id, issue_key, summary, status_id, status_name, \
         column_name, assignee, due_date, created, updated)\n    values"
    );
    write_values(&mut sql, chunk.len(), 10);
    sql.push_str(
        "\non conflict (board_id, issue_key) do update set
    summary = excluded.summary,
    status_id = excluded.status_id,
    status_name = excluded.status_name,
    column_name = excluded.column_name,
    assignee = excluded.assignee,
    due_date = excluded.due_date,
    created = excluded.created,
    updated = excluded.updated",
    );

    let mut params = Vec::<&(dyn ToSql + Sync)>::with_capacity(chunk.len() * 10);
    for i in chunk {
        params.push(&i.board_id);
        params.push(&i.issue_key);
        params.push(&i.summary);
        params.push(&i.status_id);
        params.push(&i.status_name);
        params.push(&i.column_name);
        params.push(&i.assignee);
        params.push(&i.due_date);
        params.push(&i.created);
        params.push(&i.updated);
    }
    (sql, params)
}
