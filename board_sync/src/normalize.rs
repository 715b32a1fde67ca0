//! Turns the Jira board payloads into the rows written to the database.
//!
//! All functions here are pure; nothing touches the network or the database.
use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use jira::models::board::BoardConfiguration;
use jira::models::issue::Issue;
use log::warn;

use crate::types::{BoardColumnMapping, BoardIssue};

/// Format of the timestamps produced by Jira Cloud, i.e. `2026-02-07T10:22:33.123+0530`
const JIRA_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// One mapping per (column, status) pair, in the order the columns appear on the board.
#[must_use]
pub fn flatten_configuration(board_id: i64, configuration: &BoardConfiguration) -> Vec<BoardColumnMapping> {
    configuration
        .column_config
        .columns
        .iter()
        .flat_map(|column| {
            column.statuses.iter().map(move |status| BoardColumnMapping {
                board_id,
                column_name: column.name.clone(),
                status_id: status.id.to_string(),
                status_name: status.name.clone(),
            })
        })
        .collect()
}

/// Converts the raw board issues into rows, placing each issue in the column its status
/// is mapped to. If a status id is mapped more than once, the last mapping wins.
#[must_use]
pub fn normalize(board_id: i64, issues: &[Issue], mappings: &[BoardColumnMapping]) -> Vec<BoardIssue> {
    let columns: HashMap<&str, &str> = mappings
        .iter()
        .map(|m| (m.status_id.as_str(), m.column_name.as_str()))
        .collect();

    issues
        .iter()
        .map(|issue| {
            let key = issue.key.as_str();
            let fields = &issue.fields;
            let status_id = fields
                .status
                .as_ref()
                .and_then(|s| s.id.as_ref())
                .map(ToString::to_string);
            let column_name = status_id
                .as_deref()
                .and_then(|id| columns.get(id))
                .map(|c| (*c).to_string());

            BoardIssue {
                board_id,
                issue_key: key.to_string(),
                summary: fields.summary.clone().unwrap_or_default(),
                status_name: fields.status.as_ref().and_then(|s| s.name.clone()),
                status_id,
                column_name,
                assignee: fields.assignee.as_ref().and_then(|a| a.display_name.clone()),
                due_date: fields
                    .duedate
                    .as_deref()
                    .and_then(|v| parse_due_date(key, v)),
                created: fields
                    .created
                    .as_deref()
                    .and_then(|v| parse_timestamp(key, "created", v)),
                updated: fields
                    .updated
                    .as_deref()
                    .and_then(|v| parse_timestamp(key, "updated", v)),
            }
        })
        .collect()
}

/// Fills in missing status names from the names observed on the issues.
///
/// The board configuration endpoint only references statuses by id.
pub fn backfill_status_names(mappings: &mut [BoardColumnMapping], issues: &[BoardIssue]) {
    let names: HashMap<&str, &str> = issues
        .iter()
        .filter_map(|i| Some((i.status_id.as_deref()?, i.status_name.as_deref()?)))
        .collect();

    for mapping in mappings.iter_mut().filter(|m| m.status_name.is_none()) {
        if let Some(name) = names.get(mapping.status_id.as_str()) {
            mapping.status_name = Some((*name).to_string());
        }
    }
}

/// Parses a Jira timestamp, falling back to RFC 3339. Unparsable values are dropped.
#[must_use]
pub fn parse_timestamp(issue_key: &str, field: &str, value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(value, JIRA_TIMESTAMP_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| warn!("Ignoring {field} '{value}' of {issue_key}: {e}"))
        .ok()
}

#[must_use]
pub fn parse_due_date(issue_key: &str, value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| warn!("Ignoring due date '{value}' of {issue_key}: {e}"))
        .ok()
}
