use serde::{Deserialize, Serialize};

use super::core::StatusId;

/// A Jira Agile board, as returned by `/rest/agile/1.0/board/{id}`
#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct Board {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    /// `kanban`, `scrum` or `simple`
    #[serde(rename = "type", default)]
    pub board_type: String,
}

/// The column configuration of a board, `/rest/agile/1.0/board/{id}/configuration`
#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct BoardConfiguration {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "columnConfig", default)]
    pub column_config: ColumnConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct ColumnConfig {
    #[serde(default)]
    pub columns: Vec<BoardColumn>,
}

/// A visual column on the board and the workflow statuses it shows
#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct BoardColumn {
    pub name: String,
    #[serde(default)]
    pub statuses: Vec<StatusRef>,
}

/// Reference to a status. The configuration endpoint normally only supplies the id.
#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct StatusRef {
    pub id: StatusId,
    #[serde(default)]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_board_configuration() {
        let json = r#"{
            "id": 2,
            "name": "AB board",
            "type": "kanban",
            "self": "https://example.atlassian.net/rest/agile/1.0/board/2/configuration",
            "filter": {"id": "10000"},
            "columnConfig": {
                "columns": [
                    {"name": "To Do", "statuses": [{"id": "1", "self": "https://example/status/1"}]},
                    {"name": "In Progress", "statuses": [{"id": 3}]},
                    {"name": "Backlog"}
                ],
                "constraintType": "issueCount"
            }
        }"#;
        let cfg: BoardConfiguration = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.id, Some(2));
        let columns = &cfg.column_config.columns;
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[1].statuses[0].id.as_str(), "3");
        assert!(columns[2].statuses.is_empty());
    }

    #[test]
    fn test_parse_board() {
        let board: Board =
            serde_json::from_str(r#"{"id": 2, "name": "AB board", "type": "kanban"}"#).unwrap();
        assert_eq!(board.board_type, "kanban");
    }
}
