//! Verifies that the credentials grant access to the board, without touching the database.
use jira::models::board::Board;
use log::info;

use crate::error::SyncError;
use crate::ApplicationRuntime;

pub async fn execute(runtime: &ApplicationRuntime) -> Result<Board, SyncError> {
    let board_id = runtime.board_id();
    let board = runtime.source().fetch_board(board_id).await?;
    info!("Board {} is '{}' ({})", board.id, board.name, board.board_type);
    Ok(board)
}
