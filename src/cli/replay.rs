//! Replay command implementation.

use super::output::{BoardSummary, format_board_text};
use super::{CliError, OutputFormat};
use hexone::game::invariants::check_invariants;
use hexone::recording::Recording;
use serde::Serialize;
use std::path::Path;

/// JSON-serializable replay outcome.
#[derive(Debug, Serialize)]
struct JsonReplay {
    accepted: usize,
    rejected: usize,
    unix_timestamp: i64,
    slot: u64,
    boards: Vec<BoardSummary>,
}

/// Execute the replay command.
///
/// # Errors
///
/// Returns an error if the recording can't be loaded or a replayed board
/// breaks a board invariant.
pub(crate) fn execute(recording: &Path, format: OutputFormat) -> Result<(), CliError> {
    let recording = Recording::load(recording)?;
    let replay = recording.replay();

    for (_, board) in replay.ledger.boards() {
        let violations = check_invariants(board);
        if let Some(first) = violations.first() {
            return Err(CliError::new(format!(
                "game {} replayed into an invalid state: {first}",
                board.game_id
            )));
        }
    }

    let clock = replay.ledger.clock();
    match format {
        OutputFormat::Text => {
            println!(
                "Replayed {} transactions ({} rejected), slot {} at {}",
                replay.accepted + replay.rejected,
                replay.rejected,
                clock.slot,
                clock.unix_timestamp
            );
            for (_, board) in replay.ledger.boards() {
                println!();
                print!("{}", format_board_text(board));
            }
        }
        OutputFormat::Json => {
            let json = JsonReplay {
                accepted: replay.accepted,
                rejected: replay.rejected,
                unix_timestamp: clock.unix_timestamp,
                slot: clock.slot,
                boards: replay
                    .ledger
                    .boards()
                    .map(|(_, board)| BoardSummary::from_board(board))
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    Ok(())
}
