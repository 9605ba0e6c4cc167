//! Run command implementation.

use super::output::{BoardSummary, format_board_text, format_result_text};
use super::{CliError, OutputFormat};
use hexone::GameConfig;
use hexone::codec::encode_board;
use hexone::simulate::{SimulationConfig, run_game};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// JSON-serializable output of one run.
#[derive(Debug, Serialize)]
struct JsonRun<'a> {
    result: &'a hexone::simulate::GameResult,
    board: Option<BoardSummary>,
}

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the game fails to run or an output can't be written.
pub(crate) fn execute(
    game: GameConfig,
    seed: Option<u64>,
    steps: u32,
    format: OutputFormat,
    save: Option<&Path>,
    board_path: Option<&Path>,
    quiet: bool,
) -> Result<(), CliError> {
    let seed = super::seed_or_now(seed);
    let config = SimulationConfig {
        max_steps: steps,
        game,
        ..SimulationConfig::default()
    };

    if !quiet && format == OutputFormat::Text {
        println!("Running game with seed {seed}...");
        println!();
    }

    let (result, recording) = run_game(seed, &config)?;

    if let Some(save_path) = save {
        recording
            .save(save_path)
            .map_err(|e| CliError::new(format!("Failed to save recording: {e}")))?;
        if !quiet && format == OutputFormat::Text {
            println!("Recording saved to: {}", save_path.display());
            println!();
        }
    }

    let ledger = recording.replay().ledger;
    let board = ledger.boards().next().map(|(_, board)| *board);

    if let (Some(path), Some(board)) = (board_path, board.as_ref()) {
        fs::write(path, encode_board(board))
            .map_err(|e| CliError::new(format!("Failed to write {}: {e}", path.display())))?;
    }

    match format {
        OutputFormat::Text => {
            print!("{}", format_result_text(&result));
            if let Some(board) = board.as_ref().filter(|_| !quiet) {
                println!();
                print!("{}", format_board_text(board));
            }
        }
        OutputFormat::Json => {
            let json = JsonRun {
                result: &result,
                board: board.as_ref().map(BoardSummary::from_board),
            };
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    Ok(())
}
