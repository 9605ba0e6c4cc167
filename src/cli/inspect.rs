//! Inspect command implementation.

use super::output::{BoardSummary, format_board_text};
use super::{CliError, OutputFormat};
use hexone::codec::decode_board;
use hexone::game::invariants::check_invariants;
use std::fs;
use std::path::Path;

/// Execute the inspect command.
///
/// # Errors
///
/// Returns an error if the file can't be read or isn't an encoded board.
pub(crate) fn execute(path: &Path, format: OutputFormat) -> Result<(), CliError> {
    let bytes = fs::read(path)
        .map_err(|e| CliError::new(format!("Failed to read {}: {e}", path.display())))?;
    let board = decode_board(&bytes)?;
    let violations = check_invariants(&board);

    match format {
        OutputFormat::Text => {
            print!("{}", format_board_text(&board));
            if !violations.is_empty() {
                println!();
                println!("Invariant violations:");
                for violation in &violations {
                    println!("  {violation}");
                }
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&BoardSummary::from_board(&board))?;
            println!("{json}");
            for violation in &violations {
                eprintln!("invariant violation: {violation}");
            }
        }
    }

    Ok(())
}
