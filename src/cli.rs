//! CLI command implementations for Hexone.

pub(crate) mod inspect;
pub(crate) mod replay;
pub(crate) mod run;
pub(crate) mod simulate;

mod output;

use clap::ValueEnum;
use hexone::GameConfig;
use std::error::Error;
use std::fmt;
use std::path::Path;

/// Output format for the `run`, `replay` and `inspect` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Output format for the `simulate` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum SimulateFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
    /// CSV format.
    Csv,
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(format!("JSON serialization failed: {e}"))
    }
}

impl From<hexone::simulate::SimulationError> for CliError {
    fn from(e: hexone::simulate::SimulationError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<hexone::recording::RecordingError> for CliError {
    fn from(e: hexone::recording::RecordingError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<hexone::codec::CodecError> for CliError {
    fn from(e: hexone::codec::CodecError) -> Self {
        Self::new(format!("not a game board: {e}"))
    }
}

/// Game rules from `path`, or the defaults.
///
/// # Errors
///
/// Returns an error if the file can't be read or parsed.
pub(crate) fn load_config(path: Option<&Path>) -> Result<GameConfig, CliError> {
    match path {
        Some(path) => GameConfig::load(path)
            .map_err(|e| CliError::new(format!("Failed to load {}: {e}", path.display()))),
        None => Ok(GameConfig::default()),
    }
}

/// `seed`, or one taken from the system clock.
pub(crate) fn seed_or_now(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() ^ u64::from(d.subsec_nanos()))
            .unwrap_or(42)
    })
}
