//! Hexone CLI - Command-line interface for simulating and inspecting games.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Hexone - A four-player hex territory-conquest game engine
#[derive(Parser, Debug)]
#[command(name = "hexone")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Raise log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Game rules as JSON (default: built-in rules)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a single game between four bots
    Run {
        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Maximum steps (default: 5000)
        #[arg(long, default_value = "5000")]
        steps: u32,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Save recording to file
        #[arg(long)]
        save: Option<PathBuf>,

        /// Write the encoded final board to file
        #[arg(long)]
        board: Option<PathBuf>,

        /// Suppress progress lines and the map
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run many games in parallel and aggregate statistics
    Simulate {
        /// Number of games to run (default: 1000)
        #[arg(short, long, default_value = "1000")]
        games: u64,

        /// Starting seed (increments for each game)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Maximum steps per game (default: 5000)
        #[arg(short = 't', long)]
        max_steps: Option<u32>,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::SimulateFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Replay a recorded game and print the final boards
    Replay {
        /// Recording file (.json)
        #[arg(required = true)]
        recording: PathBuf,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Decode an encoded board file
    Inspect {
        /// Board file written by `run --board`
        #[arg(required = true)]
        board: PathBuf,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },
}

/// Install the log subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let result = cli::load_config(args.config.as_deref()).and_then(|game| match args.command {
        Commands::Run {
            seed,
            steps,
            format,
            save,
            board,
            quiet,
        } => cli::run::execute(
            game,
            seed,
            steps,
            format,
            save.as_deref(),
            board.as_deref(),
            quiet,
        ),

        Commands::Simulate {
            games,
            seed,
            threads,
            max_steps,
            format,
            progress,
        } => cli::simulate::execute(game, games, seed, threads, max_steps, format, progress),

        Commands::Replay { recording, format } => cli::replay::execute(&recording, format),

        Commands::Inspect { board, format } => cli::inspect::execute(&board, format),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
