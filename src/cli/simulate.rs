//! Simulate command implementation.

use super::output::{
    JsonSimulationResult, SimulationStats, format_simulation_csv, format_simulation_text,
};
use super::{CliError, SimulateFormat};
use hexone::GameConfig;
use hexone::simulate::{SimulationConfig, run_game};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::time::Instant;

/// Execute the simulate command.
///
/// # Errors
///
/// Returns an error if the progress bar can't be built or output fails.
pub(crate) fn execute(
    game: GameConfig,
    games: u64,
    seed: Option<u64>,
    threads: Option<usize>,
    max_steps: Option<u32>,
    format: SimulateFormat,
    progress: bool,
) -> Result<(), CliError> {
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let base_seed = super::seed_or_now(seed);

    let mut config = SimulationConfig {
        game,
        ..SimulationConfig::default()
    };
    if let Some(steps) = max_steps {
        config.max_steps = steps;
    }

    let pb = if progress {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} games ({per_sec})")
            .map_err(|e| CliError::new(format!("Invalid progress template: {e}")))?
            .progress_chars("=>-");
        let pb = ProgressBar::new(games);
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();

    // Each thread folds into its own stats; merged once at the end
    let stats = (0..games)
        .into_par_iter()
        .fold(SimulationStats::default, |mut local_stats, i| {
            let game_seed = base_seed.wrapping_add(i);
            match run_game(game_seed, &config) {
                Ok((result, _)) => local_stats.add_result(&result),
                Err(e) => tracing::warn!(seed = game_seed, error = %e, "game failed"),
            }
            if let Some(pb) = &pb {
                pb.inc(1);
            }
            local_stats
        })
        .reduce(SimulationStats::default, |mut a, b| {
            a.merge(&b);
            a
        });

    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }

    let duration = start.elapsed();

    match format {
        SimulateFormat::Text => {
            println!();
            print!("{}", format_simulation_text(&stats));
            println!();
            println!("Duration: {:.2}s", duration.as_secs_f64());
        }
        SimulateFormat::Json => {
            let json_result = JsonSimulationResult::from_stats(&stats);
            println!("{}", serde_json::to_string_pretty(&json_result)?);
        }
        SimulateFormat::Csv => {
            print!("{}", format_simulation_csv(&stats));
        }
    }

    Ok(())
}
