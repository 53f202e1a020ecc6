//! # Reach Runtime
//!
//! Entry point for the `reach` binary.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use physics::SimConfig;
use planning::RrtConfig;
use reach::app::{self, EpisodeSettings};
use std::path::PathBuf;
use tracing::Level;

/// Command-line arguments for the reach binary.
#[derive(Parser, Debug)]
#[command(name = "reach", version, about = "5-link arm reaching among moving obstacles")]
struct Cli {
    /// JSON file with simulation constants; defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for pose sampling, obstacle spawning and memory sampling.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run PD-controlled episodes and fill the replay memory.
    Episode {
        #[arg(long, default_value_t = 3)]
        obstacles: usize,
        #[arg(long, default_value_t = 1)]
        episodes: usize,
        /// Transitions drawn from memory after each episode.
        #[arg(long, default_value_t = 128)]
        batch: usize,
        /// Skip scene geometry in observations.
        #[arg(long)]
        eval: bool,
    },
    /// Search for a collision-free path with an RRT.
    Plan {
        #[arg(long, default_value_t = 3)]
        obstacles: usize,
        #[arg(long, default_value_t = 500)]
        iterations: usize,
        /// Replay budget per edge.
        #[arg(long, default_value_t = 25)]
        steps: usize,
        #[arg(long, default_value_t = 0.1)]
        goal_bias: f64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = match &cli.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SimConfig::default(),
    };

    match cli.command {
        Command::Episode {
            obstacles,
            episodes,
            batch,
            eval,
        } => {
            let settings = EpisodeSettings {
                obstacles,
                episodes,
                batch,
                eval,
            };
            let summaries = app::run_episodes(config, cli.seed, &settings)?;
            let reached = summaries
                .iter()
                .filter(|s| s.termination == Some(physics::Termination::GoalReached))
                .count();
            tracing::info!(episodes = summaries.len(), reached, "done");
        }
        Command::Plan {
            obstacles,
            iterations,
            steps,
            goal_bias,
        } => {
            let rrt = RrtConfig {
                steps_per_edge: steps,
                goal_bias,
                max_iterations: iterations,
            };
            let summary = app::run_plan(config, cli.seed, obstacles, rrt)?;
            tracing::info!(
                vertices = summary.vertices,
                edges = summary.edges,
                solved = summary.path.is_some(),
                "done"
            );
        }
    }
    Ok(())
}
