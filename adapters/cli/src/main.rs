#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line runner: drives scripted or random policies against
//! the simulation and reports per-episode results.

mod harness;

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use harness::Environment;
use tower_defence_core::{GameConfig, TowerKind};
use tower_defence_system_balance::{
    apply_adjustments, parse_adjustments, BalanceSnapshot, DEFAULT_CONFIDENCE_THRESHOLD,
};
use tower_defence_system_episode::{PerformanceWeights, RewardConfig};
use tower_defence_world::query;

/// Headless tower-defence episode runner.
#[derive(Debug, Parser)]
#[command(name = "tower-defence", version)]
struct Args {
    /// Number of episodes to run.
    #[arg(long, default_value_t = 1)]
    episodes: u32,

    /// Seed for the random policy.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Simulated seconds advanced per step.
    #[arg(long, default_value_t = 0.5)]
    dt: f32,

    /// Step budget per episode before the run is cut short.
    #[arg(long, default_value_t = 10_000)]
    max_steps: u32,

    /// Policy deciding the action each step.
    #[arg(long, value_enum, default_value_t = Policy::Random)]
    policy: Policy,

    /// JSON run configuration (game parameters, reward table, weights).
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON batch of balance adjustments applied before the first episode.
    #[arg(long)]
    adjustments: Option<PathBuf>,

    /// Minimum confidence an adjustment needs to be applied.
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE_THRESHOLD)]
    confidence_threshold: f32,

    /// Write a balance snapshot (spec values plus session history) here
    /// after the run.
    #[arg(long)]
    export_snapshot: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Policy {
    /// Uniformly random action indices.
    Random,
    /// A fixed opening (one tower of each kind), then idle.
    Scripted,
}

/// Everything the runner loads from `--config`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RunConfig {
    game: GameConfig,
    rewards: RewardConfig,
    weights: PerformanceWeights,
}

fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Builds one tower of each kind on the first slots, then idles.
fn scripted_action(step: u32) -> usize {
    let kinds = TowerKind::COUNT as u32;
    if step >= 2 * kinds {
        return 0;
    }
    let kind = step / 2;
    if step % 2 == 0 {
        1 + kind as usize
    } else {
        1 + TowerKind::COUNT + kind as usize
    }
}

fn load_run_config(path: Option<&PathBuf>) -> anyhow::Result<RunConfig> {
    let Some(path) = path else {
        return Ok(RunConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging()?;
    anyhow::ensure!(args.dt > 0.0 && args.dt.is_finite(), "--dt must be positive");

    let run = load_run_config(args.config.as_ref())?;
    let mut env = Environment::new(
        run.game,
        run.rewards,
        run.weights,
        Duration::from_secs_f32(args.dt),
    );

    if let Some(path) = &args.adjustments {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read adjustments {}", path.display()))?;
        let batch = parse_adjustments(&text)
            .with_context(|| format!("failed to parse adjustments {}", path.display()))?;
        let mut commands = Vec::new();
        apply_adjustments(&batch, args.confidence_threshold, &mut commands);
        let applied = commands.len();
        let events = env.apply_commands(commands);
        tracing::info!(
            suggested = batch.len(),
            applied,
            responses = events.len(),
            "applied balance adjustments"
        );
    }

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    for episode in 0..args.episodes {
        env.reset();
        tracing::debug!(
            episode,
            actions = env.action_count(),
            observation_width = env.observe().len(),
            "episode started"
        );
        let mut steps = 0;
        while steps < args.max_steps {
            let action = match args.policy {
                Policy::Random => rng.gen_range(0..env.action_count()),
                Policy::Scripted => scripted_action(steps),
            };
            let report = env.step(action);
            steps += 1;
            if report.done {
                break;
            }
        }
        tracing::info!(
            episode,
            steps,
            outcome = ?env.shaper().outcome(),
            total_reward = env.shaper().total_reward(),
            waves = env.shaper().waves_completed(),
            kills = env.shaper().kills(),
            elapsed = ?env.shaper().elapsed(),
            "episode finished"
        );
    }

    if let Some(path) = &args.export_snapshot {
        // Capture from the world: accepted economy adjustments live in its
        // config, not in the file the run started from.
        let snapshot = BalanceSnapshot::capture(
            query::catalog(env.world()),
            query::game_config(env.world()),
            env.recorder().history(),
        );
        let json = serde_json::to_string_pretty(&snapshot)?;
        fs::write(path, json)
            .with_context(|| format!("failed to write snapshot {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote balance snapshot");
    }

    Ok(())
}
