//! Simulate CLI: play seeded random matches and check replay determinism.
//!
//! Usage:
//!   cargo run --release --bin simulate -- --matches 500 --seed 7 --preset cricket
//!   cargo run --release --bin simulate -- --matches 100 --players 4 --preset killer

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use dart_match_engine::engine::arena::{run_arena, DEFAULT_MAX_ROUNDS};
use dart_match_engine::engine::presets::{load_default_presets, load_presets};

#[derive(Parser)]
#[command(name = "simulate", about = "Replay seeded random dart matches and check determinism")]
struct Cli {
    /// Number of matches to play
    #[arg(long, default_value = "100")]
    matches: usize,

    /// Base random seed; match i uses seed + i
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Players per match
    #[arg(long, default_value = "2")]
    players: usize,

    /// Preset name (default: the presets file's default)
    #[arg(long)]
    preset: Option<String>,

    /// Path to match_presets.toml (default: auto-discover)
    #[arg(long, env = "DART_ENGINE_PRESETS")]
    presets: Option<PathBuf>,

    /// Abandon matches still open after this many rounds
    #[arg(long, default_value_t = DEFAULT_MAX_ROUNDS)]
    max_rounds: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .init();

    let cli = Cli::parse();
    if cli.players == 0 {
        return Err("--players must be at least 1".into());
    }

    let presets = match &cli.presets {
        Some(path) => load_presets(path).map_err(|e| format!("Failed to load presets: {e}"))?,
        None => load_default_presets(),
    };
    let config = presets.resolve(cli.preset.as_deref())?;

    println!(
        "Simulating {} {} matches, {} players, seed {}",
        cli.matches,
        config.type_tag(),
        cli.players,
        cli.seed
    );
    let start = Instant::now();
    let result = run_arena(&config, cli.players, cli.matches, cli.seed, cli.max_rounds)?;
    println!("{}", result.summary());
    println!("  Elapsed: {:.2}s", start.elapsed().as_secs_f64());

    if !result.is_deterministic() {
        return Err(format!("{} matches replayed differently", result.mismatches.len()).into());
    }
    Ok(())
}
