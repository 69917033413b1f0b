use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use dart_match_engine::engine::presets::{load_default_presets, load_presets, MatchPresets};
use dart_match_engine::engine::scoreboard::Scoreboard;
use dart_match_engine::{
    classify_hit, get_scoreboard, replay_from_flat_throw_log, undo, Calibration, GameConfig,
    Player, Point, StoredThrow,
};

#[derive(Parser)]
#[command(name = "dart-engine", about = "Replay stored dart matches and classify board hits")]
struct Cli {
    /// Stored match log (JSON: players, config or preset, throws)
    #[arg(long)]
    log: Option<PathBuf>,

    /// Preset to use when the log carries no config
    #[arg(long)]
    preset: Option<String>,

    /// Path to match_presets.toml (default: auto-discover)
    #[arg(long, env = "DART_ENGINE_PRESETS")]
    presets: Option<PathBuf>,

    /// Undo this many throws after replaying
    #[arg(long, default_value = "0")]
    undo: usize,

    /// Print the scoreboard as JSON
    #[arg(long)]
    json: bool,

    /// Screen point to classify, "x,y" in pixels
    #[arg(long)]
    classify: Option<String>,

    /// Calibration for --classify, "cx,cy,scale,rotation" (mm per px, radians)
    #[arg(long)]
    calibration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MatchLog {
    players: Vec<Player>,
    #[serde(default)]
    config: Option<serde_json::Value>,
    #[serde(default)]
    preset: Option<String>,
    #[serde(default)]
    throws: Vec<StoredThrow>,
}

fn parse_floats(raw: &str, expected: usize, what: &str) -> Result<Vec<f64>, String> {
    let values = raw
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("bad {what} {raw:?}: {e}"))?;
    if values.len() != expected {
        return Err(format!("{what} needs {expected} comma-separated numbers, got {raw:?}"));
    }
    Ok(values)
}

fn load_match_presets(path: Option<&Path>) -> Result<MatchPresets, Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            let presets = load_presets(p).map_err(|e| format!("Failed to load presets: {e}"))?;
            tracing::info!(path = %p.display(), count = presets.presets.len(), "loaded match presets");
            Ok(presets)
        }
        None => Ok(load_default_presets()),
    }
}

fn print_scoreboard(board: &Scoreboard) {
    println!("{} | {}", board.game_type, board.round_indicator);
    println!("{}", board.headers.join(" | "));
    for row in &board.rows {
        let marker = if row.active { ">" } else { " " };
        println!(
            "{marker} {:<12} {:>6}  {}",
            row.player_name,
            row.score,
            row.details.join(" ")
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();

    if let Some(raw) = &cli.classify {
        let xy = parse_floats(raw, 2, "point")?;
        let calibration = match &cli.calibration {
            Some(raw) => {
                let c = parse_floats(raw, 4, "calibration")?;
                Calibration {
                    center_x: c[0],
                    center_y: c[1],
                    scale: c[2],
                    rotation: c[3],
                }
            }
            None => Calibration::default(),
        };
        let hit = classify_hit(Point::new(xy[0], xy[1]), &calibration);
        println!("{hit} ({} points)", hit.value());
        if cli.log.is_none() {
            return Ok(());
        }
    }

    let Some(log_path) = &cli.log else {
        return Err("nothing to do: pass --log <file> or --classify x,y".into());
    };
    let content = fs::read_to_string(log_path)
        .map_err(|e| format!("Failed to read {}: {e}", log_path.display()))?;
    let log: MatchLog = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse {}: {e}", log_path.display()))?;

    let config = match log.config {
        Some(value) => GameConfig::from_value(value)?,
        None => {
            let presets = load_match_presets(cli.presets.as_deref())?;
            presets.resolve(cli.preset.as_deref().or(log.preset.as_deref()))?
        }
    };
    tracing::info!(
        game = config.type_tag(),
        players = log.players.len(),
        throws = log.throws.len(),
        "replaying match log"
    );

    let mut state = replay_from_flat_throw_log(&log.throws, config, &log.players)?;
    for _ in 0..cli.undo {
        state = undo(state)?;
    }

    let board = get_scoreboard(&state);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&board)?);
    } else {
        print_scoreboard(&board);
    }
    if let Some(winner) = &state.winner_id {
        tracing::info!(winner = %winner, "match winner");
    }

    Ok(())
}
