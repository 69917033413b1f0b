//! Seeded random matches: generate hit logs, replay them and check that
//! replay reproduces the live match exactly.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::board::geometry::SEGMENT_ORDER;
use crate::engine::config::GameConfig;
use crate::engine::machine::init;
use crate::engine::models::*;
use crate::engine::simulator::{play_hit, replay_from_flat_throw_log};
use crate::error::Result;

/// Rounds played before an unfinished match is abandoned.
pub const DEFAULT_MAX_ROUNDS: u32 = 40;

/// Aggregated outcome of a batch of random matches.
#[derive(Debug, Clone, Default)]
pub struct ArenaResult {
    pub num_matches: usize,
    pub completed: usize,
    pub wins: BTreeMap<PlayerId, usize>,
    pub darts_per_match: Vec<usize>,
    /// Matches whose replay differed from the live state.
    pub mismatches: Vec<u64>,
}

impl ArenaResult {
    pub fn win_rate(&self, player_id: &str) -> f64 {
        if self.num_matches == 0 {
            return 0.0;
        }
        self.wins.get(player_id).copied().unwrap_or(0) as f64 / self.num_matches as f64
    }

    pub fn avg_darts(&self) -> f64 {
        if self.darts_per_match.is_empty() {
            return 0.0;
        }
        self.darts_per_match.iter().sum::<usize>() as f64 / self.darts_per_match.len() as f64
    }

    pub fn is_deterministic(&self) -> bool {
        self.mismatches.is_empty()
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!("Simulation Results ({} matches)", self.num_matches)];
        lines.push("=".repeat(48));
        for (player, wins) in &self.wins {
            lines.push(format!(
                "  {:>8}: {:4} wins ({:5.1}%)",
                player,
                wins,
                self.win_rate(player) * 100.0
            ));
        }
        lines.push(format!(
            "  {:>8}: {}",
            "Open",
            self.num_matches - self.completed
        ));
        lines.push(format!("  Avg darts per match: {:.1}", self.avg_darts()));
        if self.is_deterministic() {
            lines.push("  Replay: deterministic".into());
        } else {
            lines.push(format!("  Replay: MISMATCH on seeds {:?}", self.mismatches));
        }
        lines.join("\n")
    }
}

/// A loosely realistic random dart.
pub fn random_hit(rng: &mut impl Rng) -> Hit {
    if rng.gen_bool(0.08) {
        return Hit::miss();
    }
    if rng.gen_bool(0.05) {
        let multiplier = if rng.gen_bool(0.3) { 2 } else { 1 };
        return Hit { segment: BULL, multiplier };
    }
    let segment = SEGMENT_ORDER[rng.gen_range(0..SEGMENT_ORDER.len())];
    let multiplier = match rng.gen_range(0..100) {
        0..=69 => 1,
        70..=84 => 2,
        _ => 3,
    };
    Hit { segment, multiplier }
}

pub fn make_players(count: usize) -> Vec<Player> {
    (0..count)
        .map(|i| Player::new(format!("p{i}"), format!("Player {}", i + 1)))
        .collect()
}

/// Play one seeded match live and return its hit log with the final state.
///
/// Stops on a win or after `max_rounds` rounds, whichever comes first.
pub fn generate_match(
    config: &GameConfig,
    players: &[Player],
    seed: u64,
    max_rounds: u32,
) -> Result<(Vec<StoredThrow>, GameState)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let limit = config.round_limit().unwrap_or(max_rounds).min(max_rounds);
    let mut state = init(players, config.clone())?;
    let mut log = Vec::new();
    let mut clock = 1_700_000_000_000_i64 + seed as i64;

    while !state.is_finished() && state.current_round <= limit {
        let hit = random_hit(&mut rng);
        clock += rng.gen_range(800..2500);
        log.push(StoredThrow {
            player_id: state.current_player_id.clone(),
            round_index: state.current_round,
            throw_index: state.current_turn.throws.len() as u8 + 1,
            segment: hit.segment,
            multiplier: hit.multiplier,
            timestamp_ms: clock,
            turn_closed: false,
        });
        state = play_hit(state, hit, clock)?;
    }
    Ok((log, state))
}

/// Outcome of one simulated match.
#[derive(Debug, Clone)]
struct MatchOutcome {
    seed: u64,
    winner: Option<PlayerId>,
    darts: usize,
    deterministic: bool,
}

fn run_match(config: &GameConfig, players: &[Player], seed: u64, max_rounds: u32) -> Result<MatchOutcome> {
    let (log, live) = generate_match(config, players, seed, max_rounds)?;
    let (first, second) = rayon::join(
        || replay_from_flat_throw_log(&log, config.clone(), players),
        || replay_from_flat_throw_log(&log, config.clone(), players),
    );
    let (first, second) = (first?, second?);
    let deterministic = first == second && first == live;
    if !deterministic {
        tracing::warn!(seed, darts = log.len(), "replay diverged from live match");
    }
    Ok(MatchOutcome {
        seed,
        winner: live.winner_id,
        darts: log.len(),
        deterministic,
    })
}

/// Run `num_matches` seeded matches in parallel and aggregate the results.
pub fn run_arena(
    config: &GameConfig,
    num_players: usize,
    num_matches: usize,
    base_seed: u64,
    max_rounds: u32,
) -> Result<ArenaResult> {
    let players = make_players(num_players);
    let outcomes: Vec<MatchOutcome> = (0..num_matches as u64)
        .into_par_iter()
        .map(|i| run_match(config, &players, base_seed.wrapping_add(i), max_rounds))
        .collect::<Result<_>>()?;

    let mut result = ArenaResult {
        num_matches,
        wins: players.iter().map(|p| (p.id.clone(), 0)).collect(),
        ..ArenaResult::default()
    };
    for outcome in outcomes {
        if let Some(winner) = outcome.winner {
            result.completed += 1;
            *result.wins.entry(winner).or_insert(0) += 1;
        }
        result.darts_per_match.push(outcome.darts);
        if !outcome.deterministic {
            result.mismatches.push(outcome.seed);
        }
    }
    tracing::info!(
        game = config.type_tag(),
        matches = num_matches,
        completed = result.completed,
        "arena finished"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::{CricketConfig, HighScoreConfig, KillerConfig, X01Config};

    #[test]
    fn test_same_seed_same_log() {
        let config = GameConfig::X01(X01Config::default());
        let players = make_players(2);
        let (a, sa) = generate_match(&config, &players, 7, 20).unwrap();
        let (b, sb) = generate_match(&config, &players, 7, 20).unwrap();
        assert_eq!(a, b);
        assert_eq!(sa, sb);
    }

    #[test]
    fn test_round_limit_caps_high_score() {
        let config = GameConfig::HighScore(HighScoreConfig { rounds: 3 });
        let players = make_players(2);
        let (log, state) = generate_match(&config, &players, 1, DEFAULT_MAX_ROUNDS).unwrap();
        assert_eq!(log.len(), 3 * 3 * 2);
        assert_eq!(state.current_round, 4);
    }

    #[test]
    fn test_arena_replays_match_live() {
        for config in [
            GameConfig::X01(X01Config { start_score: 101, ..X01Config::default() }),
            GameConfig::Cricket(CricketConfig::default()),
            GameConfig::Killer(KillerConfig::default()),
        ] {
            let result = run_arena(&config, 3, 8, 42, 30).unwrap();
            assert_eq!(result.num_matches, 8);
            assert_eq!(result.darts_per_match.len(), 8);
            assert!(result.is_deterministic(), "{}", result.summary());
        }
    }

    #[test]
    fn test_random_hits_are_valid() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            random_hit(&mut rng).validate().unwrap();
        }
    }
}
