//! Scoreboard projection types and shared row helpers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::models::*;
use crate::games::with_variant;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub game_type: String,
    pub round_indicator: String,
    pub headers: Vec<String>,
    pub rows: Vec<ScoreboardRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreboardRow {
    pub player_id: PlayerId,
    pub player_name: String,
    /// Display value; may be text such as "OUT" or "WON".
    pub score: String,
    pub active: bool,
    pub details: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<BTreeMap<u8, u8>>,
}

pub const WON: &str = "WON";
pub const OUT: &str = "OUT";

/// Project the match for display with the rules of its configured variant.
pub fn get_scoreboard(state: &GameState) -> Scoreboard {
    with_variant(&state.config, |v| v.scoreboard(state))
}

/// One row per player in roster order, filled by `details`.
pub fn build_rows<F>(state: &GameState, mut details: F) -> Vec<ScoreboardRow>
where
    F: FnMut(&PlayerState) -> (String, Vec<String>),
{
    state
        .player_states
        .iter()
        .map(|ps| {
            let (score, details) = details(ps);
            let score = if state.winner_id.as_deref() == Some(ps.player_id.as_str()) {
                WON.to_string()
            } else {
                score
            };
            ScoreboardRow {
                player_id: ps.player_id.clone(),
                player_name: state
                    .player(&ps.player_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| ps.player_id.clone()),
                score,
                active: !state.is_finished() && ps.player_id == state.current_player_id,
                details,
                marks: None,
            }
        })
        .collect()
}

/// "Round 3" or "Round 3/7" when the variant has a round limit.
pub fn round_label(state: &GameState) -> String {
    match state.config.round_limit() {
        Some(limit) => format!("Round {}/{}", state.current_round, limit),
        None => format!("Round {}", state.current_round),
    }
}

/// Notation of the darts in the player's open turn, e.g. ["T20", "S5"].
pub fn open_turn_darts(state: &GameState, player_id: &str) -> Vec<String> {
    if state.current_turn.player_id != player_id {
        return Vec::new();
    }
    state
        .current_turn
        .throws
        .iter()
        .map(|t| t.hit.to_string())
        .collect()
}

pub fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|h| h.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::{GameConfig, ShanghaiConfig, X01Config};
    use crate::engine::machine::init;
    use crate::engine::simulator::play_hit;

    fn players() -> Vec<Player> {
        vec![Player::new("p0", "Ann"), Player::new("p1", "Ben")]
    }

    #[test]
    fn test_rows_follow_roster_and_mark_active() {
        let state = init(&players(), GameConfig::X01(X01Config::default())).unwrap();
        let board = get_scoreboard(&state);
        assert_eq!(board.game_type, "501");
        assert_eq!(board.round_indicator, "Round 1");
        let names: Vec<&str> = board.rows.iter().map(|r| r.player_name.as_str()).collect();
        assert_eq!(names, ["Ann", "Ben"]);
        assert!(board.rows[0].active);
        assert!(!board.rows[1].active);
    }

    #[test]
    fn test_open_turn_darts_only_for_thrower() {
        let state = init(&players(), GameConfig::Shanghai(ShanghaiConfig::default())).unwrap();
        let state = play_hit(state, Hit { segment: 20, multiplier: 3 }, 0).unwrap();
        let state = play_hit(state, Hit::miss(), 1).unwrap();
        assert_eq!(open_turn_darts(&state, "p0"), ["T20", "MISS"]);
        assert!(open_turn_darts(&state, "p1").is_empty());
    }

    #[test]
    fn test_round_label_with_limit() {
        let state = init(&players(), GameConfig::Shanghai(ShanghaiConfig::default())).unwrap();
        assert_eq!(round_label(&state), "Round 1/7");
    }
}
