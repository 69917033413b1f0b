//! Shanghai: each round has one live number; single, double and triple of it
//! in one turn wins outright.

use std::collections::BTreeSet;

use crate::engine::config::ShanghaiConfig;
use crate::engine::models::*;
use crate::engine::plugin::{turn_hits, RuleVariant};
use crate::engine::scoreboard::{build_rows, headers, open_turn_darts, round_label, Scoreboard};
use crate::error::Result;

pub struct ShanghaiRules<'a>(pub &'a ShanghaiConfig);

impl ShanghaiRules<'_> {
    /// Live number for `round`, or None once past 20.
    pub fn target(&self, round: u32) -> Option<u8> {
        let n = self.0.start_number as u32 + round.saturating_sub(1);
        (n <= 20).then_some(n as u8)
    }
}

impl RuleVariant for ShanghaiRules<'_> {
    fn game_id(&self) -> &'static str {
        "shanghai"
    }

    fn display_name(&self) -> &'static str {
        "Shanghai"
    }

    fn init(&self, players: &[Player]) -> Result<Vec<PlayerState>> {
        Ok(players
            .iter()
            .map(|p| PlayerState {
                player_id: p.id.clone(),
                score: 0,
                stats: PlayerStats::Shanghai,
            })
            .collect())
    }

    fn process_throw(&self, state: &GameState, hit: Hit, timestamp: i64) -> Result<Throw> {
        let me = state.current_player_state()?;
        let Some(target) = self.target(state.current_round) else {
            return Ok(Throw::new(hit, 0, timestamp));
        };
        if hit.is_miss() || hit.segment != target {
            return Ok(Throw::new(hit, 0, timestamp));
        }

        let points = hit.value();
        let mut throw = Throw::new(hit, points, timestamp);
        throw
            .effects
            .push(Effect::score(&me.player_id, me.score, me.score + points));

        let multipliers: BTreeSet<u8> = turn_hits(state)
            .chain(std::iter::once(&hit))
            .filter(|h| !h.is_miss() && h.segment == target)
            .map(|h| h.multiplier)
            .collect();
        if multipliers.is_superset(&BTreeSet::from([1, 2, 3])) {
            throw.is_win = true;
            tracing::debug!(player = %me.player_id, target, "shanghai");
        }
        Ok(throw)
    }

    fn scoreboard(&self, state: &GameState) -> Scoreboard {
        let rows = build_rows(state, |ps| {
            (ps.score.to_string(), open_turn_darts(state, &ps.player_id))
        });
        let round_indicator = match self.target(state.current_round) {
            Some(t) => format!("{} · Target {t}", round_label(state)),
            None => round_label(state),
        };
        Scoreboard {
            game_type: self.display_name().into(),
            round_indicator,
            headers: headers(&["Player", "Points", "Darts"]),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::GameConfig;
    use crate::engine::machine::{add_throw, init, next_turn};
    use crate::engine::simulator::process_throw;

    fn setup() -> GameState {
        let players = vec![Player::new("p0", "Ann"), Player::new("p1", "Ben")];
        init(&players, GameConfig::Shanghai(ShanghaiConfig::default())).unwrap()
    }

    fn play(state: GameState, segment: u8, multiplier: u8) -> (GameState, Throw) {
        let throw = process_throw(&state, Hit { segment, multiplier }, 0).unwrap();
        let state = add_throw(state, throw.clone()).unwrap();
        (state, throw)
    }

    #[test]
    fn test_target_advances_by_round() {
        let config = ShanghaiConfig { start_number: 5, rounds: 7 };
        let rules = ShanghaiRules(&config);
        assert_eq!(rules.target(1), Some(5));
        assert_eq!(rules.target(3), Some(7));
        assert_eq!(rules.target(17), None);
    }

    #[test]
    fn test_only_target_scores() {
        let state = setup();
        let (state, t) = play(state, 20, 3);
        assert_eq!(t.points, 0);
        let (state, t) = play(state, 1, 3);
        assert_eq!(t.points, 3);
        assert_eq!(state.player_state("p0").unwrap().score, 3);
    }

    #[test]
    fn test_shanghai_any_order_wins() {
        let state = setup();
        let (state, t) = play(state, 1, 3);
        assert!(!t.is_win);
        let (state, t) = play(state, 1, 1);
        assert!(!t.is_win);
        let (state, t) = play(state, 1, 2);
        assert!(t.is_win);
        assert_eq!(state.status, GameStatus::Completed);
        assert_eq!(state.player_state("p0").unwrap().score, 6);
    }

    #[test]
    fn test_shanghai_needs_same_turn() {
        let state = setup();
        let (state, _) = play(state, 1, 1);
        let (state, _) = play(state, 1, 2);
        let (state, _) = play(state, 5, 1);
        let state = next_turn(next_turn(state).unwrap()).unwrap();
        // Round 2 now targets 2; a T1 neither scores nor completes anything.
        let (_, t) = play(state, 1, 3);
        assert!(!t.is_win);
        assert_eq!(t.points, 0);
    }

    #[test]
    fn test_round_indicator_shows_target() {
        let state = setup();
        let board = ShanghaiRules(&ShanghaiConfig::default()).scoreboard(&state);
        assert_eq!(board.round_indicator, "Round 1/7 · Target 1");
    }
}
