//! Round the Clock: hit 1 through 20 in order (then the bull, if configured).

use crate::engine::config::{ClockMode, RoundTheClockConfig};
use crate::engine::models::*;
use crate::engine::plugin::RuleVariant;
use crate::engine::scoreboard::{build_rows, headers, round_label, Scoreboard};
use crate::error::Result;

pub struct RoundTheClockRules<'a>(pub &'a RoundTheClockConfig);

fn clock_of(ps: &PlayerState) -> (u8, bool) {
    match ps.stats {
        PlayerStats::RoundTheClock { target, finished } => (target, finished),
        _ => (1, false),
    }
}

impl RoundTheClockRules<'_> {
    fn qualifies(&self, hit: &Hit, target: u8) -> bool {
        if hit.is_miss() || hit.segment != target {
            return false;
        }
        match self.0.mode {
            ClockMode::Any => true,
            ClockMode::Double => hit.multiplier == 2,
            // No triple bull: the inner bull stands in.
            ClockMode::Triple if target == BULL => hit.multiplier == 2,
            ClockMode::Triple => hit.multiplier == 3,
        }
    }

    /// Target after `target`, or None when `target` was the last.
    fn next_target(&self, target: u8) -> Option<u8> {
        if target == self.0.end_target {
            None
        } else if target == 20 {
            Some(BULL)
        } else {
            Some(target + 1)
        }
    }
}

impl RuleVariant for RoundTheClockRules<'_> {
    fn game_id(&self) -> &'static str {
        "round_the_clock"
    }

    fn display_name(&self) -> &'static str {
        "Round the Clock"
    }

    fn init(&self, players: &[Player]) -> Result<Vec<PlayerState>> {
        Ok(players
            .iter()
            .map(|p| PlayerState {
                player_id: p.id.clone(),
                score: 0,
                stats: PlayerStats::RoundTheClock {
                    target: 1,
                    finished: false,
                },
            })
            .collect())
    }

    fn process_throw(&self, state: &GameState, hit: Hit, timestamp: i64) -> Result<Throw> {
        let me = state.current_player_state()?;
        let (target, finished) = clock_of(me);
        if finished || !self.qualifies(&hit, target) {
            return Ok(Throw::new(hit, 0, timestamp));
        }

        let mut throw = Throw::new(hit, 1, timestamp);
        let after = match self.next_target(target) {
            Some(next) => PlayerStats::RoundTheClock {
                target: next,
                finished: false,
            },
            None => {
                throw.is_win = true;
                PlayerStats::RoundTheClock {
                    target,
                    finished: true,
                }
            }
        };
        throw
            .effects
            .push(Effect::stats(&me.player_id, me.stats.clone(), after));
        throw
            .effects
            .push(Effect::score(&me.player_id, me.score, me.score + 1));
        Ok(throw)
    }

    fn scoreboard(&self, state: &GameState) -> Scoreboard {
        let rows = build_rows(state, |ps| {
            let (target, finished) = clock_of(ps);
            let label = if target == BULL { "Bull".to_string() } else { target.to_string() };
            let details = if finished {
                vec!["done".to_string()]
            } else {
                vec![format!("next {label}")]
            };
            (ps.score.to_string(), details)
        });
        Scoreboard {
            game_type: self.display_name().into(),
            round_indicator: round_label(state),
            headers: headers(&["Player", "Hits", "Target"]),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::GameConfig;
    use crate::engine::machine::{add_throw, init};
    use crate::engine::simulator::process_throw;

    fn setup(mode: ClockMode, end_target: u8) -> GameState {
        let players = vec![Player::new("p0", "Ann"), Player::new("p1", "Ben")];
        init(&players, GameConfig::RoundTheClock(RoundTheClockConfig { mode, end_target })).unwrap()
    }

    fn set_target(state: &mut GameState, target: u8) {
        state.player_state_mut("p0").unwrap().stats = PlayerStats::RoundTheClock {
            target,
            finished: false,
        };
    }

    fn target(state: &GameState) -> u8 {
        clock_of(state.player_state("p0").unwrap()).0
    }

    #[test]
    fn test_advances_on_target_only() {
        let state = setup(ClockMode::Any, BULL);
        let t = process_throw(&state, Hit { segment: 2, multiplier: 1 }, 0).unwrap();
        assert!(t.effects.is_empty());
        let t = process_throw(&state, Hit { segment: 1, multiplier: 3 }, 0).unwrap();
        let state = add_throw(state, t).unwrap();
        assert_eq!(target(&state), 2);
        assert_eq!(state.player_state("p0").unwrap().score, 1);
    }

    #[test]
    fn test_double_mode_gates() {
        let state = setup(ClockMode::Double, BULL);
        let t = process_throw(&state, Hit { segment: 1, multiplier: 1 }, 0).unwrap();
        assert!(t.effects.is_empty());
        let t = process_throw(&state, Hit { segment: 1, multiplier: 2 }, 0).unwrap();
        assert_eq!(t.points, 1);
    }

    #[test]
    fn test_twenty_then_bull_then_win() {
        let mut state = setup(ClockMode::Any, BULL);
        set_target(&mut state, 20);
        let t = process_throw(&state, Hit { segment: 20, multiplier: 1 }, 0).unwrap();
        assert!(!t.is_win);
        let state = add_throw(state, t).unwrap();
        assert_eq!(target(&state), BULL);
        let t = process_throw(&state, Hit { segment: BULL, multiplier: 1 }, 0).unwrap();
        assert!(t.is_win);
    }

    #[test]
    fn test_end_at_twenty() {
        let mut state = setup(ClockMode::Any, 20);
        set_target(&mut state, 20);
        let t = process_throw(&state, Hit { segment: 20, multiplier: 2 }, 0).unwrap();
        assert!(t.is_win);
    }

    #[test]
    fn test_triple_mode_bull_takes_inner() {
        let mut state = setup(ClockMode::Triple, BULL);
        set_target(&mut state, BULL);
        let t = process_throw(&state, Hit { segment: BULL, multiplier: 1 }, 0).unwrap();
        assert!(!t.is_win);
        let t = process_throw(&state, Hit { segment: BULL, multiplier: 2 }, 0).unwrap();
        assert!(t.is_win);
    }
}
