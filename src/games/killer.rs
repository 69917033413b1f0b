//! Killer: become a killer on your own double, then take lives off the others.

use crate::board::geometry::SEGMENT_ORDER;
use crate::engine::config::KillerConfig;
use crate::engine::models::*;
use crate::engine::plugin::RuleVariant;
use crate::engine::scoreboard::{build_rows, headers, round_label, Scoreboard, OUT};
use crate::error::{EngineError, Result};

pub struct KillerRules<'a>(pub &'a KillerConfig);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Killer {
    number: u8,
    lives: u32,
    is_killer: bool,
}

fn killer_of(ps: &PlayerState) -> Option<Killer> {
    match ps.stats {
        PlayerStats::Killer {
            number,
            lives,
            is_killer,
        } => Some(Killer {
            number,
            lives,
            is_killer,
        }),
        _ => None,
    }
}

fn stats_of(k: Killer) -> PlayerStats {
    PlayerStats::Killer {
        number: k.number,
        lives: k.lives,
        is_killer: k.is_killer,
    }
}

/// Number for each seat: explicit, or spread evenly round the board.
fn assign_numbers(config: &KillerConfig, count: usize) -> Result<Vec<u8>> {
    if let Some(numbers) = &config.numbers {
        if numbers.len() < count {
            return Err(EngineError::InvalidConfig(format!(
                "killer has {} numbers for {count} players",
                numbers.len()
            )));
        }
        return Ok(numbers[..count].to_vec());
    }
    if count > SEGMENT_ORDER.len() {
        return Err(EngineError::InvalidConfig(format!(
            "killer supports at most {} players, got {count}",
            SEGMENT_ORDER.len()
        )));
    }
    Ok((0..count)
        .map(|i| SEGMENT_ORDER[i * SEGMENT_ORDER.len() / count])
        .collect())
}

impl RuleVariant for KillerRules<'_> {
    fn game_id(&self) -> &'static str {
        "killer"
    }

    fn display_name(&self) -> &'static str {
        "Killer"
    }

    fn init(&self, players: &[Player]) -> Result<Vec<PlayerState>> {
        let numbers = assign_numbers(self.0, players.len())?;
        Ok(players
            .iter()
            .zip(numbers)
            .map(|(p, number)| PlayerState {
                player_id: p.id.clone(),
                score: self.0.lives as i32,
                stats: stats_of(Killer {
                    number,
                    lives: self.0.lives,
                    is_killer: false,
                }),
            })
            .collect())
    }

    fn process_throw(&self, state: &GameState, hit: Hit, timestamp: i64) -> Result<Throw> {
        let me = state.current_player_state()?;
        let Some(mine) = killer_of(me) else {
            return Err(EngineError::MissingPlayerState(me.player_id.clone()));
        };
        if mine.lives == 0 {
            return Ok(Throw::invalid(hit, timestamp));
        }

        let alive: Vec<&PlayerState> = state
            .player_states
            .iter()
            .filter(|ps| killer_of(ps).is_some_and(|k| k.lives > 0))
            .collect();
        if alive.len() == 1 {
            // Last one standing after the others went out on their own darts.
            let mut throw = Throw::new(hit, 0, timestamp);
            throw.is_win = true;
            return Ok(throw);
        }
        if hit.is_miss() {
            return Ok(Throw::new(hit, 0, timestamp));
        }

        if !mine.is_killer {
            let mut throw = Throw::new(hit, 0, timestamp);
            if hit.segment == mine.number && hit.is_double() {
                let promoted = Killer {
                    is_killer: true,
                    ..mine
                };
                throw
                    .effects
                    .push(Effect::stats(&me.player_id, me.stats.clone(), stats_of(promoted)));
                tracing::debug!(player = %me.player_id, number = mine.number, "player became killer");
            }
            return Ok(throw);
        }

        let victim = alive
            .iter()
            .copied()
            .find(|ps| killer_of(ps).is_some_and(|k| k.number == hit.segment));
        let Some(victim) = victim else {
            return Ok(Throw::new(hit, 0, timestamp));
        };
        if victim.player_id == me.player_id && !self.0.self_suicide {
            return Ok(Throw::new(hit, 0, timestamp));
        }

        let Some(before) = killer_of(victim) else {
            return Err(EngineError::MissingPlayerState(victim.player_id.clone()));
        };
        let damage = before.lives.min(hit.multiplier as u32);
        let after = Killer {
            lives: before.lives - damage,
            ..before
        };
        let mut throw = Throw::new(hit, damage as i32, timestamp);
        throw
            .effects
            .push(Effect::stats(&victim.player_id, victim.stats.clone(), stats_of(after)));
        throw
            .effects
            .push(Effect::score(&victim.player_id, victim.score, after.lives as i32));
        if after.lives == 0 {
            tracing::debug!(player = %victim.player_id, by = %me.player_id, "player eliminated");
        }

        let survivors: Vec<&str> = alive
            .iter()
            .filter(|ps| ps.player_id != victim.player_id || after.lives > 0)
            .map(|ps| ps.player_id.as_str())
            .collect();
        throw.is_win = survivors == [me.player_id.as_str()];
        Ok(throw)
    }

    fn scoreboard(&self, state: &GameState) -> Scoreboard {
        let rows = build_rows(state, |ps| match killer_of(ps) {
            Some(k) => {
                let mut details = vec![format!("#{}", k.number)];
                if k.is_killer {
                    details.push("KILLER".into());
                }
                let score = if k.lives == 0 {
                    OUT.to_string()
                } else {
                    k.lives.to_string()
                };
                (score, details)
            }
            None => (ps.score.to_string(), Vec::new()),
        });
        Scoreboard {
            game_type: self.display_name().into(),
            round_indicator: round_label(state),
            headers: headers(&["Player", "Lives", "Number"]),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::GameConfig;
    use crate::engine::machine::{add_throw, init, next_turn, undo};
    use crate::engine::simulator::process_throw;

    fn setup(players: usize, lives: u32, self_suicide: bool) -> GameState {
        let players: Vec<Player> = (0..players)
            .map(|i| Player::new(format!("p{i}"), format!("P{i}")))
            .collect();
        let config = KillerConfig {
            lives,
            self_suicide,
            numbers: Some(vec![20, 19, 18, 17]),
        };
        init(&players, GameConfig::Killer(config)).unwrap()
    }

    fn make_killer(state: &mut GameState, player: &str) {
        let ps = state.player_state_mut(player).unwrap();
        if let PlayerStats::Killer { is_killer, .. } = &mut ps.stats {
            *is_killer = true;
        }
    }

    fn lives(state: &GameState, player: &str) -> u32 {
        killer_of(state.player_state(player).unwrap()).unwrap().lives
    }

    #[test]
    fn test_default_numbers_spread() {
        let numbers = assign_numbers(&KillerConfig::default(), 4).unwrap();
        assert_eq!(numbers, vec![20, 6, 3, 11]);
        assert!(assign_numbers(&KillerConfig::default(), 21).is_err());
    }

    #[test]
    fn test_must_hit_own_double_first() {
        let state = setup(2, 3, false);
        // Not a killer yet: hitting p1's number does nothing.
        let throw = process_throw(&state, Hit { segment: 19, multiplier: 3 }, 1).unwrap();
        assert!(throw.effects.is_empty());
        // Single on own number is not enough.
        let throw = process_throw(&state, Hit { segment: 20, multiplier: 1 }, 1).unwrap();
        assert!(throw.effects.is_empty());

        let throw = process_throw(&state, Hit { segment: 20, multiplier: 2 }, 1).unwrap();
        let state = add_throw(state, throw).unwrap();
        assert!(killer_of(state.player_state("p0").unwrap()).unwrap().is_killer);
    }

    #[test]
    fn test_killer_damages_owner_by_multiplier() {
        let mut state = setup(3, 3, false);
        make_killer(&mut state, "p0");
        let throw = process_throw(&state, Hit { segment: 19, multiplier: 2 }, 1).unwrap();
        assert_eq!(throw.points, 2);
        let state = add_throw(state, throw).unwrap();
        assert_eq!(lives(&state, "p1"), 1);
        assert_eq!(state.player_state("p1").unwrap().score, 1);

        let state = undo(state).unwrap();
        assert_eq!(lives(&state, "p1"), 3);
        assert_eq!(state.player_state("p1").unwrap().score, 3);
    }

    #[test]
    fn test_last_survivor_wins() {
        let mut state = setup(2, 2, false);
        make_killer(&mut state, "p0");
        let throw = process_throw(&state, Hit { segment: 19, multiplier: 3 }, 1).unwrap();
        assert!(throw.is_win);
        assert_eq!(throw.points, 2);
        let state = add_throw(state, throw).unwrap();
        assert_eq!(state.winner_id.as_deref(), Some("p0"));
        let board = KillerRules(&KillerConfig::default()).scoreboard(&state);
        assert_eq!(board.rows[0].score, "WON");
        assert_eq!(board.rows[1].score, "OUT");
    }

    #[test]
    fn test_own_number_ignored_without_self_suicide() {
        let mut state = setup(2, 3, false);
        make_killer(&mut state, "p0");
        let throw = process_throw(&state, Hit { segment: 20, multiplier: 3 }, 1).unwrap();
        assert!(throw.effects.is_empty());
    }

    #[test]
    fn test_self_suicide_then_survivor_wins() {
        let mut state = setup(2, 1, true);
        make_killer(&mut state, "p0");
        let throw = process_throw(&state, Hit { segment: 20, multiplier: 1 }, 1).unwrap();
        assert!(!throw.is_win);
        let state = add_throw(state, throw).unwrap();
        assert_eq!(lives(&state, "p0"), 0);

        let state = next_turn(state).unwrap();
        let throw = process_throw(&state, Hit::miss(), 2).unwrap();
        assert!(throw.is_win);
    }

    #[test]
    fn test_eliminated_player_darts_are_invalid() {
        let mut state = setup(3, 3, false);
        if let PlayerStats::Killer { lives, .. } = &mut state.player_state_mut("p0").unwrap().stats {
            *lives = 0;
        }
        let throw = process_throw(&state, Hit { segment: 19, multiplier: 3 }, 1).unwrap();
        assert!(!throw.is_valid);
    }
}
