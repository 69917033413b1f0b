//! Halve It: one target per round; a turn with no hit on it halves the score.

use std::fmt;

use crate::engine::config::HalveItConfig;
use crate::engine::models::*;
use crate::engine::plugin::{is_last_dart, turn_hits, RuleVariant};
use crate::engine::scoreboard::{build_rows, headers, open_turn_darts, round_label, Scoreboard};
use crate::error::{EngineError, Result};

/// A parsed round target: a number, optionally restricted to one ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalveItTarget {
    pub segment: u8,
    pub multiplier: Option<u8>,
}

impl HalveItTarget {
    /// Parse tokens like "20", "D7", "T10", "S5", "25", "DB" or "BULL".
    pub fn parse(token: &str) -> Result<Self> {
        let invalid = || EngineError::InvalidConfig(format!("bad halve_it target {token:?}"));
        let upper = token.trim().to_ascii_uppercase();
        match upper.as_str() {
            "B" | "BULL" | "SB" => {
                return Ok(HalveItTarget { segment: BULL, multiplier: None });
            }
            "DB" => {
                return Ok(HalveItTarget { segment: BULL, multiplier: Some(2) });
            }
            _ => {}
        }

        let (multiplier, digits) = match upper.chars().next() {
            Some('S') => (Some(1), &upper[1..]),
            Some('D') => (Some(2), &upper[1..]),
            Some('T') => (Some(3), &upper[1..]),
            _ => (None, upper.as_str()),
        };
        let segment: u8 = digits.parse().map_err(|_| invalid())?;
        if !((1..=20).contains(&segment) || segment == BULL) {
            return Err(invalid());
        }
        if segment == BULL && multiplier == Some(3) {
            return Err(invalid());
        }
        Ok(HalveItTarget { segment, multiplier })
    }

    pub fn matches(&self, hit: &Hit) -> bool {
        !hit.is_miss()
            && hit.segment == self.segment
            && self.multiplier.map_or(true, |m| m == hit.multiplier)
    }
}

impl fmt::Display for HalveItTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let number = if self.segment == BULL { "Bull".to_string() } else { self.segment.to_string() };
        match self.multiplier {
            None => write!(f, "{number}"),
            Some(1) => write!(f, "S{number}"),
            Some(2) => write!(f, "D{number}"),
            Some(_) => write!(f, "T{number}"),
        }
    }
}

pub struct HalveItRules<'a>(pub &'a HalveItConfig);

impl HalveItRules<'_> {
    pub fn target(&self, round: u32) -> Result<HalveItTarget> {
        let targets = &self.0.targets;
        if targets.is_empty() {
            return Err(EngineError::InvalidConfig("halve_it needs at least one target".into()));
        }
        let idx = (round.saturating_sub(1) as usize) % targets.len();
        HalveItTarget::parse(&targets[idx])
    }
}

fn halvings_of(ps: &PlayerState) -> u32 {
    match ps.stats {
        PlayerStats::HalveIt { halvings } => halvings,
        _ => 0,
    }
}

impl RuleVariant for HalveItRules<'_> {
    fn game_id(&self) -> &'static str {
        "halve_it"
    }

    fn display_name(&self) -> &'static str {
        "Halve It"
    }

    fn init(&self, players: &[Player]) -> Result<Vec<PlayerState>> {
        Ok(players
            .iter()
            .map(|p| PlayerState {
                player_id: p.id.clone(),
                score: 0,
                stats: PlayerStats::HalveIt { halvings: 0 },
            })
            .collect())
    }

    fn process_throw(&self, state: &GameState, hit: Hit, timestamp: i64) -> Result<Throw> {
        let me = state.current_player_state()?;
        let target = self.target(state.current_round)?;

        if target.matches(&hit) {
            let points = hit.value();
            let mut throw = Throw::new(hit, points, timestamp);
            throw
                .effects
                .push(Effect::score(&me.player_id, me.score, me.score + points));
            return Ok(throw);
        }

        let scored_this_turn = turn_hits(state).any(|h| target.matches(h));
        if !is_last_dart(state) || scored_this_turn {
            return Ok(Throw::new(hit, 0, timestamp));
        }

        let halved = me.score.div_euclid(2);
        let mut throw = Throw::new(hit, halved - me.score, timestamp);
        if halved != me.score {
            throw
                .effects
                .push(Effect::score(&me.player_id, me.score, halved));
        }
        let halvings = halvings_of(me);
        throw.effects.push(Effect::stats(
            &me.player_id,
            me.stats.clone(),
            PlayerStats::HalveIt { halvings: halvings + 1 },
        ));
        tracing::debug!(player = %me.player_id, from = me.score, to = halved, "score halved");
        Ok(throw)
    }

    fn scoreboard(&self, state: &GameState) -> Scoreboard {
        let rows = build_rows(state, |ps| {
            let mut details = vec![format!("halved {}x", halvings_of(ps))];
            details.extend(open_turn_darts(state, &ps.player_id));
            (ps.score.to_string(), details)
        });
        let round_indicator = match self.target(state.current_round) {
            Ok(t) => format!("{} · Target {t}", round_label(state)),
            Err(_) => round_label(state),
        };
        Scoreboard {
            game_type: self.display_name().into(),
            round_indicator,
            headers: headers(&["Player", "Points", "Details"]),
            rows,
        }
    }
}
