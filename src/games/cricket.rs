//! Cricket: close the target numbers, score on numbers opponents still have open.

use std::collections::BTreeMap;

use crate::engine::config::{CricketConfig, CricketMode};
use crate::engine::models::*;
use crate::engine::plugin::RuleVariant;
use crate::engine::scoreboard::{build_rows, round_label, Scoreboard};
use crate::error::Result;

pub const MARKS_TO_CLOSE: u8 = 3;

pub struct CricketRules<'a>(pub &'a CricketConfig);

fn marks_on(ps: &PlayerState, number: u8) -> u8 {
    match &ps.stats {
        PlayerStats::Cricket { marks } => marks.get(&number).copied().unwrap_or(0),
        _ => 0,
    }
}

/// Glyph for a mark count: nothing, "/", "X", then "O" once closed.
pub fn mark_glyph(marks: u8) -> &'static str {
    match marks {
        0 => "",
        1 => "/",
        2 => "X",
        _ => "O",
    }
}

fn number_label(number: u8) -> String {
    if number == BULL {
        "Bull".into()
    } else {
        number.to_string()
    }
}

impl CricketRules<'_> {
    fn all_closed(&self, marks: &BTreeMap<u8, u8>) -> bool {
        self.0
            .numbers
            .iter()
            .all(|n| marks.get(n).copied().unwrap_or(0) >= MARKS_TO_CLOSE)
    }

    fn finished(&self, ps: &PlayerState) -> bool {
        match &ps.stats {
            PlayerStats::Cricket { marks } => self.all_closed(marks),
            _ => false,
        }
    }
}

impl RuleVariant for CricketRules<'_> {
    fn game_id(&self) -> &'static str {
        "cricket"
    }

    fn display_name(&self) -> &'static str {
        match self.0.mode {
            CricketMode::Standard => "Cricket",
            CricketMode::CutThroat => "Cut-Throat Cricket",
        }
    }

    fn init(&self, players: &[Player]) -> Result<Vec<PlayerState>> {
        let marks: BTreeMap<u8, u8> = self.0.numbers.iter().map(|&n| (n, 0)).collect();
        Ok(players
            .iter()
            .map(|p| PlayerState {
                player_id: p.id.clone(),
                score: 0,
                stats: PlayerStats::Cricket { marks: marks.clone() },
            })
            .collect())
    }

    fn process_throw(&self, state: &GameState, hit: Hit, timestamp: i64) -> Result<Throw> {
        let me = state.current_player_state()?;
        let number = hit.segment;
        if hit.is_miss() || !self.0.numbers.contains(&number) {
            return Ok(Throw::new(hit, 0, timestamp));
        }

        let current = marks_on(me, number);
        let closing = hit.multiplier.min(MARKS_TO_CLOSE.saturating_sub(current));
        let excess = hit.multiplier - closing;

        let open_opponents: Vec<&PlayerState> = state
            .opponents()
            .filter(|o| marks_on(o, number) < MARKS_TO_CLOSE)
            .collect();
        let points = if excess > 0 && !open_opponents.is_empty() {
            excess as i32 * number as i32
        } else {
            0
        };

        let mut throw = Throw::new(hit, points, timestamp);
        let mut my_marks = match &me.stats {
            PlayerStats::Cricket { marks } => marks.clone(),
            _ => BTreeMap::new(),
        };
        if closing > 0 {
            my_marks.insert(number, current + closing);
            throw.effects.push(Effect::stats(
                &me.player_id,
                me.stats.clone(),
                PlayerStats::Cricket { marks: my_marks.clone() },
            ));
        }

        // Scores after this dart, for the win check.
        let mut scores: Vec<(&str, i32)> = state
            .player_states
            .iter()
            .map(|ps| (ps.player_id.as_str(), ps.score))
            .collect();
        if points > 0 {
            match self.0.mode {
                CricketMode::Standard => {
                    throw.effects.push(Effect::score(&me.player_id, me.score, me.score + points));
                    for entry in scores.iter_mut().filter(|(id, _)| *id == me.player_id) {
                        entry.1 += points;
                    }
                }
                CricketMode::CutThroat => {
                    for o in &open_opponents {
                        throw.effects.push(Effect::score(&o.player_id, o.score, o.score + points));
                        for entry in scores.iter_mut().filter(|(id, _)| *id == o.player_id) {
                            entry.1 += points;
                        }
                    }
                }
            }
        }

        if self.all_closed(&my_marks) {
            let mine = me.score + if self.0.mode == CricketMode::Standard { points } else { 0 };
            // Only opponents who have closed every number compete on points.
            let mut rivals = scores
                .iter()
                .filter(|(id, _)| *id != me.player_id)
                .filter(|(id, _)| state.player_state(id).is_ok_and(|ps| self.finished(ps)))
                .map(|(_, s)| *s);
            throw.is_win = match self.0.mode {
                CricketMode::Standard => rivals.all(|s| mine >= s),
                CricketMode::CutThroat => rivals.all(|s| mine <= s),
            };
        }
        tracing::trace!(
            player = %me.player_id,
            number,
            closing,
            points,
            win = throw.is_win,
            "cricket dart"
        );
        Ok(throw)
    }

    fn scoreboard(&self, state: &GameState) -> Scoreboard {
        let mut headers = vec!["Player".to_string()];
        headers.extend(self.0.numbers.iter().map(|&n| number_label(n)));
        headers.push("Points".into());

        let mut rows = build_rows(state, |ps| {
            let details = self
                .0
                .numbers
                .iter()
                .map(|&n| mark_glyph(marks_on(ps, n)).to_string())
                .collect();
            (ps.score.to_string(), details)
        });
        for (row, ps) in rows.iter_mut().zip(&state.player_states) {
            if let PlayerStats::Cricket { marks } = &ps.stats {
                row.marks = Some(marks.clone());
            }
        }

        Scoreboard {
            game_type: self.display_name().into(),
            round_indicator: round_label(state),
            headers,
            rows,
        }
    }
}
