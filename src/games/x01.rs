//! X01 (301/501/...): count down to exactly zero.

use crate::engine::config::{InMode, OutMode, X01Config};
use crate::engine::models::*;
use crate::engine::plugin::RuleVariant;
use crate::engine::scoreboard::{build_rows, headers, open_turn_darts, round_label, Scoreboard};
use crate::error::Result;

pub struct X01Rules<'a>(pub &'a X01Config);

impl X01Rules<'_> {
    fn finishes(&self, hit: &Hit) -> bool {
        match self.0.out_mode {
            OutMode::Straight => true,
            OutMode::Double => hit.is_double(),
            OutMode::Master => hit.is_double() || hit.is_triple(),
        }
    }
}

impl RuleVariant for X01Rules<'_> {
    fn game_id(&self) -> &'static str {
        "x01"
    }

    fn display_name(&self) -> &'static str {
        "X01"
    }

    fn init(&self, players: &[Player]) -> Result<Vec<PlayerState>> {
        let opened = self.0.in_mode == InMode::Straight;
        Ok(players
            .iter()
            .map(|p| PlayerState {
                player_id: p.id.clone(),
                score: self.0.start_score,
                stats: PlayerStats::X01 { opened },
            })
            .collect())
    }

    fn process_throw(&self, state: &GameState, hit: Hit, timestamp: i64) -> Result<Throw> {
        let me = state.current_player_state()?;
        let player_id = me.player_id.as_str();
        let mut effects = Vec::new();

        let opened = matches!(me.stats, PlayerStats::X01 { opened: true });
        if !opened {
            if !hit.is_double() {
                return Ok(Throw::invalid(hit, timestamp));
            }
            effects.push(Effect::stats(
                player_id,
                me.stats.clone(),
                PlayerStats::X01 { opened: true },
            ));
            tracing::debug!(player = %player_id, hit = %hit, "double-in, player opened");
        }

        let points = hit.value();
        let remaining = me.score - points;
        let needs_finish = self.0.out_mode != OutMode::Straight;
        let bust = remaining < 0
            || (remaining == 1 && needs_finish)
            || (remaining == 0 && !self.finishes(&hit));

        let mut throw = Throw::new(hit, points, timestamp);
        if bust {
            throw.is_bust = true;
            return Ok(throw);
        }
        if points != 0 {
            effects.push(Effect::score(player_id, me.score, remaining));
        }
        throw.is_win = remaining == 0;
        throw.effects = effects;
        Ok(throw)
    }

    fn scoreboard(&self, state: &GameState) -> Scoreboard {
        let start = self.0.start_score;
        let rows = build_rows(state, |ps| {
            let darts: usize = state
                .all_turns()
                .filter(|t| t.player_id == ps.player_id)
                .map(|t| t.throws.len())
                .sum();
            let average = if darts == 0 {
                0.0
            } else {
                (start - ps.score) as f64 * 3.0 / darts as f64
            };
            let mut details = vec![format!("darts {darts}"), format!("avg {average:.1}")];
            if matches!(ps.stats, PlayerStats::X01 { opened: false }) {
                details.push("not opened".into());
            }
            details.extend(open_turn_darts(state, &ps.player_id));
            (ps.score.to_string(), details)
        });
        Scoreboard {
            game_type: format!("{start}"),
            round_indicator: round_label(state),
            headers: headers(&["Player", "Remaining", "Details"]),
            rows,
        }
    }
}
