//! High Score: every dart adds its face value. The round limit is enforced
//! by the caller.

use crate::engine::config::HighScoreConfig;
use crate::engine::models::*;
use crate::engine::plugin::RuleVariant;
use crate::engine::scoreboard::{build_rows, headers, open_turn_darts, round_label, Scoreboard};
use crate::error::Result;

pub struct HighScoreRules<'a>(pub &'a HighScoreConfig);

impl RuleVariant for HighScoreRules<'_> {
    fn game_id(&self) -> &'static str {
        "high_score"
    }

    fn display_name(&self) -> &'static str {
        "High Score"
    }

    fn init(&self, players: &[Player]) -> Result<Vec<PlayerState>> {
        Ok(players
            .iter()
            .map(|p| PlayerState {
                player_id: p.id.clone(),
                score: 0,
                stats: PlayerStats::HighScore,
            })
            .collect())
    }

    fn process_throw(&self, state: &GameState, hit: Hit, timestamp: i64) -> Result<Throw> {
        let me = state.current_player_state()?;
        let points = hit.value();
        let mut throw = Throw::new(hit, points, timestamp);
        if points > 0 {
            throw
                .effects
                .push(Effect::score(&me.player_id, me.score, me.score + points));
        }
        Ok(throw)
    }

    fn scoreboard(&self, state: &GameState) -> Scoreboard {
        let rows = build_rows(state, |ps| {
            (ps.score.to_string(), open_turn_darts(state, &ps.player_id))
        });
        let round_indicator = if state.current_round > self.0.rounds {
            format!("Final ({} rounds)", self.0.rounds)
        } else {
            round_label(state)
        };
        Scoreboard {
            game_type: self.display_name().into(),
            round_indicator,
            headers: headers(&["Player", "Points", "Darts"]),
            rows,
        }
    }
}
