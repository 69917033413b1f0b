//! The RuleVariant trait every scoring variant implements.

use crate::engine::models::*;
use crate::engine::scoreboard::Scoreboard;
use crate::error::Result;

/// Trait every rule set implements. Implementations borrow their config
/// arm, so dispatch happens once per call in `games::with_variant`.
pub trait RuleVariant {
    fn game_id(&self) -> &'static str;
    fn display_name(&self) -> &'static str;

    /// Seed one player state per player, in roster order.
    fn init(&self, players: &[Player]) -> Result<Vec<PlayerState>>;

    /// Judge one dart for the current player.
    ///
    /// Reads `state` only. Any change to player scores or stats, including
    /// other players', is returned as `Throw::effects` for the engine to apply.
    fn process_throw(&self, state: &GameState, hit: Hit, timestamp: i64) -> Result<Throw>;

    /// Read-only view of the match for display.
    fn scoreboard(&self, state: &GameState) -> Scoreboard;
}

/// Throws the current player has already made this turn.
pub fn turn_hits(state: &GameState) -> impl Iterator<Item = &Hit> {
    state.current_turn.throws.iter().map(|t| &t.hit)
}

/// Whether the next dart is the last of the turn.
pub fn is_last_dart(state: &GameState) -> bool {
    state.current_turn.throws.len() + 1 >= MAX_THROWS_PER_TURN
}
