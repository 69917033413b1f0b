//! Hit-level driver over the state machine: judge a hit with the active
//! variant, fold it in, rotate turns, and replay stored hit logs.

use crate::engine::config::GameConfig;
use crate::engine::machine::{add_throw, init, is_turn_complete, next_turn};
use crate::engine::models::*;
use crate::error::{EngineError, Result};
use crate::games::with_variant;

/// Judge `hit` for the current player under `state.config`.
pub fn process_throw(state: &GameState, hit: Hit, timestamp: i64) -> Result<Throw> {
    hit.validate()?;
    state.current_player_state()?;
    with_variant(&state.config, |v| v.process_throw(state, hit, timestamp))
}

/// Judge a hit, fold it into the turn and rotate when the turn is over.
pub fn play_hit(state: GameState, hit: Hit, timestamp: i64) -> Result<GameState> {
    if state.is_finished() {
        tracing::warn!(hit = %hit, "hit on a finished match ignored");
        return Ok(state);
    }
    let throw = process_throw(&state, hit, timestamp)?;
    tracing::debug!(
        player = %state.current_player_id,
        hit = %hit,
        points = throw.points,
        bust = throw.is_bust,
        win = throw.is_win,
        "throw judged"
    );
    let state = add_throw(state, throw)?;
    if is_turn_complete(&state) {
        next_turn(state)
    } else {
        Ok(state)
    }
}

/// Rebuild a match from stored hits in capture order, re-running rule logic.
///
/// Hits are grouped into turns by `(round_index, player_id)`. A group closes
/// after three darts, a bust, a win, an explicit `turn_closed` marker, or when
/// the key changes. Players with no stored hits in a round get an empty turn.
pub fn replay_from_flat_throw_log(
    throws: &[StoredThrow],
    config: GameConfig,
    players: &[Player],
) -> Result<GameState> {
    let mut state = init(players, config)?;
    let mut closed_key: Option<(u32, &str)> = None;

    for (i, stored) in throws.iter().enumerate() {
        if state.is_finished() {
            tracing::warn!(
                remaining = throws.len() - i,
                "hits stored after the match completed, skipped"
            );
            break;
        }
        if !(1..=MAX_THROWS_PER_TURN as u8).contains(&stored.throw_index) {
            return Err(EngineError::InvalidStoredThrow(format!(
                "throw #{i}: throw_index {} outside 1..={MAX_THROWS_PER_TURN}",
                stored.throw_index
            )));
        }
        let hit = stored.hit()?;
        let key = (stored.round_index, stored.player_id.as_str());
        if closed_key == Some(key) {
            tracing::warn!(
                player = %stored.player_id,
                round = stored.round_index,
                throw_index = stored.throw_index,
                "hit after its turn closed, skipped"
            );
            continue;
        }

        state = advance_to(state, key, i)?;
        let throw = process_throw(&state, hit, stored.timestamp_ms)?;
        state = add_throw(state, throw)?;

        if state.is_finished() {
            continue;
        }
        if is_turn_complete(&state) || stored.turn_closed {
            closed_key = Some(key);
            state = next_turn(state)?;
        }
    }

    tracing::debug!(
        throws = throws.len(),
        turns = state.history.len(),
        status = ?state.status,
        "flat throw log replayed"
    );
    Ok(state)
}

/// Rotate until the engine sits on `(round, player)`, archiving any open or
/// skipped turns on the way.
///
/// The key may be at most one round ahead of the engine, so a single call
/// archives fewer than two rounds of turns.
fn advance_to(mut state: GameState, key: (u32, &str), index: usize) -> Result<GameState> {
    let (round, player_id) = key;
    let target_seat = state
        .player_index(player_id)
        .ok_or_else(|| EngineError::MissingPlayerState(player_id.to_string()))?;
    if round > state.current_round.saturating_add(1) {
        return Err(EngineError::InvalidStoredThrow(format!(
            "throw #{index}: round {round} for {player_id} is more than one round ahead of the match (round {})",
            state.current_round
        )));
    }

    loop {
        let seat = state
            .player_index(&state.current_player_id)
            .ok_or_else(|| EngineError::MissingPlayerState(state.current_player_id.clone()))?;
        let here = (state.current_round, seat);
        if here == (round, target_seat) {
            return Ok(state);
        }
        if here > (round, target_seat) {
            return Err(EngineError::InvalidStoredThrow(format!(
                "throw #{index}: round {round} for {player_id} is behind the match (round {}, {})",
                state.current_round, state.current_player_id
            )));
        }
        state = next_turn(state)?;
    }
}
