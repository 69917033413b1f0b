//! Turn/round state machine over `GameState`.
//!
//! Every transition consumes the state and returns the next one. A failed
//! transition drops the partially updated value, so callers never observe a
//! half-applied throw.

use std::collections::BTreeSet;

use crate::engine::config::GameConfig;
use crate::engine::models::*;
use crate::error::{EngineError, Result};
use crate::games::with_variant;

/// Create an active match. The first player in roster order opens round 1.
pub fn init(players: &[Player], config: GameConfig) -> Result<GameState> {
    let first = players.first().ok_or(EngineError::EmptyRoster)?;
    let mut seen = BTreeSet::new();
    for p in players {
        if !seen.insert(p.id.as_str()) {
            return Err(EngineError::DuplicatePlayer(p.id.clone()));
        }
    }
    config.validate()?;

    let player_states = with_variant(&config, |v| v.init(players))?;
    let start_score = player_states
        .iter()
        .find(|ps| ps.player_id == first.id)
        .map(|ps| ps.score)
        .ok_or_else(|| EngineError::MissingPlayerState(first.id.clone()))?;

    tracing::info!(
        game = config.type_tag(),
        players = players.len(),
        "match initialised"
    );

    Ok(GameState {
        id: String::new(),
        game_id: config.type_tag().to_string(),
        config,
        status: GameStatus::Active,
        players: players.to_vec(),
        player_states,
        current_round: 1,
        current_player_id: first.id.clone(),
        current_turn: Turn::open(&first.id, 1, start_score),
        history: Vec::new(),
        winner_id: None,
        started_at: None,
        ended_at: None,
    })
}

/// Fold a judged throw into the open turn.
///
/// Applies the throw's effects, reverts the thrower to the turn-start score
/// on a bust and completes the match on a win. Whether the turn is over is
/// left to `is_turn_complete`.
///
/// Fails with `MatchFinished` on a completed match and with `TurnClosed`
/// once the open turn is busted or already holds three darts.
pub fn add_throw(mut state: GameState, mut throw: Throw) -> Result<GameState> {
    if state.is_finished() {
        return Err(EngineError::MatchFinished);
    }
    if state.current_turn.is_bust || state.current_turn.throws.len() >= MAX_THROWS_PER_TURN {
        return Err(EngineError::TurnClosed(state.current_player_id.clone()));
    }

    for effect in &throw.effects {
        apply_effect(&mut state, effect)?;
    }

    let player_id = state.current_player_id.clone();
    if throw.is_bust {
        let start = state.current_turn.start_score;
        let current = state.player_state(&player_id)?.score;
        if current != start {
            let revert = Effect::score(&player_id, current, start);
            apply_effect(&mut state, &revert)?;
            throw.effects.push(revert);
        }
        state.current_turn.is_bust = true;
        state.current_turn.end_score = start;
        tracing::debug!(player = %player_id, score = start, "bust, turn reverted");
    } else {
        state.current_turn.end_score = state.player_state(&player_id)?.score;
    }

    if state.started_at.is_none() {
        state.started_at = Some(throw.timestamp);
    }
    if throw.is_win {
        state.status = GameStatus::Completed;
        state.winner_id = Some(player_id.clone());
        state.ended_at = Some(throw.timestamp);
        tracing::info!(winner = %player_id, round = state.current_round, "match completed");
    }

    state.current_turn.throws.push(throw);
    Ok(state)
}

pub fn is_turn_complete(state: &GameState) -> bool {
    state.status == GameStatus::Completed
        || state.current_turn.is_bust
        || state.current_turn.throws.len() >= MAX_THROWS_PER_TURN
}

/// Archive the open turn and hand the board to the next player.
///
/// A finished match stays where it is.
pub fn next_turn(mut state: GameState) -> Result<GameState> {
    if state.is_finished() {
        return Ok(state);
    }
    let idx = state
        .player_index(&state.current_player_id)
        .ok_or_else(|| EngineError::MissingPlayerState(state.current_player_id.clone()))?;
    let next_idx = (idx + 1) % state.players.len();
    if next_idx == 0 {
        state.current_round += 1;
    }
    let next_id = state.players[next_idx].id.clone();
    let score = state.player_state(&next_id)?.score;

    let closed = std::mem::replace(
        &mut state.current_turn,
        Turn::open(&next_id, state.current_round, score),
    );
    state.history.push(closed);
    state.current_player_id = next_id;

    tracing::trace!(
        player = %state.current_player_id,
        round = state.current_round,
        "turn started"
    );
    Ok(state)
}

/// Take back the most recent throw.
///
/// With an empty open turn, the last archived turn is reopened first so a
/// single undo steps back across the turn boundary. Empty archived turns
/// (skipped players) are stepped over. No-op on a fresh match.
///
/// Cost is bounded by the run of consecutive empty turns at the end of the
/// history, at most `players.len()` per round, and never by its total length.
pub fn undo(mut state: GameState) -> Result<GameState> {
    while state.current_turn.throws.is_empty() {
        let Some(previous) = state.history.pop() else {
            return Ok(state);
        };
        state.current_player_id = previous.player_id.clone();
        state.current_round = previous.round_index;
        state.current_turn = previous;
    }

    let Some(throw) = state.current_turn.throws.pop() else {
        return Ok(state);
    };
    for effect in throw.effects.iter().rev() {
        revert_effect(&mut state, effect)?;
    }

    let score = state.player_state(&state.current_turn.player_id)?.score;
    let turn = &mut state.current_turn;
    turn.is_bust = turn.throws.iter().any(|t| t.is_bust);
    turn.end_score = if turn.is_bust { turn.start_score } else { score };

    if throw.is_win {
        state.status = GameStatus::Active;
        state.winner_id = None;
        state.ended_at = None;
    }
    if state.history.is_empty() && state.current_turn.throws.is_empty() {
        state.started_at = None;
    }

    tracing::debug!(
        player = %state.current_player_id,
        hit = %throw.hit,
        "throw undone"
    );
    Ok(state)
}

/// Rebuild a match from closed turns without re-running rule logic.
///
/// Scores come from each turn's `end_score`. Recorded throw effects, when
/// present, also restore variant stats and scores changed on other players'
/// turns. The result is positioned after the last turn, or on that turn if
/// its final throw won the match.
pub fn reconstruct_state(
    mut history: Vec<Turn>,
    config: GameConfig,
    players: &[Player],
) -> Result<GameState> {
    let mut state = init(players, config)?;
    if history.is_empty() {
        return Ok(state);
    }

    for turn in &history {
        for throw in &turn.throws {
            for effect in &throw.effects {
                apply_effect(&mut state, effect)?;
            }
        }
        state.player_state_mut(&turn.player_id)?.score = turn.end_score;
    }
    state.started_at = history
        .iter()
        .flat_map(|t| t.throws.first())
        .map(|t| t.timestamp)
        .next();

    let won = history
        .last()
        .and_then(|t| t.throws.last())
        .filter(|t| t.is_win)
        .map(|t| t.timestamp);

    let Some(last) = history.pop() else {
        return Ok(state);
    };
    if let Some(ended_at) = won {
        state.status = GameStatus::Completed;
        state.winner_id = Some(last.player_id.clone());
        state.ended_at = Some(ended_at);
        state.current_player_id = last.player_id.clone();
        state.current_round = last.round_index;
        state.current_turn = last;
        state.history = history;
        return Ok(state);
    }

    let idx = state
        .player_index(&last.player_id)
        .ok_or_else(|| EngineError::MissingPlayerState(last.player_id.clone()))?;
    let next_idx = (idx + 1) % state.players.len();
    let round = if next_idx == 0 {
        last.round_index + 1
    } else {
        last.round_index
    };
    let next_id = state.players[next_idx].id.clone();
    let score = state.player_state(&next_id)?.score;

    history.push(last);
    state.history = history;
    state.current_round = round;
    state.current_turn = Turn::open(&next_id, round, score);
    state.current_player_id = next_id;

    tracing::debug!(
        turns = state.history.len(),
        round = state.current_round,
        "match reconstructed from turn history"
    );
    Ok(state)
}

fn apply_effect(state: &mut GameState, effect: &Effect) -> Result<()> {
    let ps = state.player_state_mut(effect.player_id())?;
    match effect {
        Effect::Score { after, .. } => ps.score = *after,
        Effect::Stats { after, .. } => ps.stats = after.clone(),
    }
    Ok(())
}

fn revert_effect(state: &mut GameState, effect: &Effect) -> Result<()> {
    let ps = state.player_state_mut(effect.player_id())?;
    match effect {
        Effect::Score { before, .. } => ps.score = *before,
        Effect::Stats { before, .. } => ps.stats = before.clone(),
    }
    Ok(())
}
