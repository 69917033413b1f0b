//! Core match data types: hits, throws, turns and the match state.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::config::GameConfig;
use crate::error::{EngineError, Result};

pub type PlayerId = String;

/// Darts per turn. No variant uses a different count.
pub const MAX_THROWS_PER_TURN: usize = 3;

pub const BULL: u8 = 25;

/// A classified dart. `segment == 0` or `multiplier == 0` is a miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hit {
    pub segment: u8,
    pub multiplier: u8,
}

impl Hit {
    pub fn new(segment: u8, multiplier: u8) -> Result<Self> {
        let hit = Hit { segment, multiplier };
        hit.validate()?;
        Ok(hit)
    }

    pub const fn miss() -> Self {
        Hit { segment: 0, multiplier: 0 }
    }

    /// Segments 0..=20 and 25, multipliers 0..=3, no triple bull.
    pub fn validate(&self) -> Result<()> {
        let segment_ok = self.segment <= 20 || self.segment == BULL;
        let multiplier_ok = match self.segment {
            BULL => self.multiplier <= 2,
            _ => self.multiplier <= 3,
        };
        if segment_ok && multiplier_ok {
            Ok(())
        } else {
            Err(EngineError::InvalidHit {
                segment: self.segment,
                multiplier: self.multiplier,
            })
        }
    }

    pub fn is_miss(&self) -> bool {
        self.segment == 0 || self.multiplier == 0
    }

    /// Face value of the dart (segment x multiplier), 0 for a miss.
    pub fn value(&self) -> i32 {
        if self.is_miss() {
            0
        } else {
            self.segment as i32 * self.multiplier as i32
        }
    }

    pub fn is_double(&self) -> bool {
        !self.is_miss() && self.multiplier == 2
    }

    pub fn is_triple(&self) -> bool {
        !self.is_miss() && self.multiplier == 3
    }
}

impl fmt::Display for Hit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_miss() {
            return write!(f, "MISS");
        }
        match (self.segment, self.multiplier) {
            (BULL, 1) => write!(f, "SB"),
            (BULL, _) => write!(f, "DB"),
            (s, 1) => write!(f, "S{s}"),
            (s, 2) => write!(f, "D{s}"),
            (s, _) => write!(f, "T{s}"),
        }
    }
}

/// A change to one participant's state caused by a single throw.
///
/// Both sides are recorded so the engine can apply and revert effects
/// without re-running rule logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    Score {
        player_id: PlayerId,
        before: i32,
        after: i32,
    },
    Stats {
        player_id: PlayerId,
        before: PlayerStats,
        after: PlayerStats,
    },
}

impl Effect {
    pub fn score(player_id: &str, before: i32, after: i32) -> Self {
        Effect::Score {
            player_id: player_id.to_string(),
            before,
            after,
        }
    }

    pub fn stats(player_id: &str, before: PlayerStats, after: PlayerStats) -> Self {
        Effect::Stats {
            player_id: player_id.to_string(),
            before,
            after,
        }
    }

    pub fn player_id(&self) -> &str {
        match self {
            Effect::Score { player_id, .. } | Effect::Stats { player_id, .. } => player_id,
        }
    }

    pub fn score_delta(&self) -> i32 {
        match self {
            Effect::Score { before, after, .. } => after - before,
            Effect::Stats { .. } => 0,
        }
    }
}

/// One dart's outcome as judged by a rule variant. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Throw {
    pub hit: Hit,
    /// Raw scoring delta; additive or subtractive depending on the variant.
    pub points: i32,
    pub is_bust: bool,
    pub is_win: bool,
    pub is_valid: bool,
    pub timestamp: i64,
    #[serde(default)]
    pub effects: Vec<Effect>,
}

impl Throw {
    pub fn new(hit: Hit, points: i32, timestamp: i64) -> Self {
        Throw {
            hit,
            points,
            is_bust: false,
            is_win: false,
            is_valid: true,
            timestamp,
            effects: Vec::new(),
        }
    }

    /// A throw that counts for nothing, e.g. a double-in miss.
    pub fn invalid(hit: Hit, timestamp: i64) -> Self {
        Throw {
            is_valid: false,
            ..Throw::new(hit, 0, timestamp)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Player {
            id: id.into(),
            name: name.into(),
            avatar_url: None,
        }
    }
}

/// Variant-specific per-player data, owned by the match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerStats {
    X01 {
        /// False until the double-in requirement has been met.
        opened: bool,
    },
    Cricket {
        marks: BTreeMap<u8, u8>,
    },
    Killer {
        number: u8,
        lives: u32,
        is_killer: bool,
    },
    Shanghai,
    RoundTheClock {
        target: u8,
        finished: bool,
    },
    HighScore,
    HalveIt {
        halvings: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub player_id: PlayerId,
    pub score: i32,
    pub stats: PlayerStats,
}

/// One player's visit to the board: up to three throws.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub player_id: PlayerId,
    pub round_index: u32,
    pub throws: Vec<Throw>,
    pub start_score: i32,
    pub end_score: i32,
    pub is_bust: bool,
}

impl Turn {
    pub fn open(player_id: &str, round_index: u32, score: i32) -> Self {
        Turn {
            player_id: player_id.to_string(),
            round_index,
            throws: Vec::new(),
            start_score: score,
            end_score: score,
            is_bust: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Setup,
    Active,
    Completed,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub id: String,
    /// Variant tag of `config`, e.g. "x01".
    pub game_id: String,
    pub config: GameConfig,
    pub status: GameStatus,
    pub players: Vec<Player>,
    pub player_states: Vec<PlayerState>,
    pub current_round: u32,
    pub current_player_id: PlayerId,
    pub current_turn: Turn,
    pub history: Vec<Turn>,
    pub winner_id: Option<PlayerId>,
    pub started_at: Option<i64>,
    pub ended_at: Option<i64>,
}

impl GameState {
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn player_index(&self, player_id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.id == player_id)
    }

    pub fn player_state(&self, player_id: &str) -> Result<&PlayerState> {
        self.player_states
            .iter()
            .find(|ps| ps.player_id == player_id)
            .ok_or_else(|| EngineError::MissingPlayerState(player_id.to_string()))
    }

    pub fn player_state_mut(&mut self, player_id: &str) -> Result<&mut PlayerState> {
        self.player_states
            .iter_mut()
            .find(|ps| ps.player_id == player_id)
            .ok_or_else(|| EngineError::MissingPlayerState(player_id.to_string()))
    }

    pub fn current_player_state(&self) -> Result<&PlayerState> {
        self.player_state(&self.current_player_id)
    }

    /// Every player state except the thrower's, in roster order.
    pub fn opponents(&self) -> impl Iterator<Item = &PlayerState> {
        self.player_states
            .iter()
            .filter(move |ps| ps.player_id != self.current_player_id)
    }

    /// Archived turns followed by the open one.
    pub fn all_turns(&self) -> impl Iterator<Item = &Turn> {
        self.history.iter().chain(std::iter::once(&self.current_turn))
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, GameStatus::Completed | GameStatus::Aborted)
    }
}

/// A hit as persisted by the storage layer, in capture order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredThrow {
    pub player_id: PlayerId,
    pub round_index: u32,
    /// 1-based position within the turn.
    pub throw_index: u8,
    pub segment: u8,
    pub multiplier: u8,
    pub timestamp_ms: i64,
    /// Explicit end-of-turn marker for turns closed with fewer than three darts.
    #[serde(default)]
    pub turn_closed: bool,
}

impl StoredThrow {
    pub fn hit(&self) -> Result<Hit> {
        Hit::new(self.segment, self.multiplier)
    }
}
