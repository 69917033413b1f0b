//! Error type shared by the board, engine and rule variants.
//!
//! Only invalid input and corrupted state are errors. Busts, invalid throws
//! and halving are ordinary `Throw` outcomes.

use thiserror::Error;

use crate::engine::models::PlayerId;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("a match needs at least one player")]
    EmptyRoster,

    #[error("player id {0} appears more than once in the roster")]
    DuplicatePlayer(PlayerId),

    #[error("unknown game variant: {0}")]
    UnknownVariant(String),

    #[error("hit out of range: segment {segment}, multiplier {multiplier}")]
    InvalidHit { segment: u8, multiplier: u8 },

    #[error("no player state for player {0}")]
    MissingPlayerState(PlayerId),

    #[error("invalid game config: {0}")]
    InvalidConfig(String),

    #[error("invalid calibration: {0}")]
    InvalidCalibration(String),

    #[error("invalid stored throw: {0}")]
    InvalidStoredThrow(String),

    #[error("turn for player {0} is closed")]
    TurnClosed(PlayerId),

    #[error("match is already finished")]
    MatchFinished,

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
