//! Dart match engine: board classification, rule variants, turn/round
//! state machine, undo and replay of stored hit logs.

pub mod board;
pub mod engine;
pub mod error;
pub mod games;

pub use board::calibration::{Calibration, Point};
pub use board::geometry::classify_hit;
pub use engine::config::GameConfig;
pub use engine::machine::{add_throw, init, is_turn_complete, next_turn, reconstruct_state, undo};
pub use engine::models::{GameState, GameStatus, Hit, Player, StoredThrow, Throw, Turn};
pub use engine::scoreboard::{get_scoreboard, Scoreboard};
pub use engine::simulator::{play_hit, process_throw, replay_from_flat_throw_log};
pub use error::{EngineError, Result};
