pub mod arena;
pub mod config;
pub mod machine;
pub mod models;
pub mod plugin;
pub mod presets;
pub mod scoreboard;
pub mod simulator;
