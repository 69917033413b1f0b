//! Per-variant match configuration, tagged by `type`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::engine::models::BULL;
use crate::error::{EngineError, Result};
use crate::games::halve_it::HalveItTarget;

/// Variant tags accepted in the `type` field, in display order.
pub const VARIANT_TAGS: [&str; 7] = [
    "x01",
    "cricket",
    "killer",
    "shanghai",
    "round_the_clock",
    "high_score",
    "halve_it",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameConfig {
    X01(X01Config),
    Cricket(CricketConfig),
    Killer(KillerConfig),
    Shanghai(ShanghaiConfig),
    RoundTheClock(RoundTheClockConfig),
    HighScore(HighScoreConfig),
    HalveIt(HalveItConfig),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InMode {
    #[default]
    Straight,
    Double,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutMode {
    Straight,
    #[default]
    Double,
    /// Double or triple.
    Master,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct X01Config {
    #[serde(default = "default_start_score")]
    pub start_score: i32,
    #[serde(default)]
    pub in_mode: InMode,
    #[serde(default)]
    pub out_mode: OutMode,
}

fn default_start_score() -> i32 {
    501
}

impl Default for X01Config {
    fn default() -> Self {
        X01Config {
            start_score: default_start_score(),
            in_mode: InMode::default(),
            out_mode: OutMode::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CricketMode {
    #[default]
    Standard,
    CutThroat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CricketConfig {
    #[serde(default)]
    pub mode: CricketMode,
    #[serde(default = "default_cricket_numbers")]
    pub numbers: Vec<u8>,
}

fn default_cricket_numbers() -> Vec<u8> {
    vec![15, 16, 17, 18, 19, 20, BULL]
}

impl Default for CricketConfig {
    fn default() -> Self {
        CricketConfig {
            mode: CricketMode::default(),
            numbers: default_cricket_numbers(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillerConfig {
    #[serde(default = "default_lives")]
    pub lives: u32,
    /// A killer hitting their own number loses lives instead of ignoring it.
    #[serde(default)]
    pub self_suicide: bool,
    /// Numbers by seat. Spread around the board when absent.
    #[serde(default)]
    pub numbers: Option<Vec<u8>>,
}

fn default_lives() -> u32 {
    3
}

impl Default for KillerConfig {
    fn default() -> Self {
        KillerConfig {
            lives: default_lives(),
            self_suicide: false,
            numbers: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShanghaiConfig {
    #[serde(default = "default_start_number")]
    pub start_number: u8,
    #[serde(default = "default_rounds")]
    pub rounds: u32,
}

fn default_start_number() -> u8 {
    1
}

fn default_rounds() -> u32 {
    7
}

impl Default for ShanghaiConfig {
    fn default() -> Self {
        ShanghaiConfig {
            start_number: default_start_number(),
            rounds: default_rounds(),
        }
    }
}

/// Which multipliers advance the Round-the-Clock target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockMode {
    #[default]
    #[serde(alias = "single")]
    Any,
    Double,
    Triple,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTheClockConfig {
    #[serde(default)]
    pub mode: ClockMode,
    /// Last target; 25 means 1..20 then the bull.
    #[serde(default = "default_end_target")]
    pub end_target: u8,
}

fn default_end_target() -> u8 {
    BULL
}

impl Default for RoundTheClockConfig {
    fn default() -> Self {
        RoundTheClockConfig {
            mode: ClockMode::default(),
            end_target: default_end_target(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreConfig {
    #[serde(default = "default_rounds")]
    pub rounds: u32,
}

impl Default for HighScoreConfig {
    fn default() -> Self {
        HighScoreConfig {
            rounds: default_rounds(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalveItConfig {
    /// Target tokens such as "20", "D7", "T10" or "25", one per round.
    #[serde(default = "default_halve_it_targets")]
    pub targets: Vec<String>,
}

fn default_halve_it_targets() -> Vec<String> {
    ["20", "16", "D7", "14", "T10", "17", "25"]
        .iter()
        .map(|t| t.to_string())
        .collect()
}

impl Default for HalveItConfig {
    fn default() -> Self {
        HalveItConfig {
            targets: default_halve_it_targets(),
        }
    }
}

impl GameConfig {
    /// Parse a config from JSON, reporting unknown `type` tags as such
    /// rather than as a generic deserialization failure.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let tag = value
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| EngineError::InvalidConfig("missing \"type\" tag".into()))?;
        if !VARIANT_TAGS.contains(&tag) {
            return Err(EngineError::UnknownVariant(tag.to_string()));
        }
        let config: GameConfig = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn type_tag(&self) -> &'static str {
        match self {
            GameConfig::X01(_) => "x01",
            GameConfig::Cricket(_) => "cricket",
            GameConfig::Killer(_) => "killer",
            GameConfig::Shanghai(_) => "shanghai",
            GameConfig::RoundTheClock(_) => "round_the_clock",
            GameConfig::HighScore(_) => "high_score",
            GameConfig::HalveIt(_) => "halve_it",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            GameConfig::X01(c) => {
                if c.start_score < 2 {
                    return invalid(format!("x01 start_score must be at least 2, got {}", c.start_score));
                }
            }
            GameConfig::Cricket(c) => {
                if c.numbers.is_empty() {
                    return invalid("cricket needs at least one number".into());
                }
                check_board_numbers("cricket", &c.numbers, true)?;
            }
            GameConfig::Killer(c) => {
                if c.lives == 0 {
                    return invalid("killer lives must be at least 1".into());
                }
                if let Some(numbers) = &c.numbers {
                    check_board_numbers("killer", numbers, false)?;
                }
            }
            GameConfig::Shanghai(c) => {
                if !(1..=20).contains(&c.start_number) {
                    return invalid(format!("shanghai start_number {} not in 1..=20", c.start_number));
                }
            }
            GameConfig::RoundTheClock(c) => {
                if !(1..=20).contains(&c.end_target) && c.end_target != BULL {
                    return invalid(format!("round_the_clock end_target {} is not a board number", c.end_target));
                }
            }
            GameConfig::HighScore(_) => {}
            GameConfig::HalveIt(c) => {
                if c.targets.is_empty() {
                    return invalid("halve_it needs at least one target".into());
                }
                for token in &c.targets {
                    HalveItTarget::parse(token)?;
                }
            }
        }
        Ok(())
    }

    /// Configured round count for variants that end on an external round limit.
    pub fn round_limit(&self) -> Option<u32> {
        match self {
            GameConfig::Shanghai(c) => Some(c.rounds),
            GameConfig::HighScore(c) => Some(c.rounds),
            GameConfig::HalveIt(c) => Some(c.targets.len() as u32),
            _ => None,
        }
    }
}

fn invalid(msg: String) -> Result<()> {
    Err(EngineError::InvalidConfig(msg))
}

fn check_board_numbers(variant: &str, numbers: &[u8], allow_bull: bool) -> Result<()> {
    let mut seen = BTreeSet::new();
    for &n in numbers {
        let on_board = (1..=20).contains(&n) || (allow_bull && n == BULL);
        if !on_board {
            return invalid(format!("{variant} number {n} is not allowed"));
        }
        if !seen.insert(n) {
            return invalid(format!("{variant} number {n} listed twice"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_from_bare_tag() {
        let config = GameConfig::from_value(json!({"type": "x01"})).unwrap();
        assert_eq!(config, GameConfig::X01(X01Config::default()));
        if let GameConfig::X01(c) = config {
            assert_eq!(c.start_score, 501);
            assert_eq!(c.in_mode, InMode::Straight);
            assert_eq!(c.out_mode, OutMode::Double);
        }
    }

    #[test]
    fn test_unknown_variant() {
        let err = GameConfig::from_value(json!({"type": "baseball"})).unwrap_err();
        assert!(matches!(err, EngineError::UnknownVariant(t) if t == "baseball"));
    }

    #[test]
    fn test_missing_tag_is_invalid_config() {
        let err = GameConfig::from_value(json!({"start_score": 301})).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn test_variant_fields_parse() {
        let config = GameConfig::from_value(json!({
            "type": "cricket",
            "mode": "cut_throat",
            "numbers": [18, 19, 20],
        }))
        .unwrap();
        assert_eq!(
            config,
            GameConfig::Cricket(CricketConfig {
                mode: CricketMode::CutThroat,
                numbers: vec![18, 19, 20],
            })
        );
        assert_eq!(config.type_tag(), "cricket");
    }

    #[test]
    fn test_clock_mode_single_alias() {
        let config = GameConfig::from_value(json!({"type": "round_the_clock", "mode": "single"})).unwrap();
        assert!(matches!(config, GameConfig::RoundTheClock(RoundTheClockConfig { mode: ClockMode::Any, .. })));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let bad = [
            json!({"type": "x01", "start_score": 1}),
            json!({"type": "cricket", "numbers": []}),
            json!({"type": "cricket", "numbers": [20, 20]}),
            json!({"type": "cricket", "numbers": [21]}),
            json!({"type": "killer", "lives": 0}),
            json!({"type": "killer", "numbers": [25]}),
            json!({"type": "shanghai", "start_number": 0}),
            json!({"type": "round_the_clock", "end_target": 22}),
            json!({"type": "halve_it", "targets": ["Q5"]}),
        ];
        for value in bad {
            let err = GameConfig::from_value(value.clone()).unwrap_err();
            assert!(matches!(err, EngineError::InvalidConfig(_)), "{value} gave {err:?}");
        }
    }

    #[test]
    fn test_round_limit() {
        assert_eq!(GameConfig::HighScore(HighScoreConfig { rounds: 5 }).round_limit(), Some(5));
        assert_eq!(GameConfig::HalveIt(HalveItConfig::default()).round_limit(), Some(7));
        assert_eq!(GameConfig::X01(X01Config::default()).round_limit(), None);
    }
}
