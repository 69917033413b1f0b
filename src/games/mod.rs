pub mod cricket;
pub mod halve_it;
pub mod high_score;
pub mod killer;
pub mod round_the_clock;
pub mod shanghai;
pub mod x01;

use crate::engine::config::GameConfig;
use crate::engine::plugin::RuleVariant;

use cricket::CricketRules;
use halve_it::HalveItRules;
use high_score::HighScoreRules;
use killer::KillerRules;
use round_the_clock::RoundTheClockRules;
use shanghai::ShanghaiRules;
use x01::X01Rules;

/// Run `f` against the rule set selected by `config`.
pub fn with_variant<R>(config: &GameConfig, f: impl FnOnce(&dyn RuleVariant) -> R) -> R {
    match config {
        GameConfig::X01(c) => f(&X01Rules(c)),
        GameConfig::Cricket(c) => f(&CricketRules(c)),
        GameConfig::Killer(c) => f(&KillerRules(c)),
        GameConfig::Shanghai(c) => f(&ShanghaiRules(c)),
        GameConfig::RoundTheClock(c) => f(&RoundTheClockRules(c)),
        GameConfig::HighScore(c) => f(&HighScoreRules(c)),
        GameConfig::HalveIt(c) => f(&HalveItRules(c)),
    }
}
