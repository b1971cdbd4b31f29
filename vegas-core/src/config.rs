use crate::{Currency, Round, MAX_PLAYERS};
use serde::{Deserialize, Serialize};

const DEF_COLORED_DICE: u8 = 8;
const DEF_NEUTRAL_DICE: u8 = 4;
const DEF_MAX_ROUNDS: Round = 4;
const DEF_CASINO_THRESHOLD: Currency = 50000;

#[derive(Debug, derive_more::Display)]
pub enum ConfigError {
    NoDice,
    NoRounds,
    #[display(fmt = "{} neutral dice each is more than one casino can count", _0)]
    TooManyDice(u8),
    #[display(fmt = "Casino threshold must be positive, not {}", _0)]
    BadThreshold(Currency),
}

impl std::error::Error for ConfigError {}

/// Tunables of a match. Missing fields in a serialized config fall back to the standard rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Colored dice each player gets at the start of every round
    pub colored_dice: u8,
    /// Neutral dice each player gets at the start of every round
    pub neutral_dice: u8,
    /// The match ends after this round, or earlier if the deck runs dry
    pub max_rounds: Round,
    /// Casinos are dealt notes until their sum reaches this amount
    pub casino_threshold: Currency,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            colored_dice: DEF_COLORED_DICE,
            neutral_dice: DEF_NEUTRAL_DICE,
            max_rounds: DEF_MAX_ROUNDS,
            casino_threshold: DEF_CASINO_THRESHOLD,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.colored_dice == 0 && self.neutral_dice == 0 {
            return Err(ConfigError::NoDice);
        }
        // every player's neutral dice may end up on one casino
        if usize::from(self.neutral_dice) * MAX_PLAYERS > usize::from(u8::MAX) {
            return Err(ConfigError::TooManyDice(self.neutral_dice));
        }
        if self.max_rounds == 0 {
            return Err(ConfigError::NoRounds);
        }
        if self.casino_threshold < 1 {
            return Err(ConfigError::BadThreshold(self.casino_threshold));
        }
        Ok(())
    }

    pub fn dice_per_round(&self) -> u16 {
        u16::from(self.colored_dice) + u16::from(self.neutral_dice)
    }
}
