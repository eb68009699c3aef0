//! Game configuration.

use std::time::Duration;

use microrush_core::error::GameError;
use serde::{Deserialize, Serialize};

use super::difficulty::DifficultyCurve;

/// Tunables for a session. Every field has a default, so a partial YAML
/// document only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Lives at the start of a session.
    pub initial_lives: u32,
    /// Score → round budget.
    pub difficulty: DifficultyCurve,
    /// Timer loop period, in milliseconds.
    pub tick_period_ms: u64,
    /// Pause after a win before the next round, in milliseconds.
    pub win_delay_ms: u64,
    /// Pause after a failure before the next round, in milliseconds.
    pub fail_delay_ms: u64,
    /// Length of the failure shake cue, in milliseconds.
    pub shake_ms: u64,
    /// Remaining fraction below which the timer bar turns urgent.
    pub urgency_threshold: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_lives: 4,
            difficulty: DifficultyCurve::default(),
            tick_period_ms: 16,
            win_delay_ms: 500,
            fail_delay_ms: 1000,
            shake_ms: 500,
            urgency_threshold: 0.30,
        }
    }
}

impl GameConfig {
    /// Timer loop period.
    #[must_use]
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    /// Pause after a win.
    #[must_use]
    pub fn win_delay(&self) -> Duration {
        Duration::from_millis(self.win_delay_ms)
    }

    /// Pause after a failure.
    #[must_use]
    pub fn fail_delay(&self) -> Duration {
        Duration::from_millis(self.fail_delay_ms)
    }

    /// Length of the shake cue.
    #[must_use]
    pub fn shake(&self) -> Duration {
        Duration::from_millis(self.shake_ms)
    }

    /// Checks the configuration is playable.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidConfig` describing the first problem found.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.initial_lives == 0 {
            return Err(GameError::InvalidConfig(
                "initial_lives must be positive".to_owned(),
            ));
        }
        if self.tick_period_ms == 0 {
            return Err(GameError::InvalidConfig(
                "tick_period_ms must be positive".to_owned(),
            ));
        }
        if !(0.0..=1.0).contains(&self.urgency_threshold) {
            return Err(GameError::InvalidConfig(format!(
                "urgency_threshold {} is outside 0..=1",
                self.urgency_threshold
            )));
        }
        self.difficulty.validate()
    }
}
