//! Difficulty curve: maps the current score to a round's time budget.

use std::time::Duration;

use microrush_core::error::GameError;
use serde::{Deserialize, Serialize};

/// Stepped difficulty curve.
///
/// Every `points_per_step` points shave `step_ms` off the baseline; the
/// result never drops below `floor_ms`. A linear curve is the special case
/// `points_per_step = 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DifficultyCurve {
    /// Default round budget at score zero, in milliseconds.
    pub base_time_ms: u64,
    /// Minimum round budget, in milliseconds.
    pub floor_ms: u64,
    /// Score points per difficulty step.
    pub points_per_step: u32,
    /// Time removed per step, in milliseconds.
    pub step_ms: u64,
}

impl Default for DifficultyCurve {
    fn default() -> Self {
        Self {
            base_time_ms: 4000,
            floor_ms: 1200,
            points_per_step: 10,
            step_ms: 400,
        }
    }
}

impl DifficultyCurve {
    /// The baseline a fresh session starts from.
    #[must_use]
    pub fn base_time(&self) -> Duration {
        Duration::from_millis(self.base_time_ms)
    }

    /// The minimum round budget.
    #[must_use]
    pub fn floor(&self) -> Duration {
        Duration::from_millis(self.floor_ms)
    }

    /// Time removed from the baseline at `score`. Non-decreasing in `score`.
    #[must_use]
    pub fn reduction(&self, score: u32) -> Duration {
        let steps = u64::from(score / self.points_per_step.max(1));
        Duration::from_millis(steps.saturating_mul(self.step_ms))
    }

    /// Round budget for `score` starting from `base_time`.
    #[must_use]
    pub fn max_time(&self, base_time: Duration, score: u32) -> Duration {
        base_time
            .saturating_sub(self.reduction(score))
            .max(self.floor())
    }

    /// Checks the curve is usable.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidConfig` if the floor is zero or above the
    /// baseline, or if `points_per_step` is zero.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.floor_ms == 0 {
            return Err(GameError::InvalidConfig(
                "difficulty floor must be positive".to_owned(),
            ));
        }
        if self.floor_ms > self.base_time_ms {
            return Err(GameError::InvalidConfig(format!(
                "difficulty floor {}ms exceeds base time {}ms",
                self.floor_ms, self.base_time_ms
            )));
        }
        if self.points_per_step == 0 {
            return Err(GameError::InvalidConfig(
                "points_per_step must be positive".to_owned(),
            ));
        }
        Ok(())
    }
}
