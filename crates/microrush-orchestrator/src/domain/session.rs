//! Session state: lives, score and the round timer.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::config::GameConfig;

/// Orchestrator state machine phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Before the first start.
    Idle,
    /// A round is running.
    Active,
    /// Showing win/fail feedback before the next round.
    Resolving,
    /// Lives ran out.
    GameOver,
}

impl GamePhase {
    /// Stable name of the phase.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Active => "active",
            Self::Resolving => "resolving",
            Self::GameOver => "game_over",
        }
    }

    /// Whether a session is running (a round is live or about to be).
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Active | Self::Resolving)
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mutable state of one play session.
///
/// Only the orchestrator mutates a session. `lives` only goes down and
/// `score` only goes up until [`Session::reset`]; `timer` only goes down
/// within a round.
///
/// `is_active` means a session is running, not that a round is live. It
/// stays `true` through the win/fail feedback delay, when no microgame
/// handle exists; only game over clears it. Use [`GamePhase::Active`] to
/// know whether a handle is live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    lives: u32,
    score: u32,
    base_time: Duration,
    max_time: Duration,
    timer: Duration,
    is_active: bool,
}

impl Session {
    /// Creates a session with the configured starting values.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        let base_time = config.difficulty.base_time();
        Self {
            lives: config.initial_lives,
            score: 0,
            base_time,
            max_time: base_time,
            timer: Duration::ZERO,
            is_active: false,
        }
    }

    /// Restores lives, score and the difficulty baseline.
    pub fn reset(&mut self, config: &GameConfig) {
        *self = Self::new(config);
    }

    /// Remaining lives.
    #[must_use]
    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// Rounds won.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Difficulty baseline.
    #[must_use]
    pub fn base_time(&self) -> Duration {
        self.base_time
    }

    /// Budget of the current round.
    #[must_use]
    pub fn max_time(&self) -> Duration {
        self.max_time
    }

    /// Time left in the current round.
    #[must_use]
    pub fn timer(&self) -> Duration {
        self.timer
    }

    /// Whether a session is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Remaining fraction of the round, `0.0..=1.0`.
    #[must_use]
    pub fn timer_fraction(&self) -> f64 {
        if self.max_time.is_zero() {
            return 0.0;
        }
        self.timer.as_secs_f64() / self.max_time.as_secs_f64()
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    pub(crate) fn begin_round(&mut self, max_time: Duration) {
        self.max_time = max_time;
        self.timer = max_time;
    }

    /// Counts the timer down by `period`, returning what is left.
    pub(crate) fn count_down(&mut self, period: Duration) -> Duration {
        self.timer = self.timer.saturating_sub(period);
        self.timer
    }

    pub(crate) fn award_point(&mut self) -> u32 {
        self.score = self.score.saturating_add(1);
        self.score
    }

    pub(crate) fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_uses_config_defaults() {
        let session = Session::new(&GameConfig::default());

        assert_eq!(session.lives(), 4);
        assert_eq!(session.score(), 0);
        assert_eq!(session.base_time(), Duration::from_millis(4000));
        assert!(!session.is_active());
    }

    #[test]
    fn test_count_down_saturates_at_zero() {
        let mut session = Session::new(&GameConfig::default());
        session.begin_round(Duration::from_millis(20));

        assert_eq!(session.count_down(Duration::from_millis(16)), Duration::from_millis(4));
        assert_eq!(session.count_down(Duration::from_millis(16)), Duration::ZERO);
        assert_eq!(session.count_down(Duration::from_millis(16)), Duration::ZERO);
    }

    #[test]
    fn test_lose_life_never_underflows() {
        let config = GameConfig {
            initial_lives: 1,
            ..GameConfig::default()
        };
        let mut session = Session::new(&config);

        assert_eq!(session.lose_life(), 0);
        assert_eq!(session.lose_life(), 0);
    }

    #[test]
    fn test_reset_restores_lives_and_score() {
        let config = GameConfig::default();
        let mut session = Session::new(&config);
        session.set_active(true);
        session.lose_life();
        session.award_point();
        session.award_point();

        session.reset(&config);

        assert_eq!(session.lives(), 4);
        assert_eq!(session.score(), 0);
        assert!(!session.is_active());
    }

    #[test]
    fn test_timer_fraction_tracks_countdown() {
        let mut session = Session::new(&GameConfig::default());
        session.begin_round(Duration::from_millis(4000));
        session.count_down(Duration::from_millis(1000));

        assert!((session.timer_fraction() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_phase_running_flags() {
        assert!(!GamePhase::Idle.is_running());
        assert!(GamePhase::Active.is_running());
        assert!(GamePhase::Resolving.is_running());
        assert!(!GamePhase::GameOver.is_running());
    }
}
