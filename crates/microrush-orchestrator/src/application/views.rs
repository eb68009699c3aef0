//! Read-only views of orchestrator state.

use microrush_core::microgame::RoundId;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::session::GamePhase;

/// Serialisable snapshot of a session, for hosts and logs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    /// The session identifier.
    pub session_id: Uuid,
    /// State machine phase.
    pub phase: GamePhase,
    /// Remaining lives.
    pub lives: u32,
    /// Rounds won.
    pub score: u32,
    /// Time left in the round, in milliseconds.
    pub timer_ms: u64,
    /// Budget of the round, in milliseconds.
    pub max_time_ms: u64,
    /// Whether a session is running.
    pub is_active: bool,
    /// The live round, if any.
    pub round: Option<RoundId>,
    /// The live microgame, if any.
    pub microgame_id: Option<String>,
    /// Virtual time since the orchestrator was created, in milliseconds.
    pub elapsed_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_view_serializes_phase_and_round() {
        let view = SessionView {
            session_id: Uuid::nil(),
            phase: GamePhase::GameOver,
            lives: 0,
            score: 12,
            timer_ms: 0,
            max_time_ms: 3600,
            is_active: false,
            round: Some(RoundId(16)),
            microgame_id: None,
            elapsed_ms: 70_500,
        };

        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["phase"], "game_over");
        assert_eq!(json["round"], 16);
        assert_eq!(json["microgame_id"], serde_json::Value::Null);
        assert_eq!(json["session_id"], "00000000-0000-0000-0000-000000000000");
    }
}
