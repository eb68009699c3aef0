//! Session journal events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::microgame::RoundId;

/// Metadata attached to every game event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Type name, one of the `*_EVENT_TYPE` constants.
    pub event_type: String,
    /// Session this event belongs to.
    pub session_id: Uuid,
    /// Round the event refers to (the last started round for session events).
    pub round: RoundId,
    /// Wall-clock timestamp of the event.
    pub occurred_at: DateTime<Utc>,
}

/// Why a round was lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailCause {
    /// The microgame reported a wrong answer.
    Explicit,
    /// The timer ran out before the microgame resolved.
    Timeout,
}

/// Event type identifier for [`GameEventKind::GameStarted`].
pub const GAME_STARTED_EVENT_TYPE: &str = "microrush.game_started";

/// Event type identifier for [`GameEventKind::RoundStarted`].
pub const ROUND_STARTED_EVENT_TYPE: &str = "microrush.round_started";

/// Event type identifier for [`GameEventKind::RoundWon`].
pub const ROUND_WON_EVENT_TYPE: &str = "microrush.round_won";

/// Event type identifier for [`GameEventKind::RoundFailed`].
pub const ROUND_FAILED_EVENT_TYPE: &str = "microrush.round_failed";

/// Event type identifier for [`GameEventKind::GameOver`].
pub const GAME_OVER_EVENT_TYPE: &str = "microrush.game_over";

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEventKind {
    /// A session started (or restarted).
    GameStarted {
        /// Lives at start.
        lives: u32,
        /// Score at start.
        score: u32,
    },
    /// A microgame was selected and set up.
    RoundStarted {
        /// The selected microgame.
        microgame_id: String,
        /// Time budget of the round in milliseconds.
        max_time_ms: u64,
    },
    /// The microgame was beaten.
    RoundWon {
        /// The microgame that was beaten.
        microgame_id: String,
        /// Score after the win.
        score: u32,
    },
    /// The round was lost.
    RoundFailed {
        /// The microgame that was lost.
        microgame_id: String,
        /// Explicit failure or timeout.
        cause: FailCause,
        /// Lives after the loss.
        lives: u32,
    },
    /// Lives ran out.
    GameOver {
        /// Final score.
        final_score: u32,
    },
}

impl GameEventKind {
    /// The event type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::GameStarted { .. } => GAME_STARTED_EVENT_TYPE,
            Self::RoundStarted { .. } => ROUND_STARTED_EVENT_TYPE,
            Self::RoundWon { .. } => ROUND_WON_EVENT_TYPE,
            Self::RoundFailed { .. } => ROUND_FAILED_EVENT_TYPE,
            Self::GameOver { .. } => GAME_OVER_EVENT_TYPE,
        }
    }
}

/// Journal entry: metadata plus payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: GameEventKind,
}

impl GameEvent {
    /// Builds an event, filling the metadata's type from the payload.
    #[must_use]
    pub fn new(
        session_id: Uuid,
        round: RoundId,
        occurred_at: DateTime<Utc>,
        kind: GameEventKind,
    ) -> Self {
        Self {
            metadata: EventMetadata {
                event_id: Uuid::now_v7(),
                event_type: kind.event_type().to_owned(),
                session_id,
                round,
                occurred_at,
            },
            kind,
        }
    }

    /// The event type name.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_event_copies_type_into_metadata() {
        let session_id = Uuid::new_v4();
        let at = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();

        let event = GameEvent::new(
            session_id,
            RoundId(2),
            at,
            GameEventKind::RoundFailed {
                microgame_id: "xray".to_owned(),
                cause: FailCause::Timeout,
                lives: 3,
            },
        );

        assert_eq!(event.event_type(), "microrush.round_failed");
        assert_eq!(event.metadata.event_type, "microrush.round_failed");
        assert_eq!(event.metadata.session_id, session_id);
        assert_eq!(event.metadata.round, RoundId(2));
        assert_eq!(event.metadata.occurred_at, at);
    }

    #[test]
    fn test_event_kind_serializes_with_type_tag() {
        let kind = GameEventKind::RoundFailed {
            microgame_id: "beach".to_owned(),
            cause: FailCause::Timeout,
            lives: 3,
        };

        let json = serde_json::to_value(&kind).unwrap();

        assert_eq!(json["type"], "round_failed");
        assert_eq!(json["cause"], "timeout");
        assert_eq!(json["lives"], 3);
    }
}
