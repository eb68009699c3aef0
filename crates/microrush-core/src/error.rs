//! Structural error types.
//!
//! Losing a round is gameplay, not an error. These variants cover the
//! ways a session can be misconfigured or misdriven by its host.

use thiserror::Error;

/// Top-level error type for the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// No microgames are available to select from.
    #[error("microgame pool is empty")]
    EmptyPool,

    /// A microgame id was registered twice.
    #[error("microgame already registered: {0}")]
    DuplicateMicrogame(String),

    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An operation is not allowed in the current phase.
    #[error("cannot {operation} while {phase}")]
    InvalidTransition {
        /// The phase the session was in.
        phase: &'static str,
        /// The rejected operation.
        operation: &'static str,
    },
}
