//! MicroRush CLI — error types.

use microrush_core::error::GameError;
use thiserror::Error;

/// Startup and runtime errors for the terminal host.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The YAML configuration file could not be parsed.
    #[error("invalid configuration file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The game rejected the configuration or an operation.
    #[error("game error: {0}")]
    Game(#[from] GameError),

    /// A console line that is not a command.
    #[error("unrecognised command: {0}")]
    Command(String),

    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_error_converts_with_context() {
        let err: AppError = GameError::EmptyPool.into();

        assert!(matches!(err, AppError::Game(GameError::EmptyPool)));
        assert!(err.to_string().starts_with("game error: "));
    }

    #[test]
    fn test_command_error_names_the_line() {
        let err = AppError::Command("jump".to_owned());

        assert_eq!(err.to_string(), "unrecognised command: jump");
    }
}
