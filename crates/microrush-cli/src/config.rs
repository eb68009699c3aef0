//! Host configuration from the environment.

use std::path::Path;

use microrush_orchestrator::domain::config::GameConfig;

use crate::error::AppError;

/// Path to a YAML file with `GameConfig` overrides.
pub const CONFIG_PATH_VAR: &str = "MICRORUSH_CONFIG";

/// Seed for a reproducible session.
pub const SEED_VAR: &str = "MICRORUSH_SEED";

/// Start playing without waiting for `start`.
pub const AUTOSTART_VAR: &str = "MICRORUSH_AUTOSTART";

/// Everything the host needs to start.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppConfig {
    /// Game tunables.
    pub game: GameConfig,
    /// RNG seed; `None` seeds from the operating system.
    pub seed: Option<u64>,
    /// Start the first game immediately.
    pub autostart: bool,
}

impl AppConfig {
    /// Reads the process environment.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_lookup`].
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for a malformed seed or flag,
    /// `AppError::Io`/`AppError::Yaml` if the config file cannot be read or
    /// parsed, and `AppError::Game` if the resulting config is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let game = match lookup(CONFIG_PATH_VAR) {
            Some(path) => load_game_config(Path::new(&path))?,
            None => GameConfig::default(),
        };
        game.validate()?;

        let seed = lookup(SEED_VAR)
            .map(|raw| {
                raw.trim().parse::<u64>().map_err(|e| {
                    AppError::Config(format!("{SEED_VAR} must be an unsigned integer: {e}"))
                })
            })
            .transpose()?;

        let autostart = lookup(AUTOSTART_VAR)
            .map(|raw| parse_flag(AUTOSTART_VAR, &raw))
            .transpose()?
            .unwrap_or(false);

        Ok(Self {
            game,
            seed,
            autostart,
        })
    }
}

/// Reads a `GameConfig` from a YAML file.
///
/// # Errors
///
/// Returns `AppError::Io` if the file cannot be read, or `AppError::Yaml`
/// if it is not a valid config document.
pub fn load_game_config(path: &Path) -> Result<GameConfig, AppError> {
    let raw = std::fs::read_to_string(path)?;
    parse_game_config(&raw)
}

/// Parses a `GameConfig` from YAML. Missing fields keep their defaults.
///
/// # Errors
///
/// Returns `AppError::Yaml` on malformed YAML or unknown fields.
pub fn parse_game_config(raw: &str) -> Result<GameConfig, AppError> {
    Ok(serde_yaml::from_str(raw)?)
}

fn parse_flag(name: &str, raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(AppError::Config(format!(
            "{name} must be a boolean, got {other:?}"
        ))),
    }
}
