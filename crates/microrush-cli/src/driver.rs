//! Real-time driver: feeds console commands and elapsed wall time into the
//! orchestrator and writes what the HUD shows.

use std::sync::Arc;
use std::time::Duration;

use microrush_core::clock::{Clock, SystemClock};
use microrush_core::rng::{DeterministicRng, SeededRng};
use microrush_microgames::catalog;
use microrush_orchestrator::application::orchestrator::Orchestrator;
use microrush_orchestrator::domain::pool::MicrogamePool;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::console::{ConsoleHud, TextPlayField};
use crate::error::AppError;
use crate::input::{Command, parse_command};

/// How often the driver advances game time.
pub const FRAME_PERIOD: Duration = Duration::from_millis(16);

/// Whether the driver keeps running after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading commands.
    Continue,
    /// Stop.
    Quit,
}

/// Console host around one orchestrator.
#[derive(Debug)]
pub struct Driver {
    orchestrator: Orchestrator<ConsoleHud, TextPlayField>,
    output: Vec<String>,
}

impl Driver {
    /// Builds a driver over the bundled catalog, seeded from `config`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Game` if the orchestrator rejects the config or
    /// autostart fails.
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let rng: Box<dyn DeterministicRng> = match config.seed {
            Some(seed) => Box::new(SeededRng::from_seed(seed)),
            None => Box::new(SeededRng::from_entropy()),
        };
        Self::with_rng(config, rng)
    }

    /// Builds a driver with an explicit RNG.
    ///
    /// # Errors
    ///
    /// See [`Driver::new`].
    pub fn with_rng(config: &AppConfig, rng: Box<dyn DeterministicRng>) -> Result<Self, AppError> {
        let pool = MicrogamePool::from_descriptors(catalog())?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let orchestrator = Orchestrator::new(
            config.game.clone(),
            pool,
            ConsoleHud::new(),
            TextPlayField::new(),
            rng,
            clock,
        )?;
        info!(
            session_id = %orchestrator.session_id(),
            microgames = orchestrator.pool().len(),
            seed = ?config.seed,
            "driver ready"
        );

        let mut driver = Self {
            orchestrator,
            output: Vec::new(),
        };
        if config.autostart {
            driver.orchestrator.start_game()?;
        }
        Ok(driver)
    }

    /// The orchestrator being driven.
    #[must_use]
    pub fn orchestrator(&self) -> &Orchestrator<ConsoleHud, TextPlayField> {
        &self.orchestrator
    }

    /// Parses and runs one console line. Unknown lines are reported on the
    /// output and otherwise ignored.
    pub fn handle_line(&mut self, line: &str) -> Flow {
        match parse_command(line) {
            Ok(command) => self.execute(command),
            Err(err) => {
                self.output.push(format!("?? {err}"));
                Flow::Continue
            }
        }
    }

    /// Runs one command. Rejected operations are reported on the output.
    pub fn execute(&mut self, command: Command) -> Flow {
        let result = match command {
            Command::Start => self.orchestrator.start_game(),
            Command::Restart => self.orchestrator.reset_game(),
            Command::Status => {
                self.push_status();
                Ok(())
            }
            Command::Look => {
                let lines = self.orchestrator.field().describe();
                self.output.extend(lines);
                Ok(())
            }
            Command::Quit => return Flow::Quit,
            Command::Input(event) => {
                self.orchestrator.route_input(&event);
                Ok(())
            }
        };
        if let Err(err) = result {
            warn!(%err, "command rejected");
            self.output.push(format!("?? {err}"));
        }
        Flow::Continue
    }

    /// Moves game time forward.
    ///
    /// # Errors
    ///
    /// Propagates `GameError` from the orchestrator.
    pub fn advance(&mut self, elapsed: Duration) -> Result<(), AppError> {
        self.orchestrator.advance(elapsed)?;
        Ok(())
    }

    /// Takes everything to print, and logs the journal entries recorded
    /// since the last call.
    pub fn take_output(&mut self) -> Vec<String> {
        for event in self.orchestrator.drain_events() {
            match serde_json::to_string(&event) {
                Ok(json) => debug!(event_type = event.event_type(), %json, "game event"),
                Err(err) => warn!(%err, "could not serialise game event"),
            }
        }
        let mut lines = self.orchestrator.hud_mut().take_lines();
        lines.append(&mut self.output);
        lines
    }

    /// Runs until `quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if reading or writing fails, or
    /// `AppError::Game` if advancing the game fails.
    pub async fn run<R, W>(mut self, input: R, mut output: W) -> Result<(), AppError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        let mut frames = tokio::time::interval(FRAME_PERIOD);
        frames.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = Instant::now();
        self.flush(&mut output).await?;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        debug!("input closed");
                        break;
                    };
                    if self.handle_line(&line) == Flow::Quit {
                        break;
                    }
                }
                now = frames.tick() => {
                    self.advance(now.saturating_duration_since(last))?;
                    last = now;
                }
            }
            self.flush(&mut output).await?;
        }

        self.flush(&mut output).await?;
        info!(
            score = self.orchestrator.session().score(),
            phase = %self.orchestrator.phase(),
            "driver stopped"
        );
        Ok(())
    }

    fn push_status(&mut self) {
        match serde_json::to_string(&self.orchestrator.snapshot()) {
            Ok(json) => self.output.push(json),
            Err(err) => warn!(%err, "could not serialise snapshot"),
        }
    }

    async fn flush<W>(&mut self, output: &mut W) -> Result<(), AppError>
    where
        W: AsyncWrite + Unpin,
    {
        let lines = self.take_output();
        if lines.is_empty() {
            return Ok(());
        }
        let mut text = lines.join("\n");
        text.push('\n');
        output.write_all(text.as_bytes()).await?;
        output.flush().await?;
        Ok(())
    }
}
