//! The game orchestrator.
//!
//! Owns the session, the HUD and the play field; selects and sets up
//! microgames; runs the round timer; and turns wins, failures and timeouts
//! into state transitions. Time only moves when the host calls
//! [`Orchestrator::advance`].
//!
//! Two sources re-enter the orchestrator in no particular order: timer ticks
//! and microgame callbacks. Resolution is therefore guarded: once a round is
//! torn down, every later win/fail for it is a silent no-op.

use std::sync::Arc;
use std::time::Duration;

use microrush_core::clock::Clock;
use microrush_core::error::GameError;
use microrush_core::event::{FailCause, GameEvent, GameEventKind};
use microrush_core::microgame::{
    InputEvent, MicrogameHandle, RoundContext, RoundId, RoundLink, RoundRequest,
};
use microrush_core::rng::DeterministicRng;
use microrush_core::surface::{Hud, PlayField, Screen, TimerBar, Tone};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::scheduler::{ScheduledTask, Scheduler, Task, TaskId};
use super::views::SessionView;
use crate::domain::config::GameConfig;
use crate::domain::pool::MicrogamePool;
use crate::domain::session::{GamePhase, Session};

/// Instruction shown after a win.
pub const WIN_FEEDBACK: &str = "¡BIEN!";

/// Instruction shown after a failure.
pub const FAIL_FEEDBACK: &str = "¡FALLO!";

/// Interval between microgame animation frames.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// How a round ended, for resolutions arriving from outside a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The microgame was beaten.
    Win,
    /// The microgame was lost.
    Fail,
}

/// The round currently being played.
struct LiveRound {
    id: RoundId,
    microgame_id: String,
    handle: Box<dyn MicrogameHandle>,
}

/// What remains of a round after teardown.
struct ResolvedRound {
    id: RoundId,
    microgame_id: String,
}

/// The microgame rush state machine.
pub struct Orchestrator<H, P> {
    config: GameConfig,
    pool: MicrogamePool,
    session: Session,
    phase: GamePhase,
    hud: H,
    field: P,
    rng: Box<dyn DeterministicRng>,
    clock: Arc<dyn Clock>,
    scheduler: Scheduler,
    round: Option<LiveRound>,
    generation: u64,
    last_selected: Option<String>,
    tick_task: Option<TaskId>,
    session_id: Uuid,
    journal: Vec<GameEvent>,
}

impl<H: Hud, P: PlayField> Orchestrator<H, P> {
    /// Creates an idle orchestrator showing the start screen.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidConfig` if `config` fails validation, or
    /// `GameError::EmptyPool` if `pool` has no microgames.
    pub fn new(
        config: GameConfig,
        pool: MicrogamePool,
        hud: H,
        field: P,
        rng: Box<dyn DeterministicRng>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, GameError> {
        config.validate()?;
        if pool.is_empty() {
            return Err(GameError::EmptyPool);
        }

        let session = Session::new(&config);
        let mut orchestrator = Self {
            config,
            pool,
            session,
            phase: GamePhase::Idle,
            hud,
            field,
            rng,
            clock,
            scheduler: Scheduler::new(),
            round: None,
            generation: 0,
            last_selected: None,
            tick_task: None,
            session_id: Uuid::new_v4(),
            journal: Vec::new(),
        };
        orchestrator.hud.render_lives(orchestrator.session.lives());
        orchestrator.hud.render_score(orchestrator.session.score());
        orchestrator.switch_screen(Screen::Start);
        Ok(orchestrator)
    }

    /// Starts playing with the current lives and score.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidTransition` if a session is already
    /// running.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub fn start_game(&mut self) -> Result<(), GameError> {
        if self.phase.is_running() {
            warn!(phase = %self.phase, "start rejected: session already running");
            return Err(GameError::InvalidTransition {
                phase: self.phase.name(),
                operation: "start a game",
            });
        }

        self.session.set_active(true);
        self.switch_screen(Screen::Game);
        self.record(GameEventKind::GameStarted {
            lives: self.session.lives(),
            score: self.session.score(),
        });
        info!(
            lives = self.session.lives(),
            score = self.session.score(),
            "game started"
        );
        self.next_microgame()
    }

    /// Restores lives, score and the difficulty baseline, then starts a new
    /// game. Valid from any phase.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Orchestrator::start_game`].
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub fn reset_game(&mut self) -> Result<(), GameError> {
        self.teardown_round();
        self.scheduler.clear();
        self.tick_task = None;
        self.phase = GamePhase::Idle;

        self.session.reset(&self.config);
        self.hud.render_lives(self.session.lives());
        self.hud.render_score(self.session.score());
        info!("game reset");

        self.start_game()
    }

    /// Resolves the current round as won. No-op unless a round is live.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub fn on_win(&mut self) {
        if !self.has_live_round() {
            debug!(phase = %self.phase, "ignoring win: no live round");
            return;
        }
        self.resolve_win();
    }

    /// Resolves the current round as failed. No-op unless a round is live.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub fn on_fail(&mut self) {
        if !self.has_live_round() {
            debug!(phase = %self.phase, "ignoring fail: no live round");
            return;
        }
        self.resolve_fail(FailCause::Explicit);
    }

    /// Resolves `round`, if it is still the live round.
    ///
    /// Hosts use this for resolutions that arrive after the callback that
    /// produced them returned; a stale `round` is discarded.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub fn resolve(&mut self, round: RoundId, outcome: Outcome) {
        if !self.is_live(round) {
            debug!(%round, ?outcome, "discarding resolution for a resolved round");
            return;
        }
        match outcome {
            Outcome::Win => self.resolve_win(),
            Outcome::Fail => self.resolve_fail(FailCause::Explicit),
        }
    }

    /// Forwards `event` to the live microgame's input capability. Dropped
    /// silently when no round is live or the microgame takes no input.
    pub fn route_input(&mut self, event: &InputEvent) {
        if self.phase != GamePhase::Active {
            return;
        }
        let Some(live) = self.round.as_mut() else {
            return;
        };
        let round = live.id;
        let mut link = RoundLink::new(round);
        {
            let Some(handler) = live.handle.input_handler() else {
                return;
            };
            let mut ctx = RoundContext::new(
                &mut self.field,
                self.rng.as_mut(),
                &mut link,
                self.session.score(),
            );
            handler.on_input(event, &mut ctx);
        }
        self.apply_requests(round, link.drain());
    }

    /// Moves virtual time forward by `elapsed`, running every task that
    /// falls due, in order.
    ///
    /// # Errors
    ///
    /// Propagates `GameError` from starting the next round.
    pub fn advance(&mut self, elapsed: Duration) -> Result<(), GameError> {
        let deadline = self.scheduler.now().saturating_add(elapsed);
        while let Some(task) = self.scheduler.pop_due(deadline) {
            self.run_task(task)?;
        }
        self.scheduler.advance_to(deadline);
        Ok(())
    }

    /// Shows exactly one screen.
    pub fn switch_screen(&mut self, screen: Screen) {
        for other in Screen::ALL {
            self.hud.set_screen_visible(other, false);
        }
        self.hud.set_screen_visible(screen, true);
    }

    /// Takes the journal entries recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.journal)
    }

    /// Read-only view of the session.
    #[must_use]
    pub fn snapshot(&self) -> SessionView {
        SessionView {
            session_id: self.session_id,
            phase: self.phase,
            lives: self.session.lives(),
            score: self.session.score(),
            timer_ms: millis(self.session.timer()),
            max_time_ms: millis(self.session.max_time()),
            is_active: self.session.is_active(),
            round: self.round.as_ref().map(|r| r.id),
            microgame_id: self.round.as_ref().map(|r| r.microgame_id.clone()),
            elapsed_ms: millis(self.scheduler.now()),
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Session state.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Session identifier stamped on journal events.
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// The live round, if any.
    #[must_use]
    pub fn current_round(&self) -> Option<RoundId> {
        self.round.as_ref().map(|r| r.id)
    }

    /// Id of the live microgame, if any.
    #[must_use]
    pub fn current_microgame(&self) -> Option<&str> {
        self.round.as_ref().map(|r| r.microgame_id.as_str())
    }

    /// Virtual time elapsed since construction.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Number of tasks waiting in the scheduler.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending()
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Registered microgames.
    #[must_use]
    pub fn pool(&self) -> &MicrogamePool {
        &self.pool
    }

    /// The HUD.
    #[must_use]
    pub fn hud(&self) -> &H {
        &self.hud
    }

    /// The HUD, for hosts that buffer what was written to it.
    pub fn hud_mut(&mut self) -> &mut H {
        &mut self.hud
    }

    /// The play field.
    #[must_use]
    pub fn field(&self) -> &P {
        &self.field
    }

    fn has_live_round(&self) -> bool {
        self.phase == GamePhase::Active && self.round.is_some()
    }

    fn is_live(&self, round: RoundId) -> bool {
        self.phase == GamePhase::Active && self.round.as_ref().is_some_and(|r| r.id == round)
    }

    fn next_microgame(&mut self) -> Result<(), GameError> {
        if self.session.lives() == 0 {
            self.game_over();
            return Ok(());
        }

        self.cancel_tick();
        self.teardown_round();
        self.field.clear();

        let max_time = self
            .config
            .difficulty
            .max_time(self.session.base_time(), self.session.score());
        self.session.begin_round(max_time);

        let descriptor = self
            .pool
            .select(self.last_selected.as_deref(), self.rng.as_mut())?
            .clone();
        self.generation += 1;
        let round = RoundId(self.generation);
        self.last_selected = Some(descriptor.id().to_owned());
        self.phase = GamePhase::Active;
        self.hud.set_instruction(descriptor.instruction(), Tone::Neutral);

        let mut link = RoundLink::new(round);
        let handle = {
            let mut ctx = RoundContext::new(
                &mut self.field,
                self.rng.as_mut(),
                &mut link,
                self.session.score(),
            );
            descriptor.instantiate(&mut ctx)
        };
        self.round = Some(LiveRound {
            id: round,
            microgame_id: descriptor.id().to_owned(),
            handle,
        });

        self.render_timer();
        self.tick_task = Some(
            self.scheduler
                .schedule_in(self.config.tick_period(), round, Task::Tick),
        );
        self.record(GameEventKind::RoundStarted {
            microgame_id: descriptor.id().to_owned(),
            max_time_ms: millis(max_time),
        });
        info!(
            %round,
            microgame = descriptor.id(),
            max_time_ms = millis(max_time),
            "round started"
        );

        self.apply_requests(round, link.drain());
        Ok(())
    }

    fn tick(&mut self, round: RoundId) {
        if !self.is_live(round) {
            debug!(%round, "dropping stale tick");
            return;
        }
        self.tick_task = None;
        let remaining = self.session.count_down(self.config.tick_period());
        self.render_timer();

        if remaining.is_zero() {
            info!(%round, "round timed out");
            self.resolve_fail(FailCause::Timeout);
        } else {
            self.tick_task = Some(
                self.scheduler
                    .schedule_in(self.config.tick_period(), round, Task::Tick),
            );
        }
    }

    fn resolve_win(&mut self) {
        let Some(resolved) = self.teardown_round() else {
            return;
        };
        let score = self.session.award_point();
        self.hud.render_score(score);
        self.hud.set_instruction(WIN_FEEDBACK, Tone::Success);
        self.phase = GamePhase::Resolving;
        self.scheduler
            .schedule_in(self.config.win_delay(), resolved.id, Task::NextRound);

        self.record(GameEventKind::RoundWon {
            microgame_id: resolved.microgame_id.clone(),
            score,
        });
        info!(round = %resolved.id, microgame = %resolved.microgame_id, score, "round won");
    }

    fn resolve_fail(&mut self, cause: FailCause) {
        let Some(resolved) = self.teardown_round() else {
            return;
        };
        let lives = self.session.lose_life();
        self.hud.render_lives(lives);
        self.hud.set_instruction(FAIL_FEEDBACK, Tone::Failure);
        self.hud.shake(self.config.shake());
        self.phase = GamePhase::Resolving;

        let follow_up = if lives > 0 {
            Task::NextRound
        } else {
            Task::GameOver
        };
        self.scheduler
            .schedule_in(self.config.fail_delay(), resolved.id, follow_up);

        self.record(GameEventKind::RoundFailed {
            microgame_id: resolved.microgame_id.clone(),
            cause,
            lives,
        });
        info!(
            round = %resolved.id,
            microgame = %resolved.microgame_id,
            ?cause,
            lives,
            "round failed"
        );
    }

    fn game_over(&mut self) {
        self.session.set_active(false);
        self.teardown_round();
        self.scheduler.clear();
        self.tick_task = None;
        self.phase = GamePhase::GameOver;

        let final_score = self.session.score();
        self.hud.render_final_score(final_score);
        self.switch_screen(Screen::GameOver);
        self.record(GameEventKind::GameOver { final_score });
        info!(final_score, "game over");
    }

    /// Cleans up the live microgame and cancels all of its scheduled work.
    fn teardown_round(&mut self) -> Option<ResolvedRound> {
        let mut live = self.round.take()?;
        self.cancel_tick();
        let cancelled = self.scheduler.cancel_round(live.id);
        live.handle.cleanup();
        debug!(round = %live.id, cancelled, "round torn down");
        Some(ResolvedRound {
            id: live.id,
            microgame_id: live.microgame_id,
        })
    }

    fn cancel_tick(&mut self) {
        if let Some(id) = self.tick_task.take() {
            self.scheduler.cancel(id);
        }
    }

    fn render_timer(&mut self) {
        let fill = self.session.timer_fraction();
        self.hud.render_timer(TimerBar {
            fill,
            urgent: fill < self.config.urgency_threshold,
        });
    }

    fn run_task(&mut self, task: ScheduledTask) -> Result<(), GameError> {
        match task.task {
            Task::Tick => self.tick(task.round),
            Task::NextRound => {
                if self.awaiting_transition(task.round) {
                    self.next_microgame()?;
                }
            }
            Task::GameOver => {
                if self.awaiting_transition(task.round) {
                    self.game_over();
                }
            }
            Task::MicrogameTimer(tag) => {
                self.dispatch(task.round, |handle, ctx| handle.on_timer(tag, ctx));
            }
            Task::MicrogameFrame => {
                self.dispatch(task.round, |handle, ctx| handle.on_frame(ctx));
            }
        }
        Ok(())
    }

    fn awaiting_transition(&self, round: RoundId) -> bool {
        self.phase == GamePhase::Resolving && self.generation == round.0
    }

    /// Calls into the live microgame and applies what it asked for.
    fn dispatch<F>(&mut self, round: RoundId, call: F)
    where
        F: FnOnce(&mut dyn MicrogameHandle, &mut RoundContext<'_>),
    {
        if !self.is_live(round) {
            debug!(%round, "dropping stale microgame callback");
            return;
        }
        let Some(live) = self.round.as_mut() else {
            return;
        };
        let mut link = RoundLink::new(round);
        {
            let mut ctx = RoundContext::new(
                &mut self.field,
                self.rng.as_mut(),
                &mut link,
                self.session.score(),
            );
            let handle: &mut dyn MicrogameHandle = live.handle.as_mut();
            call(handle, &mut ctx);
        }
        self.apply_requests(round, link.drain());
    }

    fn apply_requests(&mut self, round: RoundId, requests: Vec<RoundRequest>) {
        for request in requests {
            if !self.is_live(round) {
                debug!(%round, ?request, "discarding request from a resolved round");
                continue;
            }
            match request {
                RoundRequest::Win => self.resolve_win(),
                RoundRequest::Fail => self.resolve_fail(FailCause::Explicit),
                RoundRequest::Schedule { delay, tag } => {
                    self.scheduler
                        .schedule_in(delay, round, Task::MicrogameTimer(tag));
                }
                RoundRequest::Cancel(tag) => {
                    self.scheduler
                        .cancel_matching(round, Task::MicrogameTimer(tag));
                }
                RoundRequest::Frame => {
                    if !self.scheduler.has_pending(round, Task::MicrogameFrame) {
                        self.scheduler
                            .schedule_in(FRAME_INTERVAL, round, Task::MicrogameFrame);
                    }
                }
                RoundRequest::Instruction(text) => {
                    self.hud.set_instruction(&text, Tone::Neutral);
                }
            }
        }
    }

    fn record(&mut self, kind: GameEventKind) {
        self.journal.push(GameEvent::new(
            self.session_id,
            RoundId(self.generation),
            self.clock.now(),
            kind,
        ));
    }
}

impl<H, P> std::fmt::Debug for Orchestrator<H, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("session_id", &self.session_id)
            .field("phase", &self.phase)
            .field("session", &self.session)
            .field("round", &self.round.as_ref().map(|r| r.id))
            .field("now", &self.scheduler.now())
            .finish_non_exhaustive()
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use microrush_test_support::{
        FixedClock, MockRng, ProbeMicrogame, ProbeScript, RecordingHud, RecordingPlayField,
    };

    type TestOrchestrator = Orchestrator<RecordingHud, RecordingPlayField>;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn orchestrator(config: GameConfig, pool: MicrogamePool) -> Result<TestOrchestrator, GameError> {
        Orchestrator::new(
            config,
            pool,
            RecordingHud::new(),
            RecordingPlayField::new(),
            Box::new(MockRng),
            Arc::new(FixedClock::default()),
        )
    }

    fn probe_pool() -> MicrogamePool {
        let log = ProbeMicrogame::new_log();
        MicrogamePool::from_descriptors(vec![
            ProbeMicrogame::descriptor("alpha", ProbeScript::default(), &log),
            ProbeMicrogame::descriptor("beta", ProbeScript::default(), &log),
        ])
        .unwrap()
    }

    #[test]
    fn test_new_rejects_empty_pool() {
        let result = orchestrator(GameConfig::default(), MicrogamePool::new());

        assert_eq!(result.unwrap_err(), GameError::EmptyPool);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = GameConfig {
            initial_lives: 0,
            ..GameConfig::default()
        };

        let result = orchestrator(config, probe_pool());

        assert!(matches!(result, Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn test_reset_restores_configured_lives() {
        let config = GameConfig {
            initial_lives: 2,
            ..GameConfig::default()
        };
        let mut orchestrator = orchestrator(config.clone(), probe_pool()).unwrap();
        orchestrator.start_game().unwrap();
        orchestrator.on_fail();
        assert_eq!(orchestrator.session().lives(), 1);

        orchestrator.reset_game().unwrap();

        assert_eq!(orchestrator.config(), &config);
        assert_eq!(
            orchestrator.session().lives(),
            orchestrator.config().initial_lives
        );
    }

    #[test]
    fn test_start_arms_one_tick() {
        let mut orchestrator = orchestrator(GameConfig::default(), probe_pool()).unwrap();

        orchestrator.start_game().unwrap();

        assert_eq!(orchestrator.pending_tasks(), 1);
        assert!(orchestrator.tick_task.is_some());
        assert_eq!(orchestrator.current_round(), Some(RoundId(1)));
    }

    #[test]
    fn test_journal_records_round_lifecycle() {
        let mut orchestrator = orchestrator(GameConfig::default(), probe_pool()).unwrap();
        orchestrator.start_game().unwrap();
        orchestrator.on_win();
        orchestrator.advance(ms(500)).unwrap();
        orchestrator.on_fail();

        let events = orchestrator.drain_events();
        let types: Vec<&str> = events.iter().map(GameEvent::event_type).collect();

        assert_eq!(
            types,
            vec![
                "microrush.game_started",
                "microrush.round_started",
                "microrush.round_won",
                "microrush.round_started",
                "microrush.round_failed",
            ]
        );
        assert!(
            events
                .iter()
                .all(|e| e.metadata.session_id == orchestrator.session_id())
        );
        assert_eq!(events[4].metadata.round, RoundId(2));
        assert!(orchestrator.drain_events().is_empty());
    }

    #[test]
    fn test_snapshot_reflects_live_round() {
        let mut orchestrator = orchestrator(GameConfig::default(), probe_pool()).unwrap();
        orchestrator.start_game().unwrap();
        orchestrator.advance(ms(160)).unwrap();

        let view = orchestrator.snapshot();

        assert_eq!(view.phase, GamePhase::Active);
        assert_eq!(view.lives, 4);
        assert_eq!(view.timer_ms, 3840);
        assert_eq!(view.max_time_ms, 4000);
        assert_eq!(view.round, Some(RoundId(1)));
        assert_eq!(view.microgame_id.as_deref(), Some("alpha"));
        assert_eq!(view.elapsed_ms, 160);
        assert!(view.is_active);
    }

    #[test]
    fn test_session_stays_active_while_resolving() {
        let mut orchestrator = orchestrator(GameConfig::default(), probe_pool()).unwrap();
        orchestrator.start_game().unwrap();

        orchestrator.on_fail();

        assert_eq!(orchestrator.phase(), GamePhase::Resolving);
        assert!(orchestrator.session().is_active());
        assert_eq!(orchestrator.current_round(), None);
    }

    #[test]
    fn test_stale_transition_is_dropped() {
        let mut orchestrator = orchestrator(GameConfig::default(), probe_pool()).unwrap();
        orchestrator.start_game().unwrap();
        orchestrator.on_win();
        orchestrator
            .scheduler
            .schedule_in(ms(10), RoundId(99), Task::NextRound);

        orchestrator.advance(ms(10)).unwrap();

        assert_eq!(orchestrator.phase(), GamePhase::Resolving);
        assert_eq!(orchestrator.current_round(), None);
    }

    #[test]
    fn test_instruction_request_updates_hud() {
        let mut orchestrator = orchestrator(GameConfig::default(), probe_pool()).unwrap();
        orchestrator.start_game().unwrap();

        orchestrator.apply_requests(
            RoundId(1),
            vec![RoundRequest::Instruction("AGAIN!".to_owned())],
        );

        assert_eq!(
            orchestrator.hud().instruction(),
            Some(("AGAIN!", Tone::Neutral))
        );
    }

    #[test]
    fn test_frame_requests_are_coalesced() {
        let mut orchestrator = orchestrator(GameConfig::default(), probe_pool()).unwrap();
        orchestrator.start_game().unwrap();

        orchestrator.apply_requests(RoundId(1), vec![RoundRequest::Frame, RoundRequest::Frame]);

        assert_eq!(orchestrator.pending_tasks(), 2);
    }
}
