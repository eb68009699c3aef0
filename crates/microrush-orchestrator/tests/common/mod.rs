//! Shared helpers for orchestrator integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use microrush_core::clock::Clock;
use microrush_core::microgame::MicrogameDescriptor;
use microrush_core::rng::DeterministicRng;
use microrush_orchestrator::application::orchestrator::Orchestrator;
use microrush_orchestrator::domain::config::GameConfig;
use microrush_orchestrator::domain::pool::MicrogamePool;
use microrush_test_support::{
    FixedClock, MockRng, ProbeLog, ProbeMicrogame, ProbeScript, RecordingHud, RecordingPlayField,
};

pub type TestOrchestrator = Orchestrator<RecordingHud, RecordingPlayField>;

pub fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

/// Probe script that takes keyboard input and never resolves on its own.
pub fn input_script() -> ProbeScript {
    ProbeScript {
        handles_input: true,
        ..ProbeScript::default()
    }
}

/// Build an orchestrator over `descriptors` with the given config and RNG.
pub fn build(
    config: GameConfig,
    descriptors: Vec<MicrogameDescriptor>,
    rng: impl DeterministicRng + 'static,
) -> TestOrchestrator {
    let pool = MicrogamePool::from_descriptors(descriptors).unwrap();
    let clock: Arc<dyn Clock> = Arc::new(FixedClock::default());
    Orchestrator::new(
        config,
        pool,
        RecordingHud::new(),
        RecordingPlayField::new(),
        Box::new(rng),
        clock,
    )
    .unwrap()
}

/// Two keyboard probes, `alpha` and `beta`, sharing one log.
pub fn two_probe_orchestrator(config: GameConfig) -> (TestOrchestrator, Arc<Mutex<ProbeLog>>) {
    let log = ProbeMicrogame::new_log();
    let orchestrator = build(
        config,
        vec![
            ProbeMicrogame::descriptor("alpha", input_script(), &log),
            ProbeMicrogame::descriptor("beta", input_script(), &log),
        ],
        MockRng,
    );
    (orchestrator, log)
}
