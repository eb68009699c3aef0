//! Shared test doubles and utilities for the MicroRush microgame engine.

mod clock;
mod harness;
mod probe;
mod rng;
mod surface;

pub use clock::FixedClock;
pub use harness::RoundHarness;
pub use probe::{ProbeLog, ProbeMicrogame, ProbeScript};
pub use rng::{MockRng, SequenceRng};
pub use surface::{HudLog, RecordingHud, RecordingPlayField};
