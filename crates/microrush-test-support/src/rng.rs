//! Test RNG — deterministic `DeterministicRng` implementations for tests.

use microrush_core::rng::DeterministicRng;

/// Always returns `min` for `next_u32_range` and `0.0` for `next_f64`, so
/// selection picks the first eligible microgame and layouts sit at their
/// lower bounds.
#[derive(Debug, Default)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }

    fn next_f64(&mut self) -> f64 {
        0.0
    }
}

/// Replays a predetermined sequence of values, clamped into the requested
/// range. Once the sequence is exhausted it falls back to `min` / `0.0`.
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<u32>,
    index: usize,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given values.
    #[must_use]
    pub fn new(values: Vec<u32>) -> Self {
        Self { values, index: 0 }
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        let Some(&value) = self.values.get(self.index) else {
            return min;
        };
        self.index += 1;
        value.clamp(min, max.max(min))
    }

    fn next_f64(&mut self) -> f64 {
        0.0
    }
}
