//! Round harness: drives a single microgame handle without an orchestrator.

use std::time::Duration;

use microrush_core::microgame::{
    InputEvent, MicrogameDescriptor, MicrogameHandle, RoundContext, RoundId, RoundLink,
    RoundRequest, TimerTag,
};
use microrush_core::rng::DeterministicRng;
use microrush_core::surface::Point;

use crate::surface::RecordingPlayField;

/// Owns everything a [`RoundContext`] borrows, so microgame tests can call
/// handle methods directly and inspect what was requested.
pub struct RoundHarness {
    field: RecordingPlayField,
    rng: Box<dyn DeterministicRng>,
    link: RoundLink,
    score: u32,
}

impl RoundHarness {
    /// A harness for round 1 at `score`.
    pub fn new(score: u32, rng: impl DeterministicRng + 'static) -> Self {
        Self {
            field: RecordingPlayField::new(),
            rng: Box::new(rng),
            link: RoundLink::new(RoundId(1)),
            score,
        }
    }

    /// Context for one callback.
    pub fn ctx(&mut self) -> RoundContext<'_> {
        RoundContext::new(
            &mut self.field,
            self.rng.as_mut(),
            &mut self.link,
            self.score,
        )
    }

    /// Runs the descriptor's factory.
    pub fn setup(&mut self, descriptor: &MicrogameDescriptor) -> Box<dyn MicrogameHandle> {
        let mut ctx = self.ctx();
        descriptor.instantiate(&mut ctx)
    }

    /// Feeds `event` to the handle's input capability.
    ///
    /// # Panics
    ///
    /// Panics if the handle takes no input.
    pub fn input(&mut self, handle: &mut dyn MicrogameHandle, event: &InputEvent) {
        let mut ctx = self.ctx();
        handle
            .input_handler()
            .expect("microgame has no input capability")
            .on_input(event, &mut ctx);
    }

    /// Presses `key`.
    pub fn key(&mut self, handle: &mut dyn MicrogameHandle, key: &str) {
        self.input(handle, &InputEvent::key(key));
    }

    /// Clicks at `(x, y)`.
    pub fn click(&mut self, handle: &mut dyn MicrogameHandle, x: f64, y: f64) {
        self.input(handle, &InputEvent::Click { at: Point::new(x, y) });
    }

    /// Presses at `from`, moves to `to` and releases there.
    pub fn drag(&mut self, handle: &mut dyn MicrogameHandle, from: Point, to: Point) {
        self.input(handle, &InputEvent::PointerDown { at: from });
        self.input(handle, &InputEvent::PointerMove { at: to });
        self.input(handle, &InputEvent::PointerUp { at: to });
    }

    /// Fires timer `tag`.
    pub fn fire(&mut self, handle: &mut dyn MicrogameHandle, tag: TimerTag) {
        let mut ctx = self.ctx();
        handle.on_timer(tag, &mut ctx);
    }

    /// Runs `count` animation frames.
    pub fn frames(&mut self, handle: &mut dyn MicrogameHandle, count: usize) {
        for _ in 0..count {
            let mut ctx = self.ctx();
            handle.on_frame(&mut ctx);
        }
    }

    /// Takes the requests buffered so far.
    pub fn requests(&mut self) -> Vec<RoundRequest> {
        self.link.drain()
    }

    /// Number of `Win` requests buffered so far (drains the link).
    pub fn wins(&mut self) -> usize {
        self.count(&RoundRequest::Win)
    }

    /// Number of `Fail` requests buffered so far (drains the link).
    pub fn fails(&mut self) -> usize {
        self.count(&RoundRequest::Fail)
    }

    /// The first timer scheduled with `tag`, if any (drains the link).
    pub fn scheduled(&mut self, tag: TimerTag) -> Option<Duration> {
        self.link.drain().into_iter().find_map(|request| match request {
            RoundRequest::Schedule { delay, tag: t } if t == tag => Some(delay),
            _ => None,
        })
    }

    /// The play field.
    #[must_use]
    pub fn field(&self) -> &RecordingPlayField {
        &self.field
    }

    fn count(&mut self, wanted: &RoundRequest) -> usize {
        self.link.drain().iter().filter(|r| *r == wanted).count()
    }
}

impl std::fmt::Debug for RoundHarness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoundHarness")
            .field("field", &self.field)
            .field("link", &self.link)
            .field("score", &self.score)
            .finish_non_exhaustive()
    }
}
