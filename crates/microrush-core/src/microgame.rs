//! Microgame plug-in contract.
//!
//! A microgame is registered as a [`MicrogameDescriptor`]. Each round the
//! orchestrator calls its factory with a [`RoundContext`] and keeps the
//! returned [`MicrogameHandle`] until the round resolves. The handle never
//! holds a reference back into the orchestrator: everything it wants from
//! the session (resolving the round, scheduling timers, animation frames)
//! goes through the [`RoundLink`] carried by the context, and the
//! orchestrator applies those requests after the call returns.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::rng::DeterministicRng;
use crate::surface::{PlayField, Point};

/// Identifies one round. Increases monotonically within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoundId(pub u64);

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "round-{}", self.0)
    }
}

/// A microgame-chosen label for one of its own timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerTag(pub u32);

/// Raw input forwarded to the active microgame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputEvent {
    /// A key press, named like a DOM `KeyboardEvent.key` (`" "`, `"a"`, ...).
    Key {
        /// The key name.
        key: String,
    },
    /// Pointer pressed.
    PointerDown {
        /// Position on the play field.
        at: Point,
    },
    /// Pointer moved.
    PointerMove {
        /// Position on the play field.
        at: Point,
    },
    /// Pointer released.
    PointerUp {
        /// Position on the play field.
        at: Point,
    },
    /// A press and release at the same spot.
    Click {
        /// Position on the play field.
        at: Point,
    },
}

impl InputEvent {
    /// Shorthand for a key press.
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key { key: key.into() }
    }

    /// The key name, for keyboard events.
    #[must_use]
    pub fn key_name(&self) -> Option<&str> {
        match self {
            Self::Key { key } => Some(key),
            _ => None,
        }
    }

    /// The pointer position, for pointer events.
    #[must_use]
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::Key { .. } => None,
            Self::PointerDown { at }
            | Self::PointerMove { at }
            | Self::PointerUp { at }
            | Self::Click { at } => Some(*at),
        }
    }
}

/// Something a microgame asked of the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundRequest {
    /// The round was won.
    Win,
    /// The round was lost.
    Fail,
    /// Call `on_timer(tag)` after `delay`.
    Schedule {
        /// Delay from now.
        delay: Duration,
        /// Label passed back to `on_timer`.
        tag: TimerTag,
    },
    /// Cancel every pending timer with this tag.
    Cancel(TimerTag),
    /// Call `on_frame` on the next animation frame.
    Frame,
    /// Replace the instruction text.
    Instruction(String),
}

/// The microgame's only route back into the orchestrator.
///
/// Requests are buffered and applied, in order, once control returns to the
/// orchestrator. A link is bound to one round; requests from a round that
/// has already been torn down are discarded.
#[derive(Debug)]
pub struct RoundLink {
    round: RoundId,
    requests: Vec<RoundRequest>,
}

impl RoundLink {
    /// Creates an empty link for `round`.
    #[must_use]
    pub fn new(round: RoundId) -> Self {
        Self {
            round,
            requests: Vec::new(),
        }
    }

    /// The round this link belongs to.
    #[must_use]
    pub fn round(&self) -> RoundId {
        self.round
    }

    /// Signals a win.
    pub fn win(&mut self) {
        self.requests.push(RoundRequest::Win);
    }

    /// Signals a failure.
    pub fn fail(&mut self) {
        self.requests.push(RoundRequest::Fail);
    }

    /// Asks for `on_timer(tag)` after `delay`.
    pub fn schedule(&mut self, delay: Duration, tag: TimerTag) {
        self.requests.push(RoundRequest::Schedule { delay, tag });
    }

    /// Cancels pending timers with `tag`.
    pub fn cancel(&mut self, tag: TimerTag) {
        self.requests.push(RoundRequest::Cancel(tag));
    }

    /// Asks for `on_frame` on the next animation frame.
    pub fn request_frame(&mut self) {
        self.requests.push(RoundRequest::Frame);
    }

    /// Replaces the HUD instruction text.
    pub fn set_instruction(&mut self, text: impl Into<String>) {
        self.requests.push(RoundRequest::Instruction(text.into()));
    }

    /// Takes the buffered requests, leaving the link empty.
    pub fn drain(&mut self) -> Vec<RoundRequest> {
        std::mem::take(&mut self.requests)
    }
}

/// Everything a microgame sees during a callback.
pub struct RoundContext<'a> {
    field: &'a mut dyn PlayField,
    rng: &'a mut dyn DeterministicRng,
    link: &'a mut RoundLink,
    score: u32,
}

impl<'a> RoundContext<'a> {
    /// Creates a context for one callback.
    pub fn new(
        field: &'a mut dyn PlayField,
        rng: &'a mut dyn DeterministicRng,
        link: &'a mut RoundLink,
        score: u32,
    ) -> Self {
        Self {
            field,
            rng,
            link,
            score,
        }
    }

    /// The play field to render into.
    pub fn field(&mut self) -> &mut dyn PlayField {
        &mut *self.field
    }

    /// Session randomness.
    pub fn rng(&mut self) -> &mut dyn DeterministicRng {
        &mut *self.rng
    }

    /// Score at the start of the round.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// The link back to the orchestrator.
    pub fn link(&mut self) -> &mut RoundLink {
        &mut *self.link
    }

    /// The round being played.
    #[must_use]
    pub fn round(&self) -> RoundId {
        self.link.round()
    }
}

impl fmt::Debug for RoundContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoundContext")
            .field("round", &self.link.round())
            .field("score", &self.score)
            .finish_non_exhaustive()
    }
}

/// Optional capability: a microgame that reacts to routed input.
pub trait InputHandler: Send {
    /// Handles one input event.
    fn on_input(&mut self, event: &InputEvent, ctx: &mut RoundContext<'_>);
}

/// The live, per-round object a microgame returns from setup.
pub trait MicrogameHandle: Send {
    /// Input capability, if the microgame has one.
    fn input_handler(&mut self) -> Option<&mut dyn InputHandler> {
        None
    }

    /// A timer scheduled through the link fired.
    fn on_timer(&mut self, _tag: TimerTag, _ctx: &mut RoundContext<'_>) {}

    /// An animation frame requested through the link fired.
    fn on_frame(&mut self, _ctx: &mut RoundContext<'_>) {}

    /// Releases everything the microgame acquired.
    fn cleanup(&mut self);
}

/// Factory signature for a microgame.
pub type SetupFn = dyn Fn(&mut RoundContext<'_>) -> Box<dyn MicrogameHandle> + Send + Sync;

/// Immutable registration record for a microgame.
#[derive(Clone)]
pub struct MicrogameDescriptor {
    id: String,
    instruction: String,
    setup: Arc<SetupFn>,
}

impl MicrogameDescriptor {
    /// Creates a descriptor.
    pub fn new<F>(id: impl Into<String>, instruction: impl Into<String>, setup: F) -> Self
    where
        F: Fn(&mut RoundContext<'_>) -> Box<dyn MicrogameHandle> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            instruction: instruction.into(),
            setup: Arc::new(setup),
        }
    }

    /// Unique id within the pool.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Text shown on the HUD while the microgame runs.
    #[must_use]
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Runs the factory.
    pub fn instantiate(&self, ctx: &mut RoundContext<'_>) -> Box<dyn MicrogameHandle> {
        (self.setup)(ctx)
    }
}

impl fmt::Debug for MicrogameDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MicrogameDescriptor")
            .field("id", &self.id)
            .field("instruction", &self.instruction)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_drains_requests_in_order() {
        let mut link = RoundLink::new(RoundId(3));
        link.request_frame();
        link.schedule(Duration::from_millis(200), TimerTag(1));
        link.win();

        let drained = link.drain();

        assert_eq!(
            drained,
            vec![
                RoundRequest::Frame,
                RoundRequest::Schedule {
                    delay: Duration::from_millis(200),
                    tag: TimerTag(1)
                },
                RoundRequest::Win,
            ]
        );
        assert!(link.drain().is_empty());
    }

    #[test]
    fn test_input_event_accessors() {
        let key = InputEvent::key(" ");
        let click = InputEvent::Click {
            at: Point::new(4.0, 5.0),
        };

        assert_eq!(key.key_name(), Some(" "));
        assert_eq!(key.position(), None);
        assert_eq!(click.key_name(), None);
        assert_eq!(click.position(), Some(Point::new(4.0, 5.0)));
    }

    #[test]
    fn test_input_event_deserializes_from_tagged_json() {
        let event: InputEvent =
            serde_json::from_str(r#"{"kind":"pointer_down","at":{"x":1.0,"y":2.0}}"#).unwrap();
        assert_eq!(
            event,
            InputEvent::PointerDown {
                at: Point::new(1.0, 2.0)
            }
        );
    }

    #[test]
    fn test_round_id_display() {
        assert_eq!(RoundId(7).to_string(), "round-7");
    }
}
