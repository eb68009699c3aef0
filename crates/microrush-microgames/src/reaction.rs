//! Reaction: wait for the signal, then press any key. Jumping the gun
//! loses the round, and so does answering after the reaction window.

use std::time::Duration;

use microrush_core::microgame::{
    InputEvent, InputHandler, MicrogameDescriptor, MicrogameHandle, RoundContext, TimerTag,
};
use microrush_core::surface::{Node, Point, Shape};
use tracing::debug;

/// Registration id.
pub const ID: &str = "reaction";

/// HUD instruction.
pub const INSTRUCTION: &str = "¡ESPERA LA SEÑAL!";

/// Instruction once the signal is up.
pub const GO_INSTRUCTION: &str = "¡YA!";

/// Shortest wait before the signal, in milliseconds.
pub const MIN_WAIT_MS: u32 = 500;

/// Longest wait before the signal, in milliseconds. Keeps the round
/// winnable at the shortest time budget.
pub const MAX_WAIT_MS: u32 = 1000;

/// Reaction window at score zero, in milliseconds.
pub const BASE_WINDOW_MS: u64 = 1000;

/// Shortest reaction window, in milliseconds.
pub const MIN_WINDOW_MS: u64 = 300;

const WINDOW_STEP_MS: u64 = 100;
const SIGNAL: TimerTag = TimerTag(1);
const TOO_LATE: TimerTag = TimerTag(2);
const LAMP_NODE: &str = "reaction-lamp";

/// Descriptor for the catalog.
#[must_use]
pub fn descriptor() -> MicrogameDescriptor {
    MicrogameDescriptor::new(
        ID,
        INSTRUCTION,
        |ctx: &mut RoundContext<'_>| -> Box<dyn MicrogameHandle> {
            Box::new(Reaction::setup(ctx))
        },
    )
}

/// Time allowed between the signal and the key press for `score`.
#[must_use]
pub fn reaction_window(score: u32) -> Duration {
    let steps = u64::from(score / 5);
    let ms = BASE_WINDOW_MS
        .saturating_sub(steps.saturating_mul(WINDOW_STEP_MS))
        .max(MIN_WINDOW_MS);
    Duration::from_millis(ms)
}

/// Per-round state.
#[derive(Debug)]
pub struct Reaction {
    wait: Duration,
    window: Duration,
    signalled: bool,
    answered: bool,
}

impl Reaction {
    /// Shows a red lamp and arms the signal.
    pub fn setup(ctx: &mut RoundContext<'_>) -> Self {
        let wait_ms = ctx.rng().next_u32_range(MIN_WAIT_MS, MAX_WAIT_MS);
        let wait = Duration::from_millis(u64::from(wait_ms));
        ctx.field().upsert(lamp("🔴"));
        ctx.link().schedule(wait, SIGNAL);
        Self {
            wait,
            window: reaction_window(ctx.score()),
            signalled: false,
            answered: false,
        }
    }

    /// Delay before the signal.
    #[must_use]
    pub fn wait(&self) -> Duration {
        self.wait
    }

    /// Time allowed to answer once the signal shows.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Whether the signal is showing.
    #[must_use]
    pub fn signalled(&self) -> bool {
        self.signalled
    }
}

impl InputHandler for Reaction {
    fn on_input(&mut self, event: &InputEvent, ctx: &mut RoundContext<'_>) {
        if self.answered || event.key_name().is_none() {
            return;
        }
        self.answered = true;
        if self.signalled {
            ctx.link().cancel(TOO_LATE);
            ctx.link().win();
        } else {
            debug!("key pressed before the signal");
            ctx.link().cancel(SIGNAL);
            ctx.link().fail();
        }
    }
}

impl MicrogameHandle for Reaction {
    fn input_handler(&mut self) -> Option<&mut dyn InputHandler> {
        Some(self)
    }

    fn on_timer(&mut self, tag: TimerTag, ctx: &mut RoundContext<'_>) {
        if self.answered {
            return;
        }
        if tag == SIGNAL {
            self.signalled = true;
            ctx.field().upsert(lamp("🟢"));
            ctx.link().set_instruction(GO_INSTRUCTION);
            ctx.link().schedule(self.window, TOO_LATE);
        } else if tag == TOO_LATE && self.signalled {
            debug!(window_ms = self.window.as_millis(), "no key within the window");
            self.answered = true;
            ctx.field().upsert(lamp("⚫"));
            ctx.link().fail();
        }
    }

    fn cleanup(&mut self) {
        self.answered = true;
    }
}

fn lamp(glyph: &str) -> Node {
    Node::new(LAMP_NODE, Shape::Glyph(glyph.to_owned()), Point::new(260.0, 110.0))
}
