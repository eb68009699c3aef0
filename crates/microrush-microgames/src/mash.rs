//! Button mash: hammer the space bar enough times before time runs out.

use microrush_core::microgame::{
    InputEvent, InputHandler, MicrogameDescriptor, MicrogameHandle, RoundContext,
};
use microrush_core::surface::{Node, Point, Shape};

/// Registration id.
pub const ID: &str = "mash";

/// HUD instruction.
pub const INSTRUCTION: &str = "¡MACHACA EL ESPACIO!";

/// Most presses ever required.
pub const MAX_PRESSES: u32 = 20;

const METER_NODE: &str = "mash-meter";
const COUNT_NODE: &str = "mash-count";

/// Descriptor for the catalog.
#[must_use]
pub fn descriptor() -> MicrogameDescriptor {
    MicrogameDescriptor::new(
        ID,
        INSTRUCTION,
        |ctx: &mut RoundContext<'_>| -> Box<dyn MicrogameHandle> { Box::new(Mash::setup(ctx)) },
    )
}

/// Presses required at `score`.
#[must_use]
pub fn required_presses(score: u32) -> u32 {
    (8 + score / 2).min(MAX_PRESSES)
}

/// Per-round state.
#[derive(Debug)]
pub struct Mash {
    required: u32,
    presses: u32,
}

impl Mash {
    /// Draws an empty meter.
    pub fn setup(ctx: &mut RoundContext<'_>) -> Self {
        let mash = Self {
            required: required_presses(ctx.score()),
            presses: 0,
        };
        ctx.field().upsert(Node::new(
            "mash-key",
            Shape::Text("[ ESPACIO ]".to_owned()),
            Point::new(260.0, 80.0),
        ));
        mash.draw(ctx);
        mash
    }

    /// Presses still needed.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.required.saturating_sub(self.presses)
    }

    fn draw(&self, ctx: &mut RoundContext<'_>) {
        ctx.field().upsert(Node::new(
            METER_NODE,
            Shape::Meter(f64::from(self.presses) / f64::from(self.required)),
            Point::new(260.0, 140.0),
        ));
        ctx.field().upsert(Node::new(
            COUNT_NODE,
            Shape::Text(format!("{}/{}", self.presses, self.required)),
            Point::new(260.0, 170.0),
        ));
    }
}

impl InputHandler for Mash {
    fn on_input(&mut self, event: &InputEvent, ctx: &mut RoundContext<'_>) {
        if !matches!(event.key_name(), Some(" " | "Space" | "Spacebar")) {
            return;
        }
        if self.presses >= self.required {
            return;
        }
        self.presses += 1;
        self.draw(ctx);
        if self.presses == self.required {
            ctx.link().win();
        }
    }
}

impl MicrogameHandle for Mash {
    fn input_handler(&mut self) -> Option<&mut dyn InputHandler> {
        Some(self)
    }

    fn cleanup(&mut self) {
        self.presses = self.required;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use microrush_test_support::{MockRng, RoundHarness};

    #[test]
    fn test_required_presses_scale_and_cap() {
        assert_eq!(required_presses(0), 8);
        assert_eq!(required_presses(5), 10);
        assert_eq!(required_presses(24), 20);
        assert_eq!(required_presses(90), 20);
    }

    #[test]
    fn test_enough_presses_win_once() {
        let mut harness = RoundHarness::new(0, MockRng);
        let mut mash = Mash::setup(&mut harness.ctx());

        for _ in 0..12 {
            harness.key(&mut mash, " ");
        }

        assert_eq!(mash.remaining(), 0);
        assert_eq!(harness.wins(), 1);
        let count = harness.field().node(COUNT_NODE).unwrap();
        assert_eq!(count.shape, Shape::Text("8/8".to_owned()));
    }

    #[test]
    fn test_other_keys_are_ignored() {
        let mut harness = RoundHarness::new(0, MockRng);
        let mut mash = Mash::setup(&mut harness.ctx());

        harness.key(&mut mash, "a");
        harness.key(&mut mash, "Enter");
        harness.click(&mut mash, 260.0, 80.0);

        assert_eq!(mash.remaining(), 8);
        assert_eq!(harness.wins(), 0);
    }
}
