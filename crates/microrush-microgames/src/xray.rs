//! X-ray: sweep a small light over a dark field and click the hidden gem.

use std::time::Duration;

use microrush_core::microgame::{
    InputEvent, InputHandler, MicrogameDescriptor, MicrogameHandle, RoundContext, TimerTag,
};
use microrush_core::surface::{Node, Point, Shape};
use tracing::debug;

/// Registration id.
pub const ID: &str = "xray";

/// HUD instruction.
pub const INSTRUCTION: &str = "¡ENCUÉNTRALO!";

/// Delay between finding the gem and the win.
pub const REVEAL_DELAY: Duration = Duration::from_millis(200);

/// Clicks closer than this to the gem's centre hit it.
pub const TARGET_RADIUS: f64 = 20.0;

const REVEAL: TimerTag = TimerTag(1);
const EDGE: f64 = 50.0;
const GEMS: [&str; 5] = ["💎", "🏆", "👑", "🔑", "⭐"];
const LIGHT_NODE: &str = "xray-light";
const TARGET_NODE: &str = "xray-target";

/// Descriptor for the catalog.
#[must_use]
pub fn descriptor() -> MicrogameDescriptor {
    MicrogameDescriptor::new(
        ID,
        INSTRUCTION,
        |ctx: &mut RoundContext<'_>| -> Box<dyn MicrogameHandle> { Box::new(Xray::setup(ctx)) },
    )
}

/// Light radius for `score`: shrinks by 5 px every 5 points, never below 40.
#[must_use]
pub fn light_radius(score: u32) -> f64 {
    let shrink = f64::from(score / 5) * 5.0;
    (80.0 - shrink).max(40.0)
}

/// Per-round state.
#[derive(Debug)]
pub struct Xray {
    gem: &'static str,
    target: Point,
    radius: f64,
    light: Option<Point>,
    found: bool,
}

impl Xray {
    /// Hides the gem somewhere away from the edges.
    pub fn setup(ctx: &mut RoundContext<'_>) -> Self {
        let extent = ctx.field().extent();
        let gem = ctx
            .rng()
            .pick_index(GEMS.len())
            .map_or(GEMS[0], |i| GEMS[i]);
        let x = EDGE
            + ctx
                .rng()
                .next_f64_range(0.0, (extent.width - 2.0 * EDGE).max(0.0));
        let y = EDGE
            + ctx
                .rng()
                .next_f64_range(0.0, (extent.height - 2.0 * EDGE).max(0.0));
        ctx.field().upsert(Node::new(
            LIGHT_NODE,
            Shape::Rect {
                width: 0.0,
                height: 0.0,
            },
            Point::default(),
        ));

        Self {
            gem,
            target: Point::new(x, y),
            radius: light_radius(ctx.score()),
            light: None,
            found: false,
        }
    }

    /// Where the gem is hidden.
    #[must_use]
    pub fn target(&self) -> Point {
        self.target
    }

    /// Radius of the light around the pointer.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Whether the gem currently sits inside the light.
    #[must_use]
    pub fn is_lit(&self) -> bool {
        self.found
            || self
                .light
                .is_some_and(|light| light.distance(self.target) <= self.radius)
    }

    fn shine(&mut self, ctx: &mut RoundContext<'_>, at: Point) {
        self.light = Some(at);
        let diameter = self.radius * 2.0;
        ctx.field().upsert(Node::new(
            LIGHT_NODE,
            Shape::Rect {
                width: diameter,
                height: diameter,
            },
            at,
        ));
        self.draw_target(ctx);
    }

    fn draw_target(&self, ctx: &mut RoundContext<'_>) {
        if self.is_lit() {
            ctx.field().upsert(Node::new(
                TARGET_NODE,
                Shape::Glyph(self.gem.to_owned()),
                self.target,
            ));
        } else {
            ctx.field().remove(TARGET_NODE);
        }
    }

    fn click(&mut self, ctx: &mut RoundContext<'_>, at: Point) {
        if self.found || at.distance(self.target) > TARGET_RADIUS {
            return;
        }
        self.found = true;
        self.draw_target(ctx);
        ctx.link().schedule(REVEAL_DELAY, REVEAL);
        debug!("gem found");
    }
}

impl InputHandler for Xray {
    fn on_input(&mut self, event: &InputEvent, ctx: &mut RoundContext<'_>) {
        match *event {
            InputEvent::PointerMove { at } | InputEvent::PointerDown { at } => {
                self.shine(ctx, at);
            }
            InputEvent::Click { at } => {
                self.shine(ctx, at);
                self.click(ctx, at);
            }
            InputEvent::PointerUp { .. } | InputEvent::Key { .. } => {}
        }
    }
}

impl MicrogameHandle for Xray {
    fn input_handler(&mut self) -> Option<&mut dyn InputHandler> {
        Some(self)
    }

    fn on_timer(&mut self, tag: TimerTag, ctx: &mut RoundContext<'_>) {
        if tag == REVEAL {
            ctx.link().win();
        }
    }

    fn cleanup(&mut self) {
        self.light = None;
    }
}
