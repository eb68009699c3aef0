//! Solar panel: aim the sun's ray at a panel sweeping along the ground
//! until it is fully charged.

use microrush_core::microgame::{
    InputEvent, InputHandler, MicrogameDescriptor, MicrogameHandle, RoundContext,
};
use microrush_core::surface::{Extent, Node, Point, Shape};
use tracing::debug;

use crate::difficulty_level;
use crate::motion::Sweep;

/// Registration id.
pub const ID: &str = "solar";

/// HUD instruction.
pub const INSTRUCTION: &str = "¡APUNTA EL RAYO A LA PLACA!";

/// Energy needed to win.
pub const FULL_CHARGE: f64 = 100.0;

/// Energy lost on a frame where the ray misses.
pub const DRAIN_PER_FRAME: f64 = 0.45;

const PANEL_HEIGHT: f64 = 14.0;
const SUN_NODE: &str = "solar-sun";
const PANEL_NODE: &str = "solar-panel";
const AIM_NODE: &str = "solar-aim";
const ENERGY_NODE: &str = "solar-energy";

/// Descriptor for the catalog.
#[must_use]
pub fn descriptor() -> MicrogameDescriptor {
    MicrogameDescriptor::new(
        ID,
        INSTRUCTION,
        |ctx: &mut RoundContext<'_>| -> Box<dyn MicrogameHandle> { Box::new(Solar::setup(ctx)) },
    )
}

/// Tuning derived from the score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarTuning {
    /// Panel speed in pixels per frame.
    pub panel_speed: f64,
    /// Panel width in pixels.
    pub panel_width: f64,
    /// Energy gained on a frame where the ray hits.
    pub charge_per_frame: f64,
}

impl SolarTuning {
    /// Tuning for `score`.
    #[must_use]
    pub fn for_score(score: u32) -> Self {
        let level = difficulty_level(score);
        Self {
            panel_speed: 1.5 + level * 0.5,
            panel_width: (150.0 - level * 10.0).max(80.0),
            charge_per_frame: 1.2 + level * 0.15,
        }
    }
}

/// Per-round state.
#[derive(Debug)]
pub struct Solar {
    tuning: SolarTuning,
    sun: Point,
    panel_y: f64,
    panel: Sweep,
    aim: Point,
    energy: f64,
    finished: bool,
}

impl Solar {
    /// Centres the panel, points the ray straight down and starts the
    /// frame loop.
    pub fn setup(ctx: &mut RoundContext<'_>) -> Self {
        let extent = ctx.field().extent();
        let tuning = SolarTuning::for_score(ctx.score());
        let panel = Sweep::new(
            extent.width / 2.0 - tuning.panel_width / 2.0,
            tuning.panel_width,
            tuning.panel_speed,
            extent.width,
        );
        let solar = Self {
            tuning,
            sun: Point::new(extent.width / 2.0, extent.height * 0.22),
            panel_y: extent.height * 0.8,
            panel,
            aim: Point::new(extent.width / 2.0, extent.height),
            energy: 0.0,
            finished: false,
        };
        solar.draw_static(ctx, extent);
        solar.draw(ctx);
        ctx.link().request_frame();
        solar
    }

    /// Current charge, `0.0..=100.0`.
    #[must_use]
    pub fn energy(&self) -> f64 {
        self.energy
    }

    /// Left and right edge of the panel.
    #[must_use]
    pub fn panel_span(&self) -> (f64, f64) {
        (self.panel.left(), self.panel.right())
    }

    /// Height of the panel line.
    #[must_use]
    pub fn panel_y(&self) -> f64 {
        self.panel_y
    }

    /// Sun centre, where the ray starts.
    #[must_use]
    pub fn sun(&self) -> Point {
        self.sun
    }

    /// Whether the ray from the sun through the aim point crosses the
    /// panel line within the panel.
    #[must_use]
    pub fn ray_hits(&self) -> bool {
        let dx = self.aim.x - self.sun.x;
        let dy = self.aim.y - self.sun.y;
        if dy <= 0.0 {
            return false;
        }
        let t = (self.panel_y - self.sun.y) / dy;
        let x = self.sun.x + dx * t;
        x >= self.panel.left() && x <= self.panel.right()
    }

    fn step(&mut self, ctx: &mut RoundContext<'_>) {
        self.panel.step();
        if self.ray_hits() {
            self.energy = (self.energy + self.tuning.charge_per_frame).min(FULL_CHARGE);
        } else {
            self.energy = (self.energy - DRAIN_PER_FRAME).max(0.0);
        }
        self.draw(ctx);

        if self.energy >= FULL_CHARGE {
            self.finished = true;
            debug!("panel fully charged");
            ctx.link().win();
        } else {
            ctx.link().request_frame();
        }
    }

    fn draw_static(&self, ctx: &mut RoundContext<'_>, extent: Extent) {
        ctx.field()
            .upsert(Node::new(SUN_NODE, Shape::Glyph("☀".to_owned()), self.sun));
        ctx.field().upsert(Node::new(
            "solar-ground",
            Shape::Rect {
                width: extent.width,
                height: 1.0,
            },
            Point::new(extent.width / 2.0, self.panel_y),
        ));
    }

    fn draw(&self, ctx: &mut RoundContext<'_>) {
        ctx.field().upsert(Node::new(
            PANEL_NODE,
            Shape::Rect {
                width: self.tuning.panel_width,
                height: PANEL_HEIGHT,
            },
            Point::new(self.panel.center(), self.panel_y),
        ));
        ctx.field()
            .upsert(Node::new(AIM_NODE, Shape::Glyph("✛".to_owned()), self.aim));
        ctx.field().upsert(Node::new(
            ENERGY_NODE,
            Shape::Meter(self.energy / FULL_CHARGE),
            Point::new(self.sun.x, self.panel_y + 24.0),
        ));
    }
}

impl InputHandler for Solar {
    fn on_input(&mut self, event: &InputEvent, _ctx: &mut RoundContext<'_>) {
        if let InputEvent::PointerMove { at } | InputEvent::PointerDown { at } = *event {
            self.aim = at;
        }
    }
}

impl MicrogameHandle for Solar {
    fn input_handler(&mut self) -> Option<&mut dyn InputHandler> {
        Some(self)
    }

    fn on_frame(&mut self, ctx: &mut RoundContext<'_>) {
        if !self.finished {
            self.step(ctx);
        }
    }

    fn cleanup(&mut self) {
        self.finished = true;
    }
}
