//! Beach clean-up: drag every piece of litter into the bin.

use std::time::Duration;

use microrush_core::microgame::{
    InputEvent, InputHandler, MicrogameDescriptor, MicrogameHandle, RoundContext, TimerTag,
};
use microrush_core::surface::{Extent, Node, Point, Shape};
use tracing::debug;

/// Registration id.
pub const ID: &str = "beach";

/// HUD instruction.
pub const INSTRUCTION: &str = "¡LIMPIA LA PLAYA!";

/// Delay between setup and the litter appearing.
pub const SPAWN_DELAY: Duration = Duration::from_millis(50);

/// An item whose centre is dropped closer than this to the bin centre is
/// collected.
pub const BIN_RADIUS: f64 = 70.0;

/// Delay between the last item landing in the bin and the win.
pub const CLEAN_DELAY: Duration = Duration::from_millis(100);

const SPAWN: TimerTag = TimerTag(1);
const CLEAN: TimerTag = TimerTag(2);
const ITEM_SIZE: f64 = 40.0;
const SPAWN_MARGIN: f64 = 80.0;
const LITTER: [&str; 6] = ["🧴", "🥫", "🍕", "🥤", "🍌", "🦴"];
const BIN_NODE: &str = "beach-bin";

/// Descriptor for the catalog.
#[must_use]
pub fn descriptor() -> MicrogameDescriptor {
    MicrogameDescriptor::new(
        ID,
        INSTRUCTION,
        |ctx: &mut RoundContext<'_>| -> Box<dyn MicrogameHandle> { Box::new(Beach::setup(ctx)) },
    )
}

/// Number of litter items for `score`.
#[must_use]
pub fn item_count(score: u32) -> usize {
    2 + (score / 10).min(2) as usize
}

#[derive(Debug, Clone)]
struct Litter {
    glyph: &'static str,
    center: Point,
    collected: bool,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    item: usize,
    offset: Point,
}

/// Per-round state.
#[derive(Debug)]
pub struct Beach {
    bin: Point,
    pending: usize,
    items: Vec<Litter>,
    drag: Option<Drag>,
    remaining: usize,
    done: bool,
}

impl Beach {
    /// Places the bin and schedules the litter drop.
    pub fn setup(ctx: &mut RoundContext<'_>) -> Self {
        let extent = ctx.field().extent();
        let bin = bin_position(extent);
        ctx.field()
            .upsert(Node::new(BIN_NODE, Shape::Glyph("🗑️".to_owned()), bin));
        ctx.link().schedule(SPAWN_DELAY, SPAWN);

        let count = item_count(ctx.score());
        Self {
            bin,
            pending: count,
            items: Vec::with_capacity(count),
            drag: None,
            remaining: count,
            done: false,
        }
    }

    /// Bin centre.
    #[must_use]
    pub fn bin(&self) -> Point {
        self.bin
    }

    /// Items not yet collected.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Centres of the uncollected items that are on the sand.
    #[must_use]
    pub fn item_positions(&self) -> Vec<Point> {
        self.items
            .iter()
            .filter(|item| !item.collected)
            .map(|item| item.center)
            .collect()
    }

    fn spawn(&mut self, ctx: &mut RoundContext<'_>) {
        let extent = ctx.field().extent();
        for _ in 0..self.pending {
            let glyph = ctx
                .rng()
                .pick_index(LITTER.len())
                .map_or(LITTER[0], |i| LITTER[i]);
            let x = ctx
                .rng()
                .next_f64_range(0.0, (extent.width - SPAWN_MARGIN).max(0.0));
            let y = ctx
                .rng()
                .next_f64_range(0.0, (extent.height - SPAWN_MARGIN).max(0.0));
            let center = Point::new(x + ITEM_SIZE / 2.0, y + ITEM_SIZE / 2.0);
            self.items.push(Litter {
                glyph,
                center,
                collected: false,
            });
            let index = self.items.len() - 1;
            self.draw(ctx, index);
        }
        self.pending = 0;
    }

    fn grab(&mut self, at: Point) {
        let reach = ITEM_SIZE / 2.0;
        self.drag = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.collected && item.center.distance(at) <= reach)
            .min_by(|(_, a), (_, b)| a.center.distance(at).total_cmp(&b.center.distance(at)))
            .map(|(item, litter)| Drag {
                item,
                offset: Point::new(at.x - litter.center.x, at.y - litter.center.y),
            });
    }

    fn move_to(&mut self, ctx: &mut RoundContext<'_>, at: Point) {
        let Some(drag) = self.drag else {
            return;
        };
        if let Some(item) = self.items.get_mut(drag.item) {
            item.center = Point::new(at.x - drag.offset.x, at.y - drag.offset.y);
        }
        self.draw(ctx, drag.item);
    }

    fn release(&mut self, ctx: &mut RoundContext<'_>, at: Point) {
        self.move_to(ctx, at);
        let Some(drag) = self.drag.take() else {
            return;
        };
        let Some(item) = self.items.get_mut(drag.item) else {
            return;
        };
        if item.center.distance(self.bin) >= BIN_RADIUS {
            return;
        }

        item.collected = true;
        ctx.field().remove(&item_node(drag.item));
        self.remaining = self.remaining.saturating_sub(1);
        debug!(remaining = self.remaining, "litter collected");
        if self.remaining == 0 && !self.done {
            self.done = true;
            ctx.link().schedule(CLEAN_DELAY, CLEAN);
        }
    }

    fn draw(&self, ctx: &mut RoundContext<'_>, index: usize) {
        if let Some(item) = self.items.get(index) {
            ctx.field().upsert(Node::new(
                item_node(index),
                Shape::Glyph(item.glyph.to_owned()),
                item.center,
            ));
        }
    }
}

impl InputHandler for Beach {
    fn on_input(&mut self, event: &InputEvent, ctx: &mut RoundContext<'_>) {
        if self.done {
            return;
        }
        match *event {
            InputEvent::PointerDown { at } => self.grab(at),
            InputEvent::PointerMove { at } => self.move_to(ctx, at),
            InputEvent::PointerUp { at } => self.release(ctx, at),
            InputEvent::Key { .. } | InputEvent::Click { .. } => {}
        }
    }
}

impl MicrogameHandle for Beach {
    fn input_handler(&mut self) -> Option<&mut dyn InputHandler> {
        Some(self)
    }

    fn on_timer(&mut self, tag: TimerTag, ctx: &mut RoundContext<'_>) {
        if tag == SPAWN {
            self.spawn(ctx);
        } else if tag == CLEAN {
            ctx.link().win();
        }
    }

    fn cleanup(&mut self) {
        self.drag = None;
        self.done = true;
    }
}

fn bin_position(extent: Extent) -> Point {
    Point::new(extent.width - 60.0, extent.height - 60.0)
}

fn item_node(index: usize) -> String {
    format!("beach-item-{index}")
}
