//! Cooking: pick the three ingredients of the dish on the order ticket.
//!
//! Ingredients sit in a grid of slots, seven per row, labelled `a`..`n`.
//! Higher scores put more decoys on the counter. A slot can be picked by
//! clicking it or by pressing its letter. Wrong picks only flash the plate;
//! they never fail the round.

use std::time::Duration;

use microrush_core::microgame::{
    InputEvent, InputHandler, MicrogameDescriptor, MicrogameHandle, RoundContext, TimerTag,
};
use microrush_core::rng::shuffle;
use microrush_core::surface::{Extent, Node, Point, Shape};
use tracing::debug;

/// Registration id.
pub const ID: &str = "cooking";

/// HUD instruction.
pub const INSTRUCTION: &str = "¡COCINA EL PLATO!";

/// Delay between the last ingredient and the win.
pub const SERVE_DELAY: Duration = Duration::from_millis(400);

/// How long the plate flashes after a wrong pick.
pub const FLASH_DURATION: Duration = Duration::from_millis(400);

/// A dish and the ingredients it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recipe {
    /// Dish name shown on the ticket.
    pub name: &'static str,
    /// Required ingredients.
    pub ingredients: [&'static str; 3],
}

/// The dishes that can be ordered.
pub const RECIPES: [Recipe; 4] = [
    Recipe {
        name: "PIZZA",
        ingredients: ["🍞", "🍅", "🧀"],
    },
    Recipe {
        name: "HAMBURGUESA",
        ingredients: ["🍔", "🥩", "🥬"],
    },
    Recipe {
        name: "ENSALADA",
        ingredients: ["🥬", "🍅", "🥒"],
    },
    Recipe {
        name: "SUSHI",
        ingredients: ["🍚", "🐟", "🥢"],
    },
];

/// Everything in the pantry, before shuffling.
pub const PANTRY: [&str; 14] = [
    "🍞", "🍅", "🧀", "🍔", "🥩", "🥬", "🥒", "🍚", "🐟", "🥢", "🥚", "🥓", "🍄", "🌽",
];

/// Ingredients on the counter at score zero.
pub const BASE_COUNTER: usize = 8;

const SERVE: TimerTag = TimerTag(1);
const UNFLASH: TimerTag = TimerTag(2);
const COLUMNS: usize = 7;
const CELL: f64 = 50.0;
const GAP: f64 = 10.0;
const PLATE_NODE: &str = "cooking-plate";
const PLATE: &str = "🍳";
const PLATE_WRONG: &str = "🍳❌";
const PLATE_DONE: &str = "✨🥘✨";

/// Descriptor for the catalog.
#[must_use]
pub fn descriptor() -> MicrogameDescriptor {
    MicrogameDescriptor::new(
        ID,
        INSTRUCTION,
        |ctx: &mut RoundContext<'_>| -> Box<dyn MicrogameHandle> { Box::new(Cooking::setup(ctx)) },
    )
}

/// Number of ingredients laid out for `score`: two more every five
/// points, up to the whole pantry.
#[must_use]
pub fn counter_size(score: u32) -> usize {
    let extra = 2 * (score / 5) as usize;
    (BASE_COUNTER + extra).min(PANTRY.len())
}

#[derive(Debug, Clone)]
struct Slot {
    ingredient: &'static str,
    center: Point,
    used: bool,
}

/// Per-round state.
#[derive(Debug)]
pub struct Cooking {
    recipe: Recipe,
    slots: Vec<Slot>,
    found: Vec<&'static str>,
    served: bool,
}

impl Cooking {
    /// Chooses a recipe and lays out its ingredients among shuffled
    /// decoys.
    pub fn setup(ctx: &mut RoundContext<'_>) -> Self {
        let recipe = ctx
            .rng()
            .pick_index(RECIPES.len())
            .map_or(RECIPES[0], |i| RECIPES[i]);

        let mut decoys: Vec<&'static str> = PANTRY
            .iter()
            .copied()
            .filter(|ingredient| !recipe.ingredients.contains(ingredient))
            .collect();
        shuffle(ctx.rng(), &mut decoys);
        let size = counter_size(ctx.score());
        decoys.truncate(size.saturating_sub(recipe.ingredients.len()));

        let mut counter: Vec<&'static str> = recipe.ingredients.to_vec();
        counter.append(&mut decoys);
        shuffle(ctx.rng(), &mut counter);

        let extent = ctx.field().extent();
        let count = counter.len();
        let slots: Vec<Slot> = counter
            .into_iter()
            .enumerate()
            .map(|(index, ingredient)| Slot {
                ingredient,
                center: slot_center(extent, index, count),
                used: false,
            })
            .collect();

        let cooking = Self {
            recipe,
            slots,
            found: Vec::with_capacity(3),
            served: false,
        };
        cooking.draw(ctx, extent);
        debug!(recipe = recipe.name, "order ticket drawn");
        cooking
    }

    /// The dish being cooked.
    #[must_use]
    pub fn recipe(&self) -> Recipe {
        self.recipe
    }

    /// Number of slots on the counter.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Ingredient in slot `index`.
    #[must_use]
    pub fn ingredient_at(&self, index: usize) -> Option<&'static str> {
        self.slots.get(index).map(|slot| slot.ingredient)
    }

    /// Index of the slot holding `ingredient`.
    #[must_use]
    pub fn slot_of(&self, ingredient: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.ingredient == ingredient)
    }

    /// Centre of slot `index`.
    #[must_use]
    pub fn slot_center(&self, index: usize) -> Option<Point> {
        self.slots.get(index).map(|slot| slot.center)
    }

    /// Ingredients found so far.
    #[must_use]
    pub fn found(&self) -> &[&'static str] {
        &self.found
    }

    fn pick(&mut self, ctx: &mut RoundContext<'_>, index: usize) {
        if self.served {
            return;
        }
        let Some(slot) = self.slots.get_mut(index) else {
            return;
        };
        if slot.used {
            return;
        }

        let Some(position) = self
            .recipe
            .ingredients
            .iter()
            .position(|&needed| needed == slot.ingredient)
        else {
            ctx.field().upsert(plate(PLATE_WRONG));
            ctx.link().cancel(UNFLASH);
            ctx.link().schedule(FLASH_DURATION, UNFLASH);
            return;
        };

        slot.used = true;
        self.found.push(slot.ingredient);
        ctx.field().upsert(Node::new(
            slot_node(index),
            Shape::Text(format!("✔{}", slot.ingredient)),
            slot.center,
        ));
        ctx.field().upsert(Node::new(
            ticket_node(position),
            Shape::Glyph("✅".to_owned()),
            ticket_position(position),
        ));

        if self.found.len() == self.recipe.ingredients.len() {
            self.served = true;
            ctx.link().cancel(UNFLASH);
            ctx.field().upsert(plate(PLATE_DONE));
            ctx.link().schedule(SERVE_DELAY, SERVE);
            debug!(recipe = self.recipe.name, "dish complete");
        }
    }

    fn slot_at(&self, at: Point) -> Option<usize> {
        let half = CELL / 2.0;
        self.slots.iter().position(|slot| {
            (at.x - slot.center.x).abs() <= half && (at.y - slot.center.y).abs() <= half
        })
    }

    fn draw(&self, ctx: &mut RoundContext<'_>, extent: Extent) {
        ctx.field().upsert(Node::new(
            "cooking-header",
            Shape::Text(format!("RECETA: {}", self.recipe.name)),
            Point::new(extent.width / 2.0, 16.0),
        ));
        for (position, ingredient) in self.recipe.ingredients.iter().enumerate() {
            ctx.field().upsert(Node::new(
                ticket_node(position),
                Shape::Glyph((*ingredient).to_owned()),
                ticket_position(position),
            ));
        }
        ctx.field().upsert(plate(PLATE));
        for (index, slot) in self.slots.iter().enumerate() {
            ctx.field().upsert(Node::new(
                slot_node(index),
                Shape::Glyph(slot.ingredient.to_owned()),
                slot.center,
            ));
        }
    }
}

impl InputHandler for Cooking {
    fn on_input(&mut self, event: &InputEvent, ctx: &mut RoundContext<'_>) {
        let index = match event {
            InputEvent::Click { at } => self.slot_at(*at),
            InputEvent::Key { key } => slot_for_key(key),
            _ => None,
        };
        if let Some(index) = index {
            self.pick(ctx, index);
        }
    }
}

impl MicrogameHandle for Cooking {
    fn input_handler(&mut self) -> Option<&mut dyn InputHandler> {
        Some(self)
    }

    fn on_timer(&mut self, tag: TimerTag, ctx: &mut RoundContext<'_>) {
        if tag == SERVE {
            ctx.link().win();
        } else if tag == UNFLASH && !self.served {
            ctx.field().upsert(plate(PLATE));
        }
    }

    fn cleanup(&mut self) {
        self.served = true;
    }
}

/// Slot index for a key `a`..`n`.
fn slot_for_key(key: &str) -> Option<usize> {
    let mut chars = key.chars();
    let letter = chars.next()?.to_ascii_lowercase();
    if chars.next().is_some() || !letter.is_ascii_lowercase() {
        return None;
    }
    let index = (letter as usize).checked_sub('a' as usize)?;
    (index < PANTRY.len()).then_some(index)
}

fn slot_center(extent: Extent, index: usize, count: usize) -> Point {
    let rows = count.div_ceil(COLUMNS).max(1);
    let grid_width = COLUMNS as f64 * CELL + (COLUMNS - 1) as f64 * GAP;
    let grid_height = rows as f64 * CELL + (rows - 1) as f64 * GAP;
    let left = (extent.width - grid_width) / 2.0;
    let top = extent.height - grid_height;
    let column = (index % COLUMNS) as f64;
    let row = (index / COLUMNS) as f64;
    Point::new(
        left + column * (CELL + GAP) + CELL / 2.0,
        top + row * (CELL + GAP) + CELL / 2.0,
    )
}

fn ticket_position(position: usize) -> Point {
    Point::new(40.0 + position as f64 * 44.0, 44.0)
}

fn plate(glyph: &str) -> Node {
    Node::new(PLATE_NODE, Shape::Glyph(glyph.to_owned()), Point::new(260.0, 60.0))
}

fn slot_node(index: usize) -> String {
    format!("cooking-slot-{index}")
}

fn ticket_node(position: usize) -> String {
    format!("cooking-ticket-{position}")
}
