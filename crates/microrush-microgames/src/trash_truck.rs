//! Trash truck: throw every rubbish bag into a garbage truck driving back
//! and forth.
//!
//! Bags are grabbed with the pointer and thrown with the pointer's last
//! velocity. Loose bags fall under gravity, bounce off the ground and the
//! walls, and count as loaded when they drop into the truck's hopper.

use microrush_core::microgame::{
    InputEvent, InputHandler, MicrogameDescriptor, MicrogameHandle, RoundContext,
};
use microrush_core::surface::{Extent, Node, Point, Shape};
use tracing::debug;

use crate::difficulty_level;
use crate::motion::Sweep;

/// Registration id.
pub const ID: &str = "trashTruck";

/// HUD instruction.
pub const INSTRUCTION: &str = "¡METE LAS BOLSAS AL CAMIÓN!";

/// Downward acceleration per frame.
pub const GRAVITY: f64 = 0.42;

/// Share of vertical speed kept when a bag hits the ground.
pub const BOUNCE: f64 = 0.28;

/// Horizontal speed kept per frame in the air.
pub const FRICTION: f64 = 0.87;

/// Bag radius.
pub const BAG_RADIUS: f64 = 22.0;

const GRAB_SLACK: f64 = 12.0;
const THROW_SCALE: f64 = 0.55;
const GROUND_FRICTION: f64 = 0.82;
const REST_SPEED: f64 = 0.6;
const MAX_BAGS: u32 = 4;
const TRUCK_NODE: &str = "truck";

/// Descriptor for the catalog.
#[must_use]
pub fn descriptor() -> MicrogameDescriptor {
    MicrogameDescriptor::new(
        ID,
        INSTRUCTION,
        |ctx: &mut RoundContext<'_>| -> Box<dyn MicrogameHandle> {
            Box::new(TrashTruck::setup(ctx))
        },
    )
}

/// Truck speed in pixels per frame for `score`.
#[must_use]
pub fn truck_speed(score: u32) -> f64 {
    1.8 + difficulty_level(score) * 0.55
}

/// Number of bags for `score`.
#[must_use]
pub fn bag_count(score: u32) -> usize {
    let level = score / 5;
    (1 + level * 3 / 5).min(MAX_BAGS) as usize
}

/// A rubbish bag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bag {
    /// Centre.
    pub at: Point,
    /// Velocity in pixels per frame.
    pub velocity: Point,
    /// Loaded into the truck.
    pub loaded: bool,
    /// Held by the pointer.
    pub held: bool,
}

#[derive(Debug, Clone, Copy)]
struct Grip {
    bag: usize,
    offset: Point,
}

/// Per-round state.
#[derive(Debug)]
pub struct TrashTruck {
    bound: f64,
    ground_y: f64,
    truck: Sweep,
    truck_height: f64,
    bags: Vec<Bag>,
    grip: Option<Grip>,
    pointer: Point,
    pointer_velocity: Point,
    finished: bool,
}

impl TrashTruck {
    /// Parks the truck at a random spot, lines the bags up on the kerb and
    /// starts the frame loop.
    pub fn setup(ctx: &mut RoundContext<'_>) -> Self {
        let extent = ctx.field().extent();
        let score = ctx.score();
        let ground_y = extent.height * 0.78;
        let truck_width = (extent.width * 0.28).min(145.0);
        let truck_x = ctx
            .rng()
            .next_f64_range(0.0, (extent.width - truck_width).max(0.0));

        let count = bag_count(score);
        let spread = extent.width * 0.7;
        let bags = (0..count)
            .map(|i| {
                let offset = if count == 1 {
                    spread / 2.0
                } else {
                    i as f64 / (count - 1) as f64 * spread
                };
                Bag {
                    at: Point::new(extent.width * 0.15 + offset, ground_y - BAG_RADIUS),
                    velocity: Point::default(),
                    loaded: false,
                    held: false,
                }
            })
            .collect();

        let truck = Self {
            bound: extent.width,
            ground_y,
            truck: Sweep::new(truck_x, truck_width, truck_speed(score), extent.width),
            truck_height: truck_width * 0.58,
            bags,
            grip: None,
            pointer: Point::default(),
            pointer_velocity: Point::default(),
            finished: false,
        };
        truck.draw_ground(ctx, extent);
        truck.draw(ctx);
        ctx.link().request_frame();
        truck
    }

    /// The bags.
    #[must_use]
    pub fn bags(&self) -> &[Bag] {
        &self.bags
    }

    /// Horizontal span of the hopper opening.
    #[must_use]
    pub fn hopper(&self) -> (f64, f64) {
        (
            self.truck.x + self.truck.width * 0.12,
            self.truck.x + self.truck.width * 0.65,
        )
    }

    /// Height of the hopper rim.
    #[must_use]
    pub fn hopper_top(&self) -> f64 {
        self.truck_y() + self.truck_height * 0.08
    }

    /// Where the ground is.
    #[must_use]
    pub fn ground_y(&self) -> f64 {
        self.ground_y
    }

    fn truck_y(&self) -> f64 {
        self.ground_y - self.truck_height
    }

    fn grab(&mut self, at: Point) {
        self.pointer = at;
        self.pointer_velocity = Point::default();
        let reach = BAG_RADIUS + GRAB_SLACK;
        let Some(index) = self
            .bags
            .iter()
            .enumerate()
            .filter(|(_, bag)| !bag.loaded && bag.at.distance(at) < reach)
            .min_by(|(_, a), (_, b)| a.at.distance(at).total_cmp(&b.at.distance(at)))
            .map(|(index, _)| index)
        else {
            return;
        };
        if let Some(bag) = self.bags.get_mut(index) {
            bag.held = true;
            bag.velocity = Point::default();
            self.grip = Some(Grip {
                bag: index,
                offset: Point::new(at.x - bag.at.x, at.y - bag.at.y),
            });
        }
    }

    fn drag(&mut self, at: Point) {
        self.pointer_velocity = Point::new(at.x - self.pointer.x, at.y - self.pointer.y);
        self.pointer = at;
        let Some(grip) = self.grip else {
            return;
        };
        if let Some(bag) = self.bags.get_mut(grip.bag) {
            bag.at = Point::new(at.x - grip.offset.x, at.y - grip.offset.y);
        }
    }

    fn throw(&mut self) {
        let Some(grip) = self.grip.take() else {
            return;
        };
        if let Some(bag) = self.bags.get_mut(grip.bag) {
            bag.held = false;
            bag.velocity = Point::new(
                self.pointer_velocity.x * THROW_SCALE,
                self.pointer_velocity.y * THROW_SCALE,
            );
        }
    }

    fn step(&mut self, ctx: &mut RoundContext<'_>) {
        self.truck.step();
        let (open_left, open_right) = self.hopper();
        let open_top = self.hopper_top();

        for bag in self.bags.iter_mut().filter(|bag| !bag.loaded && !bag.held) {
            bag.velocity.y += GRAVITY;
            bag.at.x += bag.velocity.x;
            bag.at.y += bag.velocity.y;
            bag.velocity.x *= FRICTION;

            if bag.at.y + BAG_RADIUS >= self.ground_y {
                bag.at.y = self.ground_y - BAG_RADIUS;
                bag.velocity.y = -bag.velocity.y * BOUNCE;
                bag.velocity.x *= GROUND_FRICTION;
                if bag.velocity.y.abs() < REST_SPEED {
                    bag.velocity.y = 0.0;
                }
            }
            if bag.at.x - BAG_RADIUS < 0.0 {
                bag.at.x = BAG_RADIUS;
                bag.velocity.x = bag.velocity.x.abs() * 0.5;
            }
            if bag.at.x + BAG_RADIUS > self.bound {
                bag.at.x = self.bound - BAG_RADIUS;
                bag.velocity.x = -bag.velocity.x.abs() * 0.5;
            }

            let in_x = bag.at.x > open_left && bag.at.x < open_right;
            let in_y = bag.at.y - BAG_RADIUS < open_top + 18.0
                && bag.at.y + BAG_RADIUS > open_top - 10.0;
            if in_x && in_y && bag.velocity.y > 0.0 {
                bag.loaded = true;
                debug!(x = bag.at.x, "bag loaded");
            }
        }
        self.draw(ctx);

        if self.bags.iter().all(|bag| bag.loaded) {
            self.finished = true;
            ctx.link().win();
        } else {
            ctx.link().request_frame();
        }
    }

    fn draw_ground(&self, ctx: &mut RoundContext<'_>, extent: Extent) {
        ctx.field().upsert(Node::new(
            "truck-ground",
            Shape::Rect {
                width: extent.width,
                height: extent.height - self.ground_y,
            },
            Point::new(extent.width / 2.0, self.ground_y),
        ));
    }

    fn draw(&self, ctx: &mut RoundContext<'_>) {
        let glyph = if self.truck.direction > 0.0 { "🚛" } else { "🚚" };
        ctx.field().upsert(Node::new(
            TRUCK_NODE,
            Shape::Glyph(glyph.to_owned()),
            Point::new(self.truck.center(), self.truck_y()),
        ));
        for (index, bag) in self.bags.iter().enumerate() {
            let id = format!("truck-bag-{index}");
            if bag.loaded {
                ctx.field().remove(&id);
            } else {
                ctx.field()
                    .upsert(Node::new(id, Shape::Glyph("🛍️".to_owned()), bag.at));
            }
        }
        let loaded = self.bags.iter().filter(|bag| bag.loaded).count();
        ctx.field().upsert(Node::new(
            "truck-count",
            Shape::Text(format!("{loaded}/{}", self.bags.len())),
            Point::new(self.bound - 30.0, 16.0),
        ));
    }
}

impl InputHandler for TrashTruck {
    fn on_input(&mut self, event: &InputEvent, _ctx: &mut RoundContext<'_>) {
        match *event {
            InputEvent::PointerDown { at } => self.grab(at),
            InputEvent::PointerMove { at } => self.drag(at),
            InputEvent::PointerUp { at } => {
                self.drag(at);
                self.throw();
            }
            InputEvent::Click { .. } | InputEvent::Key { .. } => {}
        }
    }
}

impl MicrogameHandle for TrashTruck {
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
        self.grip = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use microrush_core::microgame::RoundRequest;
    use microrush_test_support::{MockRng, RoundHarness};

    #[test]
    fn test_bag_count_grows_with_difficulty() {
        assert_eq!(bag_count(0), 1);
        assert_eq!(bag_count(9), 1);
        assert_eq!(bag_count(10), 2);
        assert_eq!(bag_count(25), 4);
        assert_eq!(bag_count(200), 4);
    }

    #[test]
    fn test_truck_speed_grows_with_difficulty() {
        assert!((truck_speed(0) - 1.8).abs() < 1e-9);
        assert!((truck_speed(10) - 2.9).abs() < 1e-9);
    }

    #[test]
    fn test_resting_bag_stays_on_ground() {
        let mut harness = RoundHarness::new(0, MockRng);
        let mut truck = TrashTruck::setup(&mut harness.ctx());
        let start = truck.bags()[0].at;

        harness.frames(&mut truck, 30);

        let bag = truck.bags()[0];
        assert!((bag.at.y - start.y).abs() < 1e-9);
        assert!(!bag.loaded);
    }

    #[test]
    fn test_dropping_bag_into_hopper_loads_it_and_wins() {
        let mut harness = RoundHarness::new(0, MockRng);
        let mut truck = TrashTruck::setup(&mut harness.ctx());
        harness.requests();
        let start = truck.bags()[0].at;
        let (left, right) = truck.hopper();
        let above = Point::new(f64::midpoint(left, right), truck.hopper_top() - 10.0);

        harness.input(&mut truck, &InputEvent::PointerDown { at: start });
        harness.input(&mut truck, &InputEvent::PointerMove { at: above });
        harness.input(&mut truck, &InputEvent::PointerMove { at: above });
        harness.input(&mut truck, &InputEvent::PointerUp { at: above });
        harness.frames(&mut truck, 1);

        assert!(truck.bags()[0].loaded);
        assert_eq!(harness.requests(), vec![RoundRequest::Win]);
        assert!(harness.field().node("truck-bag-0").is_none());
    }

    #[test]
    fn test_held_bag_ignores_gravity() {
        let mut harness = RoundHarness::new(0, MockRng);
        let mut truck = TrashTruck::setup(&mut harness.ctx());
        let start = truck.bags()[0].at;
        let lifted = Point::new(start.x, 20.0);

        harness.input(&mut truck, &InputEvent::PointerDown { at: start });
        harness.input(&mut truck, &InputEvent::PointerMove { at: lifted });
        harness.frames(&mut truck, 10);

        assert_eq!(truck.bags()[0].at, lifted);
    }

    #[test]
    fn test_dropped_bag_settles_on_ground() {
        let mut harness = RoundHarness::new(0, MockRng);
        let mut truck = TrashTruck::setup(&mut harness.ctx());
        let start = truck.bags()[0].at;
        let lifted = Point::new(start.x, 120.0);

        harness.input(&mut truck, &InputEvent::PointerDown { at: start });
        harness.input(&mut truck, &InputEvent::PointerMove { at: lifted });
        harness.input(&mut truck, &InputEvent::PointerUp { at: lifted });
        harness.frames(&mut truck, 40);

        let bag = truck.bags()[0];
        assert!(!bag.loaded);
        assert!((bag.at.y - (truck.ground_y() - BAG_RADIUS)).abs() < 1e-9);
        assert!(bag.velocity.y.abs() < f64::EPSILON);
    }

    #[test]
    fn test_pointer_far_from_bags_grabs_nothing() {
        let mut harness = RoundHarness::new(0, MockRng);
        let mut truck = TrashTruck::setup(&mut harness.ctx());

        harness.input(
            &mut truck,
            &InputEvent::PointerDown {
                at: Point::new(10.0, 10.0),
            },
        );

        assert!(!truck.bags()[0].held);
    }
}
