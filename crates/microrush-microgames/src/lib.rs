//! MicroRush — bundled microgame catalog.
//!
//! Each module is one microgame: a `descriptor()` for registration and a
//! handle type holding the per-round state. Rendering goes to the play
//! field as named nodes; timing goes through the round link.

pub mod beach;
pub mod cooking;
pub mod mash;
mod motion;
pub mod reaction;
pub mod solar;
pub mod trash_truck;
pub mod xray;

use microrush_core::microgame::MicrogameDescriptor;

/// Every bundled microgame, in registration order.
#[must_use]
pub fn catalog() -> Vec<MicrogameDescriptor> {
    vec![
        beach::descriptor(),
        cooking::descriptor(),
        xray::descriptor(),
        solar::descriptor(),
        trash_truck::descriptor(),
        mash::descriptor(),
        reaction::descriptor(),
    ]
}

/// Difficulty level used by the canvas microgames: one step every five
/// points.
pub(crate) fn difficulty_level(score: u32) -> f64 {
    f64::from(score / 5)
}
