//! Rendering surfaces implemented by the host.
//!
//! The orchestrator writes the HUD; microgames draw into the play field.
//! Neither trait knows anything about how a host actually displays them.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A position on the play field, in pixels from the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal offset.
    pub x: f64,
    /// Vertical offset.
    pub y: f64,
}

impl Point {
    /// Creates a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Size of the play field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Default for Extent {
    fn default() -> Self {
        Self {
            width: 520.0,
            height: 220.0,
        }
    }
}

/// The three mutually exclusive screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    /// Title screen shown before the first session.
    Start,
    /// The running game: HUD plus play field.
    Game,
    /// Final score screen.
    GameOver,
}

impl Screen {
    /// Every screen, in display order.
    pub const ALL: [Self; 3] = [Self::Start, Self::Game, Self::GameOver];

    /// Stable name of the screen.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Game => "game",
            Self::GameOver => "game-over",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Colouring of the instruction text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// Default colour.
    Neutral,
    /// Win feedback.
    Success,
    /// Fail feedback.
    Failure,
}

/// Timer bar state for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimerBar {
    /// Remaining fraction of the round, `0.0..=1.0`.
    pub fill: f64,
    /// Whether the urgency colour applies.
    pub urgent: bool,
}

/// HUD write surface owned by the orchestrator.
pub trait Hud: Send {
    /// Shows or hides a screen.
    fn set_screen_visible(&mut self, screen: Screen, visible: bool);

    /// Renders `lives` life icons.
    fn render_lives(&mut self, lives: u32);

    /// Renders the numeric score.
    fn render_score(&mut self, score: u32);

    /// Renders the timer bar.
    fn render_timer(&mut self, bar: TimerBar);

    /// Replaces the instruction text.
    fn set_instruction(&mut self, text: &str, tone: Tone);

    /// Plays the host-wide shake cue.
    fn shake(&mut self, duration: Duration);

    /// Renders the final score on the game-over screen.
    fn render_final_score(&mut self, score: u32);
}

/// What a play field node looks like.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// A single emoji or character.
    Glyph(String),
    /// A line of text.
    Text(String),
    /// A progress meter, `0.0..=1.0`.
    Meter(f64),
    /// A solid rectangle.
    Rect {
        /// Width in pixels.
        width: f64,
        /// Height in pixels.
        height: f64,
    },
}

/// A drawable element identified by a microgame-chosen id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Identifier, unique within the play field.
    pub id: String,
    /// Visual.
    pub shape: Shape,
    /// Anchor position.
    pub at: Point,
}

impl Node {
    /// Creates a node.
    pub fn new(id: impl Into<String>, shape: Shape, at: Point) -> Self {
        Self {
            id: id.into(),
            shape,
            at,
        }
    }
}

/// The interactive area microgames render into.
pub trait PlayField: Send {
    /// Current size of the area.
    fn extent(&self) -> Extent;

    /// Removes every node.
    fn clear(&mut self);

    /// Inserts a node, replacing any node with the same id.
    fn upsert(&mut self, node: Node);

    /// Removes the node with `id`, if present.
    fn remove(&mut self, id: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance_is_euclidean() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_names_are_stable() {
        let names: Vec<&str> = Screen::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["start", "game", "game-over"]);
    }

    #[test]
    fn test_screen_serializes_as_kebab_case() {
        let json = serde_json::to_string(&Screen::GameOver).unwrap();
        assert_eq!(json, "\"game-over\"");
    }
}
