//! Text renderings of the HUD and the play field.

use std::collections::BTreeMap;
use std::time::Duration;

use microrush_core::surface::{Extent, Hud, Node, PlayField, Screen, Shape, TimerBar, Tone};

const TIMER_CELLS: usize = 20;

/// A HUD that turns every visible change into a line of text.
///
/// Lines are buffered until the host takes them. Timer bar updates only
/// produce a line when the drawn bar actually changes.
#[derive(Debug, Default)]
pub struct ConsoleHud {
    lines: Vec<String>,
    screen: Option<Screen>,
    timer: Option<(usize, bool)>,
}

impl ConsoleHud {
    /// Creates a HUD with nothing buffered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The screen currently shown.
    #[must_use]
    pub fn screen(&self) -> Option<Screen> {
        self.screen
    }

    /// Takes the buffered lines.
    pub fn take_lines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }
}

impl Hud for ConsoleHud {
    fn set_screen_visible(&mut self, screen: Screen, visible: bool) {
        if visible {
            self.screen = Some(screen);
            self.timer = None;
            self.lines.push(format!("== {} ==", screen_title(screen)));
        } else if self.screen == Some(screen) {
            self.screen = None;
        }
    }

    fn render_lives(&mut self, lives: u32) {
        let hearts = "♥".repeat(lives as usize);
        self.lines.push(format!("lives: {hearts} ({lives})"));
    }

    fn render_score(&mut self, score: u32) {
        self.lines.push(format!("score: {score}"));
    }

    fn render_timer(&mut self, bar: TimerBar) {
        let cells = timer_cells(bar.fill);
        if self.timer == Some((cells, bar.urgent)) {
            return;
        }
        self.timer = Some((cells, bar.urgent));
        let drawn = format!("{}{}", "#".repeat(cells), ".".repeat(TIMER_CELLS - cells));
        let marker = if bar.urgent { " !" } else { "" };
        self.lines.push(format!("time: [{drawn}]{marker}"));
    }

    fn set_instruction(&mut self, text: &str, tone: Tone) {
        let prefix = match tone {
            Tone::Neutral => ">>",
            Tone::Success => "++",
            Tone::Failure => "--",
        };
        self.lines.push(format!("{prefix} {text}"));
    }

    fn shake(&mut self, duration: Duration) {
        self.lines
            .push(format!("~~ shake ({} ms) ~~", duration.as_millis()));
    }

    fn render_final_score(&mut self, score: u32) {
        self.lines.push(format!("final score: {score}"));
    }
}

fn screen_title(screen: Screen) -> &'static str {
    match screen {
        Screen::Start => "MICRORUSH (type `start`)",
        Screen::Game => "GAME",
        Screen::GameOver => "GAME OVER (type `restart`)",
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn timer_cells(fill: f64) -> usize {
    let cells = (fill.clamp(0.0, 1.0) * TIMER_CELLS as f64).ceil();
    (cells as usize).min(TIMER_CELLS)
}

/// A play field kept as a sorted node list.
#[derive(Debug, Default)]
pub struct TextPlayField {
    extent: Extent,
    nodes: BTreeMap<String, Node>,
}

impl TextPlayField {
    /// Creates an empty field of the default size.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes on the field.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the field is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// One line per node, ordered by id.
    #[must_use]
    pub fn describe(&self) -> Vec<String> {
        self.nodes
            .values()
            .map(|node| {
                format!(
                    "{} {} @ ({:.0}, {:.0})",
                    node.id,
                    describe_shape(&node.shape),
                    node.at.x,
                    node.at.y
                )
            })
            .collect()
    }
}

impl PlayField for TextPlayField {
    fn extent(&self) -> Extent {
        self.extent
    }

    fn clear(&mut self) {
        self.nodes.clear();
    }

    fn upsert(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), node);
    }

    fn remove(&mut self, id: &str) {
        self.nodes.remove(id);
    }
}

fn describe_shape(shape: &Shape) -> String {
    match shape {
        Shape::Glyph(glyph) => glyph.clone(),
        Shape::Text(text) => format!("\"{text}\""),
        Shape::Meter(fill) => format!("{:.0}%", fill * 100.0),
        Shape::Rect { width, height } => format!("[{width:.0}x{height:.0}]"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use microrush_core::surface::Point;

    #[test]
    fn test_timer_lines_only_on_visible_change() {
        let mut hud = ConsoleHud::new();

        hud.render_timer(TimerBar {
            fill: 1.0,
            urgent: false,
        });
        hud.render_timer(TimerBar {
            fill: 0.99,
            urgent: false,
        });
        hud.render_timer(TimerBar {
            fill: 0.29,
            urgent: true,
        });

        assert_eq!(
            hud.take_lines(),
            vec![
                "time: [####################]".to_owned(),
                "time: [######..............] !".to_owned(),
            ]
        );
    }

    #[test]
    fn test_screen_switch_is_announced() {
        let mut hud = ConsoleHud::new();

        for screen in Screen::ALL {
            hud.set_screen_visible(screen, false);
        }
        hud.set_screen_visible(Screen::GameOver, true);

        assert_eq!(hud.screen(), Some(Screen::GameOver));
        assert_eq!(hud.take_lines(), vec!["== GAME OVER (type `restart`) ==".to_owned()]);
        assert!(hud.take_lines().is_empty());
    }

    #[test]
    fn test_instruction_tone_prefix() {
        let mut hud = ConsoleHud::new();

        hud.set_instruction("¡BIEN!", Tone::Success);
        hud.set_instruction("¡FALLO!", Tone::Failure);
        hud.render_lives(2);

        assert_eq!(
            hud.take_lines(),
            vec![
                "++ ¡BIEN!".to_owned(),
                "-- ¡FALLO!".to_owned(),
                "lives: ♥♥ (2)".to_owned(),
            ]
        );
    }

    #[test]
    fn test_field_describes_nodes_in_id_order() {
        let mut field = TextPlayField::new();
        field.upsert(Node::new("b", Shape::Meter(0.5), Point::new(1.0, 2.0)));
        field.upsert(Node::new("a", Shape::Glyph("🗑️".to_owned()), Point::new(3.4, 4.6)));
        field.upsert(Node::new("c", Shape::Text("hi".to_owned()), Point::default()));
        field.remove("c");

        assert_eq!(
            field.describe(),
            vec!["a 🗑️ @ (3, 5)".to_owned(), "b 50% @ (1, 2)".to_owned()]
        );

        field.clear();
        assert!(field.is_empty());
    }
}
