//! Recording surfaces — `Hud` and `PlayField` doubles that keep everything
//! written to them for later assertions.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use microrush_core::surface::{Extent, Hud, Node, PlayField, Screen, TimerBar, Tone};

/// Everything the orchestrator has written to a [`RecordingHud`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HudLog {
    /// Screens currently visible.
    pub visible: BTreeSet<&'static str>,
    /// Screens in the order they were made visible.
    pub screen_history: Vec<Screen>,
    /// Last rendered life count.
    pub lives: Option<u32>,
    /// Last rendered score.
    pub score: Option<u32>,
    /// Every timer bar rendered, oldest first.
    pub timer_bars: Vec<TimerBar>,
    /// Every instruction shown, oldest first.
    pub instructions: Vec<(String, Tone)>,
    /// Shake cues played.
    pub shakes: Vec<Duration>,
    /// Final score, once shown.
    pub final_score: Option<u32>,
}

/// A HUD that records every write.
#[derive(Debug, Default)]
pub struct RecordingHud {
    log: HudLog,
}

impl RecordingHud {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded writes.
    #[must_use]
    pub fn log(&self) -> &HudLog {
        &self.log
    }

    /// The latest instruction text and tone.
    #[must_use]
    pub fn instruction(&self) -> Option<(&str, Tone)> {
        self.log
            .instructions
            .last()
            .map(|(text, tone)| (text.as_str(), *tone))
    }

    /// The latest timer bar.
    #[must_use]
    pub fn timer_bar(&self) -> Option<TimerBar> {
        self.log.timer_bars.last().copied()
    }

    /// The single visible screen, if exactly one is visible.
    #[must_use]
    pub fn active_screen(&self) -> Option<&'static str> {
        if self.log.visible.len() == 1 {
            self.log.visible.iter().next().copied()
        } else {
            None
        }
    }
}

impl Hud for RecordingHud {
    fn set_screen_visible(&mut self, screen: Screen, visible: bool) {
        if visible {
            self.log.visible.insert(screen.name());
            self.log.screen_history.push(screen);
        } else {
            self.log.visible.remove(screen.name());
        }
    }

    fn render_lives(&mut self, lives: u32) {
        self.log.lives = Some(lives);
    }

    fn render_score(&mut self, score: u32) {
        self.log.score = Some(score);
    }

    fn render_timer(&mut self, bar: TimerBar) {
        self.log.timer_bars.push(bar);
    }

    fn set_instruction(&mut self, text: &str, tone: Tone) {
        self.log.instructions.push((text.to_owned(), tone));
    }

    fn shake(&mut self, duration: Duration) {
        self.log.shakes.push(duration);
    }

    fn render_final_score(&mut self, score: u32) {
        self.log.final_score = Some(score);
    }
}

/// A play field that keeps its nodes in a map.
#[derive(Debug)]
pub struct RecordingPlayField {
    extent: Extent,
    nodes: BTreeMap<String, Node>,
    clears: usize,
}

impl Default for RecordingPlayField {
    fn default() -> Self {
        Self::with_extent(Extent::default())
    }
}

impl RecordingPlayField {
    /// Creates an empty field of the default size.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty field of the given size.
    #[must_use]
    pub fn with_extent(extent: Extent) -> Self {
        Self {
            extent,
            nodes: BTreeMap::new(),
            clears: 0,
        }
    }

    /// Looks up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// All nodes, ordered by id.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Ids of nodes whose id starts with `prefix`.
    #[must_use]
    pub fn ids_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.nodes
            .keys()
            .filter(|id| id.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// How many times the field was cleared.
    #[must_use]
    pub fn clears(&self) -> usize {
        self.clears
    }
}

impl PlayField for RecordingPlayField {
    fn extent(&self) -> Extent {
        self.extent
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.clears += 1;
    }

    fn upsert(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), node);
    }

    fn remove(&mut self, id: &str) {
        self.nodes.remove(id);
    }
}
