//! Bundled microgames driven through the orchestrator.

use std::sync::Arc;
use std::time::Duration;

use microrush_core::clock::Clock;
use microrush_core::event::GameEventKind;
use microrush_core::microgame::{InputEvent, MicrogameDescriptor};
use microrush_core::rng::{DeterministicRng, SeededRng};
use microrush_core::surface::{Shape, Tone};
use microrush_microgames::{catalog, cooking, mash, reaction};
use microrush_orchestrator::application::orchestrator::Orchestrator;
use microrush_orchestrator::domain::config::GameConfig;
use microrush_orchestrator::domain::pool::MicrogamePool;
use microrush_orchestrator::domain::session::GamePhase;
use microrush_test_support::{FixedClock, MockRng, RecordingHud, RecordingPlayField};

type TestOrchestrator = Orchestrator<RecordingHud, RecordingPlayField>;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn build(
    descriptors: Vec<MicrogameDescriptor>,
    rng: impl DeterministicRng + 'static,
) -> TestOrchestrator {
    let clock: Arc<dyn Clock> = Arc::new(FixedClock::default());
    Orchestrator::new(
        GameConfig::default(),
        MicrogamePool::from_descriptors(descriptors).unwrap(),
        RecordingHud::new(),
        RecordingPlayField::new(),
        Box::new(rng),
        clock,
    )
    .unwrap()
}

fn press(orchestrator: &mut TestOrchestrator, key: &str) {
    orchestrator.route_input(&InputEvent::key(key));
}

#[test]
fn test_idle_player_times_out_of_every_round() {
    let mut orchestrator = build(catalog(), SeededRng::from_seed(7));
    orchestrator.start_game().unwrap();

    orchestrator.advance(ms(20_000)).unwrap();

    assert_eq!(orchestrator.phase(), GamePhase::GameOver);
    assert_eq!(orchestrator.session().score(), 0);
    assert_eq!(orchestrator.pending_tasks(), 0);

    let started: Vec<String> = orchestrator
        .drain_events()
        .into_iter()
        .filter_map(|event| match event.kind {
            GameEventKind::RoundStarted { microgame_id, .. } => Some(microgame_id),
            _ => None,
        })
        .collect();
    assert_eq!(started.len(), 4);
    assert!(started.windows(2).all(|pair| pair[0] != pair[1]));
}

#[test]
fn test_mash_round_is_won_with_space_bar() {
    let mut orchestrator = build(vec![mash::descriptor()], MockRng);
    orchestrator.start_game().unwrap();

    for _ in 0..mash::required_presses(0) {
        press(&mut orchestrator, " ");
    }

    assert_eq!(orchestrator.session().score(), 1);
    assert_eq!(orchestrator.phase(), GamePhase::Resolving);
}

#[test]
fn test_reaction_punishes_early_key_and_rewards_late_key() {
    let mut orchestrator = build(vec![reaction::descriptor()], MockRng);
    orchestrator.start_game().unwrap();

    press(&mut orchestrator, " ");
    assert_eq!(orchestrator.session().lives(), 3);

    orchestrator.advance(ms(1000)).unwrap();
    orchestrator.advance(ms(u64::from(reaction::MIN_WAIT_MS))).unwrap();
    assert_eq!(
        orchestrator.hud().instruction(),
        Some((reaction::GO_INSTRUCTION, Tone::Neutral))
    );

    press(&mut orchestrator, " ");
    assert_eq!(orchestrator.session().score(), 1);
}

#[test]
fn test_cooking_round_is_won_with_slot_keys() {
    let mut orchestrator = build(vec![cooking::descriptor()], SeededRng::from_seed(3));
    orchestrator.start_game().unwrap();

    let letters = "abcdefghijklmn";
    for position in 0..3 {
        let ticket = orchestrator
            .field()
            .node(&format!("cooking-ticket-{position}"))
            .unwrap()
            .shape
            .clone();
        let slot = (0..cooking::PANTRY.len())
            .find(|i| {
                orchestrator
                    .field()
                    .node(&format!("cooking-slot-{i}"))
                    .is_some_and(|node| node.shape == ticket)
            })
            .unwrap();
        press(&mut orchestrator, &letters[slot..=slot]);
    }
    assert!(matches!(
        orchestrator.field().node("cooking-plate").unwrap().shape,
        Shape::Glyph(ref glyph) if glyph == "✨🥘✨"
    ));
    assert_eq!(orchestrator.session().score(), 0);

    orchestrator.advance(cooking::SERVE_DELAY).unwrap();

    assert_eq!(orchestrator.session().score(), 1);
}

#[test]
fn test_microgame_timers_die_with_their_round() {
    // Early key fails the reaction round; its signal timer must not fire
    // into the next round.
    let mut orchestrator = build(vec![reaction::descriptor()], MockRng);
    orchestrator.start_game().unwrap();
    press(&mut orchestrator, "x");

    orchestrator.advance(ms(1000)).unwrap();
    orchestrator.advance(ms(400)).unwrap();

    assert_eq!(
        orchestrator.hud().instruction(),
        Some((reaction::INSTRUCTION, Tone::Neutral))
    );
}

#[test]
fn test_reaction_window_expiry_costs_a_life() {
    let mut orchestrator = build(vec![reaction::descriptor()], MockRng);
    orchestrator.start_game().unwrap();
    let wait = ms(u64::from(reaction::MIN_WAIT_MS));

    orchestrator.advance(wait + reaction::reaction_window(0)).unwrap();

    assert_eq!(orchestrator.session().lives(), 3);
    assert_eq!(orchestrator.session().score(), 0);
    assert_eq!(orchestrator.phase(), GamePhase::Resolving);
}
