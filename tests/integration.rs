use std::collections::HashSet;

use dialogue_hues::color::{hue_distance, Color};
use dialogue_hues::pipeline::conflict::{find_conflicts, Conflict};
use dialogue_hues::registry::Registry;
use dialogue_hues::settings::Settings;
use dialogue_hues::store::{self, Document};
use dialogue_hues::Engine;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn unlocked_engine() -> Engine {
    Engine::with_seed(
        Settings {
            auto_lock_detected: false,
            ..Settings::default()
        },
        1234,
    )
}

fn hsl(h: f32, l: f32) -> Color {
    Color::from_hsl(h, 70.0, l, 0.0)
}

fn colors_of(registry: &Registry) -> Vec<(String, Color)> {
    registry.iter().map(|e| (e.key.clone(), e.color)).collect()
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn new_speakers_from_plural_block() {
    let mut engine = unlocked_engine();
    let report = engine.scan_message("Hi! [COLORS:Alice=#ff0000,Bob=#00ff00]");

    assert_eq!(report.blocks, ["[COLORS:Alice=#ff0000,Bob=#00ff00]"]);
    let reg = engine.registry();
    assert_eq!(reg.len(), 2);
    let alice = reg.get("alice").unwrap();
    let bob = reg.get("bob").unwrap();
    assert_eq!(alice.dialogue_count, 1);
    assert_eq!(bob.dialogue_count, 1);
    assert_eq!(alice.color.to_hex(), "#ff0000");
    assert_eq!(bob.color.to_hex(), "#00ff00");
}

#[test]
fn locked_speaker_keeps_color_but_counts() {
    let mut engine = unlocked_engine();
    engine.add("Alice", Some(Color::from_hex("#123456").unwrap()));
    engine.toggle_lock("alice");
    engine.scan_message("[COLOR:Alice=#ffffff]");
    engine.scan_message("[COLOR:Alice=#ffffff]");

    let alice = engine.registry().get("alice").unwrap();
    assert_eq!(alice.color.to_hex(), "#123456");
    assert_eq!(alice.dialogue_count, 2);
}

#[test]
fn single_locked_detection_counts_to_two() {
    let mut engine = unlocked_engine();
    engine.scan_message("[COLOR:Alice=#123456]");
    engine.toggle_lock("alice");
    engine.scan_message("[COLOR:Alice=#ffffff]");

    let alice = engine.registry().get("alice").unwrap();
    assert_eq!(alice.color.to_hex(), "#123456");
    assert_eq!(alice.dialogue_count, 2);
}

#[test]
fn close_colors_conflict_and_one_moves() {
    let mut engine = unlocked_engine();
    engine.add("Alice", Some(hsl(10.0, 50.0)));
    engine.add("Bob", Some(hsl(20.0, 55.0)));

    assert_eq!(engine.find_conflicts(), vec![Conflict::new("alice", "bob")]);

    let before = colors_of(engine.registry());
    let report = engine.auto_resolve();
    let after = colors_of(engine.registry());

    assert_eq!(report.resolved, 1);
    assert!(report.unresolved.is_empty());
    let changed = before.iter().zip(&after).filter(|(b, a)| b != a).count();
    assert_eq!(changed, 1);
}

#[test]
fn invalid_pair_does_not_block_sibling() {
    let mut engine = unlocked_engine();
    let report = engine.scan_message("[COLORS:Carol=notahex,Dave=#abcdef]");

    assert_eq!(report.skipped, 1);
    assert!(engine.registry().get("dave").is_some());
    assert!(engine.registry().get("carol").is_none());
    assert_eq!(engine.registry().len(), 1);
}

// ---------------------------------------------------------------------------
// Cross-module behavior
// ---------------------------------------------------------------------------

#[test]
fn history_is_bounded_after_many_actions() {
    let mut engine = unlocked_engine();
    for i in 0..25 {
        engine.add(&format!("speaker {i}"), None);
    }
    assert!(engine.history().len() <= 20);

    let mut undos = 0;
    while engine.undo() {
        undos += 1;
    }
    assert_eq!(undos, 19);
    assert!(!engine.undo());
}

#[test]
fn undo_restores_previous_registry() {
    let mut engine = unlocked_engine();
    engine.scan_message("[COLOR:Alice=#ff0000]");
    let snapshot = engine.registry().clone();
    engine.recolor("alice", Color::new(0, 0, 255));
    engine.swap("alice", "alice");

    assert!(engine.undo());
    assert_eq!(engine.registry(), &snapshot);
    assert!(engine.redo());
    assert_eq!(
        engine.registry().get("alice").unwrap().color,
        Color::new(0, 0, 255)
    );
}

#[test]
fn both_locked_conflict_surfaces_as_unresolved() {
    let mut engine = unlocked_engine();
    engine.add("Alice", Some(hsl(100.0, 50.0)));
    engine.add("Bob", Some(hsl(105.0, 50.0)));
    engine.toggle_lock("alice");
    engine.toggle_lock("bob");
    let history_len = engine.history().len();

    let report = engine.auto_resolve();
    assert_eq!(report.resolved, 0);
    assert_eq!(report.unresolved.len(), 1);
    assert_eq!(engine.history().len(), history_len);
}

#[test]
fn full_scan_after_edits_rederives_counts() {
    let mut engine = unlocked_engine();
    let transcript = [
        "Alice waves. [COLOR:Alice=#ff0000]",
        "Bob nods. [COLOR:Bob=#0000ff]",
        "Both talk. [COLORS:Alice=#ff0000,Bob=#0000ff]",
    ];
    for message in transcript {
        engine.scan_message(message);
    }
    engine.scan_message("[COLOR:Alice=#ff0000]");
    assert_eq!(engine.registry().get("alice").unwrap().dialogue_count, 3);

    let report = engine.full_scan(transcript);
    assert_eq!(report.blocks.len(), 3);
    assert_eq!(engine.registry().get("alice").unwrap().dialogue_count, 2);
    assert_eq!(engine.registry().get("bob").unwrap().dialogue_count, 2);
}

#[test]
fn prompt_reflects_registry() {
    let mut engine = unlocked_engine();
    engine.scan_message("[COLORS:Alice=#ff0000,Bob=#00ff00]");
    engine.add_alias("alice", "Ally");
    engine.toggle_lock("bob");

    let prompt = engine.prompt();
    assert!(prompt.contains("Alice=#ff0000"));
    assert!(prompt.contains("Never change the colors of: Bob."));
    assert!(prompt.contains("also called ally"));
}

#[test]
fn state_survives_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = store::scope_path(dir.path(), "chat-1");

    let mut engine = unlocked_engine();
    engine.scan_message("[COLORS:Alice=#ff0000,Bob=#00ff00]");
    engine.cycle_style("bob");
    store::save(&engine.document(), &path).unwrap();

    let restored = Engine::from_document(store::load_or_default(&path));
    assert_eq!(restored.registry(), engine.registry());
    assert_eq!(restored.settings(), engine.settings());
}

#[test]
fn corrupt_state_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "[COLORS").unwrap();

    let engine = Engine::from_document(store::load_or_default(&path));
    assert!(engine.registry().is_empty());
    assert_eq!(engine.settings(), &Settings::default());
}

#[test]
fn import_replaces_scope() {
    let mut engine = unlocked_engine();
    engine.add("Alice", None);

    let mut doc = Document::default();
    doc.colors.add("Zed", Color::new(9, 9, 9), false);
    doc.settings.palette = "neon".to_string();
    engine.replace_scope(doc);

    assert!(engine.registry().get("alice").is_none());
    assert_eq!(engine.settings().palette, "neon");
}

#[test]
fn allocation_avoids_existing_colors() {
    let mut engine = unlocked_engine();
    for i in 0..8 {
        engine.add(&format!("speaker {i}"), None);
    }
    let colors: HashSet<Color> = engine.registry().iter().map(|e| e.color).collect();
    assert_eq!(colors.len(), 8);
}

// ---------------------------------------------------------------------------
// Property tests
// ---------------------------------------------------------------------------

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_registry() -> impl Strategy<Value = Vec<(String, (u8, u8, u8))>> {
        proptest::collection::vec(("[a-z]{1,6}", (0u8..=255, 0u8..=255, 0u8..=255)), 0..12)
    }

    fn build(items: &[(String, (u8, u8, u8))]) -> Registry {
        let mut reg = Registry::new();
        for (name, (r, g, b)) in items {
            reg.add(name, Color::new(*r, *g, *b), false);
        }
        reg
    }

    proptest! {
        // Lightness stays mid-band so 8-bit quantization moves s and l by at
        // most one unit. Hue error grows as chroma shrinks, so low-chroma
        // colors get a wider hue tolerance.
        #[test]
        fn hsl_round_trip_within_one(h in 0u16..360, s in 20u8..=100, l in 35u8..=65) {
            let back = Color::from_hsl(h.into(), s.into(), l.into(), 0.0).to_hsl();
            let chroma = f32::from(s) * (100.0 - (2.0 * f32::from(l) - 100.0).abs()) / 100.0;
            let hue_tolerance = if chroma >= 35.0 { 1 } else { (50.0 / chroma).ceil() as u16 };
            prop_assert!(hue_distance(back.h, h) <= hue_tolerance, "h {} -> {} (chroma {})", h, back.h, chroma);
            prop_assert!(back.s.abs_diff(s) <= 1, "s {} -> {}", s, back.s);
            prop_assert!(back.l.abs_diff(l) <= 1, "l {} -> {}", l, back.l);
        }

        #[test]
        fn hex_always_well_formed(h in 0.0f32..360.0, s in 0.0f32..=100.0, l in 0.0f32..=100.0, off in -50.0f32..50.0) {
            let hex = Color::from_hsl(h, s, l, off).to_hex();
            prop_assert_eq!(hex.len(), 7);
            prop_assert!(hex.starts_with('#'));
            prop_assert!(hex[1..].chars().all(|c| c.is_ascii_hexdigit()));
        }

        #[test]
        fn reparsing_same_block_is_idempotent(items in proptest::collection::vec(("[A-Za-z]{1,8}", (0u8..=255, 0u8..=255, 0u8..=255)), 1..6)) {
            let body: Vec<String> = items
                .iter()
                .map(|(n, (r, g, b))| format!("{n}={}", Color::new(*r, *g, *b)))
                .collect();
            let block = format!("[COLORS:{}]", body.join(","));

            let mut engine = unlocked_engine();
            engine.scan_message(&block);
            let once = colors_of(engine.registry());
            engine.scan_message(&block);
            let twice = colors_of(engine.registry());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn conflicts_ignore_insertion_order(items in arb_registry()) {
            let forward = build(&items);
            // Duplicate names keep whichever color was inserted first, so
            // compare only on names that are unique.
            let mut seen = HashSet::new();
            let unique: Vec<_> = items
                .iter()
                .filter(|(n, _)| items.iter().filter(|(m, _)| m == n).count() == 1 && seen.insert(n.clone()))
                .cloned()
                .collect();
            let mut unique_rev = unique.clone();
            unique_rev.reverse();

            let a: HashSet<Conflict> = find_conflicts(&build(&unique)).into_iter().collect();
            let b: HashSet<Conflict> = find_conflicts(&build(&unique_rev)).into_iter().collect();
            prop_assert_eq!(a, b);

            for c in find_conflicts(&forward) {
                prop_assert!(c.a < c.b);
            }
        }
    }
}
