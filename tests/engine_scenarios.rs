//! End-to-end play-throughs of the sample world.

use duskhollow::game::{GameProcessor, GameState, StateValue, CURSE_TURNS, MAX_LAMP_BATTERY};

mod common;
use common::{processor, room_items, run_all};

fn start() -> (GameProcessor, GameState) {
    let processor = processor();
    let state = processor.new_game();
    (processor, state)
}

#[test]
fn take_examine_drop_in_adjoining_room() {
    let (processor, mut state) = start();
    let initial_inventory = state.inventory.len();

    let moved = processor.process(&mut state, "north");
    assert!(moved.success);
    assert!(moved.room_changed);
    assert_eq!(moved.new_room.as_deref(), Some("graveyard"));

    let taken = processor.process(&mut state, "take iron key");
    assert!(taken.success, "{}", taken.message);
    assert!(taken.inventory_changed);
    assert!(!room_items(&processor, &state, "graveyard").contains(&"iron_key".to_string()));

    let examined = processor.process(&mut state, "examine key");
    assert!(examined.success);
    assert!(!examined.message.is_empty());

    let dropped = processor.process(&mut state, "drop key");
    assert!(dropped.success);
    assert_eq!(state.inventory.len(), initial_inventory);
    assert!(room_items(&processor, &state, "graveyard").contains(&"iron_key".to_string()));
}

#[test]
fn second_lock_reports_already_locked() {
    let (processor, mut state) = start();
    run_all(&processor, &mut state, &["north", "take key"]);

    let first = processor.process(&mut state, "lock door with key");
    assert!(first.success, "{}", first.message);

    let before = state.clone();
    let second = processor.process(&mut state, "lock door with key");
    assert!(!second.success);
    assert!(second.message.contains("already locked"), "{}", second.message);
    assert_eq!(state, before);
}

#[test]
fn dagger_kills_ghoul_in_three_blows() {
    let (processor, mut state) = start();
    run_all(
        &processor,
        &mut state,
        &["north", "open door", "north", "open reliquary", "take dagger", "south", "east"],
    );
    let world = processor.engine().world().clone();

    run_all(&processor, &mut state, &["attack ghoul with dagger", "attack ghoul with dagger"]);
    let ghoul = state.world.state_of(&world, "ghoul").expect("ghoul");
    assert_eq!(ghoul.health, 2);
    assert!(ghoul.is_alive);

    let killing = processor.process(&mut state, "attack ghoul with dagger");
    assert!(killing.success);
    let ghoul = state.world.state_of(&world, "ghoul").expect("ghoul");
    assert_eq!(ghoul.health, 0);
    assert!(!ghoul.is_alive);
    assert!(ghoul.is_dead);
    assert_eq!(state.souls_collected, 1);
    assert!(killing.message.contains("folds into itself"));
    assert!(killing.notifications.iter().any(|n| n.contains("Souls collected: 1")));

    let again = processor.process(&mut state, "attack ghoul with dagger");
    assert!(!again.success);
    assert_eq!(state.souls_collected, 1);
}

#[test]
fn bare_hands_do_one_point() {
    let (processor, mut state) = start();
    run_all(&processor, &mut state, &["north", "east", "attack ghoul"]);
    let world = processor.engine().world().clone();
    assert_eq!(state.world.state_of(&world, "ghoul").expect("ghoul").health, 9);
}

#[test]
fn unrecognised_commands_change_nothing() {
    let (processor, mut state) = start();
    run_all(&processor, &mut state, &["north"]);
    for input in ["dance wildly", "xyzzy", "climb tree", "take moon", "open", "go sideways", "unlock lamp"] {
        let before = state.clone();
        let result = processor.process(&mut state, input);
        assert!(!result.success, "'{}' unexpectedly succeeded", input);
        assert_eq!(state, before, "'{}' mutated state", input);
    }
}

#[test]
fn closed_and_locked_doors_block_movement() {
    let (processor, mut state) = start();
    run_all(&processor, &mut state, &["north", "take key"]);

    let blocked = processor.process(&mut state, "north");
    assert!(!blocked.success);
    assert_eq!(blocked.message, "The chapel door is closed.");
    assert_eq!(state.current_room, "graveyard");

    run_all(&processor, &mut state, &["lock door with key"]);
    let blocked = processor.process(&mut state, "north");
    assert_eq!(blocked.message, "The chapel door is locked.");
    assert!(!processor.process(&mut state, "open door").success);

    run_all(&processor, &mut state, &["unlock door", "open door", "north"]);
    assert_eq!(state.current_room, "chapel");
}

#[test]
fn safe_room_restores_sanity() {
    let (processor, mut state) = start();
    let entered = run_all(&processor, &mut state, &["north"]);
    assert_eq!(entered.sanity_change, -2);
    assert_eq!(state.sanity, 98);

    let chapel = run_all(&processor, &mut state, &["open door", "north"]);
    assert_eq!(chapel.sanity_change, 2);
    assert_eq!(state.sanity, 100);
    assert!(chapel.notifications.iter().any(|n| n == "You feel safer here."));
}

#[test]
fn crypt_is_dark_and_cursed() {
    let (processor, mut state) = start();
    let crypt = run_all(&processor, &mut state, &["north", "down"]);
    assert!(crypt.message.contains("pitch black"));
    assert!(state.cursed);
    assert_eq!(state.curse_duration, CURSE_TURNS - 1);
    assert_eq!(state.sanity, 88);

    let before = state.clone();
    let grope = processor.process(&mut state, "take skull");
    assert!(!grope.success);
    assert_eq!(state, before);
}

#[test]
fn lamp_reveals_crypt_and_treasure_scores() {
    let (processor, mut state) = start();
    let crypt = run_all(&processor, &mut state, &["take lamp", "turn on lamp", "north", "down"]);
    assert!(crypt.message.contains("jewelled skull"), "{}", crypt.message);

    let taken = processor.process(&mut state, "take skull");
    assert!(taken.success);
    assert_eq!(state.score, 50);
    assert!(taken.notifications.iter().any(|n| n.contains("50 points")));
}

#[test]
fn curse_drains_lamp_and_lifts_after_ten_turns() {
    let (processor, mut state) = start();
    run_all(&processor, &mut state, &["take lamp", "turn on lamp", "north", "down"]);
    assert_eq!(state.curse_duration, CURSE_TURNS - 1);

    let battery = state.lamp_battery;
    run_all(&processor, &mut state, &["wait"]);
    assert_eq!(state.lamp_battery, battery - 2);

    for _ in 0..(CURSE_TURNS - 3) {
        run_all(&processor, &mut state, &["wait"]);
    }
    assert!(state.cursed);
    let lifted = run_all(&processor, &mut state, &["wait"]);
    assert!(!state.cursed);
    assert_eq!(state.curse_duration, 0);
    assert!(lifted.notifications.iter().any(|n| n.contains("curse is broken")));

    let battery = state.lamp_battery;
    run_all(&processor, &mut state, &["wait"]);
    assert_eq!(state.lamp_battery, battery - 1);
}

#[test]
fn lamp_dies_when_battery_runs_out() {
    let (processor, mut state) = start();
    run_all(&processor, &mut state, &["take lamp", "turn on lamp"]);
    assert_eq!(state.lamp_battery, MAX_LAMP_BATTERY - 1);
    state.lamp_battery = 1;

    let result = run_all(&processor, &mut state, &["wait"]);
    assert_eq!(state.lamp_battery, 0);
    assert!(result.notifications.iter().any(|n| n.contains("flickers and dies")));
    let world = processor.engine().world().clone();
    assert!(!state.world.state_of(&world, "lamp").expect("lamp").is_on);
    assert!(!processor.process(&mut state, "turn on lamp").success);
}

#[test]
fn treasure_scores_only_once() {
    let (processor, mut state) = start();
    run_all(&processor, &mut state, &["north", "west", "west", "take ring", "drop ring", "take ring"]);
    assert_eq!(state.score, 75);
}

#[test]
fn back_returns_to_previous_room() {
    let (processor, mut state) = start();
    assert!(!processor.process(&mut state, "back").success);
    run_all(&processor, &mut state, &["north", "east"]);
    let back = run_all(&processor, &mut state, &["back"]);
    assert!(back.room_changed);
    assert_eq!(state.current_room, "graveyard");
    assert_eq!(state.moves, 3);
}

#[test]
fn first_matching_interaction_applies_effects_once() {
    let (processor, mut state) = start();
    run_all(&processor, &mut state, &["north"]);
    let sanity = state.sanity;

    let first = run_all(&processor, &mut state, &["read headstone"]);
    assert!(first.message.contains("AND SO WILL YOU"));
    assert_eq!(state.sanity, sanity - 5);
    assert!(!first.notifications.is_empty());
    let world = processor.engine().world().clone();
    assert_eq!(state.flag(&world, "read_epitaph"), Some(StateValue::Bool(true)));

    let second = run_all(&processor, &mut state, &["read headstone"]);
    assert!(second.message.contains("fresher letters are gone"));
    assert_eq!(state.sanity, sanity - 5);
}

#[test]
fn water_cleanses_the_altar() {
    let (processor, mut state) = start();
    run_all(
        &processor,
        &mut state,
        &["north", "east", "take bucket", "fill bucket", "west", "open door", "north"],
    );
    let world = processor.engine().world().clone();
    assert_eq!(state.flag(&world, "altar_cleansed"), Some(StateValue::Bool(false)));

    let poured = run_all(&processor, &mut state, &["pour water on altar"]);
    assert!(poured.message.contains("hisses"));
    assert_eq!(state.flag(&world, "altar_cleansed"), Some(StateValue::Bool(true)));
    assert_eq!(state.world.state_of(&world, "bucket").expect("bucket").liquid_level, 0);
}

#[test]
fn bell_wheel_rings_on_last_position() {
    let (processor, mut state) = start();
    run_all(&processor, &mut state, &["north", "open door", "north", "turn wheel", "turn wheel"]);
    let world = processor.engine().world().clone();
    assert_eq!(state.flag(&world, "bell_rung"), Some(StateValue::Bool(false)));

    let rung = run_all(&processor, &mut state, &["turn wheel"]);
    assert!(rung.message.contains("bell tolls"));
    assert_eq!(state.flag(&world, "bell_rung"), Some(StateValue::Bool(true)));
}

#[test]
fn severe_sanity_triggers_hallucinations() {
    let (processor, mut state) = start();
    state.sanity = 20;
    let result = run_all(&processor, &mut state, &["wait"]);
    assert_eq!(result.notifications.len(), 1);

    state.sanity = 60;
    let result = run_all(&processor, &mut state, &["wait"]);
    assert!(result.notifications.is_empty());
}

#[test]
fn read_only_verbs_do_not_advance_time() {
    let (processor, mut state) = start();
    run_all(&processor, &mut state, &["take lamp", "light lamp"]);
    let before = state.clone();
    run_all(&processor, &mut state, &["look", "inventory", "score", "diagnose", "help"]);
    assert_eq!(state, before);
}
