//! Forward-then-inverse verb pairs restore every field the forward verb touched.

use std::sync::Arc;

use duskhollow::game::{build_world, GameProcessor, GameState, ObjectState, StateValue};

mod common;
use common::{processor, run_all};

fn object(processor: &GameProcessor, state: &GameState, id: &str) -> ObjectState {
    state
        .world
        .state_of(processor.engine().world(), id)
        .expect("object state")
        .clone()
}

#[test]
fn lock_then_unlock() {
    let processor = processor();
    let mut state = processor.new_game();
    run_all(&processor, &mut state, &["north", "take key"]);
    let door = object(&processor, &state, "chapel_door");

    run_all(&processor, &mut state, &["lock door with key"]);
    assert!(object(&processor, &state, "chapel_door").is_locked);
    run_all(&processor, &mut state, &["unlock door with key"]);

    assert_eq!(object(&processor, &state, "chapel_door"), door);
}

#[test]
fn wrong_key_is_refused() {
    let processor = processor();
    let mut state = processor.new_game();
    run_all(&processor, &mut state, &["take lamp", "north", "take key"]);
    let before = state.clone();
    let result = processor.process(&mut state, "lock door with lamp");
    assert!(!result.success);
    assert!(result.message.contains("doesn't fit"));
    assert_eq!(state, before);
}

#[test]
fn tie_then_untie() {
    let processor = processor();
    let mut state = processor.new_game();
    run_all(&processor, &mut state, &["north", "west", "take rope"]);
    let rope = object(&processor, &state, "rope");
    let post = object(&processor, &state, "mooring_post");
    let inventory = state.inventory.clone();

    run_all(&processor, &mut state, &["tie rope to post"]);
    let tied = object(&processor, &state, "rope");
    assert!(tied.is_tied);
    assert_eq!(tied.tied_to.as_deref(), Some("mooring_post"));
    assert_eq!(
        object(&processor, &state, "mooring_post").attached_rope.as_deref(),
        Some("rope")
    );

    // The rope holds the player in place and cannot be dropped.
    let before = state.clone();
    assert!(!processor.process(&mut state, "east").success);
    assert!(!processor.process(&mut state, "drop rope").success);
    assert_eq!(state, before);

    run_all(&processor, &mut state, &["untie post"]);
    assert_eq!(object(&processor, &state, "rope"), rope);
    assert_eq!(object(&processor, &state, "mooring_post"), post);
    assert_eq!(state.inventory, inventory);
}

#[test]
fn rope_only_ties_to_declared_targets() {
    let processor = processor();
    let mut state = processor.new_game();
    run_all(&processor, &mut state, &["north", "west", "take rope", "east"]);
    assert!(!processor.process(&mut state, "tie rope to headstone").success);
    run_all(&processor, &mut state, &["tie rope to yew tree", "untie rope"]);
}

#[test]
fn fill_then_pour() {
    let processor = processor();
    let mut state = processor.new_game();
    run_all(&processor, &mut state, &["north", "east", "take bucket"]);
    let bucket = object(&processor, &state, "bucket");

    run_all(&processor, &mut state, &["fill bucket with water"]);
    let full = object(&processor, &state, "bucket");
    assert_eq!(full.liquid_level, 4);
    assert_eq!(full.liquid.as_deref(), Some("water"));
    assert!(!processor.process(&mut state, "fill bucket").success);

    run_all(&processor, &mut state, &["pour water"]);
    assert_eq!(object(&processor, &state, "bucket"), bucket);
}

#[test]
fn fill_needs_a_liquid_source() {
    let processor = processor();
    let mut state = processor.new_game();
    run_all(&processor, &mut state, &["north", "east", "take bucket", "west"]);
    let before = state.clone();
    let result = processor.process(&mut state, "fill bucket");
    assert!(!result.success);
    assert_eq!(state, before);
}

#[test]
fn inflate_then_deflate() {
    let processor = processor();
    let mut state = processor.new_game();
    let boat = object(&processor, &state, "boat");
    run_all(&processor, &mut state, &["north", "west"]);
    assert!(!processor.process(&mut state, "inflate boat").success);

    run_all(&processor, &mut state, &["take pump", "inflate boat with pump"]);
    assert!(object(&processor, &state, "boat").is_inflated);
    run_all(&processor, &mut state, &["deflate boat"]);
    assert_eq!(object(&processor, &state, "boat"), boat);
}

#[test]
fn board_then_disembark() {
    let processor = processor();
    let mut state = processor.new_game();
    run_all(&processor, &mut state, &["north", "west", "take pump"]);
    assert!(!processor.process(&mut state, "board boat").success);
    run_all(&processor, &mut state, &["inflate boat"]);
    let boat = object(&processor, &state, "boat");
    let vehicle = state.current_vehicle.clone();

    let aboard = run_all(&processor, &mut state, &["board boat"]);
    assert!(aboard.message.contains("clamber"));
    assert_eq!(state.current_vehicle.as_deref(), Some("boat"));
    assert!(object(&processor, &state, "boat").is_occupied);
    assert!(!processor.process(&mut state, "deflate boat").success);

    run_all(&processor, &mut state, &["disembark"]);
    assert_eq!(state.current_vehicle, vehicle);
    assert_eq!(object(&processor, &state, "boat"), boat);
}

#[test]
fn get_out_of_boat_disembarks() {
    let processor = processor();
    let mut state = processor.new_game();
    run_all(&processor, &mut state, &["north", "west", "take pump", "inflate boat"]);
    for phrase in ["get out of boat", "climb out of the boat"] {
        run_all(&processor, &mut state, &["board boat"]);
        let result = processor.process(&mut state, phrase);
        assert!(result.success, "'{}': {}", phrase, result.message);
        assert_eq!(state.current_vehicle, None);
    }
}

#[test]
fn vehicle_travels_with_player() {
    let processor = processor();
    let mut state = processor.new_game();
    run_all(
        &processor,
        &mut state,
        &["north", "west", "take pump", "inflate boat", "board boat", "west"],
    );
    let world = processor.engine().world();
    assert!(state.world.items_in(world, "mere").contains(&"boat".to_string()));
    assert!(!state.world.items_in(world, "boathouse").contains(&"boat".to_string()));
}

#[test]
fn enter_then_exit() {
    let processor = processor();
    let mut state = processor.new_game();
    run_all(&processor, &mut state, &["north", "open door", "north"]);
    let room = state.current_room.clone();
    let inside = state.inside.clone();

    let entered = run_all(&processor, &mut state, &["enter confessional"]);
    assert!(entered.room_changed);
    assert_eq!(state.current_room, "confessional_booth");
    assert_eq!(state.inside.as_deref(), Some("confessional"));

    run_all(&processor, &mut state, &["exit"]);
    assert_eq!(state.current_room, room);
    assert_eq!(state.inside, inside);
}

fn shed_processor() -> GameProcessor {
    let rooms = r#"{
        "yard": {"name": "Yard", "description": "A muddy yard.", "items": ["rope", "hook", "shed"], "is_start": true},
        "shed_inside": {"name": "Shed", "description": "Cobwebs.", "items": ["beam"]}
    }"#;
    let objects = r#"{
        "rope": {"name": "rope", "description": "Hemp.", "type": "item", "is_takeable": true,
                 "capabilities": {"rope": {"targets": ["hook", "beam"]}}, "state": {},
                 "interactions": [{"verb": "untie", "response_base": "The knot slips free.",
                                   "flag_change": {"rope_freed": true}}]},
        "hook": {"name": "hook", "description": "Iron.", "type": "scenery", "state": {}, "interactions": []},
        "beam": {"name": "beam", "description": "Oak.", "type": "scenery", "state": {}, "interactions": []},
        "shed": {"name": "shed", "description": "A lean-to shed.", "type": "scenery",
                 "capabilities": {"enterable": {"destination": "shed_inside", "exit_to": "yard"}},
                 "state": {}, "interactions": []}
    }"#;
    GameProcessor::new(Arc::new(build_world(rooms, objects, "{}").expect("shed world")))
}

#[test]
fn tied_rope_blocks_enter_and_exit() {
    let processor = shed_processor();
    let mut state = processor.new_game();
    run_all(&processor, &mut state, &["take rope", "tie rope to hook"]);

    let before = state.clone();
    let refused = processor.process(&mut state, "enter shed");
    assert!(!refused.success);
    assert!(refused.message.contains("holds you back"), "{}", refused.message);
    assert_eq!(state, before);

    run_all(&processor, &mut state, &["untie rope", "enter shed", "tie rope to beam"]);
    assert_eq!(state.current_room, "shed_inside");
    let before = state.clone();
    assert!(!processor.process(&mut state, "exit").success);
    assert_eq!(state, before);

    run_all(&processor, &mut state, &["untie beam", "exit"]);
    assert_eq!(state.current_room, "yard");
    assert!(state.inventory.contains(&"rope".to_string()));
}

#[test]
fn inverse_verbs_run_authored_interactions() {
    let processor = shed_processor();
    let mut state = processor.new_game();
    run_all(&processor, &mut state, &["take rope", "tie rope to hook"]);
    let untied = run_all(&processor, &mut state, &["untie rope"]);
    assert_eq!(untied.message, "The knot slips free.");
    let world = processor.engine().world().clone();
    assert_eq!(state.flag(&world, "rope_freed"), Some(StateValue::Bool(true)));
}
