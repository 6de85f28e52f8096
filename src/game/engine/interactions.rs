//! Data-driven verbs: examine, read, search, listen, smell, touch, use,
//! push, pull and turn.

use crate::game::errors::GameError;
use crate::game::inventory::{is_open_container, join_names};
use crate::game::parser::{ParsedCommand, Verb};
use crate::game::sanity;
use crate::game::state::GameState;
use crate::game::types::{Capability, GameObject, Interaction, ObjectState};
use crate::game::world::World;

use super::{present, refuse, ActionResult, Step};

pub(super) fn handle(world: &World, command: &ParsedCommand, state: &mut GameState) -> Step<ActionResult> {
    let id = present(world, state, command.object.as_deref(), command.verb)?;
    let object = world.get_object(&id)?;
    let current = state.world.state_of(world, &id)?;
    match object.find_interaction(command.verb, current) {
        Some(interaction) => Ok(apply_interaction(world, state, object, interaction)?),
        None => Ok(ActionResult::success(default_response(
            world,
            state,
            command.verb,
            object,
        )?)),
    }
}

/// Apply an interaction's effects and return its themed response.
pub(super) fn apply_interaction(
    world: &World,
    state: &mut GameState,
    object: &GameObject,
    interaction: &Interaction,
) -> Result<ActionResult, GameError> {
    if !interaction.state_change.is_empty() {
        let object_state = state.world.state_of_mut(world, &object.id)?;
        for assignment in &interaction.state_change {
            object_state
                .set(&assignment.key, &assignment.value)
                .map_err(|reason| GameError::Internal(format!("{}: {}", object.id, reason)))?;
        }
    }
    for (key, value) in &interaction.flag_change {
        state.set_flag(key, value.clone());
    }
    let mut result = ActionResult::success(interaction.response_themed.clone());
    let change = sanity::apply_effect(state, interaction.sanity_effect, object.display_name());
    result.absorb_sanity(change);
    Ok(result)
}

/// Run the first matching interaction for `verb`, if any, after a built-in
/// handler already succeeded. Its response replaces the handler's message.
pub(super) fn follow_up(
    world: &World,
    state: &mut GameState,
    object: &GameObject,
    verb: Verb,
    result: &mut ActionResult,
) -> Result<(), GameError> {
    let current = state.world.state_of(world, &object.id)?;
    if let Some(interaction) = object.find_interaction(verb, current) {
        let extra = apply_interaction(world, state, object, interaction)?;
        result.message = extra.message;
        result.sanity_change += extra.sanity_change;
        result.notifications.extend(extra.notifications);
    }
    Ok(())
}

fn describe_state(world: &World, state: &GameState, object: &GameObject, current: &ObjectState) -> Result<Vec<String>, GameError> {
    let mut lines = Vec::new();
    let name = object.display_name();
    if object.has(Capability::Openable) {
        let status = match (current.is_open, current.is_locked) {
            (true, _) => "open",
            (false, true) => "closed and locked",
            (false, false) => "closed",
        };
        lines.push(format!("The {} is {}.", name, status));
    }
    if object.has(Capability::Container) && is_open_container(world, state, &object.id)? {
        if current.contents.is_empty() {
            lines.push(format!("The {} is empty.", name));
        } else {
            let mut names = Vec::new();
            for id in &current.contents {
                names.push(world.get_object(id)?.display_name().to_string());
            }
            lines.push(format!("Inside you see {}.", join_names(&names)));
        }
    }
    if object.has(Capability::Creature) && current.is_dead {
        lines.push(format!("The {} is dead.", name));
    }
    if object.has(Capability::Light) && current.is_on {
        lines.push(format!("The {} is lit.", name));
    }
    if let Some(liquid) = current.liquid.as_ref().filter(|_| current.liquid_level > 0) {
        lines.push(format!("It holds {}.", liquid));
    }
    if object.has(Capability::Inflatable) {
        let status = if current.is_inflated { "inflated" } else { "deflated" };
        lines.push(format!("It is {}.", status));
    }
    if let Some(target) = current.tied_to.as_deref() {
        lines.push(format!("It is tied to the {}.", world.get_object(target)?.display_name()));
    }
    if let Some(rope) = current.attached_rope.as_deref() {
        lines.push(format!("The {} is tied to it.", world.get_object(rope)?.display_name()));
    }
    if let Some(turn) = &object.capabilities.turnable {
        let positions = turn.positions.max(1);
        lines.push(format!("It is set to position {} of {}.", current.position % positions + 1, positions));
    }
    Ok(lines)
}

fn default_response(world: &World, state: &GameState, verb: Verb, object: &GameObject) -> Result<String, GameError> {
    let name = object.display_name();
    let text = match verb {
        Verb::Examine => {
            let current = state.world.state_of(world, &object.id)?;
            let mut lines = vec![object.description.clone()];
            lines.extend(describe_state(world, state, object, current)?);
            lines.join(" ")
        }
        Verb::Read => format!("There is nothing written on the {}.", name),
        Verb::Search => format!("You search the {} but find nothing unusual.", name),
        Verb::Listen => format!("The {} makes no sound.", name),
        Verb::Smell => format!("The {} smells of damp and old dust.", name),
        Verb::Touch => format!("The {} is cold to the touch.", name),
        Verb::Use => format!("You can't see any obvious way to use the {}.", name),
        Verb::Push | Verb::Pull => format!("The {} doesn't budge.", name),
        _ => format!("Nothing unusual happens to the {}.", name),
    };
    Ok(text)
}

/// TURN: advance a turnable's position, then consult "turn" interactions
/// against the new position.
pub(super) fn turn(world: &World, command: &ParsedCommand, state: &mut GameState) -> Step<ActionResult> {
    let id = present(world, state, command.object.as_deref(), command.verb)?;
    let object = world.get_object(&id)?;

    let Some(spec) = &object.capabilities.turnable else {
        let current = state.world.state_of(world, &id)?;
        return match object.find_interaction(Verb::Turn, current) {
            Some(interaction) => Ok(apply_interaction(world, state, object, interaction)?),
            None => refuse(format!("You can't turn the {}.", object.display_name())),
        };
    };

    let object_state = state.world.state_of_mut(world, &id)?;
    let positions = spec.positions.max(1);
    object_state.position = (object_state.position % positions + 1) % positions;
    let position = object_state.position;

    let mut result = ActionResult::success(format!(
        "You turn the {}. It clicks into position {}.",
        object.display_name(),
        position + 1
    ));
    follow_up(world, state, object, Verb::Turn, &mut result)?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::StateValue;
    use crate::game::world::WorldSource;

    fn test_world() -> World {
        WorldSource::Documents {
            rooms: r#"{"study": {"name": "Study", "description": "Books.", "items": ["diary", "dial", "portrait"], "is_start": true}}"#
                .to_string(),
            objects: r#"{
                "diary": {"name": "diary", "description": "Leather.", "type": "item", "state": {"extra": {"read": false}},
                          "interactions": [
                            {"verb": "read", "condition": {"read": false}, "response_base": "First reading.",
                             "response_themed": "The ink squirms.", "state_change": {"read": true},
                             "flag_change": {"knows_name": true}, "sanity_effect": -5},
                            {"verb": "read", "response_base": "Again.", "response_themed": "The pages are blank now."}
                          ]},
                "dial": {"name": "dial", "description": "Brass.", "type": "scenery",
                         "capabilities": {"turnable": {"positions": 3}}, "state": {},
                         "interactions": [{"verb": "turn", "condition": {"position": 2}, "response_base": "click",
                                           "response_themed": "A drawer slides open."}]},
                "portrait": {"name": "portrait", "description": "A stern face.", "type": "scenery", "state": {}, "interactions": []}
            }"#
            .to_string(),
            flags: "{}".to_string(),
        }
        .load()
        .expect("test world")
    }

    fn cmd(verb: Verb, object: &str) -> ParsedCommand {
        ParsedCommand {
            verb,
            object: Some(object.to_string()),
            ..Default::default()
        }
    }

    fn ok(step: Step<ActionResult>) -> ActionResult {
        match step {
            Ok(result) => result,
            Err(super::super::Halt::Refuse(result)) => result,
            Err(super::super::Halt::Fault(e)) => panic!("fault: {}", e),
        }
    }

    #[test]
    fn test_first_matching_interaction_wins() {
        let world = test_world();
        let mut state = GameState::new("study");
        let first = ok(handle(&world, &cmd(Verb::Read, "diary"), &mut state));
        assert!(first.success);
        assert_eq!(first.message, "The ink squirms.");
        assert_eq!(first.sanity_change, -5);
        assert!(!first.notifications.is_empty());
        assert_eq!(state.sanity, 95);
        assert_eq!(state.flags.get("knows_name"), Some(&StateValue::Bool(true)));

        let second = ok(handle(&world, &cmd(Verb::Read, "diary"), &mut state));
        assert_eq!(second.message, "The pages are blank now.");
        assert_eq!(second.sanity_change, 0);
        assert!(second.notifications.is_empty());
    }

    #[test]
    fn test_default_response_when_no_interaction() {
        let world = test_world();
        let mut state = GameState::new("study");
        let result = ok(handle(&world, &cmd(Verb::Smell, "portrait"), &mut state));
        assert!(result.success);
        assert!(result.message.contains("portrait"));

        let result = ok(handle(&world, &cmd(Verb::Examine, "portrait"), &mut state));
        assert_eq!(result.message, "A stern face.");
    }

    #[test]
    fn test_absent_object_fails_without_mutation() {
        let world = test_world();
        let mut state = GameState::new("study");
        let before = state.clone();
        let result = ok(handle(&world, &cmd(Verb::Examine, "skull"), &mut state));
        assert!(!result.success);
        assert_eq!(state, before);
    }

    #[test]
    fn test_turn_cycles_position_and_triggers() {
        let world = test_world();
        let mut state = GameState::new("study");
        let result = ok(turn(&world, &cmd(Verb::Turn, "dial"), &mut state));
        assert!(result.message.contains("position 2"));
        let result = ok(turn(&world, &cmd(Verb::Turn, "dial"), &mut state));
        assert_eq!(result.message, "A drawer slides open.");
        ok(turn(&world, &cmd(Verb::Turn, "dial"), &mut state));
        assert_eq!(state.world.state_of(&world, "dial").expect("dial").position, 0);

        let result = ok(turn(&world, &cmd(Verb::Turn, "portrait"), &mut state));
        assert!(!result.success);
    }

    #[test]
    fn test_out_of_range_position_wraps_instead_of_overflowing() {
        let world = test_world();
        let mut state = GameState::new("study");
        state.world.state_of_mut(&world, "dial").expect("dial").position = u32::MAX;

        let result = ok(handle(&world, &cmd(Verb::Examine, "dial"), &mut state));
        assert!(result.message.contains("of 3"), "{}", result.message);

        ok(turn(&world, &cmd(Verb::Turn, "dial"), &mut state));
        assert!(state.world.state_of(&world, "dial").expect("dial").position < 3);
    }
}
