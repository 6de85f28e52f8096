//! Item handling: take, drop, put, open, close, inventory and light sources.

use crate::game::inventory::{can_see, container_holding, describe_room, format_inventory, join_names};
use crate::game::parser::{ParsedCommand, Verb};
use crate::game::resolver::reachable;
use crate::game::state::GameState;
use crate::game::types::Capability;
use crate::game::world::World;

use super::interactions::{apply_interaction, follow_up};
use super::{display_name, held, present, refuse, ActionResult, Step};

pub(super) fn take(world: &World, command: &ParsedCommand, state: &mut GameState) -> Step<ActionResult> {
    let id = present(world, state, command.object.as_deref(), Verb::Take)?;
    let object = world.get_object(&id)?;
    let name = object.display_name();

    if state.has_item(&id) {
        return refuse(format!("You already have the {}.", name));
    }
    if state.current_vehicle.as_deref() == Some(id.as_str()) {
        return refuse(format!("You can't take the {} while you're in it.", name));
    }
    if !object.is_takeable {
        return refuse(format!("You can't take the {}.", name));
    }

    let in_room = state
        .world
        .items_in(world, &state.current_room)
        .iter()
        .any(|i| *i == id);
    let scope = reachable(world, state)?;
    let source = if in_room {
        None
    } else {
        match container_holding(world, state, &scope, &id)? {
            Some(container) => Some(container),
            None => return refuse(format!("You can't reach the {}.", name)),
        }
    };

    if let Some(target) = command.target.as_deref() {
        let from = present(world, state, Some(target), Verb::Take)?;
        if source.as_deref() != Some(from.as_str()) {
            return refuse(format!(
                "The {} isn't in the {}.",
                name,
                display_name(world, &from)?
            ));
        }
    }

    match &source {
        Some(container) => state
            .world
            .state_of_mut(world, container)?
            .contents
            .retain(|i| *i != id),
        None => {
            let current_room = state.current_room.clone();
            state
                .world
                .items_in_mut(world, &current_room)?
                .retain(|i| *i != id)
        }
    }
    state.add_item(&id);

    let mut result = ActionResult::success("Taken.").inventory_changed();
    if object.is_treasure && state.scored_treasures.insert(id.clone()) {
        let points = state.add_score(object.treasure_value);
        if points > 0 {
            result.notify(format!("Your score just went up by {} points.", points));
        }
    }
    follow_up(world, state, object, Verb::Take, &mut result)?;
    Ok(result)
}

pub(super) fn drop(world: &World, command: &ParsedCommand, state: &mut GameState) -> Step<ActionResult> {
    let id = held(world, state, command.object.as_deref(), Verb::Drop)?;
    let object = world.get_object(&id)?;
    let object_state = state.world.state_of(world, &id)?;
    if let Some(target) = object_state.tied_to.as_deref() {
        return refuse(format!(
            "The {} is tied to the {}.",
            object.display_name(),
            display_name(world, target)?
        ));
    }

    state.remove_item(&id);
    let current_room = state.current_room.clone();
    state.world.items_in_mut(world, &current_room)?.push(id.clone());

    let mut result = ActionResult::success("Dropped.").inventory_changed();
    follow_up(world, state, object, Verb::Drop, &mut result)?;
    Ok(result)
}

pub(super) fn put(world: &World, command: &ParsedCommand, state: &mut GameState) -> Step<ActionResult> {
    let id = held(world, state, command.object.as_deref(), Verb::Put)?;
    let object = world.get_object(&id)?;
    let name = object.display_name();

    let Some(target_name) = command.target.as_deref() else {
        return refuse(format!("Where do you want to put the {}?", name));
    };
    let target_id = present(world, state, Some(target_name), Verb::Put)?;
    let target = world.get_object(&target_id)?;
    let target_display = target.display_name();

    if target_id == id {
        return refuse(format!("You can't put the {} inside itself.", name));
    }
    if !target.has(Capability::Container) {
        return refuse(format!("You can't put things in the {}.", target_display));
    }
    let object_state = state.world.state_of(world, &id)?;
    if object_state.tied_to.is_some() {
        return refuse(format!("The {} is tied to something.", name));
    }
    if object_state.contents.iter().any(|c| *c == target_id) {
        return refuse(format!("The {} is inside the {}.", target_display, name));
    }
    let target_state = state.world.state_of(world, &target_id)?;
    if target.has(Capability::Openable) && !target_state.is_open {
        return refuse(format!("The {} is closed.", target_display));
    }
    if target_state.contents.len() as u32 >= target.capacity() {
        return refuse(format!("There's no more room in the {}.", target_display));
    }

    state.remove_item(&id);
    state
        .world
        .state_of_mut(world, &target_id)?
        .contents
        .push(id.clone());
    let mut result = ActionResult::success(format!("You put the {} in the {}.", name, target_display)).inventory_changed();
    follow_up(world, state, object, Verb::Put, &mut result)?;
    Ok(result)
}

pub(super) fn open(world: &World, command: &ParsedCommand, state: &mut GameState) -> Step<ActionResult> {
    let id = present(world, state, command.object.as_deref(), Verb::Open)?;
    let object = world.get_object(&id)?;
    let name = object.display_name();
    if !object.has(Capability::Openable) {
        return refuse(format!("You can't open the {}.", name));
    }
    let current = state.world.state_of(world, &id)?;
    if current.is_open {
        return refuse(format!("The {} is already open.", name));
    }
    if current.is_locked {
        return refuse(format!("The {} is locked.", name));
    }

    let object_state = state.world.state_of_mut(world, &id)?;
    object_state.is_open = true;
    let message = if object.has(Capability::Container) && !object_state.contents.is_empty() {
        let contents = object_state.contents.clone();
        let mut names = Vec::with_capacity(contents.len());
        for content in &contents {
            names.push(display_name(world, content)?.to_string());
        }
        format!("Opening the {} reveals {}.", name, join_names(&names))
    } else {
        "Opened.".to_string()
    };

    let mut result = ActionResult::success(message);
    follow_up(world, state, object, Verb::Open, &mut result)?;
    Ok(result)
}

pub(super) fn close(world: &World, command: &ParsedCommand, state: &mut GameState) -> Step<ActionResult> {
    let id = present(world, state, command.object.as_deref(), Verb::Close)?;
    let object = world.get_object(&id)?;
    let name = object.display_name();
    if !object.has(Capability::Openable) {
        return refuse(format!("You can't close the {}.", name));
    }
    if !state.world.state_of(world, &id)?.is_open {
        return refuse(format!("The {} is already closed.", name));
    }

    state.world.state_of_mut(world, &id)?.is_open = false;
    let mut result = ActionResult::success("Closed.");
    follow_up(world, state, object, Verb::Close, &mut result)?;
    Ok(result)
}

pub(super) fn inventory(world: &World, state: &GameState) -> Step<ActionResult> {
    Ok(ActionResult::success(format_inventory(world, state)?))
}

/// TURN ON / TURN OFF. Light sources are handled here; anything else
/// needs a matching interaction.
pub(super) fn switch(world: &World, command: &ParsedCommand, state: &mut GameState, on: bool) -> Step<ActionResult> {
    let verb = if on { Verb::TurnOn } else { Verb::TurnOff };
    let id = present(world, state, command.object.as_deref(), verb)?;
    let object = world.get_object(&id)?;
    let name = object.display_name();

    if !object.has(Capability::Light) {
        let current = state.world.state_of(world, &id)?;
        return match object.find_interaction(verb, current) {
            Some(interaction) => Ok(apply_interaction(world, state, object, interaction)?),
            None => refuse(format!("You can't turn the {} {}.", name, if on { "on" } else { "off" })),
        };
    }

    let current = state.world.state_of(world, &id)?;
    if current.is_on == on {
        return refuse(format!("The {} is already {}.", name, if on { "on" } else { "off" }));
    }
    if on && state.lamp_battery == 0 {
        return refuse(format!("The {} is dead. Nothing happens.", name));
    }

    let could_see = can_see(world, state)?;
    state.world.state_of_mut(world, &id)?.is_on = on;
    let mut result = if on {
        ActionResult::success(format!("The {} flickers on.", name))
    } else {
        ActionResult::success(format!("The {} goes dark.", name))
    };
    if on && !could_see && can_see(world, state)? {
        result.message = format!("{}\n\n{}", result.message, describe_room(world, state)?);
    } else if !on && could_see && !can_see(world, state)? {
        result.notify("It is now pitch black.");
    }
    follow_up(world, state, object, verb, &mut result)?;
    Ok(result)
}
