use log::debug;

use crate::game::errors::GameError;
use crate::game::inventory::describe_room;
use crate::game::parser::ParsedCommand;
use crate::game::sanity;
use crate::game::state::GameState;
use crate::game::types::Direction;
use crate::game::world::World;

use super::status::CURSE_TURNS;
use super::{display_name, refuse, ActionResult, Step};

pub(super) fn look(world: &World, state: &GameState) -> Step<ActionResult> {
    Ok(ActionResult::success(describe_room(world, state)?))
}

pub(super) fn go(world: &World, command: &ParsedCommand, state: &mut GameState) -> Step<ActionResult> {
    match command.direction {
        Some(direction) => go_direction(world, state, direction),
        None => refuse("Which way do you want to go?"),
    }
}

/// Refuse movement while something holds the player in place.
pub(super) fn check_free_to_leave(world: &World, state: &GameState) -> Step<()> {
    for id in &state.inventory {
        let object_state = state.world.state_of(world, id)?;
        if let Some(target) = object_state.tied_to.as_deref() {
            return refuse(format!(
                "The {} tied to the {} holds you back.",
                display_name(world, id)?,
                display_name(world, target)?
            ));
        }
    }
    Ok(())
}

pub(super) fn go_direction(world: &World, state: &mut GameState, direction: Direction) -> Step<ActionResult> {
    let room = world.get_room(&state.current_room)?;
    let Some(destination) = room.exits.get(&direction) else {
        return refuse("You can't go that way.");
    };

    if let Some(door_id) = room.doors.get(&direction) {
        let door = state.world.state_of(world, door_id)?;
        let name = display_name(world, door_id)?;
        if door.is_locked {
            return refuse(format!("The {} is locked.", name));
        }
        if !door.is_open {
            return refuse(format!("The {} is closed.", name));
        }
    }
    check_free_to_leave(world, state)?;

    state.inside = None;
    Ok(move_to(world, state, destination)?)
}

pub(super) fn back(world: &World, state: &mut GameState) -> Step<ActionResult> {
    let Some(previous) = state.previous_room.clone() else {
        return refuse("You haven't been anywhere yet.");
    };
    let room = world.get_room(&state.current_room)?;
    match room
        .exits
        .iter()
        .find(|(_, destination)| **destination == previous)
        .map(|(direction, _)| *direction)
    {
        Some(direction) => go_direction(world, state, direction),
        None => refuse("You can't find the way back from here."),
    }
}

/// Move the player (and any vehicle they are aboard) into `destination` and
/// apply room-entry effects.
pub(super) fn move_to(world: &World, state: &mut GameState, destination: &str) -> Result<ActionResult, GameError> {
    let room = world.get_room(destination)?;
    let origin = std::mem::replace(&mut state.current_room, destination.to_string());
    debug!("session {} moves {} -> {}", state.session_id, origin, destination);

    if let Some(vehicle) = state.current_vehicle.clone() {
        state.world.items_in_mut(world, &origin)?.retain(|i| *i != vehicle);
        state.world.items_in_mut(world, destination)?.push(vehicle);
    }

    state.previous_room = Some(origin);
    state.rooms_visited.insert(destination.to_string());
    state.moves += 1;

    let mut notifications = Vec::new();
    if room.is_cursed_room && !state.cursed {
        state.cursed = true;
        state.curse_duration = CURSE_TURNS;
        notifications.push("A cold weight settles on your shoulders. You have been cursed.".to_string());
    }

    let entry = sanity::process_room_entry(state, room);
    let mut result = ActionResult::success(describe_room(world, state)?);
    result.room_changed = true;
    result.new_room = Some(destination.to_string());
    result.notifications = notifications;
    result.absorb_sanity(entry);
    Ok(result)
}
