//! Object locations, light and player-facing listings.

use crate::game::errors::GameError;
use crate::game::sanity::SanityThreshold;
use crate::game::state::GameState;
use crate::game::types::{Capability, GameObject, ObjectKind};
use crate::game::world::World;

/// One place an object can be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Room(String),
    Inventory,
    Container(String),
}

// ============================================================================
// Location queries
// ============================================================================

/// Every location currently listing `object_id`. A consistent session
/// yields at most one entry.
pub fn locate(world: &World, state: &GameState, object_id: &str) -> Result<Vec<Location>, GameError> {
    let mut found = Vec::new();
    for room_id in world.rooms.keys() {
        if state.world.items_in(world, room_id).iter().any(|id| id == object_id) {
            found.push(Location::Room(room_id.clone()));
        }
    }
    if state.has_item(object_id) {
        found.push(Location::Inventory);
    }
    for (id, object) in &world.objects {
        if !object.has(Capability::Container) {
            continue;
        }
        if state
            .world
            .state_of(world, id)?
            .contents
            .iter()
            .any(|c| c == object_id)
        {
            found.push(Location::Container(id.clone()));
        }
    }
    Ok(found)
}

/// Whether the object is a container whose contents can be seen and reached.
pub fn is_open_container(world: &World, state: &GameState, object_id: &str) -> Result<bool, GameError> {
    let object = world.get_object(object_id)?;
    if !object.has(Capability::Container) {
        return Ok(false);
    }
    Ok(!object.has(Capability::Openable) || state.world.state_of(world, object_id)?.is_open)
}

/// Open container in `candidates` that currently holds `object_id`.
pub fn container_holding(
    world: &World,
    state: &GameState,
    candidates: &[String],
    object_id: &str,
) -> Result<Option<String>, GameError> {
    for candidate in candidates {
        if is_open_container(world, state, candidate)?
            && state
                .world
                .state_of(world, candidate)?
                .contents
                .iter()
                .any(|c| c == object_id)
        {
            return Ok(Some(candidate.clone()));
        }
    }
    Ok(None)
}

/// First light source in inventory that is switched on.
pub fn lit_light(world: &World, state: &GameState) -> Result<Option<String>, GameError> {
    for id in &state.inventory {
        if world.get_object(id)?.has(Capability::Light) && state.world.state_of(world, id)?.is_on {
            return Ok(Some(id.clone()));
        }
    }
    Ok(None)
}

/// The player can see the current room: it is lit, or they carry a lit light.
pub fn can_see(world: &World, state: &GameState) -> Result<bool, GameError> {
    let room = world.get_room(&state.current_room)?;
    Ok(!room.is_dark || lit_light(world, state)?.is_some())
}

// ============================================================================
// Listings
// ============================================================================

fn names(world: &World, ids: &[String]) -> Result<Vec<String>, GameError> {
    ids.iter()
        .map(|id| world.get_object(id).map(|o| o.display_name().to_string()))
        .collect()
}

/// Join names as "a, b and c".
pub fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [one] => one.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

fn contents_line(world: &World, state: &GameState, object: &GameObject) -> Result<Option<String>, GameError> {
    if !is_open_container(world, state, &object.id)? {
        return Ok(None);
    }
    let contents = &state.world.state_of(world, &object.id)?.contents;
    if contents.is_empty() {
        return Ok(None);
    }
    Ok(Some(format!(
        "The {} holds {}.",
        object.display_name(),
        join_names(&names(world, contents)?)
    )))
}

pub fn format_inventory(world: &World, state: &GameState) -> Result<String, GameError> {
    if state.inventory.is_empty() {
        return Ok("You are empty-handed.".to_string());
    }
    let mut lines = vec!["You are carrying:".to_string()];
    for id in &state.inventory {
        let object = world.get_object(id)?;
        let object_state = state.world.state_of(world, id)?;
        let mut line = format!("  {}", object.display_name());
        if object.has(Capability::Light) && object_state.is_on {
            line.push_str(" (lit)");
        }
        if object.has(Capability::Liquid) {
            if let Some(liquid) = &object_state.liquid {
                line.push_str(&format!(" (full of {})", liquid));
            }
        }
        lines.push(line);
        if let Some(contents) = contents_line(world, state, object)? {
            lines.push(format!("    {}", contents));
        }
    }
    Ok(lines.join("\n"))
}

/// Full description of the player's current room.
pub fn describe_room(world: &World, state: &GameState) -> Result<String, GameError> {
    let room = world.get_room(&state.current_room)?;
    if !can_see(world, state)? {
        return Ok(format!(
            "{}\nIt is pitch black. Something shifts in the darkness nearby.",
            room.name
        ));
    }

    let mut lines = vec![
        room.name.clone(),
        world
            .get_room_description(&room.id, state.sanity)?
            .to_string(),
    ];

    let items = state.world.items_in(world, &room.id);
    let mut visible = Vec::new();
    for id in items {
        let object = world.get_object(id)?;
        if object.kind != ObjectKind::Scenery {
            visible.push(object.display_name().to_string());
        }
    }
    if !visible.is_empty() {
        lines.push(format!("You see {} here.", join_names(&visible)));
    }
    for id in items {
        if let Some(contents) = contents_line(world, state, world.get_object(id)?)? {
            lines.push(contents);
        }
    }

    if let Some(vehicle) = &state.current_vehicle {
        lines.push(format!("You are aboard the {}.", world.get_object(vehicle)?.display_name()));
    }

    let exits: Vec<String> = room.exits.keys().map(|d| d.to_string()).collect();
    if exits.is_empty() {
        lines.push("There is no obvious way out.".to_string());
    } else {
        lines.push(format!("Exits: {}.", exits.join(", ")));
    }

    if SanityThreshold::classify(state.sanity) == SanityThreshold::Garbled {
        lines.push("The room will not hold still.".to_string());
    }
    Ok(lines.join("\n"))
}

// ============================================================================
// Unit Tests
// ============================================================================
