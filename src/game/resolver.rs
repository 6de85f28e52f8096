//! Object Name Resolution
//!
//! Resolves the noun phrases the parser extracts ("rusty key", "key") to
//! object ids among the objects the player can currently reach.
//!
//! ## Search scope
//! 1. Player inventory
//! 2. Current room items (only when the player can see)
//! 3. Doors guarding the current room's exits
//! 4. Contents of open containers found in 1-3
//!
//! ## Matching
//! Case-insensitive and whitespace-normalized. An exact match on the name,
//! tone name, an alias or the id wins over partial matches; a partial match
//! requires every query word to appear in the candidate name.

use crate::game::errors::GameError;
use crate::game::inventory::{can_see, is_open_container};
use crate::game::state::GameState;
use crate::game::types::GameObject;
use crate::game::world::World;

/// Result of object name resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveResult {
    /// Single unambiguous match
    Found(String),
    /// Multiple matches - player must clarify
    Ambiguous(Vec<String>),
    /// No matches found
    NotFound,
}

/// Normalize a name for comparison
fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn candidate_names(object: &GameObject) -> impl Iterator<Item = String> + '_ {
    std::iter::once(object.name.as_str())
        .chain(object.tone_name.as_deref())
        .chain(object.aliases.iter().map(String::as_str))
        .chain(std::iter::once(object.id.as_str()))
        .map(normalize_name)
}

fn exact_match(query: &str, object: &GameObject) -> bool {
    candidate_names(object).any(|name| name == query)
}

fn partial_match(query: &str, object: &GameObject) -> bool {
    candidate_names(object).any(|name| {
        let words: Vec<&str> = name.split(' ').collect();
        query.split(' ').all(|q| words.contains(&q))
    })
}

/// Resolve `query` among a fixed list of object ids.
pub fn resolve_among(world: &World, ids: &[String], query: &str) -> Result<ResolveResult, GameError> {
    let query = normalize_name(query);
    if query.is_empty() {
        return Ok(ResolveResult::NotFound);
    }

    let mut exact = Vec::new();
    let mut partial = Vec::new();
    for id in ids {
        let object = world.get_object(id)?;
        if exact_match(&query, object) {
            exact.push(id.clone());
        } else if partial_match(&query, object) {
            partial.push(id.clone());
        }
    }
    let mut matches = if exact.is_empty() { partial } else { exact };
    matches.dedup();

    Ok(match matches.len() {
        0 => ResolveResult::NotFound,
        1 => ResolveResult::Found(matches.remove(0)),
        _ => ResolveResult::Ambiguous(matches),
    })
}

/// Every object id the player can currently reach, in search priority order.
pub fn reachable(world: &World, state: &GameState) -> Result<Vec<String>, GameError> {
    let mut ids: Vec<String> = state.inventory.clone();
    if can_see(world, state)? {
        ids.extend(state.world.items_in(world, &state.current_room).iter().cloned());
        let room = world.get_room(&state.current_room)?;
        for door in room.doors.values() {
            if !ids.contains(door) {
                ids.push(door.clone());
            }
        }
    }

    let mut nested = Vec::new();
    for id in &ids {
        if is_open_container(world, state, id)? {
            nested.extend(state.world.state_of(world, id)?.contents.iter().cloned());
        }
    }
    for id in nested {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

/// Resolve `query` against everything the player can reach.
pub fn resolve_object_name(world: &World, state: &GameState, query: &str) -> Result<ResolveResult, GameError> {
    let scope = reachable(world, state)?;
    resolve_among(world, &scope, query)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::world::WorldSource;

    fn test_world() -> World {
        WorldSource::Documents {
            rooms: r#"{
                "vestry": {"name": "Vestry", "description": "Robes.", "items": ["brass_key", "iron_key", "box"],
                           "exits": {"north": "nave"}, "doors": {"north": "oak_door"}, "is_start": true},
                "nave": {"name": "Nave", "description": "Pews.", "exits": {"south": "vestry"}}
            }"#
            .to_string(),
            objects: r#"{
                "brass_key": {"name": "brass key", "description": "Small.", "type": "item", "state": {}, "interactions": []},
                "iron_key": {"name": "iron key", "aliases": ["skeleton key"], "description": "Heavy.", "type": "item", "state": {}, "interactions": []},
                "box": {"name": "box", "description": "Open box.", "type": "container",
                        "capabilities": {"container": {"capacity": 2}}, "state": {"contents": ["ring"]}, "interactions": []},
                "ring": {"name": "ring", "description": "Gold.", "type": "item", "state": {}, "interactions": []},
                "oak_door": {"name": "oak door", "description": "Old oak.", "type": "door",
                             "capabilities": {"openable": true}, "state": {}, "interactions": []}
            }"#
            .to_string(),
            flags: "{}".to_string(),
        }
        .load()
        .expect("test world")
    }

    #[test]
    fn test_exact_and_partial_matching() {
        let world = test_world();
        let state = GameState::new("vestry");
        assert_eq!(
            resolve_object_name(&world, &state, "Brass  Key").expect("resolve"),
            ResolveResult::Found("brass_key".into())
        );
        assert_eq!(
            resolve_object_name(&world, &state, "skeleton key").expect("resolve"),
            ResolveResult::Found("iron_key".into())
        );
        assert_eq!(
            resolve_object_name(&world, &state, "key").expect("resolve"),
            ResolveResult::Ambiguous(vec!["brass_key".into(), "iron_key".into()])
        );
        assert_eq!(
            resolve_object_name(&world, &state, "lantern").expect("resolve"),
            ResolveResult::NotFound
        );
    }

    #[test]
    fn test_scope_includes_doors_and_open_containers() {
        let world = test_world();
        let state = GameState::new("vestry");
        assert_eq!(
            resolve_object_name(&world, &state, "door").expect("resolve"),
            ResolveResult::Found("oak_door".into())
        );
        assert_eq!(
            resolve_object_name(&world, &state, "ring").expect("resolve"),
            ResolveResult::Found("ring".into())
        );
    }

    #[test]
    fn test_other_rooms_out_of_scope() {
        let world = test_world();
        let state = GameState::new("nave");
        assert_eq!(
            resolve_object_name(&world, &state, "box").expect("resolve"),
            ResolveResult::NotFound
        );
    }
}
