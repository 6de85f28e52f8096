//! World data loaders
//!
//! A world is three JSON documents under one directory: `rooms.json`,
//! `objects.json` and `flags.json`, each a map keyed by id. Seed structures
//! mirror the JSON format and are converted into validated [`Room`] and
//! [`GameObject`] records. Any missing required field, dangling reference or
//! capability that does not fit the object's kind is a fatal
//! [`GameError::DataIntegrity`].

use log::{error, info};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::mem::discriminant;
use std::path::Path;

use crate::game::errors::GameError;
use crate::game::parser::Verb;
use crate::game::types::{
    Assignment, Capabilities, Capability, Condition, Direction, GameObject, Interaction, ObjectKind, ObjectState,
    Room, StateKey, StateValue,
};
use crate::game::world::World;

pub const ROOMS_FILE: &str = "rooms.json";
pub const OBJECTS_FILE: &str = "objects.json";
pub const FLAGS_FILE: &str = "flags.json";

const ROOMS_DOC: &str = "rooms";
const OBJECTS_DOC: &str = "objects";
const FLAGS_DOC: &str = "flags";

/// Load and validate a world from `dir/{rooms,objects,flags}.json`.
pub fn load_world_from_dir<P: AsRef<Path>>(dir: P) -> Result<World, GameError> {
    let dir = dir.as_ref();
    let rooms = fs::read_to_string(dir.join(ROOMS_FILE))?;
    let objects = fs::read_to_string(dir.join(OBJECTS_FILE))?;
    let flags = fs::read_to_string(dir.join(FLAGS_FILE))?;
    let world = build_world(&rooms, &objects, &flags)?;
    info!(
        "loaded world from {}: {} rooms, {} objects, {} flags",
        dir.display(),
        world.rooms.len(),
        world.objects.len(),
        world.initial_flags.len()
    );
    Ok(world)
}

/// Parse and validate the three world documents.
pub fn build_world(rooms_json: &str, objects_json: &str, flags_json: &str) -> Result<World, GameError> {
    let result = build_world_inner(rooms_json, objects_json, flags_json);
    if let Err(e) = &result {
        error!("world data rejected: {}", e);
    }
    result
}

fn build_world_inner(rooms_json: &str, objects_json: &str, flags_json: &str) -> Result<World, GameError> {
    let room_seeds: BTreeMap<String, RoomSeed> = parse_document(ROOMS_DOC, rooms_json)?;
    let object_seeds: BTreeMap<String, ObjectSeed> = parse_document(OBJECTS_DOC, objects_json)?;
    let initial_flags: BTreeMap<String, StateValue> = parse_document(FLAGS_DOC, flags_json)?;

    let mut objects = BTreeMap::new();
    for (id, seed) in object_seeds {
        let object = convert_object(&id, seed)?;
        objects.insert(id, object);
    }

    let mut rooms = BTreeMap::new();
    for (id, seed) in room_seeds {
        let room = convert_room(&id, seed)?;
        rooms.insert(id, room);
    }

    validate_references(&rooms, &objects)?;
    let start_room = find_start_room(&rooms)?;

    Ok(World {
        rooms,
        objects,
        initial_flags,
        start_room,
    })
}

fn parse_document<T: DeserializeOwned>(document: &'static str, json: &str) -> Result<T, GameError> {
    serde_json::from_str(json)
        .map_err(|e| GameError::integrity(document, "<document>", format!("malformed JSON: {}", e)))
}

// Seed data structures that match the JSON format

#[derive(Debug, Deserialize)]
struct RoomSeed {
    name: Option<String>,
    description: Option<String>,
    #[serde(default)]
    description_themed: Option<String>,
    #[serde(default)]
    exits: BTreeMap<String, String>,
    #[serde(default)]
    doors: BTreeMap<String, String>,
    #[serde(default)]
    items: Vec<String>,
    #[serde(default)]
    sanity_effect: i32,
    #[serde(default)]
    is_safe_room: bool,
    #[serde(default)]
    is_cursed_room: bool,
    #[serde(default)]
    is_dark: bool,
    #[serde(default)]
    liquid_source: Option<String>,
    #[serde(default)]
    is_start: bool,
}

#[derive(Debug, Deserialize)]
struct ObjectSeed {
    name: Option<String>,
    #[serde(default)]
    tone_name: Option<String>,
    description: Option<String>,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(rename = "type")]
    kind: Option<ObjectKind>,
    #[serde(default)]
    is_takeable: bool,
    #[serde(default)]
    is_treasure: bool,
    #[serde(default)]
    treasure_value: u32,
    #[serde(default)]
    capabilities: Capabilities,
    state: Option<ObjectState>,
    interactions: Option<Vec<InteractionSeed>>,
}

#[derive(Debug, Deserialize)]
struct InteractionSeed {
    verb: Option<String>,
    response_base: Option<String>,
    #[serde(default)]
    response_themed: Option<String>,
    #[serde(default)]
    condition: BTreeMap<String, StateValue>,
    #[serde(default)]
    state_change: BTreeMap<String, StateValue>,
    #[serde(default)]
    flag_change: BTreeMap<String, StateValue>,
    #[serde(default)]
    sanity_effect: i32,
}

fn required(document: &'static str, id: &str, field: &str, value: Option<String>) -> Result<String, GameError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(GameError::missing_field(document, id, field)),
    }
}

fn parse_direction(document: &'static str, id: &str, token: &str) -> Result<Direction, GameError> {
    Direction::from_token(&token.to_ascii_lowercase())
        .ok_or_else(|| GameError::integrity(document, id, format!("unknown direction '{}'", token)))
}

fn convert_room(id: &str, seed: RoomSeed) -> Result<Room, GameError> {
    let name = required(ROOMS_DOC, id, "name", seed.name)?;
    let description = required(ROOMS_DOC, id, "description", seed.description)?;
    let description_themed = seed
        .description_themed
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| description.clone());

    let mut exits = BTreeMap::new();
    for (token, destination) in seed.exits {
        exits.insert(parse_direction(ROOMS_DOC, id, &token)?, destination);
    }
    let mut doors = BTreeMap::new();
    for (token, door) in seed.doors {
        let direction = parse_direction(ROOMS_DOC, id, &token)?;
        if !exits.contains_key(&direction) {
            return Err(GameError::integrity(
                ROOMS_DOC,
                id,
                format!("door '{}' guards missing exit '{}'", door, direction),
            ));
        }
        doors.insert(direction, door);
    }

    Ok(Room {
        id: id.to_string(),
        name,
        description,
        description_themed,
        exits,
        doors,
        items: seed.items,
        sanity_effect: seed.sanity_effect,
        is_safe_room: seed.is_safe_room,
        is_cursed_room: seed.is_cursed_room,
        is_dark: seed.is_dark,
        liquid_source: seed.liquid_source,
        is_start: seed.is_start,
    })
}

fn convert_object(id: &str, seed: ObjectSeed) -> Result<GameObject, GameError> {
    let name = required(OBJECTS_DOC, id, "name", seed.name)?;
    let description = required(OBJECTS_DOC, id, "description", seed.description)?;
    let kind = seed
        .kind
        .ok_or_else(|| GameError::missing_field(OBJECTS_DOC, id, "type"))?;
    let mut state = seed
        .state
        .ok_or_else(|| GameError::missing_field(OBJECTS_DOC, id, "state"))?;
    let interaction_seeds = seed
        .interactions
        .ok_or_else(|| GameError::missing_field(OBJECTS_DOC, id, "interactions"))?;
    let capabilities = seed.capabilities;

    for capability in capabilities.declared() {
        if !kind.permits(capability) {
            return Err(GameError::integrity(
                OBJECTS_DOC,
                id,
                format!(
                    "capability '{}' is not allowed on a {}",
                    capability.name(),
                    kind.as_str()
                ),
            ));
        }
    }

    if let Some(creature) = &capabilities.creature {
        if state.health == 0 && !state.is_dead {
            state.health = creature.health;
            state.is_alive = true;
        }
    }
    if let Some(liquid) = &capabilities.liquid {
        if state.liquid_level > liquid.capacity {
            return Err(GameError::integrity(OBJECTS_DOC, id, "liquid_level exceeds capacity"));
        }
    }
    if let Some(turn) = &capabilities.turnable {
        if turn.positions == 0 || state.position >= turn.positions {
            return Err(GameError::integrity(OBJECTS_DOC, id, "position outside turnable range"));
        }
    }
    if !state.contents.is_empty() && capabilities.container.is_none() {
        return Err(GameError::integrity(OBJECTS_DOC, id, "contents declared on a non-container"));
    }

    let mut object = GameObject {
        id: id.to_string(),
        name,
        tone_name: seed.tone_name,
        description,
        aliases: seed.aliases.into_iter().map(|a| a.to_lowercase()).collect(),
        kind,
        is_takeable: seed.is_takeable,
        is_treasure: seed.is_treasure,
        treasure_value: seed.treasure_value,
        capabilities,
        state,
        interactions: Vec::new(),
    };

    let mut interactions = Vec::with_capacity(interaction_seeds.len());
    for (index, seed) in interaction_seeds.into_iter().enumerate() {
        interactions.push(convert_interaction(&object, index, seed)?);
    }
    object.interactions = interactions;
    Ok(object)
}

fn convert_interaction(object: &GameObject, index: usize, seed: InteractionSeed) -> Result<Interaction, GameError> {
    let label = format!("{}#{}", object.id, index);
    let verb_name = required(OBJECTS_DOC, &label, "verb", seed.verb)?;
    let verb = Verb::from_name(&verb_name)
        .ok_or_else(|| GameError::integrity(OBJECTS_DOC, &label, format!("unknown verb '{}'", verb_name)))?;
    if !verb.takes_interactions() {
        return Err(GameError::integrity(
            OBJECTS_DOC,
            &label,
            format!("verb '{}' does not use interactions", verb_name),
        ));
    }
    let response_base = required(OBJECTS_DOC, &label, "response_base", seed.response_base)?;
    let response_themed = seed
        .response_themed
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| response_base.clone());

    let mut condition = Condition::default();
    for (name, value) in seed.condition {
        let key = checked_key(object, &label, &name, &value)?;
        condition.clauses.push((key, value));
    }

    let mut state_change = Vec::new();
    for (name, value) in seed.state_change {
        let key = checked_key(object, &label, &name, &value)?;
        state_change.push(Assignment { key, value });
    }

    Ok(Interaction {
        verb,
        response_base,
        response_themed,
        condition,
        state_change,
        flag_change: seed.flag_change.into_iter().collect(),
        sanity_effect: seed.sanity_effect,
    })
}

/// Resolve a state key and check it against the object's capabilities and
/// declared extension keys.
fn checked_key(object: &GameObject, label: &str, name: &str, value: &StateValue) -> Result<StateKey, GameError> {
    let key = StateKey::parse(name);
    match &key {
        StateKey::Extra(extra) => {
            let declared = object.state.extra.get(extra).ok_or_else(|| {
                GameError::integrity(OBJECTS_DOC, label, format!("undeclared state key '{}'", extra))
            })?;
            if discriminant(declared) != discriminant(value) {
                return Err(GameError::integrity(
                    OBJECTS_DOC,
                    label,
                    format!("value '{}' does not match declared type of '{}'", value, extra),
                ));
            }
        }
        typed => {
            if let Some(capability) = typed.required_capability() {
                if !object.has(capability) {
                    return Err(GameError::integrity(
                        OBJECTS_DOC,
                        label,
                        format!("state key '{}' needs capability '{}'", name, capability.name()),
                    ));
                }
            }
            if !typed.accepts(value) {
                return Err(GameError::integrity(
                    OBJECTS_DOC,
                    label,
                    format!("value '{}' has the wrong type for '{}'", value, name),
                ));
            }
            if let (Some(limit), Some(n)) = (int_limit(object, typed), value.as_int()) {
                if n < 0 || n > i64::from(limit) {
                    return Err(GameError::integrity(
                        OBJECTS_DOC,
                        label,
                        format!("value {} for '{}' is outside 0..={}", n, name, limit),
                    ));
                }
            }
        }
    }
    Ok(key)
}

/// Largest value an integer state key may hold on this object.
fn int_limit(object: &GameObject, key: &StateKey) -> Option<u32> {
    let caps = &object.capabilities;
    match key {
        StateKey::Position => caps.turnable.as_ref().map(|t| t.positions.saturating_sub(1)),
        StateKey::LiquidLevel => caps.liquid.as_ref().map(|l| l.capacity),
        StateKey::Health => caps.creature.as_ref().map(|c| c.health),
        _ => None,
    }
}

fn validate_references(
    rooms: &BTreeMap<String, Room>,
    objects: &BTreeMap<String, GameObject>,
) -> Result<(), GameError> {
    let object_ref = |document: &'static str, owner: &str, what: &str, target: &str| {
        if objects.contains_key(target) {
            Ok(())
        } else {
            Err(GameError::integrity(
                document,
                owner,
                format!("{} references unknown object '{}'", what, target),
            ))
        }
    };
    let room_ref = |document: &'static str, owner: &str, what: &str, target: &str| {
        if rooms.contains_key(target) {
            Ok(())
        } else {
            Err(GameError::integrity(
                document,
                owner,
                format!("{} references unknown room '{}'", what, target),
            ))
        }
    };

    // object id -> where it starts
    let mut placed: HashMap<String, String> = HashMap::new();
    let mut place = |object: &str, location: String| -> Result<(), GameError> {
        if let Some(previous) = placed.get(object) {
            return Err(GameError::integrity(
                OBJECTS_DOC,
                object,
                format!("object starts in both {} and {}", previous, location),
            ));
        }
        placed.insert(object.to_string(), location);
        Ok(())
    };

    for (id, room) in rooms {
        for destination in room.exits.values() {
            room_ref(ROOMS_DOC, id, "exit", destination)?;
        }
        for door in room.doors.values() {
            object_ref(ROOMS_DOC, id, "door", door)?;
            if let Some(obj) = objects.get(door) {
                if obj.kind != ObjectKind::Door {
                    return Err(GameError::integrity(ROOMS_DOC, id, format!("'{}' is not a door", door)));
                }
            }
        }
        for item in &room.items {
            object_ref(ROOMS_DOC, id, "item", item)?;
            place(item, format!("room '{}'", id))?;
        }
    }

    for (id, object) in objects {
        for content in &object.state.contents {
            object_ref(OBJECTS_DOC, id, "contents", content)?;
            if content == id {
                return Err(GameError::integrity(OBJECTS_DOC, id, "object contains itself"));
            }
            place(content, format!("container '{}'", id))?;
        }
        if object.state.contents.len() as u32 > object.capacity() {
            return Err(GameError::integrity(OBJECTS_DOC, id, "contents exceed capacity"));
        }
        let caps = &object.capabilities;
        if let Some(key) = caps.lockable.as_ref().and_then(|l| l.key_id.as_deref()) {
            object_ref(OBJECTS_DOC, id, "lock key", key)?;
        }
        if let Some(rope) = &caps.rope {
            for target in &rope.targets {
                object_ref(OBJECTS_DOC, id, "rope target", target)?;
            }
        }
        if let Some(enter) = &caps.enterable {
            room_ref(OBJECTS_DOC, id, "enter destination", &enter.destination)?;
            room_ref(OBJECTS_DOC, id, "exit destination", &enter.exit_to)?;
        }
        if let Some(pump) = caps.inflatable.as_ref().and_then(|i| i.pump_id.as_deref()) {
            object_ref(OBJECTS_DOC, id, "pump", pump)?;
        }
        if object.state.is_locked && !object.has(Capability::Lockable) {
            return Err(GameError::integrity(OBJECTS_DOC, id, "locked but not lockable"));
        }
    }
    Ok(())
}

fn find_start_room(rooms: &BTreeMap<String, Room>) -> Result<String, GameError> {
    let starts: Vec<&String> = rooms
        .iter()
        .filter(|(_, room)| room.is_start)
        .map(|(id, _)| id)
        .collect();
    match starts.as_slice() {
        [only] => Ok((*only).clone()),
        [] => Err(GameError::integrity(ROOMS_DOC, "<document>", "no room is marked is_start")),
        many => Err(GameError::integrity(
            ROOMS_DOC,
            "<document>",
            format!("{} rooms are marked is_start", many.len()),
        )),
    }
}
