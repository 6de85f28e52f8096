//! Per-session game state.
//!
//! `GameState` is plain data mutated only by the action engine through the
//! accessors below. Everything the engine changes about the world for one
//! player lives in its [`WorldOverlay`], so a session serializes completely
//! and two sessions never share mutable world data.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use uuid::Uuid;

use crate::game::errors::GameError;
use crate::game::types::{
    ObjectState, StateValue, GAME_STATE_SCHEMA_VERSION, MAX_LAMP_BATTERY, MAX_SANITY, MAX_SCORE,
};
use crate::game::world::World;

/// Default lifetime of a new session before the store expires it.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Copy-on-write view of the world's mutable parts for one session.
///
/// A room or object absent from the overlay still has its catalog value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct WorldOverlay {
    #[serde(default)]
    pub room_items: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub objects: BTreeMap<String, ObjectState>,
}

impl WorldOverlay {
    pub fn items_in<'a>(&'a self, world: &'a World, room_id: &str) -> &'a [String] {
        if let Some(items) = self.room_items.get(room_id) {
            return items;
        }
        world
            .rooms
            .get(room_id)
            .map(|room| room.items.as_slice())
            .unwrap_or(&[])
    }

    pub fn items_in_mut(&mut self, world: &World, room_id: &str) -> Result<&mut Vec<String>, GameError> {
        if !self.room_items.contains_key(room_id) {
            let items = world.get_room(room_id)?.items.clone();
            self.room_items.insert(room_id.to_string(), items);
        }
        self.room_items
            .get_mut(room_id)
            .ok_or_else(|| GameError::Internal(format!("overlay lost room '{}'", room_id)))
    }

    pub fn state_of<'a>(&'a self, world: &'a World, object_id: &str) -> Result<&'a ObjectState, GameError> {
        match self.objects.get(object_id) {
            Some(state) => Ok(state),
            None => Ok(&world.get_object(object_id)?.state),
        }
    }

    pub fn state_of_mut(&mut self, world: &World, object_id: &str) -> Result<&mut ObjectState, GameError> {
        if !self.objects.contains_key(object_id) {
            let state = world.get_object(object_id)?.state.clone();
            self.objects.insert(object_id.to_string(), state);
        }
        self.objects
            .get_mut(object_id)
            .ok_or_else(|| GameError::Internal(format!("overlay lost object '{}'", object_id)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameState {
    pub session_id: String,
    pub current_room: String,
    #[serde(default)]
    pub previous_room: Option<String>,
    pub inventory: Vec<String>,
    pub flags: BTreeMap<String, StateValue>,
    pub rooms_visited: HashSet<String>,
    pub turn_count: u32,
    pub moves: u32,
    pub sanity: u32,
    pub score: u32,
    pub lamp_battery: u32,
    pub cursed: bool,
    pub blood_moon_active: bool,
    pub lucky: bool,
    pub thief_here: bool,
    pub souls_collected: u32,
    pub curse_duration: u32,
    pub current_vehicle: Option<String>,
    /// Enterable object the player is currently inside.
    #[serde(default)]
    pub inside: Option<String>,
    /// Treasures that have already paid out score.
    #[serde(default)]
    pub scored_treasures: BTreeSet<String>,
    #[serde(default)]
    pub world: WorldOverlay,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl GameState {
    /// Fresh session positioned in `start_room` with the fixed initial values.
    pub fn new(start_room: &str) -> Self {
        let now = Utc::now();
        let mut rooms_visited = HashSet::new();
        rooms_visited.insert(start_room.to_string());
        Self {
            session_id: Uuid::new_v4().to_string(),
            current_room: start_room.to_string(),
            previous_room: None,
            inventory: Vec::new(),
            flags: BTreeMap::new(),
            rooms_visited,
            turn_count: 0,
            moves: 0,
            sanity: MAX_SANITY,
            score: 0,
            lamp_battery: MAX_LAMP_BATTERY,
            cursed: false,
            blood_moon_active: true,
            lucky: false,
            thief_here: false,
            souls_collected: 0,
            curse_duration: 0,
            current_vehicle: None,
            inside: None,
            scored_treasures: BTreeSet::new(),
            world: WorldOverlay::default(),
            created_at: now,
            last_accessed_at: now,
            expires_at: now + Duration::hours(DEFAULT_SESSION_TTL_HOURS),
            schema_version: GAME_STATE_SCHEMA_VERSION,
        }
    }

    pub fn has_item(&self, object_id: &str) -> bool {
        self.inventory.iter().any(|id| id == object_id)
    }

    /// Add to inventory. Returns false if already held.
    pub fn add_item(&mut self, object_id: &str) -> bool {
        if self.has_item(object_id) {
            return false;
        }
        self.inventory.push(object_id.to_string());
        true
    }

    /// Remove from inventory. Returns false if not held.
    pub fn remove_item(&mut self, object_id: &str) -> bool {
        let before = self.inventory.len();
        self.inventory.retain(|id| id != object_id);
        self.inventory.len() != before
    }

    pub fn set_flag(&mut self, key: &str, value: StateValue) {
        self.flags.insert(key.to_string(), value);
    }

    /// Session flag, falling back to the world's initial flags.
    pub fn flag(&self, world: &World, key: &str) -> Option<StateValue> {
        self.flags
            .get(key)
            .or_else(|| world.initial_flag(key))
            .cloned()
    }

    /// Add treasure points, clamped to the maximum score. Returns points applied.
    pub fn add_score(&mut self, points: u32) -> u32 {
        let before = self.score;
        self.score = self.score.saturating_add(points).min(MAX_SCORE);
        self.score - before
    }

    pub fn extend_ttl(&mut self, hours: i64) {
        let now = Utc::now();
        self.last_accessed_at = now;
        self.expires_at = now + Duration::hours(hours);
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn to_value(&self) -> Result<serde_json::Value, GameError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, GameError> {
        let state: GameState = serde_json::from_value(value)?;
        state.check_schema()
    }

    pub fn to_json(&self) -> Result<String, GameError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, GameError> {
        let state: GameState = serde_json::from_str(text)?;
        state.check_schema()
    }

    fn check_schema(self) -> Result<Self, GameError> {
        if self.schema_version != GAME_STATE_SCHEMA_VERSION {
            return Err(GameError::SchemaMismatch {
                entity: "game_state",
                expected: GAME_STATE_SCHEMA_VERSION,
                found: self.schema_version,
            });
        }
        Ok(self)
    }
}
