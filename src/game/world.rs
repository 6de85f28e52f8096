//! World Model: the immutable catalog of rooms, objects and interactions.
//!
//! A [`World`] is built once by the seed loader and shared behind an `Arc`.
//! Per-session mutations (room item lists, object state, container contents)
//! never touch it; they live in the session's
//! [`WorldOverlay`](crate::game::state::WorldOverlay).
//!
//! [`init`] caches one world for the process lifetime. Repeated calls return
//! the cached instance without re-reading or re-validating. [`reset`] drops
//! the cache so tests can construct a clean instance.

use log::debug;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::game::errors::GameError;
use crate::game::seed_loader;
use crate::game::types::{GameObject, Room, StateValue};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct World {
    pub rooms: BTreeMap<String, Room>,
    pub objects: BTreeMap<String, GameObject>,
    pub initial_flags: BTreeMap<String, StateValue>,
    pub start_room: String,
}

impl World {
    pub fn get_room(&self, id: &str) -> Result<&Room, GameError> {
        self.rooms
            .get(id)
            .ok_or_else(|| GameError::NotFound(format!("room '{}'", id)))
    }

    pub fn get_object(&self, id: &str) -> Result<&GameObject, GameError> {
        self.objects
            .get(id)
            .ok_or_else(|| GameError::NotFound(format!("object '{}'", id)))
    }

    /// Themed description for a room. `sanity` is accepted for description
    /// variants but the themed text is currently returned unchanged.
    pub fn get_room_description(&self, id: &str, sanity: u32) -> Result<&str, GameError> {
        let room = self.get_room(id)?;
        debug!("describing room {} at sanity {}", id, sanity);
        Ok(&room.description_themed)
    }

    pub fn initial_flag(&self, key: &str) -> Option<&StateValue> {
        self.initial_flags.get(key)
    }
}

/// Where world documents come from.
#[derive(Debug, Clone)]
pub enum WorldSource {
    /// Directory holding `rooms.json`, `objects.json` and `flags.json`.
    Directory(PathBuf),
    /// In-memory JSON documents.
    Documents {
        rooms: String,
        objects: String,
        flags: String,
    },
}

impl WorldSource {
    pub fn load(&self) -> Result<World, GameError> {
        match self {
            WorldSource::Directory(dir) => seed_loader::load_world_from_dir(dir),
            WorldSource::Documents {
                rooms,
                objects,
                flags,
            } => seed_loader::build_world(rooms, objects, flags),
        }
    }
}

static WORLD: RwLock<Option<Arc<World>>> = RwLock::new(None);

fn poisoned() -> GameError {
    GameError::Internal("world cache lock poisoned".to_string())
}

/// Load `source` into the process-wide cache, or return the already cached
/// world if one is present.
pub fn init(source: &WorldSource) -> Result<Arc<World>, GameError> {
    if let Some(world) = WORLD.read().map_err(|_| poisoned())?.as_ref() {
        return Ok(Arc::clone(world));
    }
    let mut slot = WORLD.write().map_err(|_| poisoned())?;
    if let Some(world) = slot.as_ref() {
        return Ok(Arc::clone(world));
    }
    let world = Arc::new(source.load()?);
    *slot = Some(Arc::clone(&world));
    Ok(world)
}

/// The cached world. Fails with `NotFound` before a successful [`init`].
pub fn current() -> Result<Arc<World>, GameError> {
    WORLD
        .read()
        .map_err(|_| poisoned())?
        .as_ref()
        .cloned()
        .ok_or_else(|| GameError::NotFound("world not loaded".to_string()))
}

/// Drop the cached world.
pub fn reset() {
    match WORLD.write() {
        Ok(mut slot) => *slot = None,
        Err(poisoned) => *poisoned.into_inner() = None,
    }
}
