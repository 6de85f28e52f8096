//! Duskhollow interpreter core.
//!
//! The world is loaded once from JSON documents ([`seed_loader`], [`world`])
//! and is read-only afterwards. Everything a player changes lives in their
//! [`GameState`], including the per-session overlay of room items, container
//! contents and object state. Commands flow parser → engine → result; the
//! [`processor`] wraps that flow with input sanitation, snapshots and
//! persistence through [`storage`].

pub mod engine;
pub mod errors;
pub mod inventory;
pub mod parser;
pub mod processor;
pub mod resolver;
pub mod sanity;
pub mod seed_loader;
pub mod state;
pub mod storage;
pub mod types;
pub mod world;

pub use engine::{rank_for, ActionEngine, ActionResult, CURSE_TURNS, LOW_BATTERY_WARNING, UNARMED_DAMAGE};
pub use errors::GameError;
pub use inventory::{describe_room, format_inventory, locate, Location};
pub use parser::{parse, ParsedCommand, Verb};
pub use processor::GameProcessor;
pub use resolver::{resolve_object_name, ResolveResult};
pub use sanity::{SanityChange, SanityThreshold};
pub use seed_loader::{build_world, load_world_from_dir};
pub use state::{GameState, WorldOverlay, DEFAULT_SESSION_TTL_HOURS};
pub use storage::{SessionStore, SessionStoreBuilder};
pub use types::*;
pub use world::{World, WorldSource};
