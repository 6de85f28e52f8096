//! Action Engine: verb dispatch, world mutation and result construction.
//!
//! `execute` routes a [`ParsedCommand`] to a verb-family handler. Handlers
//! validate every precondition before mutating anything, so a refused action
//! leaves the session untouched. Ordinary refusals come back as an
//! [`ActionResult`] with `success == false`; only dangling ids and other
//! broken invariants surface as [`GameError`].
//!
//! A successful action that is not read-only ends the turn (see
//! [`status::end_turn`]).

mod combat;
mod interactions;
mod items;
mod movement;
mod paired;
mod status;

pub use combat::UNARMED_DAMAGE;
pub use status::{rank_for, CURSE_TURNS, LOW_BATTERY_WARNING};

use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::game::errors::GameError;
use crate::game::parser::{ParsedCommand, Verb};
use crate::game::resolver::{resolve_among, resolve_object_name, ResolveResult};
use crate::game::sanity::SanityChange;
use crate::game::state::GameState;
use crate::game::world::World;
use crate::logutil::escape_log;

pub const MSG_UNKNOWN: &str = "I don't understand that.";
pub const MSG_UNAVAILABLE: &str = "That isn't available yet.";

/// Report of one executed command. Every mutation it describes has already
/// been applied.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
    pub room_changed: bool,
    pub new_room: Option<String>,
    pub inventory_changed: bool,
    pub sanity_change: i32,
    pub notifications: Vec<String>,
}

impl ActionResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn notify(&mut self, text: impl Into<String>) {
        self.notifications.push(text.into());
    }

    pub(crate) fn absorb_sanity(&mut self, change: SanityChange) {
        self.sanity_change += change.delta;
        self.notifications.extend(change.notifications);
    }

    pub(crate) fn inventory_changed(mut self) -> Self {
        self.inventory_changed = true;
        self
    }
}

/// Why a handler stopped early.
pub(crate) enum Halt {
    /// Ordinary gameplay refusal; nothing was mutated.
    Refuse(ActionResult),
    /// Broken invariant.
    Fault(GameError),
}

impl From<GameError> for Halt {
    fn from(e: GameError) -> Self {
        Halt::Fault(e)
    }
}

pub(crate) type Step<T> = Result<T, Halt>;

pub(crate) fn refuse<T>(message: impl Into<String>) -> Step<T> {
    Err(Halt::Refuse(ActionResult::failure(message)))
}

fn verb_phrase(verb: Verb) -> String {
    verb.name().replace('_', " ")
}

fn ambiguity(world: &World, ids: &[String]) -> Step<String> {
    let mut names = Vec::with_capacity(ids.len());
    for id in ids {
        names.push(format!("the {}", world.get_object(id)?.display_name()));
    }
    refuse(format!("Which do you mean: {}?", names.join(" or ")))
}

/// Resolve a noun phrase among everything the player can reach.
pub(crate) fn present(world: &World, state: &GameState, name: Option<&str>, verb: Verb) -> Step<String> {
    let Some(name) = name else {
        return refuse(format!("What do you want to {}?", verb_phrase(verb)));
    };
    match resolve_object_name(world, state, name)? {
        ResolveResult::Found(id) => Ok(id),
        ResolveResult::Ambiguous(ids) => ambiguity(world, &ids),
        ResolveResult::NotFound => refuse(format!("You don't see any {} here.", name)),
    }
}

/// Resolve a noun phrase among the player's inventory only.
pub(crate) fn held(world: &World, state: &GameState, name: Option<&str>, verb: Verb) -> Step<String> {
    let Some(name) = name else {
        return refuse(format!("What do you want to {}?", verb_phrase(verb)));
    };
    match resolve_among(world, &state.inventory, name)? {
        ResolveResult::Found(id) => Ok(id),
        ResolveResult::Ambiguous(ids) => ambiguity(world, &ids),
        ResolveResult::NotFound => match resolve_object_name(world, state, name)? {
            ResolveResult::Found(id) => refuse(format!(
                "You aren't carrying the {}.",
                world.get_object(&id)?.display_name()
            )),
            _ => refuse(format!("You don't have any {}.", name)),
        },
    }
}

pub(crate) fn display_name<'a>(world: &'a World, id: &str) -> Result<&'a str, GameError> {
    Ok(world.get_object(id)?.display_name())
}

pub struct ActionEngine {
    world: Arc<World>,
}

impl ActionEngine {
    pub fn new(world: Arc<World>) -> Self {
        Self { world }
    }

    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    /// Fresh session positioned in the world's start room.
    pub fn new_game(&self) -> GameState {
        GameState::new(&self.world.start_room)
    }

    pub fn execute(&self, command: &ParsedCommand, state: &mut GameState) -> Result<ActionResult, GameError> {
        let world = self.world.as_ref();
        debug!(
            "session {} verb={} object={} target={} room={}",
            state.session_id,
            command.verb,
            escape_log(command.object.as_deref().unwrap_or("-")),
            escape_log(command.target.as_deref().unwrap_or("-")),
            state.current_room
        );

        let outcome = match command.verb {
            Verb::Unknown => return Ok(ActionResult::failure(MSG_UNKNOWN)),
            Verb::Climb
            | Verb::Jump
            | Verb::Swim
            | Verb::Dig
            | Verb::Give
            | Verb::Throw
            | Verb::Eat
            | Verb::Drink
            | Verb::Pray
            | Verb::Sleep
            | Verb::Burn => return Ok(ActionResult::failure(MSG_UNAVAILABLE)),

            Verb::Look => movement::look(world, state),
            Verb::Go => movement::go(world, command, state),
            Verb::Back => movement::back(world, state),

            Verb::Examine
            | Verb::Read
            | Verb::Search
            | Verb::Listen
            | Verb::Smell
            | Verb::Touch
            | Verb::Use
            | Verb::Push
            | Verb::Pull => interactions::handle(world, command, state),
            Verb::Turn => interactions::turn(world, command, state),

            Verb::Take => items::take(world, command, state),
            Verb::Drop => items::drop(world, command, state),
            Verb::Put => items::put(world, command, state),
            Verb::Open => items::open(world, command, state),
            Verb::Close => items::close(world, command, state),
            Verb::Inventory => items::inventory(world, state),
            Verb::TurnOn => items::switch(world, command, state, true),
            Verb::TurnOff => items::switch(world, command, state, false),

            Verb::Lock => paired::lock(world, command, state),
            Verb::Unlock => paired::unlock(world, command, state),
            Verb::Tie => paired::tie(world, command, state),
            Verb::Untie => paired::untie(world, command, state),
            Verb::Fill => paired::fill(world, command, state),
            Verb::Pour => paired::pour(world, command, state),
            Verb::Board => paired::board(world, command, state),
            Verb::Disembark => paired::disembark(world, command, state),
            Verb::Enter => paired::enter(world, command, state),
            Verb::Exit => paired::exit(world, command, state),
            Verb::Inflate => paired::inflate(world, command, state),
            Verb::Deflate => paired::deflate(world, command, state),

            Verb::Attack => combat::attack(world, command, state),

            Verb::Score => status::score(world, state),
            Verb::Diagnose => status::diagnose(world, state),
            Verb::Help => status::help(),
            Verb::Wait => status::wait(),
        };

        let mut result = match outcome {
            Ok(result) => result,
            Err(Halt::Refuse(result)) => {
                debug!("session {} refused: {}", state.session_id, escape_log(&result.message));
                return Ok(result);
            }
            Err(Halt::Fault(e)) => return Err(e),
        };

        if result.success && !command.verb.is_read_only() {
            status::end_turn(world, state, &mut result)?;
        }
        Ok(result)
    }
}
