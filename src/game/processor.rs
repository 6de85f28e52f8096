//! Request shell around the Action Engine.
//!
//! `GameProcessor` is what a front end talks to: it sanitizes raw text, parses
//! it, and executes it against a snapshot of the session so an engine fault
//! can never leave a half-applied action behind.

use std::sync::Arc;

use log::{error, info};

use crate::config::GameConfig;
use crate::game::engine::{ActionEngine, ActionResult};
use crate::game::errors::GameError;
use crate::game::parser::{self, ParsedCommand, Verb};
use crate::game::state::{GameState, DEFAULT_SESSION_TTL_HOURS};
use crate::game::storage::SessionStore;
use crate::game::world::World;
use crate::logutil::escape_log;
use crate::metrics;
use crate::validation::{self, sanitize_command_input, MAX_INPUT_LEN};

pub const MSG_INTERNAL_FAILURE: &str = "Something went wrong. Nothing has changed.";
pub const MSG_EMPTY_INPUT: &str = "Say something.";

pub struct GameProcessor {
    engine: ActionEngine,
    max_input_len: usize,
    ttl_hours: i64,
}

impl GameProcessor {
    pub fn new(world: Arc<World>) -> Self {
        Self {
            engine: ActionEngine::new(world),
            max_input_len: MAX_INPUT_LEN,
            ttl_hours: DEFAULT_SESSION_TTL_HOURS,
        }
    }

    pub fn from_config(world: Arc<World>, config: &GameConfig) -> Self {
        Self::new(world)
            .with_max_input_len(config.max_input_length)
            .with_ttl_hours(config.session_ttl_hours)
    }

    pub fn with_max_input_len(mut self, max: usize) -> Self {
        self.max_input_len = max;
        self
    }

    pub fn with_ttl_hours(mut self, hours: i64) -> Self {
        self.ttl_hours = hours;
        self
    }

    pub fn engine(&self) -> &ActionEngine {
        &self.engine
    }

    pub fn ttl_hours(&self) -> i64 {
        self.ttl_hours
    }

    pub fn new_game(&self) -> GameState {
        let mut state = self.engine.new_game();
        state.extend_ttl(self.ttl_hours);
        state
    }

    /// Create and persist a new session, returning it with the opening room
    /// description. A session that cannot be saved is deleted again.
    pub fn start_session(&self, store: &SessionStore) -> Result<(GameState, ActionResult), GameError> {
        let mut state = self.new_game();
        let look = ParsedCommand {
            verb: Verb::Look,
            ..Default::default()
        };
        let intro = self.engine.execute(&look, &mut state)?;
        if let Err(e) = store.update_ttl(&mut state, self.ttl_hours) {
            error!("failed to persist new session {}: {}", state.session_id, e);
            let _ = store.delete_session(&state.session_id);
            return Err(e);
        }
        info!("created session {}", state.session_id);
        Ok((state, intro))
    }

    /// Run one line of player input against `state`.
    ///
    /// Never fails: an engine fault restores `state` to its pre-call value and
    /// yields a generic failure result.
    pub fn process(&self, state: &mut GameState, input: &str) -> ActionResult {
        let text = match sanitize_command_input(input, self.max_input_len) {
            Ok(text) => text,
            Err(e) => {
                metrics::record_command("rejected", false);
                return ActionResult::failure(e.to_string());
            }
        };
        if text.is_empty() {
            return ActionResult::failure(MSG_EMPTY_INPUT);
        }

        let command = parser::parse(&text);
        if command.verb == Verb::Unknown {
            metrics::inc_unknown_command();
        }

        let snapshot = state.clone();
        match self.engine.execute(&command, state) {
            Ok(result) => {
                metrics::record_command(command.verb.name(), result.success);
                result
            }
            Err(e) => {
                error!(
                    "session {} fault on '{}': {}; restoring snapshot",
                    snapshot.session_id,
                    escape_log(&text),
                    e
                );
                *state = snapshot;
                metrics::inc_snapshot_restored();
                metrics::record_command(command.verb.name(), false);
                ActionResult::failure(MSG_INTERNAL_FAILURE)
            }
        }
    }

    /// Load → process → extend TTL → save, for one request against the store.
    pub fn handle(&self, store: &SessionStore, session_id: &str, input: &str) -> Result<ActionResult, GameError> {
        let session_id = validation::validate_session_id(session_id)
            .map_err(|e| GameError::NotFound(format!("session '{}': {}", escape_log(session_id), e)))?;
        let Some(mut state) = store.load_session(&session_id)? else {
            return Err(GameError::NotFound(format!("session '{}'", session_id)));
        };
        let result = self.process(&mut state, input);
        store.update_ttl(&mut state, self.ttl_hours)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::world::WorldSource;

    const ROOMS: &str = r#"{
        "cell": {"name": "Cell", "description": "A bare cell.", "is_start": true,
                 "exits": {"north": "hall"}, "items": ["stone"]},
        "hall": {"name": "Hall", "description": "A long hall.", "exits": {"south": "cell"}}
    }"#;
    const OBJECTS: &str = r#"{
        "stone": {"name": "stone", "description": "A smooth stone.", "type": "item",
                  "is_takeable": true, "state": {}, "interactions": []}
    }"#;

    fn processor() -> GameProcessor {
        let world = WorldSource::Documents {
            rooms: ROOMS.to_string(),
            objects: OBJECTS.to_string(),
            flags: "{}".to_string(),
        }
        .load()
        .expect("world");
        GameProcessor::new(Arc::new(world))
    }

    #[test]
    fn process_runs_commands() {
        let processor = processor();
        let mut state = processor.new_game();
        let result = processor.process(&mut state, "take stone");
        assert!(result.success, "{}", result.message);
        assert!(state.has_item("stone"));
    }

    #[test]
    fn overlong_and_empty_input_are_refused() {
        let processor = processor().with_max_input_len(8);
        let mut state = processor.new_game();
        let before = state.clone();
        assert!(!processor.process(&mut state, "take the stone now").success);
        assert!(!processor.process(&mut state, "  \n ").success);
        assert_eq!(state, before);
    }

    #[test]
    fn engine_fault_restores_snapshot() {
        let processor = processor();
        let mut state = processor.new_game();
        state.current_room = "nowhere".to_string();
        let before = state.clone();
        let result = processor.process(&mut state, "north");
        assert!(!result.success);
        assert_eq!(result.message, MSG_INTERNAL_FAILURE);
        assert_eq!(state, before);
    }
}
