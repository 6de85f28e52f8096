//! Test utilities & fixtures.
//! Loads the sample world shipped under `data/world`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use duskhollow::game::{ActionResult, GameProcessor, GameState, World, WorldSource};

/// Return the path to the sample world documents.
pub fn world_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join("world")
}

pub fn load_world() -> Arc<World> {
    Arc::new(
        WorldSource::Directory(world_dir())
            .load()
            .expect("sample world loads"),
    )
}

pub fn processor() -> GameProcessor {
    GameProcessor::new(load_world())
}

/// Run each command in order, failing the test if any is refused.
#[allow(dead_code)]
pub fn run_all(processor: &GameProcessor, state: &mut GameState, commands: &[&str]) -> ActionResult {
    let mut last = ActionResult::default();
    for command in commands {
        last = processor.process(state, command);
        assert!(last.success, "'{}' failed: {}", command, last.message);
    }
    last
}

/// Object ids lying in a room of the session's world.
#[allow(dead_code)]
pub fn room_items(processor: &GameProcessor, state: &GameState, room: &str) -> Vec<String> {
    state.world.items_in(processor.engine().world(), room).to_vec()
}
