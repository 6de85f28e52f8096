use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use sled::IVec;

use crate::game::errors::GameError;
use crate::game::state::{GameState, DEFAULT_SESSION_TTL_HOURS};

const TREE_SESSIONS: &str = "duskhollow_sessions";
const SESSION_PREFIX: &str = "sessions:";

/// Helper builder so tests can easily create throwaway stores with custom paths.
pub struct SessionStoreBuilder {
    path: PathBuf,
    ttl_hours: i64,
}

impl SessionStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ttl_hours: DEFAULT_SESSION_TTL_HOURS,
        }
    }

    /// Lifetime granted to a session each time it is touched.
    pub fn ttl_hours(mut self, hours: i64) -> Self {
        self.ttl_hours = hours;
        self
    }

    pub fn open(self) -> Result<SessionStore, GameError> {
        SessionStore::open_with_ttl(self.path, self.ttl_hours)
    }
}

/// Sled-backed persistence for per-session game state. Values are the
/// state's JSON text.
pub struct SessionStore {
    _db: sled::Db,
    sessions: sled::Tree,
    ttl_hours: i64,
}

impl SessionStore {
    /// Open (or create) the session store rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GameError> {
        Self::open_with_ttl(path, DEFAULT_SESSION_TTL_HOURS)
    }

    fn open_with_ttl<P: AsRef<Path>>(path: P, ttl_hours: i64) -> Result<Self, GameError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let sessions = db.open_tree(TREE_SESSIONS)?;
        debug!("opened session store at {}", path_ref.display());
        Ok(Self {
            _db: db,
            sessions,
            ttl_hours,
        })
    }

    pub fn ttl_hours(&self) -> i64 {
        self.ttl_hours
    }

    fn session_key(session_id: &str) -> Vec<u8> {
        format!("{}{}", SESSION_PREFIX, session_id).into_bytes()
    }

    fn deserialize(bytes: IVec) -> Result<GameState, GameError> {
        let text = std::str::from_utf8(&bytes)
            .map_err(|e| GameError::Internal(format!("session bytes are not UTF-8: {}", e)))?;
        GameState::from_json(text)
    }

    /// Fetch a live session. Expired sessions are purged and reported absent.
    pub fn load_session(&self, session_id: &str) -> Result<Option<GameState>, GameError> {
        let key = Self::session_key(session_id);
        let Some(bytes) = self.sessions.get(&key)? else {
            return Ok(None);
        };
        let state = Self::deserialize(bytes)?;
        if state.is_expired(Utc::now()) {
            info!("session {} expired at {}; purging", session_id, state.expires_at);
            self.sessions.remove(&key)?;
            self.sessions.flush()?;
            return Ok(None);
        }
        Ok(Some(state))
    }

    /// Insert or update a session.
    pub fn save_session(&self, state: &GameState) -> Result<(), GameError> {
        let key = Self::session_key(&state.session_id);
        self.sessions.insert(key, state.to_json()?.into_bytes())?;
        self.sessions.flush()?;
        Ok(())
    }

    /// Remove a session. Returns whether one existed.
    pub fn delete_session(&self, session_id: &str) -> Result<bool, GameError> {
        let existed = self.sessions.remove(Self::session_key(session_id))?.is_some();
        self.sessions.flush()?;
        Ok(existed)
    }

    /// Push the session's expiry `hours` into the future and persist it.
    pub fn update_ttl(&self, state: &mut GameState, hours: i64) -> Result<(), GameError> {
        state.extend_ttl(hours);
        self.save_session(state)
    }

    /// Extend the session by the store's configured lifetime and persist it.
    pub fn touch(&self, state: &mut GameState) -> Result<(), GameError> {
        self.update_ttl(state, self.ttl_hours)
    }

    pub fn list_session_ids(&self) -> Result<Vec<String>, GameError> {
        let mut ids = Vec::new();
        for entry in self.sessions.scan_prefix(SESSION_PREFIX.as_bytes()) {
            let (key, _) = entry?;
            let key = String::from_utf8_lossy(&key);
            if let Some(id) = key.strip_prefix(SESSION_PREFIX) {
                ids.push(id.to_string());
            }
        }
        Ok(ids)
    }

    /// Remove every session that expired at or before `now`. Unreadable
    /// records are removed too.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, GameError> {
        let mut purged = 0;
        for entry in self.sessions.scan_prefix(SESSION_PREFIX.as_bytes()) {
            let (key, value) = entry?;
            let expired = match Self::deserialize(value) {
                Ok(state) => state.is_expired(now),
                Err(e) => {
                    warn!("dropping unreadable session {}: {}", String::from_utf8_lossy(&key), e);
                    true
                }
            };
            if expired {
                self.sessions.remove(&key)?;
                purged += 1;
            }
        }
        self.sessions.flush()?;
        if purged > 0 {
            info!("purged {} expired sessions", purged);
        }
        Ok(purged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn store_round_trip_session() {
        let dir = TempDir::new().expect("tempdir");
        let store = SessionStoreBuilder::new(dir.path()).open().expect("store");
        let mut state = GameState::new("foyer");
        state.add_item("candle");
        store.save_session(&state).expect("save");
        let loaded = store.load_session(&state.session_id).expect("load").expect("present");
        assert_eq!(loaded, state);
        assert!(store.delete_session(&state.session_id).expect("delete"));
        assert!(store.load_session(&state.session_id).expect("load").is_none());
        assert!(!store.delete_session(&state.session_id).expect("delete"));
    }

    #[test]
    fn expired_session_reads_as_absent() {
        let dir = TempDir::new().expect("tempdir");
        let store = SessionStoreBuilder::new(dir.path()).ttl_hours(1).open().expect("store");
        let mut state = GameState::new("foyer");
        store.update_ttl(&mut state, -1).expect("ttl");
        assert!(store.load_session(&state.session_id).expect("load").is_none());
        assert!(store.list_session_ids().expect("list").is_empty());
    }

    #[test]
    fn touch_uses_configured_lifetime() {
        let dir = TempDir::new().expect("tempdir");
        let store = SessionStoreBuilder::new(dir.path()).ttl_hours(3).open().expect("store");
        assert_eq!(store.ttl_hours(), 3);
        let mut state = GameState::new("foyer");
        store.touch(&mut state).expect("touch");

        let expected = Utc::now() + chrono::Duration::hours(3);
        let drift = (state.expires_at - expected).num_seconds().abs();
        assert!(drift < 60, "expiry off by {}s", drift);
        let saved = store.load_session(&state.session_id).expect("load").expect("present");
        assert_eq!(saved.expires_at, state.expires_at);
    }

    #[test]
    fn purge_only_removes_expired() {
        let dir = TempDir::new().expect("tempdir");
        let store = SessionStore::open(dir.path()).expect("store");
        let live = GameState::new("foyer");
        let mut stale = GameState::new("foyer");
        stale.extend_ttl(-2);
        store.save_session(&live).expect("save");
        store.save_session(&stale).expect("save");
        assert_eq!(store.purge_expired(Utc::now()).expect("purge"), 1);
        assert_eq!(store.list_session_ids().expect("list"), vec![live.session_id.clone()]);
    }
}
