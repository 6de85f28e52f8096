//! # Configuration
//!
//! Duskhollow reads a single TOML file with three sections:
//!
//! - [`GameConfig`] - display name, world data directory, session lifetime and
//!   input limits
//! - [`StorageConfig`] - where the sled session database lives
//! - [`LoggingConfig`] - log level and optional log file
//!
//! ```toml
//! [game]
//! name = "Duskhollow"
//! world_dir = "data/world"
//! session_ttl_hours = 24
//! max_input_length = 256
//!
//! [storage]
//! session_db_path = "data/sessions"
//!
//! [logging]
//! level = "info"
//! file = "duskhollow.log"
//! ```
//!
//! Every field has a default, so a partial file is accepted.
//!
//! ```rust,no_run
//! use duskhollow::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     println!("World: {}", config.game.world_dir);
//!     Ok(())
//! }
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::game::state::DEFAULT_SESSION_TTL_HOURS;
use crate::validation::MAX_INPUT_LEN;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub name: String,
    /// Directory holding rooms.json, objects.json and flags.json.
    pub world_dir: String,
    /// Lifetime granted to a session each time it is touched.
    pub session_ttl_hours: i64,
    /// Longest accepted command line, in bytes.
    pub max_input_length: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            name: "Duskhollow".to_string(),
            world_dir: "data/world".to_string(),
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            max_input_length: MAX_INPUT_LEN,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub session_db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            session_db_path: "data/sessions".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Configured level, falling back to `Info` for unrecognised names.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        if config.game.max_input_length == 0 {
            return Err(anyhow!("game.max_input_length must be greater than zero"));
        }
        if config.game.session_ttl_hours <= 0 {
            return Err(anyhow!("game.session_ttl_hours must be positive"));
        }
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let content = toml::to_string_pretty(&Config::default())
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.game.world_dir, "data/world");
        assert_eq!(config.game.session_ttl_hours, DEFAULT_SESSION_TTL_HOURS);
        assert_eq!(config.game.max_input_length, MAX_INPUT_LEN);
        assert_eq!(config.logging.level_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("[game]\nname = \"Hollow\"\n").expect("parse");
        assert_eq!(config.game.name, "Hollow");
        assert_eq!(config.storage.session_db_path, "data/sessions");
    }

    #[test]
    fn test_unknown_level_falls_back() {
        let logging = LoggingConfig {
            level: "shouty".to_string(),
            file: None,
        };
        assert_eq!(logging.level_filter(), log::LevelFilter::Info);
    }

    #[tokio::test]
    async fn test_create_then_load() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("config.toml");
        let path = path.to_string_lossy().to_string();
        Config::create_default(&path).await.expect("create");
        let loaded = Config::load(&path).await.expect("load");
        assert_eq!(loaded.game.name, "Duskhollow");
        assert!(loaded.logging.file.is_none());
    }

    #[tokio::test]
    async fn test_rejects_zero_input_length() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[game]\nmax_input_length = 0\n").expect("write");
        assert!(Config::load(&path.to_string_lossy()).await.is_err());
    }
}
