use crate::app_dirs::AppDirs;
use crate::pair::DuplicatePolicy;
use crate::session::{SessionRules, PENALTY_SECS, REVEAL_DELAY_MS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const TICK_RATE_MS: u64 = 100;

/// Persisted user preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub penalty_secs: f64,
    pub reveal_delay_ms: u64,
    pub tick_rate_ms: u64,
    pub reject_duplicates: bool,
    pub record_history: bool,
    /// Deck played when none is given on the command line: a file path or a bundled name
    pub deck: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            penalty_secs: PENALTY_SECS,
            reveal_delay_ms: REVEAL_DELAY_MS,
            tick_rate_ms: TICK_RATE_MS,
            reject_duplicates: false,
            record_history: true,
            deck: None,
        }
    }
}

/// Effective settings for one run: the stored config with command-line overrides applied
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeSettings {
    pub penalty_secs: f64,
    pub reveal_delay_ms: u64,
    pub tick_rate_ms: u64,
    pub duplicates: DuplicatePolicy,
    pub record_history: bool,
    pub deck: Option<String>,
    pub seed: Option<u64>,
}

impl RuntimeSettings {
    pub fn rules(&self) -> SessionRules {
        SessionRules {
            penalty_secs: self.penalty_secs,
            duplicates: self.duplicates,
        }
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(1))
    }
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for RuntimeSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            penalty_secs: cfg.penalty_secs,
            reveal_delay_ms: cfg.reveal_delay_ms,
            tick_rate_ms: cfg.tick_rate_ms,
            duplicates: if cfg.reject_duplicates {
                DuplicatePolicy::Reject
            } else {
                DuplicatePolicy::Allow
            },
            record_history: cfg.record_history,
            deck: cfg.deck.clone(),
            seed: None,
        }
    }
}

impl From<&RuntimeSettings> for Config {
    fn from(rs: &RuntimeSettings) -> Self {
        Self {
            penalty_secs: rs.penalty_secs,
            reveal_delay_ms: rs.reveal_delay_ms,
            tick_rate_ms: rs.tick_rate_ms,
            reject_duplicates: rs.duplicates == DuplicatePolicy::Reject,
            record_history: rs.record_history,
            deck: rs.deck.clone(),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => tracing::warn!(path = %self.path.display(), "ignoring unreadable config: {e}"),
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).map_err(std::io::Error::other)?;
        fs::write(&self.path, data)
    }
}
