use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::leaderboard::DEFAULT_LEADERBOARD_FILE;

pub const DEFAULT_TEXT: &str =
    "Some very boring and silly text that I came up with in about 10 seconds.";
pub const DEFAULT_COUNTDOWN_SECS: u64 = 60;
pub const DEFAULT_AFFIRMATIVE: &str = "yes";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub text: String,
    pub leaderboard_path: PathBuf,
    pub countdown_secs: u64,
    pub affirmative: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT.to_string(),
            leaderboard_path: PathBuf::from(DEFAULT_LEADERBOARD_FILE),
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            affirmative: DEFAULT_AFFIRMATIVE.to_string(),
        }
    }
}

/// Values given on the command line; each one wins over the config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub text: Option<String>,
    pub leaderboard_path: Option<PathBuf>,
    pub countdown_secs: Option<u64>,
}

impl Config {
    pub fn with_overrides(self, overrides: &ConfigOverrides) -> Self {
        Self {
            text: overrides.text.clone().unwrap_or(self.text),
            leaderboard_path: overrides
                .leaderboard_path
                .clone()
                .unwrap_or(self.leaderboard_path),
            countdown_secs: overrides.countdown_secs.unwrap_or(self.countdown_secs),
            affirmative: self.affirmative,
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
        let path = if let Some(pd) = ProjectDirs::from("", "", "typeboard") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("typeboard_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the default config on first run so there is a file to edit.
    /// Returns true if a file was created. An existing file is never touched.
    pub fn init_if_missing(&self) -> bool {
        if self.path.exists() {
            return false;
        }
        match self.save(&Config::default()) {
            Ok(()) => {
                tracing::info!(path = %self.path().display(), "wrote default config");
                true
            }
            Err(err) => {
                tracing::warn!(
                    path = %self.path().display(),
                    error = %err,
                    "could not write default config"
                );
                false
            }
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Config::default(),
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "ignoring invalid config file"
                );
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
