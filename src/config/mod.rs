// Configuration management for tagshelf
// Handles loading/saving settings, with sensible defaults when config is missing

use anyhow::Result;
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tag every listable score carries.
    pub music_tag: String,
    /// Reserved prefix that turns a tag into a playlist entry.
    pub list_prefix: String,
    /// Calibre library directory - also the root item paths are relative to.
    pub library_path: PathBuf,
    pub database_file: String,
    /// Force the on-screen keyboard in/out when the search box gains/loses focus.
    pub force_onboard_keyboard: bool,
    /// How many of the most used tags become filter predicates.
    pub filter_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            music_tag: "music".to_string(),
            list_prefix: "musicList".to_string(),
            library_path: dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("Calibre Library"),
            database_file: "metadata.db".to_string(),
            force_onboard_keyboard: false,
            filter_capacity: 4,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(config_path, content)?;

        Ok(())
    }

    /// Full path of the calibre database file.
    pub fn database_path(&self) -> PathBuf {
        self.library_path.join(&self.database_file)
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("tagshelf");

        Ok(config_dir.join("config.toml"))
    }
}
