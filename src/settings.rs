//! Settings persistence using TOML
//!
//! Stores settings in ~/.config/blockfall/settings.toml (or platform equivalent)
//! and the high score table in the platform data directory.

use crate::engine::EngineConfig;
use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// Engine settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Timing and board settings
    pub gameplay: GameplaySettings,
    /// Player settings
    pub player: PlayerSettings,
}

/// Gameplay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplaySettings {
    pub board_width: usize,
    pub board_height: usize,
    /// Lock delay in milliseconds
    pub lock_delay_ms: u64,
    /// Lock delay after a hard drop in milliseconds
    pub drop_lock_delay_ms: u64,
    /// Line clear delay in milliseconds
    pub line_clear_delay_ms: u64,
    pub rows_per_level: u32,
}

/// Player settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Name written on high score records
    pub name: String,
    /// High score entries kept
    pub max_high_scores: usize,
}

impl Default for GameplaySettings {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            board_width: engine.board_width,
            board_height: engine.board_height,
            lock_delay_ms: 500,
            drop_lock_delay_ms: 100,
            line_clear_delay_ms: 300,
            rows_per_level: engine.rows_per_level,
        }
    }
}

impl Default for PlayerSettings {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            name: engine.player_name,
            max_high_scores: engine.max_high_scores,
        }
    }
}

fn ms_to_secs(ms: u64) -> f32 {
    ms as f32 / 1000.0
}

impl Settings {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "blockfall", "blockfall")
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("settings.toml"))
    }

    /// Get the high score file path
    pub fn high_scores_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().join("high_scores.bin"))
    }

    /// Load settings from file, or fall back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(contents) => Self::from_toml(&contents).unwrap_or_else(|e| {
                warn!("ignoring unreadable settings at {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Save settings to file
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::settings_path().context("could not determine settings path")?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create config dir {}", dir.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("failed to serialize settings")?;
        fs::write(&path, contents)
            .with_context(|| format!("failed to write settings to {}", path.display()))?;
        Ok(())
    }

    /// Engine tunables described by these settings
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            board_width: self.gameplay.board_width.max(4),
            board_height: self.gameplay.board_height.max(4),
            lock_delay: ms_to_secs(self.gameplay.lock_delay_ms),
            drop_lock_delay: ms_to_secs(self.gameplay.drop_lock_delay_ms),
            line_clear_delay: ms_to_secs(self.gameplay.line_clear_delay_ms),
            rows_per_level: self.gameplay.rows_per_level,
            player_name: self.player.name.clone(),
            max_high_scores: self.player.max_high_scores,
        }
    }
}
