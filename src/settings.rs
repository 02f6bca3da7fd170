//! Settings persistence using TOML
//!
//! Stored in ~/.config/quadfall/settings.toml (or platform equivalent)

use crate::game::SessionConfig;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Host and engine settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub board: BoardSettings,
    pub speed: SpeedSettings,
    pub keys: KeyBindings,
}

/// Playfield geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSettings {
    /// Square board surface in pixels
    pub board_px: u32,
    /// Cell size in pixels; the grid is board_px / cell_px on each side
    pub cell_px: u32,
}

/// Gravity and escalation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedSettings {
    /// Gravity interval at level 1, in milliseconds
    pub start_interval_ms: u64,
    /// Interval multiplier per level-up
    pub speed_factor: f64,
    /// Freezes per level before speeding up
    pub level_threshold: u32,
}

/// Key bindings, stored as strings for easy editing; each action accepts
/// one or more keys
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub move_left: Vec<String>,
    pub move_right: Vec<String>,
    pub soft_drop: Vec<String>,
    pub hard_drop: Vec<String>,
    pub rotate: Vec<String>,
    pub pause: Vec<String>,
    pub quit: Vec<String>,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            board_px: 480,
            cell_px: 30,
        }
    }
}

impl Default for SpeedSettings {
    fn default() -> Self {
        Self {
            start_interval_ms: 500,
            speed_factor: 0.85,
            level_threshold: 16,
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_left: vec!["Left".to_string()],
            move_right: vec!["Right".to_string()],
            soft_drop: vec!["Down".to_string()],
            hard_drop: vec!["Space".to_string()],
            rotate: vec!["Up".to_string(), "x".to_string()],
            pause: vec!["p".to_string(), "Esc".to_string()],
            quit: vec!["q".to_string()],
        }
    }
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "quadfall", "quadfall").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.toml"))
    }

    /// Load settings from file, or fall back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Save settings to file
    pub fn save(&self) -> Result<(), String> {
        let Some(dir) = Self::config_dir() else {
            return Err("Could not determine config directory".to_string());
        };

        let Some(path) = Self::settings_path() else {
            return Err("Could not determine settings path".to_string());
        };

        fs::create_dir_all(&dir).map_err(|e| format!("Failed to create config dir: {}", e))?;

        let contents =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize: {}", e))?;

        fs::write(&path, contents).map_err(|e| format!("Failed to write settings: {}", e))?;

        Ok(())
    }

    /// Engine configuration derived from these settings
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            board_px: self.board.board_px,
            cell_px: self.board.cell_px,
            start_interval: Duration::from_millis(self.speed.start_interval_ms),
            speed_factor: self.speed.speed_factor,
            level_threshold: self.speed.level_threshold,
        }
    }
}
