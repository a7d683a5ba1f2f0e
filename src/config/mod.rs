//! Configuration module
//!
//! Handles loading and saving MouseMover configuration. Hotkey bindings
//! live in a separate store, see [`bindings`].

pub mod bindings;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::hotkey::WindowMoveModifier;

pub use bindings::BindingStore;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Hotkey settings
    #[serde(default)]
    pub hotkeys: HotkeyConfig,

    /// Cursor animation settings
    #[serde(default)]
    pub animation: AnimationConfig,

    /// Window relocation settings
    #[serde(default)]
    pub window: WindowConfig,

    /// Highlight and refocus settings
    #[serde(default)]
    pub feedback: FeedbackConfig,
}

/// General configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging
    #[serde(default)]
    pub verbose: bool,
    /// Bindings file override (defaults to `bindings.json` next to the config)
    pub bindings_file: Option<PathBuf>,
}

/// Hotkey configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HotkeyConfig {
    /// Extra modifier that turns a binding into its "move window too" variant
    #[serde(default)]
    pub window_move_modifier: WindowMoveModifier,
}

/// Cursor animation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Duration of a cursor move (ms)
    #[serde(default = "default_animation_duration")]
    pub duration_ms: u64,
    /// Interval between animation frames (ms)
    #[serde(default = "default_tick")]
    pub tick_ms: u64,
    /// Synthesize drag events while the primary button is held
    #[serde(default = "default_true")]
    pub follow_drag: bool,
}

fn default_animation_duration() -> u64 {
    250
}

fn default_tick() -> u64 {
    16 // ~60 Hz
}

fn default_true() -> bool {
    true
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_animation_duration(),
            tick_ms: default_tick(),
            follow_drag: default_true(),
        }
    }
}

impl AnimationConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

/// Window relocation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Size difference (device units, both axes) under which a window
    /// counts as maximized
    #[serde(default = "default_maximize_tolerance")]
    pub maximize_tolerance: f64,
    /// Delay between the size write and the position write (ms)
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,
    /// Delay before re-applying a maximized frame (ms)
    #[serde(default = "default_reapply_delay")]
    pub reapply_delay_ms: u64,
    /// Write attempts per pass before giving up on read-back verification
    #[serde(default = "default_max_write_attempts")]
    pub max_write_attempts: u32,
    /// Allowed read-back deviation (device units)
    #[serde(default = "default_position_tolerance")]
    pub position_tolerance: f64,
}

fn default_maximize_tolerance() -> f64 {
    20.0
}

fn default_settle_delay() -> u64 {
    50
}

fn default_reapply_delay() -> u64 {
    100
}

fn default_max_write_attempts() -> u32 {
    3
}

fn default_position_tolerance() -> f64 {
    2.0
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            maximize_tolerance: default_maximize_tolerance(),
            settle_delay_ms: default_settle_delay(),
            reapply_delay_ms: default_reapply_delay(),
            max_write_attempts: default_max_write_attempts(),
            position_tolerance: default_position_tolerance(),
        }
    }
}

impl WindowConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn reapply_delay(&self) -> Duration {
        Duration::from_millis(self.reapply_delay_ms)
    }
}

/// Highlight and refocus configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackConfig {
    /// Show the highlight ring after a move
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Highlight animation duration (ms)
    #[serde(default = "default_highlight_duration")]
    pub duration_ms: u64,
    /// Ring diameter
    #[serde(default = "default_ring_diameter")]
    pub ring_diameter: f64,
    /// Ring stroke width
    #[serde(default = "default_ring_width")]
    pub ring_width: f64,
    /// Activate the application under the cursor after a jump
    #[serde(default = "default_true")]
    pub refocus: bool,
}

fn default_highlight_duration() -> u64 {
    400
}

fn default_ring_diameter() -> f64 {
    80.0
}

fn default_ring_width() -> f64 {
    4.0
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            duration_ms: default_highlight_duration(),
            ring_diameter: default_ring_diameter(),
            ring_width: default_ring_width(),
            refocus: default_true(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the default location
    pub fn load_default() -> ConfigResult<Self> {
        for path in Self::search_paths() {
            if path.exists() {
                return Self::load(&path);
            }
        }

        // Return default config if no file found
        Ok(Self::default())
    }

    /// Candidate configuration files, most specific first
    pub fn search_paths() -> Vec<PathBuf> {
        [
            config_dir().map(|p| p.join("config.toml")),
            Some(PathBuf::from("./mousemover.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Where hotkey bindings are persisted
    pub fn bindings_path(&self) -> PathBuf {
        self.general.bindings_file.clone().unwrap_or_else(|| {
            config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("bindings.json")
        })
    }
}

/// Per-user configuration directory
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("mousemover"))
}

/// Generate a sample configuration file
pub fn generate_sample_config() -> ConfigResult<String> {
    let config = Config {
        hotkeys: HotkeyConfig {
            window_move_modifier: WindowMoveModifier::Option,
        },
        ..Default::default()
    };

    Ok(toml::to_string_pretty(&config)?)
}
