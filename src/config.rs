use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Maximum dispatched events kept in the event log
pub const MAX_EVENTS: usize = 50;

/// Application configuration loaded from file
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ToastlineConfig {
    /// Page content
    #[serde(default)]
    pub page: PageConfig,

    /// Terminal refresh rates
    #[serde(default)]
    pub ui: UiConfig,
}

/// Page content configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageConfig {
    /// Heading shown at the top of the page
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
        }
    }
}

fn default_title() -> String {
    "URL Shortener".to_string()
}

/// Terminal refresh configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiConfig {
    /// Ticks per second (how quickly dismissed toasts disappear on screen)
    #[serde(default = "default_tick_rate")]
    pub tick_rate: f64,

    /// Maximum frames per second
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate: default_tick_rate(),
            frame_rate: default_frame_rate(),
        }
    }
}

fn default_tick_rate() -> f64 {
    10.0
}

fn default_frame_rate() -> f64 {
    30.0
}

impl ToastlineConfig {
    /// Load configuration from default path (~/.config/toastline/config.toml)
    pub fn load() -> Self {
        Self::load_from_path(&Self::default_path())
    }

    /// Get the default configuration path
    pub fn default_path() -> PathBuf {
        directories::BaseDirs::new().map_or_else(
            || PathBuf::from("~/.config/toastline/config.toml"),
            |dirs| dirs.config_dir().join("toastline").join("config.toml"),
        )
    }

    /// Load configuration from a specific path, falling back to defaults
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Self::default();
        }

        let config: Self = match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded configuration from {:?}", path);
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config file: {}, using defaults", e);
                    return Self::default();
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config file: {}, using defaults", e);
                return Self::default();
            }
        };

        config.sanitized()
    }

    /// Replace non-positive or non-finite rates with defaults
    fn sanitized(mut self) -> Self {
        if !(self.ui.tick_rate.is_finite() && self.ui.tick_rate > 0.0) {
            tracing::warn!("Invalid tick_rate {}, using default", self.ui.tick_rate);
            self.ui.tick_rate = default_tick_rate();
        }
        if !(self.ui.frame_rate.is_finite() && self.ui.frame_rate > 0.0) {
            tracing::warn!("Invalid frame_rate {}, using default", self.ui.frame_rate);
            self.ui.frame_rate = default_frame_rate();
        }
        self
    }

    /// Generate example configuration file content
    pub fn example() -> String {
        r#"# Toastline Configuration
# Place this file at ~/.config/toastline/config.toml

[page]
# Heading shown at the top of the page
title = "URL Shortener"

[ui]
# Ticks per second; dismissed toasts leave the screen on the next tick
tick_rate = 10.0

# Maximum frames per second
frame_rate = 30.0
"#
        .to_string()
    }
}

/// Page color palette
pub mod colors {
    use super::Color;

    pub const BG: Color = Color::Rgb(26, 27, 38); // #1a1b26
    pub const FG: Color = Color::Rgb(192, 202, 245); // #c0caf5
    pub const DIM: Color = Color::Rgb(86, 95, 137); // #565f89 gray
    pub const BORDER: Color = Color::Rgb(59, 66, 97); // #3b4261
    pub const HIGHLIGHT: Color = Color::Rgb(187, 154, 247); // #bb9af7 purple
    pub const SHADOW: Color = Color::Rgb(16, 16, 22); // near-black drop shadow
}
