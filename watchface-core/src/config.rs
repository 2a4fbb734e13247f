use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::render::Color;

/// Display preferences the host would normally report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DisplayConfig {
    pub use_24_hour: bool,
    pub round: bool,
    /// Panel has fewer bits per color in ambient mode; text is drawn aliased.
    pub low_bit_ambient: bool,
}

/// Offsets and text sizes for one screen shape, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutMetrics {
    pub time_y: f32,
    pub date_y: f32,
    pub divider_y: f32,
    pub weather_y: f32,
    pub time_text_size: f32,
    pub date_text_size: f32,
    pub temp_text_size: f32,
}

impl LayoutMetrics {
    pub const SQUARE: LayoutMetrics = LayoutMetrics {
        time_y: 110.0,
        date_y: 145.0,
        divider_y: 170.0,
        weather_y: 220.0,
        time_text_size: 60.0,
        date_text_size: 20.0,
        temp_text_size: 40.0,
    };

    pub const ROUND: LayoutMetrics = LayoutMetrics {
        time_y: 110.0,
        date_y: 150.0,
        divider_y: 175.0,
        weather_y: 225.0,
        time_text_size: 66.0,
        date_text_size: 22.0,
        temp_text_size: 44.0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Width over height of the weather glyphs.
    pub icon_aspect_ratio: f32,
    pub square: LayoutMetrics,
    pub round: LayoutMetrics,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self { icon_aspect_ratio: 1.0, square: LayoutMetrics::SQUARE, round: LayoutMetrics::ROUND }
    }
}

impl LayoutConfig {
    pub fn metrics(&self, round: bool) -> &LayoutMetrics {
        if round { &self.round } else { &self.square }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub primary: Color,
    pub primary_dark: Color,
    pub text_white: Color,
    pub text_grey: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: Color::rgb(0x03, 0xA9, 0xF4),
            primary_dark: Color::rgb(0x02, 0x88, 0xD1),
            text_white: Color::WHITE,
            text_grey: Color::rgb(0xA0, 0xC8, 0xE8),
        }
    }
}

/// Where weather events are read from and requests written to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DataConfig {
    pub events_file: Option<PathBuf>,
    pub outbox_file: Option<PathBuf>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// [display]
/// use_24_hour = true
///
/// [palette]
/// primary = "#03A9F4"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub layout: LayoutConfig,
    pub palette: Palette,
    pub data: DataConfig,
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "watchface", "watchface-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Events file to read weather from.
    pub fn events_file(&self) -> Result<&Path> {
        self.data.events_file.as_deref().ok_or_else(|| {
            anyhow!(
                "No weather events file configured.\n\
                 Hint: pass `--events <FILE>` or set `data.events_file` in the config file."
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("config.toml")).unwrap();

        assert_eq!(cfg, Config::default());
        assert!(!cfg.display.use_24_hour);
        assert_eq!(cfg.layout.icon_aspect_ratio, 1.0);
    }

    #[test]
    fn save_and_load_preserves_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.display.use_24_hour = true;
        cfg.display.round = true;
        cfg.palette.primary = Color::rgb(0x11, 0x22, 0x33);
        cfg.data.events_file = Some(PathBuf::from("/tmp/events.json"));

        cfg.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();

        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let contents = "[display]\nuse_24_hour = true\n\n[palette]\nprimary = \"#000000\"\n";
        fs::write(&path, contents).unwrap();

        let cfg = Config::load_from(&path).unwrap();

        assert!(cfg.display.use_24_hour);
        assert!(!cfg.display.round);
        assert_eq!(cfg.palette.primary, Color::BLACK);
        assert_eq!(cfg.palette.primary_dark, Palette::default().primary_dark);
        assert_eq!(cfg.layout, LayoutConfig::default());
    }

    #[test]
    fn bad_color_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[palette]\nprimary = \"blue\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn events_file_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.events_file().unwrap_err();

        assert!(err.to_string().contains("No weather events file configured"));
    }

    #[test]
    fn metrics_follow_screen_shape() {
        let layout = LayoutConfig::default();
        assert_eq!(layout.metrics(false), &LayoutMetrics::SQUARE);
        assert_eq!(layout.metrics(true), &LayoutMetrics::ROUND);
    }
}
