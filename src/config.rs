//! Display and gameplay configuration
//!
//! Both structs are read from JSON with every field optional; missing fields
//! take the defaults below. Durations are milliseconds, as in the key file
//! the game has always shipped with.

use std::fs;
use std::path::{Path, PathBuf};

use glam::DVec2;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Window size, controller and audio preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    /// Analog deflection ignored around center, normalized to [0, 1]
    pub controller_dead_zone: f64,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Root directory for level files, textures and sounds
    pub data_dir: PathBuf,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 720,
            height: 480,
            controller_dead_zone: 8000.0 / 32768.0,
            music_volume: 0.7,
            sfx_volume: 1.0,
            data_dir: PathBuf::from("data"),
        }
    }
}

impl DisplayConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        load_json(path.as_ref())
    }

    /// Load, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("Display config unavailable ({}), using defaults", e);
            Self::default()
        })
    }

    pub fn size(&self) -> DVec2 {
        DVec2::new(f64::from(self.width), f64::from(self.height))
    }
}

/// Gameplay tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub initial_lives: u32,
    pub level_name_fade_ms: u32,
    pub game_over_fade_ms: u32,
    /// Hit flash of a brick that survives
    pub brick_hit_ms: u32,
    /// Break-up of a destroyed brick (doubled for bonus bricks)
    pub brick_destroy_ms: u32,
    pub bonus_score_fade_ms: u32,
    pub bonus_life_fade_ms: u32,
    pub bricks_high: u32,
    pub bricks_wide: u32,
    /// Launch speed as a fraction of display height per second
    pub default_start_speed: f64,
    /// Ball size relative to brick height
    pub ball_size_ratio: f64,
    /// Paddle width relative to brick width
    pub paddle_width_ratio: f64,
    /// Paddle height relative to brick height
    pub paddle_height_ratio: f64,
    /// Speed gained per brick hit, relative to launch speed over grid size
    pub brick_hit_speed_increase_ratio: f64,
    /// Award a life every time the score crosses a multiple of this
    pub award_bonus_life: Option<u32>,
    /// Level file ids, played in order and then repeated
    pub levels: Vec<String>,
    pub high_score_entries: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_lives: 3,
            level_name_fade_ms: 5000,
            game_over_fade_ms: 4000,
            brick_hit_ms: 500,
            brick_destroy_ms: 1500,
            bonus_score_fade_ms: 1000,
            bonus_life_fade_ms: 2000,
            bricks_high: 20,
            bricks_wide: 17,
            default_start_speed: 2.0 / 3.0,
            ball_size_ratio: 3.0 / 4.0,
            paddle_width_ratio: 2.0,
            paddle_height_ratio: 1.0,
            brick_hit_speed_increase_ratio: 3.0,
            award_bonus_life: None,
            levels: Vec::new(),
            high_score_entries: 10,
        }
    }
}

impl GameConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config: Self = load_json(path.as_ref())?;
        // A zero interval would divide by zero when awarding lives
        if config.award_bonus_life == Some(0) {
            log::warn!("award_bonus_life of 0 disables bonus lives");
            config.award_bonus_life = None;
        }
        Ok(config)
    }

    /// Load, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("Game config unavailable ({}), using defaults", e);
            Self::default()
        })
    }

    /// Play-field geometry for this grid on `display`
    pub fn geometry(&self, display: &DisplayConfig) -> Geometry {
        let wide = self.bricks_wide.max(1);
        let high = self.bricks_high.max(1);
        let brick = DVec2::new(
            f64::from(display.width / wide),
            f64::from(display.height / high),
        );
        let paddle = DVec2::new(
            brick.x * self.paddle_width_ratio,
            brick.y * self.paddle_height_ratio,
        );
        let ball = DVec2::splat(brick.y * self.ball_size_ratio);
        let display_size = display.size();

        Geometry {
            display: display_size,
            bricks_wide: wide as usize,
            bricks_high: high as usize,
            brick,
            paddle,
            ball,
            paddle_start: DVec2::new(
                display_size.x / 2.0 - paddle.x / 2.0,
                brick.y * f64::from(high) - paddle.y,
            ),
            paddle_speed: display_size.x * 2.0,
            paddle_min_x: brick.x,
            paddle_max_x: brick.x * f64::from(wide - 1),
            ball_spawn: brick,
            ball_spawn_speed: display_size.y * 2.0 / 3.0,
        }
    }
}

/// Sizes and positions derived from the display and grid dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub display: DVec2,
    pub bricks_wide: usize,
    pub bricks_high: usize,
    pub brick: DVec2,
    pub paddle: DVec2,
    pub ball: DVec2,
    pub paddle_start: DVec2,
    /// Keyboard paddle speed, px/s
    pub paddle_speed: f64,
    pub paddle_min_x: f64,
    pub paddle_max_x: f64,
    pub ball_spawn: DVec2,
    pub ball_spawn_speed: f64,
}

/// Maps a resource id from a level file to a path
pub trait ResourceLocator {
    fn locate(&self, id: &str) -> Option<PathBuf>;
}

/// Finds resources as given, or relative to a data directory
#[derive(Debug, Clone)]
pub struct DataDirLocator {
    pub data_dir: PathBuf,
}

impl DataDirLocator {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }
}

impl ResourceLocator for DataDirLocator {
    fn locate(&self, id: &str) -> Option<PathBuf> {
        let direct = PathBuf::from(id);
        if direct.is_file() {
            return Some(direct);
        }
        let under = self.data_dir.join(id);
        if under.is_file() {
            return Some(under);
        }
        log::warn!("Resource {:?} not found under {}", id, self.data_dir.display());
        None
    }
}

/// Accepts every id as a path without touching the filesystem
///
/// For headless runs where no assets are installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughLocator;

impl ResourceLocator for PassthroughLocator {
    fn locate(&self, id: &str) -> Option<PathBuf> {
        Some(PathBuf::from(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry() {
        let geometry = GameConfig::default().geometry(&DisplayConfig::default());
        assert_eq!(geometry.brick, DVec2::new(42.0, 24.0));
        assert_eq!(geometry.paddle, DVec2::new(84.0, 24.0));
        assert_eq!(geometry.ball, DVec2::splat(18.0));
        assert_eq!(geometry.paddle_start, DVec2::new(318.0, 456.0));
        assert_eq!(geometry.paddle_min_x, 42.0);
        assert_eq!(geometry.paddle_max_x, 672.0);
        assert_eq!(geometry.paddle_speed, 1440.0);
        assert_eq!(geometry.ball_spawn_speed, 320.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{"initial_lives": 5, "award_bonus_life": 1000}"#).unwrap();
        assert_eq!(config.initial_lives, 5);
        assert_eq!(config.award_bonus_life, Some(1000));
        assert_eq!(config.bricks_wide, 17);
        assert_eq!(config.brick_destroy_ms, 1500);

        let display: DisplayConfig = serde_json::from_str(r#"{"width": 1024}"#).unwrap();
        assert_eq!(display.width, 1024);
        assert_eq!(display.height, 480);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let path = std::env::temp_dir().join("brickfall-missing-config.json");
        assert!(matches!(GameConfig::load(&path), Err(ConfigError::Io { .. })));
        assert_eq!(GameConfig::load_or_default(&path).initial_lives, 3);
    }

    #[test]
    fn test_zero_bonus_interval_is_disabled() {
        let path = std::env::temp_dir().join(format!("brickfall-config-{}.json", std::process::id()));
        fs::write(&path, r#"{"award_bonus_life": 0}"#).unwrap();
        let config = GameConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(config.award_bonus_life, None);
    }

    #[test]
    fn test_passthrough_locator() {
        assert_eq!(PassthroughLocator.locate("red.png"), Some(PathBuf::from("red.png")));
    }
}
