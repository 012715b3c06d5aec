//! Brickfall - a brick-breaking arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (swept-AABB collisions, entities, level loop)
//! - `renderer`: Draw-command sink the level renders into
//! - `audio`: Fire-and-forget sound cues driven by simulation events
//! - `config`: Display and game tuning loaded from JSON
//! - `highscores`: Persistent high score table

pub mod audio;
pub mod config;
pub mod highscores;
pub mod renderer;
pub mod sim;

pub use config::{ConfigError, DisplayConfig, GameConfig};
pub use highscores::HighScoreTable;

/// Game configuration constants
pub mod consts {
    /// Initial ball heading (down-left), degrees
    pub const BALL_INITIAL_DIRECTION: f64 = 240.0;

    /// Launch direction range, mapped from the spawn x position
    pub const LAUNCH_DIRECTION_MIN: f64 = 200.0;
    pub const LAUNCH_DIRECTION_MAX: f64 = 340.0;
    /// Degrees swept across the full display width
    pub const LAUNCH_DIRECTION_SWEEP: f64 = 160.0;

    /// Paddle convexity: maximum angular bias at the paddle edge (degrees)
    pub const PADDLE_DEFLECTION: f64 = 50.0;
    /// Clamp for rebounds biased counter-clockwise (left half)
    pub const PADDLE_DIRECTION_FLOOR: f64 = 190.0;
    /// Clamp for rebounds biased clockwise (right half)
    pub const PADDLE_DIRECTION_CEILING: f64 = 350.0;

    /// Bump input rotation (degrees)
    pub const BUMP_ROTATION: f64 = 10.0;

    /// Fragments per destruction animation (2 rows x 8 columns)
    pub const FRAGMENT_ROWS: usize = 2;
    pub const FRAGMENT_COLUMNS: usize = 8;
    pub const FRAGMENT_COUNT: usize = FRAGMENT_ROWS * FRAGMENT_COLUMNS;

    /// Guard against degenerate layouts that re-collide without consuming time
    pub const MAX_COLLISIONS_PER_FRAME: u32 = 256;

    /// Default level header values
    pub const DEFAULT_BASE_VALUE: u32 = 10;
    pub const DEFAULT_BONUS_PROBABILITY: u32 = 10;
    pub const DEFAULT_BONUS_TIERS: [u32; 6] = [40, 60, 80, 90, 94, 99];
    pub const DEFAULT_SPEED_RATIO: f64 = 1.0;
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Unit vector for a heading in degrees (screen space, y grows downward)
#[inline]
pub fn heading_vector(degrees: f64) -> glam::DVec2 {
    let radians = degrees.to_radians();
    glam::DVec2::new(radians.cos(), radians.sin())
}
