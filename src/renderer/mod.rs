//! Rendering sink
//!
//! The simulation never touches a graphics API. `Level::render` turns the
//! current frame into `DrawCommand`s pushed into a `RenderSink`; a backend
//! (or a test) decides what to do with them.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A screen-space rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_pos_size(pos: DVec2, size: DVec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }
}

/// Which image a sprite command draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpriteId {
    /// Level texture slot 0
    Background,
    /// Level texture slot 1..
    Brick(u8),
    Ball,
    Paddle,
}

/// Font used for a text command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextStyle {
    /// Large centered banners (level name, game over, bonus life)
    Title,
    /// Score and lives readout
    Hud,
    /// Floating score and life bonuses
    Bonus,
}

/// One primitive of a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    Sprite {
        sprite: SpriteId,
        /// Where the image lands on screen
        dest: Rect,
        /// Sub-rectangle of the source image (`None` = whole image)
        src: Option<Rect>,
        alpha: u8,
    },
    Text {
        text: String,
        /// Anchor point; backends center the text on it
        center: DVec2,
        style: TextStyle,
        alpha: u8,
    },
}

/// Receives the draw commands of a frame, in painter's order
pub trait RenderSink {
    fn draw(&mut self, command: DrawCommand);
}

/// Record commands for inspection or deferred submission
impl RenderSink for Vec<DrawCommand> {
    fn draw(&mut self, command: DrawCommand) {
        self.push(command);
    }
}

/// Alpha for a linear fade from opaque to transparent
#[inline]
pub fn fade_alpha(elapsed: f64, duration: f64) -> u8 {
    if duration <= 0.0 {
        return 0;
    }
    let remaining = (1.0 - elapsed / duration).clamp(0.0, 1.0);
    (remaining * 255.0) as u8
}
