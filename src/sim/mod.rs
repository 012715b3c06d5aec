//! Deterministic simulation module
//!
//! All gameplay logic lives here. Nothing in this module touches a window,
//! a sound device or the clock:
//! - Elapsed time is passed in by the caller
//! - Seeded RNG only (one stream per level)
//! - Stable iteration order (row-major grid, insertion-ordered animations)
//! - Side effects leave as `GameEvent`s and `DrawCommand`s

pub mod aabb;
pub mod animation;
pub mod ball;
pub mod brick;
pub mod game;
pub mod grid;
pub mod layout;
pub mod level;
pub mod paddle;
pub mod state;

pub use aabb::Aabb;
pub use animation::{Animation, AnimationClock, DestructionAnimation, DestructionMode, TextFade};
pub use ball::Ball;
pub use brick::{Brick, BrickKind};
pub use game::{Game, GameStatus};
pub use grid::{BrickGrid, Cell};
pub use layout::{BonusTable, LayoutCell, LayoutError, LevelLayout};
pub use level::{Level, LevelError, read_layout};
pub use paddle::{Paddle, PaddleInput};
pub use state::{GameEvent, GameState, RngState, RunState};
