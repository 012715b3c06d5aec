//! Game state shared across levels
//!
//! Score, lives and the run state outlive any single level; levels mutate
//! them through the methods here.

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::audio::SoundEffect;

/// Run state shared with the outer game loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    /// A level is being played (ball in flight or waiting for launch)
    Continue,
    /// Level cleared, the next one should be loaded
    NextLevel,
    /// Lives exhausted and the game-over banner has finished
    End,
}

/// Something that happened during a level update, for the platform layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Fire-and-forget sound cue
    Sound(SoundEffect),
    BrickDestroyed { row: usize, col: usize, value: u32 },
    LifeAwarded,
    BallLost { lives_left: u32 },
    LevelCleared,
    GameOver,
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    /// Generator for the given level; each level gets its own stream
    pub fn to_rng(&self, level: u32) -> Pcg32 {
        Pcg32::new(self.seed, self.stream.wrapping_add(u64::from(level)))
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng_state: RngState,
    /// Levels started so far
    pub level: u32,
    pub lives: u32,
    pub score: u64,
    /// Lives already given for crossing score thresholds
    pub bonus_lives_awarded: u32,
    pub run_state: RunState,
}

impl GameState {
    /// A fresh run that wants its first level loaded
    pub fn new(seed: u64, lives: u32) -> Self {
        Self {
            seed,
            rng_state: RngState::new(seed),
            level: 0,
            lives,
            score: 0,
            bonus_lives_awarded: 0,
            run_state: RunState::NextLevel,
        }
    }

    pub fn add_score(&mut self, delta: u32) {
        self.score = self.score.saturating_add(u64::from(delta));
    }

    pub fn add_lives(&mut self, delta: i32) {
        self.lives = self.lives.saturating_add_signed(delta);
    }

    pub fn add_bonus_lives_awarded(&mut self, delta: u32) {
        self.bonus_lives_awarded += delta;
    }

    /// Advance the level counter, returning the new value
    pub fn inc_level(&mut self) -> u32 {
        self.level += 1;
        self.level
    }

    pub fn level_rng(&self) -> Pcg32 {
        self.rng_state.to_rng(self.level)
    }
}
