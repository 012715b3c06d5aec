//! A game session: the level sequence around one `GameState`
//!
//! Levels are played in configuration order and wrap around. The session
//! loads the next level whenever the run state asks for one and stops once
//! the run has ended, recording the score.

use rand_pcg::Pcg32;

use super::layout::LevelLayout;
use super::level::{Level, LevelError, read_layout};
use super::paddle::PaddleInput;
use super::state::{GameEvent, GameState, RunState};
use crate::config::{DisplayConfig, GameConfig, ResourceLocator};
use crate::highscores::HighScoreTable;
use crate::renderer::RenderSink;

/// What the caller should do after `advance`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    /// The run is over; `rank` is the high-score position, if any
    Finished { score: u64, rank: Option<usize> },
}

pub struct Game<L: ResourceLocator> {
    config: GameConfig,
    display: DisplayConfig,
    locator: L,
    layouts: Vec<LevelLayout>,
    state: GameState,
    level: Option<Level>,
    high_scores: HighScoreTable,
    player: String,
    result: Option<GameStatus>,
}

impl<L: ResourceLocator> Game<L> {
    /// A session over already parsed layouts
    pub fn new(
        config: GameConfig,
        display: DisplayConfig,
        locator: L,
        layouts: Vec<LevelLayout>,
        seed: u64,
    ) -> Result<Self, LevelError> {
        if layouts.is_empty() {
            return Err(LevelError::NoLevels);
        }
        let state = GameState::new(seed, config.initial_lives);
        let high_scores = HighScoreTable::new(config.high_score_entries);
        Ok(Self {
            config,
            display,
            locator,
            layouts,
            state,
            level: None,
            high_scores,
            player: String::from("Player"),
            result: None,
        })
    }

    /// A session over the level files named in `config.levels`
    pub fn from_config(config: GameConfig, display: DisplayConfig, locator: L, seed: u64) -> Result<Self, LevelError> {
        let layouts = config
            .levels
            .iter()
            .map(|id| read_layout(id, &config, &locator))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(config, display, locator, layouts, seed)
    }

    pub fn with_high_scores(mut self, table: HighScoreTable) -> Self {
        self.high_scores = table;
        self
    }

    pub fn with_player(mut self, name: impl Into<String>) -> Self {
        self.player = name.into();
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    pub fn high_scores(&self) -> &HighScoreTable {
        &self.high_scores
    }

    pub fn handle_input(&mut self, input: PaddleInput) {
        if let Some(level) = &mut self.level {
            level.handle_input(input);
        }
    }

    pub fn launch(&mut self) {
        if let Some(level) = &mut self.level {
            level.launch();
        }
    }

    pub fn bump(&mut self) {
        if let Some(level) = &mut self.level {
            level.bump();
        }
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.level.as_mut().map(Level::drain_events).unwrap_or_default()
    }

    /// Run one frame of `elapsed` seconds, loading levels as needed
    pub fn advance(&mut self, elapsed: f64) -> Result<GameStatus, LevelError> {
        if let Some(result) = self.result {
            return Ok(result);
        }
        if self.state.run_state == RunState::NextLevel {
            self.load_next_level()?;
        }
        if let Some(level) = &mut self.level {
            level.update(&mut self.state, elapsed);
        }
        if self.state.run_state == RunState::End {
            return Ok(self.finish());
        }
        Ok(GameStatus::Playing)
    }

    pub fn render(&self, sink: &mut dyn RenderSink) {
        if let Some(level) = &self.level {
            level.render(&self.state, sink);
        }
    }

    fn load_next_level(&mut self) -> Result<(), LevelError> {
        let index = self.state.level as usize % self.layouts.len();
        self.state.inc_level();
        let rng: Pcg32 = self.state.level_rng();
        let level = Level::load(&self.layouts[index], &self.config, &self.display, &self.locator, rng)?;
        log::info!("Starting level {} ({:?})", self.state.level, level.name());
        self.level = Some(level);
        self.state.run_state = RunState::Continue;
        Ok(())
    }

    fn finish(&mut self) -> GameStatus {
        let score = self.state.score;
        let rank = self
            .high_scores
            .add_score(self.player.clone(), score, self.state.level, unix_now());
        log::info!("Game finished: score {} after {} levels", score, self.state.level);
        let status = GameStatus::Finished { score, rank };
        self.result = Some(status);
        status
    }
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PassthroughLocator;
    use crate::sim::layout::{BonusTable, LayoutCell};

    fn layout(name: &str, flags: u8) -> LevelLayout {
        let mut rows = vec![vec![LayoutCell::default(); 4]; 5];
        rows[0][0] = LayoutCell { texture: 1, flags };
        LevelLayout {
            name: name.to_string(),
            base_value: 10,
            bonus: BonusTable::default(),
            speed_ratio: 1.0,
            music: None,
            brick_hit_sound: None,
            paddle_hit_sound: None,
            ball_loss_sound: None,
            textures: vec!["bg".to_string(), "brick".to_string()],
            rows,
        }
    }

    fn game(layouts: Vec<LevelLayout>) -> Game<PassthroughLocator> {
        let config = GameConfig {
            bricks_wide: 4,
            bricks_high: 5,
            level_name_fade_ms: 100,
            game_over_fade_ms: 100,
            ..GameConfig::default()
        };
        let display = DisplayConfig {
            width: 160,
            height: 100,
            ..DisplayConfig::default()
        };
        Game::new(config, display, PassthroughLocator, layouts, 7).unwrap()
    }

    #[test]
    fn test_no_levels_is_an_error() {
        let result = Game::new(
            GameConfig::default(),
            DisplayConfig::default(),
            PassthroughLocator,
            Vec::new(),
            1,
        );
        assert!(matches!(result, Err(LevelError::NoLevels)));
    }

    #[test]
    fn test_levels_cycle_in_order() {
        // Wall-only levels clear as soon as their name fades
        let mut game = game(vec![layout("One", 0x01), layout("Two", 0x01)]);

        assert_eq!(game.advance(0.0).unwrap(), GameStatus::Playing);
        assert_eq!(game.level().map(Level::name), Some("One"));
        assert_eq!(game.state().level, 1);

        game.advance(0.2).unwrap();
        assert_eq!(game.state().run_state, RunState::NextLevel);
        game.advance(0.0).unwrap();
        assert_eq!(game.level().map(Level::name), Some("Two"));

        game.advance(0.2).unwrap();
        game.advance(0.0).unwrap();
        assert_eq!(game.level().map(Level::name), Some("One"));
        assert_eq!(game.state().level, 3);
    }

    #[test]
    fn test_finishes_once_lives_run_out() {
        let mut game = game(vec![layout("Only", 0x10)]);
        game.advance(0.0).unwrap();
        game.state.lives = 0;
        game.state.score = 500;

        assert_eq!(game.advance(0.0).unwrap(), GameStatus::Playing);
        let status = game.advance(0.5).unwrap();
        assert_eq!(status, GameStatus::Finished { score: 500, rank: Some(1) });
        assert_eq!(game.high_scores().top_score(), Some(500));

        // Further frames repeat the result without recording again
        assert_eq!(game.advance(0.5).unwrap(), status);
        assert_eq!(game.high_scores().entries.len(), 1);
    }
}
