//! A single level: brick grid, ball, paddle and the animation list
//!
//! `update` runs one frame. The frame's elapsed time is sliced at every
//! collision: find the earliest brick (or paddle) contact within the time
//! left, move the ball there, resolve the hit, and repeat with the rest.
//! Score, lives and the run state live in the `GameState` the caller passes
//! in, which outlives the level.

use std::fs;
use std::path::{Path, PathBuf};

use glam::DVec2;
use rand_pcg::Pcg32;
use thiserror::Error;

use super::animation::{Animation, DestructionAnimation, DestructionMode, TextFade};
use super::ball::Ball;
use super::brick::Brick;
use super::grid::{BrickGrid, Cell};
use super::layout::{LayoutError, LevelLayout};
use super::paddle::{Paddle, PaddleInput};
use super::state::{GameEvent, GameState, RunState};
use crate::audio::{SoundBank, SoundEffect};
use crate::config::{DisplayConfig, GameConfig, Geometry, ResourceLocator};
use crate::consts::*;
use crate::renderer::{DrawCommand, Rect, RenderSink, SpriteId, TextStyle};
use crate::{heading_vector, normalize_degrees};

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level {0:?} not found")]
    NotFound(String),
    #[error("failed to read level {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("no levels configured")]
    NoLevels,
}

/// Timings (seconds) and speed tuning taken from `GameConfig`
#[derive(Debug, Clone)]
struct Tuning {
    level_name_fade: f64,
    game_over_fade: f64,
    brick_hit: f64,
    brick_destroy: f64,
    bonus_score_fade: f64,
    bonus_life_fade: f64,
    default_start_speed: f64,
    hit_speed_increase_ratio: f64,
    award_bonus_life: Option<u32>,
}

fn seconds(ms: u32) -> f64 {
    f64::from(ms) / 1000.0
}

impl Tuning {
    fn new(config: &GameConfig) -> Self {
        Self {
            level_name_fade: seconds(config.level_name_fade_ms),
            game_over_fade: seconds(config.game_over_fade_ms),
            brick_hit: seconds(config.brick_hit_ms),
            brick_destroy: seconds(config.brick_destroy_ms),
            bonus_score_fade: seconds(config.bonus_score_fade_ms),
            bonus_life_fade: seconds(config.bonus_life_fade_ms),
            default_start_speed: config.default_start_speed,
            hit_speed_increase_ratio: config.brick_hit_speed_increase_ratio,
            award_bonus_life: config.award_bonus_life.filter(|&n| n > 0),
        }
    }
}

pub struct Level {
    name: String,
    base_value: u32,
    speed_ratio: f64,
    geometry: Geometry,
    tuning: Tuning,
    /// Resolved texture paths; slot 0 is the background
    textures: Vec<Option<PathBuf>>,
    sounds: SoundBank,
    grid: BrickGrid,
    ball: Ball,
    paddle: Paddle,
    animations: Vec<Animation>,
    events: Vec<GameEvent>,
    rng: Pcg32,
    launched: bool,
    bump_pending: bool,
    game_over_shown: bool,
}

impl Level {
    /// Build a level from a parsed layout
    ///
    /// Resources are resolved through `locator`; an unresolved texture leaves
    /// its bricks out of the grid, an unresolved sound stays silent. `rng`
    /// drives bonus assignment and the destruction animations.
    pub fn load(
        layout: &LevelLayout,
        config: &GameConfig,
        display: &DisplayConfig,
        locator: &dyn ResourceLocator,
        mut rng: Pcg32,
    ) -> Result<Self, LevelError> {
        let geometry = config.geometry(display);
        let (wide, high) = (geometry.bricks_wide, geometry.bricks_high);

        if layout.rows.len() < high {
            return Err(LayoutError::MissingRow(layout.rows.len()).into());
        }

        let textures: Vec<Option<PathBuf>> = layout.textures.iter().map(|id| locator.locate(id)).collect();
        let sounds = SoundBank::resolve(layout, locator);

        let mut grid = BrickGrid::new(wide, high);
        for (row, cells) in layout.rows.iter().take(high).enumerate() {
            if cells.len() < wide {
                return Err(LayoutError::RowTooShort {
                    row,
                    len: cells.len() * 4,
                    needed: wide * 4,
                }
                .into());
            }
            for (col, cell) in cells.iter().take(wide).enumerate() {
                let flags = layout.bonus.apply(&mut rng, cell.texture, cell.flags);
                if flags != cell.flags {
                    log::debug!("Bonus {:#04x} applied to {} x {}", flags, row, col);
                }
                let has_texture = cell.texture != 0
                    && textures
                        .get(usize::from(cell.texture))
                        .is_some_and(|t| t.is_some());
                if !has_texture {
                    continue;
                }
                let pos = DVec2::new(col as f64 * geometry.brick.x, row as f64 * geometry.brick.y);
                grid.set(
                    Cell { row, col },
                    Some(Brick::new(pos, geometry.brick, cell.texture, flags, layout.base_value)),
                );
            }
        }

        let paddle = Paddle::new(
            geometry.paddle_start,
            geometry.paddle,
            geometry.paddle_speed,
            geometry.paddle_min_x,
            geometry.paddle_max_x,
            display.controller_dead_zone,
        );
        let ball = Ball::new(geometry.ball_spawn, geometry.ball, geometry.ball_spawn_speed);
        let tuning = Tuning::new(config);

        let name_fade = TextFade::new(
            layout.name.clone(),
            geometry.display / 2.0,
            TextStyle::Title,
            tuning.level_name_fade,
            0.0,
        );

        log::info!(
            "Level {:?} loaded: {} active bricks, speed ratio {}",
            layout.name,
            grid.active_count(),
            layout.speed_ratio
        );

        Ok(Self {
            name: layout.name.clone(),
            base_value: layout.base_value,
            speed_ratio: layout.speed_ratio,
            geometry,
            tuning,
            textures,
            sounds,
            grid,
            ball,
            paddle,
            animations: vec![Animation::Text(name_fade)],
            events: Vec::new(),
            rng,
            launched: false,
            bump_pending: false,
            game_over_shown: false,
        })
    }

    /// Read, parse and build the level file `id`
    pub fn from_file(
        id: &str,
        config: &GameConfig,
        display: &DisplayConfig,
        locator: &dyn ResourceLocator,
        rng: Pcg32,
    ) -> Result<Self, LevelError> {
        let layout = read_layout(id, config, locator)?;
        Self::load(&layout, config, display, locator, rng)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_value(&self) -> u32 {
        self.base_value
    }

    pub fn speed_ratio(&self) -> f64 {
        self.speed_ratio
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn textures(&self) -> &[Option<PathBuf>] {
        &self.textures
    }

    pub fn sounds(&self) -> &SoundBank {
        &self.sounds
    }

    pub fn grid(&self) -> &BrickGrid {
        &self.grid
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn paddle(&self) -> &Paddle {
        &self.paddle
    }

    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    pub fn is_launched(&self) -> bool {
        self.launched
    }

    /// Non-wall bricks still standing
    pub fn active_bricks(&self) -> usize {
        self.grid.active_count()
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn handle_input(&mut self, input: PaddleInput) {
        self.paddle.handle_input(input);
    }

    /// Put the ball in play
    pub fn launch(&mut self) {
        if !self.launched {
            log::debug!("Ball launched at {:.1} degrees", self.ball.direction());
            self.launched = true;
        }
    }

    /// Nudge the ball's heading at the next update
    pub fn bump(&mut self) {
        self.bump_pending = true;
    }

    /// Advance the level by `elapsed` seconds
    pub fn update(&mut self, state: &mut GameState, elapsed: f64) {
        let elapsed = if elapsed.is_finite() { elapsed.max(0.0) } else { 0.0 };

        for animation in &mut self.animations {
            animation.advance(elapsed);
        }
        self.animations.retain(|a| !a.is_complete());

        self.paddle.move_by(elapsed);
        if self.bump_pending {
            self.apply_bump();
        }

        if state.lives == 0 {
            if !self.game_over_shown {
                self.show_game_over(state);
            }
        } else if !self.launched {
            self.hold_ball_on_paddle();
            if self.grid.active_count() == 0 && self.animations.is_empty() {
                self.finish_level(state);
            }
        } else if self.ball_out_of_play() {
            self.launched = false;
            if self.grid.active_count() != 0 {
                state.add_lives(-1);
                log::info!("Lost ball, lives = {}", state.lives);
                self.events.push(GameEvent::Sound(SoundEffect::BallLoss));
                self.events.push(GameEvent::BallLost { lives_left: state.lives });
            } else {
                log::info!("Ignoring lost ball, no active bricks");
            }
        } else {
            self.step(state, elapsed);
        }

        if state.lives == 0 && self.game_over_shown && self.animations.is_empty() {
            state.run_state = RunState::End;
        }
    }

    /// Time-sliced ball simulation for one frame
    fn step(&mut self, state: &mut GameState, mut remaining: f64) {
        let mut collisions = 0u32;
        while remaining > 0.0 {
            if collisions >= MAX_COLLISIONS_PER_FRAME {
                log::warn!(
                    "{} collisions in one frame, moving the ball for the remaining {:.4}s",
                    collisions,
                    remaining
                );
                self.ball.move_by(remaining);
                break;
            }
            collisions += 1;

            let (hit, active) = self.find_collision(remaining);
            if active == 0 && self.animations.is_empty() {
                self.finish_level(state);
                break;
            }

            if let Some((cell, t)) = hit {
                let Some(brick) = self.grid.get(cell).cloned() else {
                    break;
                };
                self.events.push(GameEvent::Sound(SoundEffect::BrickHit));
                self.resolve_brick_hit(state, cell);

                self.ball.move_by(remaining * t);
                self.ball.bounce_off_brick(&brick);
                remaining *= 1.0 - t;

                if !brick.is_wall() {
                    let increment = self.tuning.hit_speed_increase_ratio
                        * (self.geometry.display.y * self.tuning.default_start_speed)
                        / self.grid.capacity() as f64;
                    self.ball.set_speed(self.ball.speed() + increment);
                }
                continue;
            }

            let t = self.ball.paddle_contact_time(&self.paddle, remaining);
            if t > 0.0 && t < 1.0 {
                log::trace!("Paddle collision at {:.4}", t);
                self.events.push(GameEvent::Sound(SoundEffect::PaddleHit));
                self.ball.move_by(remaining * t);
                self.ball.bounce_off_paddle(&self.paddle);
                remaining *= 1.0 - t;
            } else if t <= 0.0 || self.ball.overlaps_paddle(&self.paddle) {
                log::debug!(
                    "Paddle overlap: paddle {:?} ball {:?}",
                    self.paddle.pos,
                    self.ball.pos
                );
                self.ball.bounce_off_paddle(&self.paddle);
                self.events.push(GameEvent::Sound(SoundEffect::PaddleHit));
            } else {
                self.ball.move_by(remaining);
                remaining = 0.0;
            }
        }
    }

    /// Earliest brick contact within `dt`, and the number of active bricks
    ///
    /// Bricks ahead of the ball are scanned first and only a strictly
    /// earlier contact replaces the current one, so equal times resolve to
    /// the nearest brick.
    fn find_collision(&self, dt: f64) -> (Option<(Cell, f64)>, usize) {
        let heading = heading_vector(self.ball.direction());
        let mut earliest: Option<(Cell, f64)> = None;
        let mut active = 0;

        for cell in self.grid.scan_order(heading) {
            let Some(brick) = self.grid.get(cell) else {
                continue;
            };
            let t = self.ball.brick_contact_time(Some(brick), dt);
            if t < 1.0 && earliest.is_none_or(|(_, best)| t < best) {
                earliest = Some((cell, t));
            }
            if brick.is_destructible_and_alive() {
                active += 1;
            }
        }
        (earliest, active)
    }

    /// Hit the brick at `cell`, then any area-effect neighbours
    fn resolve_brick_hit(&mut self, state: &mut GameState, cell: Cell) {
        let Some(brick) = self.grid.get(cell) else {
            return;
        };
        let (quad, all) = (brick.is_quad_destroy(), brick.is_all_brick_destroy());

        self.hit_brick(state, cell);
        if quad {
            log::debug!("Area quad hit at {} x {}", cell.row, cell.col);
            for neighbour in self.grid.neighbours(cell) {
                self.hit_brick(state, neighbour);
            }
        } else if all {
            log::debug!("Area all hit at {} x {}", cell.row, cell.col);
            let cells: Vec<Cell> = self.grid.cells().collect();
            for other in cells {
                self.hit_brick(state, other);
            }
        }
    }

    /// One hit on one brick, with scoring, animations and life awards
    fn hit_brick(&mut self, state: &mut GameState, cell: Cell) {
        let Some(brick) = self.grid.get_mut(cell) else {
            return;
        };
        if brick.hit_count() == 0 || brick.is_wall() {
            return;
        }
        brick.collision();
        let brick = brick.clone();

        state.add_score(brick.value());
        let sprite = SpriteId::Brick(brick.texture);
        let bonus = brick.value() > self.base_value;

        if brick.hit_count() == 0 {
            let mut duration = self.tuning.brick_destroy;
            if bonus {
                duration *= 2.0;
            }
            self.animations.push(Animation::Destruction(DestructionAnimation::new(
                &mut self.rng,
                sprite,
                brick.pos,
                brick.size,
                duration,
                brick.size.x,
                DestructionMode::Large,
            )));
            self.events.push(GameEvent::BrickDestroyed {
                row: cell.row,
                col: cell.col,
                value: brick.value(),
            });
        } else {
            self.animations.push(Animation::Destruction(DestructionAnimation::new(
                &mut self.rng,
                sprite,
                brick.pos,
                brick.size,
                self.tuning.brick_hit,
                brick.size.y,
                DestructionMode::Small,
            )));
        }

        let center = brick.pos + brick.size / 2.0;
        if bonus {
            self.push_text(
                brick.value().to_string(),
                center,
                TextStyle::Bonus,
                self.tuning.bonus_score_fade,
            );
        }
        if brick.is_extra_life() {
            self.push_text("+1 Life", center, TextStyle::Bonus, self.tuning.bonus_life_fade);
            state.add_lives(1);
            self.events.push(GameEvent::LifeAwarded);
        }

        self.award_bonus_lives(state);
    }

    /// A life for every multiple of the bonus interval the score has crossed
    fn award_bonus_lives(&mut self, state: &mut GameState) {
        let Some(interval) = self.tuning.award_bonus_life else {
            return;
        };
        let multiple = u32::try_from(state.score / u64::from(interval)).unwrap_or(u32::MAX);
        if multiple <= state.bonus_lives_awarded {
            return;
        }
        let delta = multiple - state.bonus_lives_awarded;
        state.add_bonus_lives_awarded(delta);
        state.add_lives(i32::try_from(delta).unwrap_or(i32::MAX));
        log::info!("Bonus life awarded at score {}, lives = {}", state.score, state.lives);
        self.events.push(GameEvent::LifeAwarded);
        self.push_text(
            "+1 Life",
            self.geometry.display / 2.0,
            TextStyle::Title,
            self.tuning.bonus_score_fade,
        );
    }

    /// Floating text that drifts one brick height per second
    fn push_text(&mut self, text: impl Into<String>, center: DVec2, style: TextStyle, duration: f64) {
        let gravity = self.geometry.brick.y;
        self.animations
            .push(Animation::Text(TextFade::new(text, center, style, duration, gravity)));
    }

    fn apply_bump(&mut self) {
        let direction = normalize_degrees(self.ball.direction() + BUMP_ROTATION);
        self.ball.set_direction(direction);
        self.bump_pending = false;
        log::info!("Bump ball to {:.1} degrees", direction);
        self.push_text("Bump!", self.ball.pos, TextStyle::Bonus, self.tuning.bonus_score_fade);
    }

    fn show_game_over(&mut self, state: &GameState) {
        self.game_over_shown = true;
        log::info!("Game over, final score {}", state.score);
        self.events.push(GameEvent::GameOver);
        self.animations.push(Animation::Text(TextFade::new(
            "Game Over",
            self.geometry.display / 2.0,
            TextStyle::Title,
            self.tuning.game_over_fade,
            0.0,
        )));
    }

    /// Park the ball above the paddle, aimed by its horizontal position
    fn hold_ball_on_paddle(&mut self) {
        let x = self.paddle.center_x() - self.ball.size.x / 2.0;
        let y = self.paddle.pos.y - self.ball.size.y - 1.0;
        self.ball.set_position(DVec2::new(x, y));

        let across = x / self.geometry.display.x;
        let direction = (LAUNCH_DIRECTION_MAX - across * LAUNCH_DIRECTION_SWEEP)
            .clamp(LAUNCH_DIRECTION_MIN, LAUNCH_DIRECTION_MAX);
        self.ball.set_direction(direction);
        self.ball
            .set_speed(self.geometry.display.y * self.tuning.default_start_speed * self.speed_ratio);
    }

    fn ball_out_of_play(&self) -> bool {
        let pos = self.ball.pos;
        let display = self.geometry.display;
        pos.y > display.y || pos.y < 0.0 || pos.x > display.x || pos.x < 0.0
    }

    fn finish_level(&mut self, state: &mut GameState) {
        if state.run_state != RunState::NextLevel {
            log::info!("Level {:?} cleared, score {}", self.name, state.score);
            self.events.push(GameEvent::LevelCleared);
        }
        state.run_state = RunState::NextLevel;
    }

    /// Emit the frame in painter's order
    pub fn render(&self, state: &GameState, sink: &mut dyn RenderSink) {
        let display = self.geometry.display;
        let brick = self.geometry.brick;

        if self.textures.first().is_some_and(|t| t.is_some()) {
            sink.draw(DrawCommand::Sprite {
                sprite: SpriteId::Background,
                dest: Rect::new(0.0, 0.0, display.x, display.y),
                src: None,
                alpha: 255,
            });
        }

        for (_, b) in self.grid.iter().filter(|(_, b)| b.is_active()) {
            sink.draw(DrawCommand::Sprite {
                sprite: SpriteId::Brick(b.texture),
                dest: Rect::from_pos_size(b.pos, b.size),
                src: None,
                alpha: 255,
            });
        }

        sink.draw(DrawCommand::Sprite {
            sprite: SpriteId::Ball,
            dest: Rect::from_pos_size(self.ball.pos, self.ball.size),
            src: None,
            alpha: 255,
        });
        sink.draw(DrawCommand::Sprite {
            sprite: SpriteId::Paddle,
            dest: Rect::from_pos_size(self.paddle.pos, self.paddle.size),
            src: None,
            alpha: 255,
        });

        sink.draw(DrawCommand::Text {
            text: format!("Lives : {}", state.lives),
            center: DVec2::new(brick.x / 3.0, brick.y / 10.0),
            style: TextStyle::Hud,
            alpha: 255,
        });
        sink.draw(DrawCommand::Text {
            text: format!("Score: {:08}", state.score),
            center: DVec2::new(display.x - brick.x / 3.0, brick.y / 10.0),
            style: TextStyle::Hud,
            alpha: 255,
        });

        for animation in &self.animations {
            animation.render(sink);
        }
    }
}

/// Locate, read and parse the level file `id` for the configured grid
pub fn read_layout(id: &str, config: &GameConfig, locator: &dyn ResourceLocator) -> Result<LevelLayout, LevelError> {
    let path = locator.locate(id).ok_or_else(|| LevelError::NotFound(id.to_string()))?;
    let text = read_text(&path)?;
    log::info!("Loading level {}", path.display());
    Ok(LevelLayout::parse(
        &text,
        config.bricks_wide as usize,
        config.bricks_high as usize,
    )?)
}

fn read_text(path: &Path) -> Result<String, LevelError> {
    fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.to_path_buf(),
        source,
    })
}
