//! Frame-clocked animations: brick destruction and fading text
//!
//! Animations own no textures; they render by sprite id. Their clocks are
//! advanced by the level with the same elapsed time the physics uses, so a
//! replay with identical frame times reproduces them exactly.

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{FRAGMENT_COLUMNS, FRAGMENT_COUNT, FRAGMENT_ROWS};
use crate::renderer::{DrawCommand, Rect, RenderSink, SpriteId, TextStyle, fade_alpha};

/// Horizontal drift direction of each fragment, row-major over the 2x8 split
const FRAGMENT_DRIFT_SIGN: [f64; FRAGMENT_COUNT] = [
    -1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, 1.0, //
    -1.0, -1.0, -1.0, 1.0, -1.0, 1.0, 1.0, 1.0,
];

/// Gravity multiplier base for the top and bottom fragment rows
const TOP_ROW_GRAVITY: f64 = 2.0;
const BOTTOM_ROW_GRAVITY: f64 = 5.0;

/// Elapsed/duration pair shared by every animation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnimationClock {
    pub elapsed: f64,
    pub duration: f64,
}

impl AnimationClock {
    pub fn new(duration: f64) -> Self {
        Self {
            elapsed: 0.0,
            duration,
        }
    }

    pub fn advance(&mut self, dt: f64) {
        self.elapsed += dt;
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed > self.duration
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }

    pub fn alpha(&self) -> u8 {
        fade_alpha(self.elapsed, self.duration)
    }
}

/// Random motion factors for one fragment
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FragmentMotion {
    /// Horizontal drift, in sprite widths per second
    pub drift: f64,
    /// Upward launch, in sprite heights per second (1..2)
    pub launch: f64,
    /// Gravity multiplier
    pub gravity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestructionMode {
    /// Brick destroyed: 16 fragments fly apart
    Large,
    /// Brick hit but still standing: the whole sprite drops and fades
    Small,
}

/// Procedural break-up of a brick sprite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestructionAnimation {
    pub sprite: SpriteId,
    pub pos: DVec2,
    pub size: DVec2,
    /// Gravity constant, px/s^2 for fragments, px/s for the small drop
    pub gravity: f64,
    pub mode: DestructionMode,
    pub clock: AnimationClock,
    fragments: [FragmentMotion; FRAGMENT_COUNT],
}

impl DestructionAnimation {
    pub fn new<R: Rng>(
        rng: &mut R,
        sprite: SpriteId,
        pos: DVec2,
        size: DVec2,
        duration: f64,
        gravity: f64,
        mode: DestructionMode,
    ) -> Self {
        let mut fragments = [FragmentMotion::default(); FRAGMENT_COUNT];
        for (i, fragment) in fragments.iter_mut().enumerate() {
            let base = if i < FRAGMENT_COLUMNS {
                TOP_ROW_GRAVITY
            } else {
                BOTTOM_ROW_GRAVITY
            };
            *fragment = FragmentMotion {
                drift: rng.random::<f64>(),
                launch: rng.random::<f64>() + 1.0,
                gravity: rng.random::<f64>() * base + base,
            };
        }
        Self {
            sprite,
            pos,
            size,
            gravity,
            mode,
            clock: AnimationClock::new(duration),
            fragments,
        }
    }

    pub fn fragments(&self) -> &[FragmentMotion; FRAGMENT_COUNT] {
        &self.fragments
    }

    /// Size of one fragment of the 2x8 split
    pub fn fragment_size(&self) -> DVec2 {
        DVec2::new(
            self.size.x / FRAGMENT_COLUMNS as f64,
            self.size.y / FRAGMENT_ROWS as f64,
        )
    }

    /// Position of fragment `index` after `t` seconds
    ///
    /// Constant horizontal drift plus a vertical launch under gravity; each
    /// fragment follows its own trajectory.
    pub fn fragment_position(&self, index: usize, t: f64) -> DVec2 {
        let cell = self.fragment_size();
        let row = index / FRAGMENT_COLUMNS;
        let col = index % FRAGMENT_COLUMNS;
        let origin = self.pos + DVec2::new(col as f64 * cell.x, row as f64 * cell.y);

        let motion = &self.fragments[index];
        let drift = FRAGMENT_DRIFT_SIGN[index] * self.size.x * motion.drift;
        let launch = -self.size.y * motion.launch;
        let gravity = self.gravity * motion.gravity;

        DVec2::new(
            origin.x + t * drift,
            origin.y + launch * t + 0.5 * gravity * t * t,
        )
    }

    /// Position of the whole sprite in small mode after `t` seconds
    pub fn drop_position(&self, t: f64) -> DVec2 {
        DVec2::new(self.pos.x, self.pos.y + t * self.gravity)
    }

    pub fn render(&self, sink: &mut dyn RenderSink) {
        let t = self.clock.elapsed;
        let alpha = self.clock.alpha();

        match self.mode {
            DestructionMode::Small => {
                sink.draw(DrawCommand::Sprite {
                    sprite: self.sprite,
                    dest: Rect::from_pos_size(self.drop_position(t), self.size),
                    src: None,
                    alpha,
                });
            }
            DestructionMode::Large => {
                let cell = self.fragment_size();
                // Fragments narrow as the animation runs out
                let progress = if self.clock.duration > 0.0 {
                    (t / self.clock.duration).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                let sub_width = cell.x * (1.0 - progress);
                for index in 0..FRAGMENT_COUNT {
                    let row = index / FRAGMENT_COLUMNS;
                    let col = index % FRAGMENT_COLUMNS;
                    let at = self.fragment_position(index, t);
                    sink.draw(DrawCommand::Sprite {
                        sprite: self.sprite,
                        dest: Rect::new(at.x, at.y, sub_width, cell.y),
                        src: Some(Rect::new(
                            col as f64 * cell.x,
                            row as f64 * cell.y,
                            sub_width,
                            cell.y,
                        )),
                        alpha,
                    });
                }
            }
        }
    }
}

/// Text that drifts and fades out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextFade {
    pub text: String,
    pub center: DVec2,
    pub style: TextStyle,
    /// Vertical drift, px/s
    pub gravity: f64,
    pub clock: AnimationClock,
}

impl TextFade {
    pub fn new(text: impl Into<String>, center: DVec2, style: TextStyle, duration: f64, gravity: f64) -> Self {
        Self {
            text: text.into(),
            center,
            style,
            gravity,
            clock: AnimationClock::new(duration),
        }
    }

    pub fn position(&self) -> DVec2 {
        DVec2::new(self.center.x, self.center.y + self.clock.elapsed * self.gravity)
    }

    pub fn render(&self, sink: &mut dyn RenderSink) {
        sink.draw(DrawCommand::Text {
            text: self.text.clone(),
            center: self.position(),
            style: self.style,
            alpha: self.clock.alpha(),
        });
    }
}

/// Any animation the level keeps in its list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Animation {
    Destruction(DestructionAnimation),
    Text(TextFade),
}

impl Animation {
    fn clock(&self) -> &AnimationClock {
        match self {
            Animation::Destruction(a) => &a.clock,
            Animation::Text(a) => &a.clock,
        }
    }

    fn clock_mut(&mut self) -> &mut AnimationClock {
        match self {
            Animation::Destruction(a) => &mut a.clock,
            Animation::Text(a) => &mut a.clock,
        }
    }

    pub fn advance(&mut self, dt: f64) {
        self.clock_mut().advance(dt);
    }

    pub fn is_complete(&self) -> bool {
        self.clock().is_complete()
    }

    pub fn reset(&mut self) {
        self.clock_mut().reset();
    }

    pub fn render(&self, sink: &mut dyn RenderSink) {
        match self {
            Animation::Destruction(a) => a.render(sink),
            Animation::Text(a) => a.render(sink),
        }
    }
}
