//! The player's paddle
//!
//! Horizontal-only. Keyboard input adds or removes a fixed speed, a pointer
//! places the paddle directly, and an analog axis maps its deflection past a
//! dead zone to a proportional speed.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;

/// Input the paddle consumes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaddleInput {
    /// Left key pressed (`true`) or released (`false`)
    Left(bool),
    /// Right key pressed (`true`) or released (`false`)
    Right(bool),
    /// Absolute pointer x position
    Pointer(f64),
    /// Analog stick deflection in [-1, 1]
    Axis(f64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    /// Upper-left corner
    pub pos: DVec2,
    pub size: DVec2,
    /// Current horizontal speed, px/s
    pub velocity_x: f64,
    /// Keyboard speed, px/s
    pub speed: f64,
    /// Leftmost x allowed
    pub min_x: f64,
    /// Rightmost edge allowed (the paddle's right side stops here)
    pub max_x: f64,
    /// Axis deflection ignored around center
    pub dead_zone: f64,
}

impl Paddle {
    pub fn new(pos: DVec2, size: DVec2, speed: f64, min_x: f64, max_x: f64, dead_zone: f64) -> Self {
        let mut paddle = Self {
            pos,
            size,
            velocity_x: 0.0,
            speed,
            min_x,
            max_x,
            dead_zone: dead_zone.abs(),
        };
        paddle.clamp();
        paddle
    }

    pub fn width(&self) -> f64 {
        self.size.x
    }

    pub fn center_x(&self) -> f64 {
        self.pos.x + self.size.x / 2.0
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::moving(self.pos, self.size, DVec2::ZERO)
    }

    pub fn handle_input(&mut self, input: PaddleInput) {
        match input {
            PaddleInput::Left(true) | PaddleInput::Right(false) => self.velocity_x -= self.speed,
            PaddleInput::Left(false) | PaddleInput::Right(true) => self.velocity_x += self.speed,
            PaddleInput::Pointer(x) => {
                self.pos.x = x;
                self.clamp();
            }
            PaddleInput::Axis(deflection) => {
                let deflection = deflection.clamp(-1.0, 1.0);
                self.velocity_x = if deflection.abs() > self.dead_zone {
                    self.speed * deflection
                } else {
                    0.0
                };
            }
        }
    }

    /// Integrate horizontal motion and clamp to the playfield range
    pub fn move_by(&mut self, dt: f64) {
        self.pos.x += self.velocity_x * dt;
        self.clamp();
    }

    fn clamp(&mut self) {
        if self.pos.x < self.min_x {
            self.pos.x = self.min_x;
        } else if self.pos.x > self.max_x - self.size.x {
            self.pos.x = self.max_x - self.size.x;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paddle() -> Paddle {
        Paddle::new(DVec2::new(100.0, 400.0), DVec2::new(80.0, 20.0), 200.0, 40.0, 680.0, 0.25)
    }

    #[test]
    fn test_keyboard_press_release_cancels() {
        let mut p = paddle();
        p.handle_input(PaddleInput::Left(true));
        assert_eq!(p.velocity_x, -200.0);
        p.handle_input(PaddleInput::Right(true));
        assert_eq!(p.velocity_x, 0.0);
        p.handle_input(PaddleInput::Left(false));
        assert_eq!(p.velocity_x, 200.0);
        p.handle_input(PaddleInput::Right(false));
        assert_eq!(p.velocity_x, 0.0);
    }

    #[test]
    fn test_move_clamps_to_bounds() {
        let mut p = paddle();
        p.handle_input(PaddleInput::Left(true));
        p.move_by(10.0);
        assert_eq!(p.pos.x, 40.0);

        p.handle_input(PaddleInput::Left(false));
        p.handle_input(PaddleInput::Right(true));
        p.move_by(10.0);
        assert_eq!(p.pos.x, 600.0);
    }

    #[test]
    fn test_pointer_sets_position_clamped() {
        let mut p = paddle();
        p.handle_input(PaddleInput::Pointer(300.0));
        assert_eq!(p.pos.x, 300.0);
        p.handle_input(PaddleInput::Pointer(5000.0));
        assert_eq!(p.pos.x, 600.0);
        p.handle_input(PaddleInput::Pointer(-20.0));
        assert_eq!(p.pos.x, 40.0);
    }

    #[test]
    fn test_axis_dead_zone() {
        let mut p = paddle();
        p.handle_input(PaddleInput::Axis(0.2));
        assert_eq!(p.velocity_x, 0.0);
        p.handle_input(PaddleInput::Axis(-0.5));
        assert_eq!(p.velocity_x, -100.0);
        p.handle_input(PaddleInput::Axis(1.0));
        assert_eq!(p.velocity_x, 200.0);
        p.handle_input(PaddleInput::Axis(0.0));
        assert_eq!(p.velocity_x, 0.0);
    }
}
