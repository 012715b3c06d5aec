//! The ball: a square box with a velocity in px/s
//!
//! Contact times come from the swept-AABB test; responses are per-axis
//! reflections rather than surface-normal bounces. A corner hit can flip
//! both axes, and the paddle response tuning depends on that.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::brick::Brick;
use super::paddle::Paddle;
use crate::consts::*;
use crate::{heading_vector, normalize_degrees};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    /// Upper-left corner
    pub pos: DVec2,
    /// Velocity, px/s
    pub vel: DVec2,
    pub size: DVec2,
}

impl Ball {
    /// A ball heading down-left at `speed` px/s
    pub fn new(pos: DVec2, size: DVec2, speed: f64) -> Self {
        Self {
            pos,
            vel: heading_vector(BALL_INITIAL_DIRECTION) * speed,
            size,
        }
    }

    pub fn center(&self) -> DVec2 {
        self.pos + self.size * 0.5
    }

    pub fn set_position(&mut self, pos: DVec2) {
        self.pos = pos;
    }

    /// Linear displacement over `dt` seconds
    pub fn move_by(&mut self, dt: f64) {
        self.pos += self.vel * dt;
    }

    pub fn speed(&self) -> f64 {
        self.vel.length()
    }

    /// Heading in degrees, [0, 360)
    pub fn direction(&self) -> f64 {
        normalize_degrees(self.vel.y.atan2(self.vel.x).to_degrees())
    }

    /// Point the ball along `degrees`, keeping its speed
    pub fn set_direction(&mut self, degrees: f64) {
        let speed = self.speed();
        self.vel = heading_vector(degrees) * speed;
    }

    /// Rescale the velocity so its magnitude becomes `speed`
    pub fn set_speed(&mut self, speed: f64) {
        let current = self.speed();
        if current <= f64::EPSILON {
            log::warn!("Ball speed was zero, relaunching along the initial heading");
            self.vel = heading_vector(BALL_INITIAL_DIRECTION) * speed;
            return;
        }
        log::trace!("Ball speed {} -> {}", current, speed);
        self.vel *= speed / current;
    }

    /// The ball's box for a step of `dt` seconds
    pub fn swept_box(&self, dt: f64) -> Aabb {
        Aabb::moving(self.pos, self.size, self.vel * dt)
    }

    /// Time of contact with `brick` within the next `dt` seconds (1.0 = none)
    pub fn brick_contact_time(&self, brick: Option<&Brick>, dt: f64) -> f64 {
        match brick {
            Some(brick) if brick.is_active() => self.swept_box(dt).sweep_against(&brick.bounds()),
            _ => 1.0,
        }
    }

    /// Time of contact with the paddle within the next `dt` seconds (1.0 = none)
    pub fn paddle_contact_time(&self, paddle: &Paddle, dt: f64) -> f64 {
        self.swept_box(dt).sweep_against(&paddle.bounds())
    }

    /// Whether the ball already sits inside the paddle (touching does not count)
    pub fn overlaps_paddle(&self, paddle: &Paddle) -> bool {
        self.swept_box(0.0).penetrates(&paddle.bounds())
    }

    /// Reflect off a brick on whichever axes the ball center is outside of
    pub fn bounce_off_brick(&mut self, brick: &Brick) {
        let bounds = brick.bounds();
        let center = self.center();

        if center.x < bounds.pos.x && self.vel.x > 0.0 {
            self.vel.x = -self.vel.x;
        } else if center.x > bounds.right() && self.vel.x < 0.0 {
            self.vel.x = -self.vel.x;
        }

        if center.y > bounds.bottom() && self.vel.y < 0.0 {
            self.vel.y = -self.vel.y;
        } else if center.y < bounds.pos.y && self.vel.y > 0.0 {
            self.vel.y = -self.vel.y;
        }
    }

    /// Rebound off the paddle
    ///
    /// Below the paddle's top edge the ball is deflected sideways and moved
    /// clear of the paddle. Otherwise it rebounds upward and its heading is
    /// biased by where it struck: left of center towards 190°, right of
    /// center towards 350°.
    pub fn bounce_off_paddle(&mut self, paddle: &Paddle) {
        let paddle_min = paddle.pos.x;
        let paddle_width = paddle.width();
        let center = self.center();

        if center.y > paddle.pos.y {
            self.vel.x = -self.vel.x;
            if center.x < paddle_min + paddle_width / 2.0 {
                self.pos.x = paddle_min - self.size.x - 1.0;
            } else {
                self.pos.x = paddle_min + paddle_width + 1.0;
            }
            log::debug!("Paddle side hit, ball moved to x={}", self.pos.x);
            return;
        }

        self.vel.y = -self.vel.y;
        if self.pos.y + self.size.y > paddle.pos.y {
            self.pos.y = paddle.pos.y - self.size.y;
        }

        let offset = center.x - paddle_min;
        let half = paddle_width / 2.0;
        let mut direction = self.direction();
        if offset < half {
            direction -= (1.0 - offset / half) * PADDLE_DEFLECTION;
            direction = direction.max(PADDLE_DIRECTION_FLOOR);
        } else {
            direction += (1.0 - (paddle_width - offset) / half) * PADDLE_DEFLECTION;
            direction = direction.min(PADDLE_DIRECTION_CEILING);
        }
        self.set_direction(direction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ball_above_paddle(paddle_y: f64) -> (Ball, Paddle) {
        let mut ball = Ball::new(DVec2::new(16.0, 0.0), DVec2::splat(16.0), 32.0);
        ball.set_direction(90.0);
        let paddle = Paddle::new(DVec2::new(0.0, paddle_y), DVec2::new(48.0, 16.0), 0.0, 0.0, 200.0, 0.0);
        (ball, paddle)
    }

    #[test]
    fn test_initial_heading_down_left() {
        let ball = Ball::new(DVec2::ZERO, DVec2::splat(8.0), 100.0);
        assert!((ball.direction() - 240.0).abs() < 1e-9);
        assert!((ball.speed() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_ball_paddle_contact() {
        let (mut ball, paddle) = ball_above_paddle(32.0);

        let t = ball.paddle_contact_time(&paddle, 1.0);
        assert_eq!(t, 0.5);
        ball.move_by(t);
        ball.bounce_off_paddle(&paddle);
        assert_eq!(ball.pos, DVec2::new(16.0, 16.0));

        // Now heading straight up, nothing to hit
        assert_eq!(ball.paddle_contact_time(&paddle, 0.5), 1.0);
        ball.move_by(0.5);
        assert!(ball.pos.y.abs() < 1e-9);
        assert!((ball.pos.x - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_ball_paddle_overlap_recovery() {
        let (mut ball, paddle) = ball_above_paddle(12.0);

        assert!(ball.overlaps_paddle(&paddle));
        assert_eq!(ball.paddle_contact_time(&paddle, 1.0), 1.0);
        ball.bounce_off_paddle(&paddle);
        assert_eq!(ball.pos.y, -4.0);
        assert!(ball.vel.y < 0.0);
        assert!(!ball.overlaps_paddle(&paddle));
    }

    #[test]
    fn test_ball_paddle_touch() {
        let (mut ball, paddle) = ball_above_paddle(16.0);

        let t = ball.paddle_contact_time(&paddle, 1.0);
        assert_eq!(t, 0.0);
        ball.move_by(t);
        ball.bounce_off_paddle(&paddle);
        ball.move_by(1.0);
        assert!((ball.pos.y + 32.0).abs() < 1e-9);
        assert!((ball.pos.x - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_paddle_side_hit_moves_ball_clear() {
        let paddle = Paddle::new(DVec2::new(100.0, 100.0), DVec2::new(60.0, 16.0), 0.0, 0.0, 400.0, 0.0);
        // Center below the paddle top, left half
        let mut ball = Ball::new(DVec2::new(96.0, 104.0), DVec2::splat(10.0), 50.0);
        ball.vel = DVec2::new(30.0, 40.0);
        ball.bounce_off_paddle(&paddle);
        assert_eq!(ball.vel, DVec2::new(-30.0, 40.0));
        assert_eq!(ball.pos.x, 89.0);

        // Right half
        let mut ball = Ball::new(DVec2::new(150.0, 104.0), DVec2::splat(10.0), 50.0);
        ball.vel = DVec2::new(-30.0, 40.0);
        ball.bounce_off_paddle(&paddle);
        assert_eq!(ball.pos.x, 161.0);
        assert_eq!(ball.vel.x, 30.0);
    }

    #[test]
    fn test_paddle_edge_hits_are_clamped() {
        let paddle = Paddle::new(DVec2::new(100.0, 100.0), DVec2::new(60.0, 16.0), 0.0, 0.0, 400.0, 0.0);

        // Far left edge, falling straight down: 270 - 50 * (1 - 0/30) would be 220
        let mut ball = Ball::new(DVec2::new(95.0, 90.0), DVec2::splat(10.0), 100.0);
        ball.set_direction(90.0);
        ball.bounce_off_paddle(&paddle);
        assert!((ball.direction() - 220.0).abs() < 1e-9);

        // Shallow approach from the left edge hits the floor
        let mut ball = Ball::new(DVec2::new(95.0, 90.0), DVec2::splat(10.0), 100.0);
        ball.set_direction(160.0);
        ball.bounce_off_paddle(&paddle);
        assert!((ball.direction() - 190.0).abs() < 1e-9);

        // Shallow approach on the right edge hits the ceiling
        let mut ball = Ball::new(DVec2::new(155.0, 90.0), DVec2::splat(10.0), 100.0);
        ball.set_direction(20.0);
        ball.bounce_off_paddle(&paddle);
        assert!((ball.direction() - 350.0).abs() < 1e-9);
    }

    #[test]
    fn test_brick_corner_reflects_both_axes() {
        let brick = Brick::new(DVec2::new(100.0, 100.0), DVec2::new(40.0, 20.0), 1, 0, 10);
        let mut ball = Ball::new(DVec2::new(88.0, 88.0), DVec2::splat(10.0), 10.0);
        ball.vel = DVec2::new(5.0, 5.0);
        ball.bounce_off_brick(&brick);
        assert_eq!(ball.vel, DVec2::new(-5.0, -5.0));
    }

    #[test]
    fn test_brick_face_reflects_one_axis() {
        let brick = Brick::new(DVec2::new(100.0, 100.0), DVec2::new(40.0, 20.0), 1, 0, 10);
        // Underneath, moving up
        let mut ball = Ball::new(DVec2::new(110.0, 121.0), DVec2::splat(10.0), 10.0);
        ball.vel = DVec2::new(3.0, -4.0);
        ball.bounce_off_brick(&brick);
        assert_eq!(ball.vel, DVec2::new(3.0, 4.0));
    }

    #[test]
    fn test_inactive_brick_is_ignored() {
        let mut brick = Brick::new(DVec2::new(0.0, 20.0), DVec2::new(40.0, 20.0), 1, 0, 10);
        let mut ball = Ball::new(DVec2::new(10.0, 0.0), DVec2::splat(10.0), 10.0);
        ball.set_direction(90.0);
        ball.set_speed(40.0);
        assert!(ball.brick_contact_time(Some(&brick), 1.0) < 1.0);
        brick.collision();
        assert_eq!(ball.brick_contact_time(Some(&brick), 1.0), 1.0);
        assert_eq!(ball.brick_contact_time(None, 1.0), 1.0);
    }

    proptest! {
        #[test]
        fn prop_direction_changes_keep_speed(
            speed in 1.0f64..2000.0,
            directions in proptest::collection::vec(0.0f64..360.0, 1..50),
        ) {
            let mut ball = Ball::new(DVec2::ZERO, DVec2::splat(8.0), speed);
            for d in directions {
                ball.set_direction(d);
            }
            prop_assert!((ball.speed() - speed).abs() < 1e-6 * speed);
        }

        #[test]
        fn prop_set_speed_round_trips(
            start in 1.0f64..2000.0,
            direction in 0.0f64..360.0,
            target in 0.5f64..5000.0,
        ) {
            let mut ball = Ball::new(DVec2::ZERO, DVec2::splat(8.0), start);
            ball.set_direction(direction);
            ball.set_speed(target);
            prop_assert!((ball.speed() - target).abs() < 1e-9 * target.max(1.0));
        }
    }
}
