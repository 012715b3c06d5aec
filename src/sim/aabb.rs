//! Axis-aligned boxes and the swept-AABB test
//!
//! Every collision in the game is box against box: the ball is treated as
//! its bounding square, bricks and the paddle are static rectangles. The
//! moving box carries its displacement for the step being tested (not a
//! per-second velocity), so a returned time of 0.5 means "halfway through
//! this step".

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle with a displacement for one simulation step
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    /// Upper-left corner
    pub pos: DVec2,
    /// Width and height (never negative)
    pub size: DVec2,
    /// Displacement over the step
    pub vel: DVec2,
}

impl Aabb {
    /// A stationary box
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            pos: DVec2::new(x, y),
            size: DVec2::new(w.max(0.0), h.max(0.0)),
            vel: DVec2::ZERO,
        }
    }

    /// A box moving by `vel` over the step
    pub fn moving(pos: DVec2, size: DVec2, vel: DVec2) -> Self {
        Self {
            pos,
            size: size.max(DVec2::ZERO),
            vel,
        }
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> DVec2 {
        self.pos + self.size * 0.5
    }

    /// Inclusive overlap test on current extents (touching edges overlap)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        !(self.right() < other.pos.x
            || self.pos.x > other.right()
            || self.bottom() < other.pos.y
            || self.pos.y > other.bottom())
    }

    /// Strict overlap: the interiors intersect, touching edges do not count
    pub fn penetrates(&self, other: &Aabb) -> bool {
        self.right() > other.pos.x
            && self.pos.x < other.right()
            && self.bottom() > other.pos.y
            && self.pos.y < other.bottom()
    }

    /// Region covering the box before and after applying its displacement
    pub fn broadphase(&self) -> Aabb {
        let (x, w) = if self.vel.x > 0.0 {
            (self.pos.x, self.size.x + self.vel.x)
        } else {
            (self.pos.x + self.vel.x, self.size.x - self.vel.x)
        };
        let (y, h) = if self.vel.y > 0.0 {
            (self.pos.y, self.size.y + self.vel.y)
        } else {
            (self.pos.y + self.vel.y, self.size.y - self.vel.y)
        };
        Aabb::new(x, y, w, h)
    }

    /// Time of first contact of `self` (moving) against `other` (stationary)
    ///
    /// Returns a value in `[0, 1)` on contact during the step, `1.0` when there
    /// is none. Boxes that already overlap and are separating on both axes
    /// report no contact. An axis with zero displacement never constrains the
    /// result.
    pub fn swept_time(&self, other: &Aabb) -> f64 {
        // Distances between near and far faces on each axis
        let (x_inv_entry, x_inv_exit) = if self.vel.x > 0.0 {
            (other.pos.x - self.right(), other.right() - self.pos.x)
        } else {
            (other.right() - self.pos.x, other.pos.x - self.right())
        };
        let (y_inv_entry, y_inv_exit) = if self.vel.y > 0.0 {
            (other.pos.y - self.bottom(), other.bottom() - self.pos.y)
        } else {
            (other.bottom() - self.pos.y, other.pos.y - self.bottom())
        };

        let (x_entry, x_exit) = if self.vel.x == 0.0 {
            (f64::NEG_INFINITY, f64::INFINITY)
        } else {
            (x_inv_entry / self.vel.x, x_inv_exit / self.vel.x)
        };
        let (y_entry, y_exit) = if self.vel.y == 0.0 {
            (f64::NEG_INFINITY, f64::INFINITY)
        } else {
            (y_inv_entry / self.vel.y, y_inv_exit / self.vel.y)
        };

        let entry_time = x_entry.max(y_entry);
        let exit_time = x_exit.min(y_exit);

        if entry_time > exit_time
            || (x_entry < 0.0 && y_entry < 0.0)
            || x_entry > 1.0
            || y_entry > 1.0
        {
            1.0
        } else {
            entry_time
        }
    }

    /// Broad-phase rejection followed by the exact sweep
    pub fn sweep_against(&self, other: &Aabb) -> f64 {
        if self.broadphase().overlaps(other) {
            self.swept_time(other)
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_overlaps_touching_edges() {
        let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
        let b = Aabb::new(10.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&b));
        assert!(!a.penetrates(&b));

        let c = Aabb::new(10.5, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_broadphase_negative_velocity() {
        let a = Aabb::moving(DVec2::new(10.0, 10.0), DVec2::new(4.0, 4.0), DVec2::new(-6.0, 3.0));
        let bp = a.broadphase();
        assert_eq!(bp.pos, DVec2::new(4.0, 10.0));
        assert_eq!(bp.size, DVec2::new(10.0, 7.0));
    }

    #[test]
    fn test_swept_head_on() {
        // 16px box falling 32px onto a surface 16px below it
        let ball = Aabb::moving(DVec2::new(16.0, 0.0), DVec2::splat(16.0), DVec2::new(0.0, 32.0));
        let paddle = Aabb::new(0.0, 32.0, 48.0, 16.0);
        assert_eq!(ball.swept_time(&paddle), 0.5);
    }

    #[test]
    fn test_swept_out_of_reach() {
        let ball = Aabb::moving(DVec2::new(0.0, 0.0), DVec2::splat(10.0), DVec2::new(0.0, 5.0));
        let wall = Aabb::new(0.0, 100.0, 50.0, 10.0);
        assert_eq!(ball.swept_time(&wall), 1.0);
        assert_eq!(ball.sweep_against(&wall), 1.0);
    }

    #[test]
    fn test_swept_overlapping_and_separating() {
        // Already overlapping, moving up and left away from the other box
        let a = Aabb::moving(DVec2::new(5.0, 5.0), DVec2::splat(10.0), DVec2::new(-3.0, -3.0));
        let b = Aabb::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&b));
        assert_eq!(a.swept_time(&b), 1.0);
    }

    #[test]
    fn test_swept_touching_is_immediate() {
        let ball = Aabb::moving(DVec2::new(16.0, 0.0), DVec2::splat(16.0), DVec2::new(0.0, 32.0));
        let paddle = Aabb::new(0.0, 16.0, 48.0, 16.0);
        assert_eq!(ball.swept_time(&paddle), 0.0);
    }

    #[test]
    fn test_swept_diagonal_misses_corner() {
        // Passes beside the box: y overlaps in time but x never does
        let a = Aabb::moving(DVec2::new(0.0, 0.0), DVec2::splat(4.0), DVec2::new(2.0, 20.0));
        let b = Aabb::new(20.0, 10.0, 4.0, 4.0);
        assert_eq!(a.swept_time(&b), 1.0);
    }

    proptest! {
        #[test]
        fn prop_stationary_boxes_never_report_contact(
            ax in -100.0f64..100.0, ay in -100.0f64..100.0,
            bx in -100.0f64..100.0, by in -100.0f64..100.0,
            aw in 0.0f64..50.0, ah in 0.0f64..50.0,
            bw in 0.0f64..50.0, bh in 0.0f64..50.0,
        ) {
            let a = Aabb::new(ax, ay, aw, ah);
            let b = Aabb::new(bx, by, bw, bh);
            prop_assert_eq!(a.swept_time(&b), 1.0);
        }

        #[test]
        fn prop_swept_time_in_unit_range(
            ax in -100.0f64..100.0, ay in -100.0f64..100.0,
            vx in -80.0f64..80.0, vy in -80.0f64..80.0,
            bx in -100.0f64..100.0, by in -100.0f64..100.0,
        ) {
            let a = Aabb::moving(DVec2::new(ax, ay), DVec2::splat(8.0), DVec2::new(vx, vy));
            let b = Aabb::new(bx, by, 20.0, 10.0);
            let t = a.swept_time(&b);
            prop_assert!(t <= 1.0);
            prop_assert!(t >= 0.0);
        }

        #[test]
        fn prop_contact_implies_broadphase_overlap(
            ax in -100.0f64..100.0, ay in -100.0f64..100.0,
            vx in -80.0f64..80.0, vy in -80.0f64..80.0,
            bx in -100.0f64..100.0, by in -100.0f64..100.0,
        ) {
            let a = Aabb::moving(DVec2::new(ax, ay), DVec2::splat(8.0), DVec2::new(vx, vy));
            let b = Aabb::new(bx, by, 20.0, 10.0);
            let t = a.swept_time(&b);
            if (0.0..1.0).contains(&t) {
                prop_assert!(a.broadphase().overlaps(&b));
            }
        }
    }
}
