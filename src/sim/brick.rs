//! Bricks and their flag encoding

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;

/// Brick behaviour, decoded from the layout flag byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BrickKind {
    /// Single hit, base value
    #[default]
    Plain,
    /// Indestructible, worth nothing
    Wall,
    /// Takes 2..=5 hits, base value
    MultiHit(u8),
    /// Single hit, value scaled by the multiplier (2, 3, 4, 10 or 100)
    ScoreMultiplier(u32),
    /// Awards a life when destroyed
    ExtraLife,
    /// Also hits the surrounding 3x3 block
    AreaQuad,
    /// Also hits every brick in the grid
    AreaAll,
}

impl BrickKind {
    pub const FLAG_WALL: u8 = 0x01;
    pub const FLAG_TWO_HIT: u8 = 0x02;
    pub const FLAG_THREE_HIT: u8 = 0x03;
    pub const FLAG_FOUR_HIT: u8 = 0x04;
    pub const FLAG_FIVE_HIT: u8 = 0x05;
    pub const FLAG_DOUBLE_SCORE: u8 = 0x10;
    pub const FLAG_TRIPLE_SCORE: u8 = 0x11;
    pub const FLAG_QUAD_SCORE: u8 = 0x12;
    pub const FLAG_TEN_SCORE: u8 = 0x13;
    pub const FLAG_HUNDRED_SCORE: u8 = 0x14;
    pub const FLAG_EXTRA_LIFE: u8 = 0x80;
    pub const FLAG_AREA_QUAD: u8 = 0x81;
    pub const FLAG_AREA_ALL: u8 = 0x82;

    /// Decode a flag byte; unknown values behave as a plain brick
    pub fn from_flags(flags: u8) -> Self {
        match flags {
            Self::FLAG_WALL => BrickKind::Wall,
            Self::FLAG_TWO_HIT..=Self::FLAG_FIVE_HIT => BrickKind::MultiHit(flags),
            Self::FLAG_DOUBLE_SCORE => BrickKind::ScoreMultiplier(2),
            Self::FLAG_TRIPLE_SCORE => BrickKind::ScoreMultiplier(3),
            Self::FLAG_QUAD_SCORE => BrickKind::ScoreMultiplier(4),
            Self::FLAG_TEN_SCORE => BrickKind::ScoreMultiplier(10),
            Self::FLAG_HUNDRED_SCORE => BrickKind::ScoreMultiplier(100),
            Self::FLAG_EXTRA_LIFE => BrickKind::ExtraLife,
            Self::FLAG_AREA_QUAD => BrickKind::AreaQuad,
            Self::FLAG_AREA_ALL => BrickKind::AreaAll,
            _ => BrickKind::Plain,
        }
    }

    /// Hits needed to destroy a brick of this kind
    pub fn hit_count(&self) -> u32 {
        match self {
            BrickKind::MultiHit(hits) => u32::from(*hits),
            _ => 1,
        }
    }

    /// Score for a hit on a brick of this kind
    pub fn value(&self, base_value: u32) -> u32 {
        match self {
            BrickKind::Wall => 0,
            BrickKind::ScoreMultiplier(m) => base_value.saturating_mul(*m),
            _ => base_value,
        }
    }
}

/// A brick occupying one grid cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brick {
    /// Upper-left corner in pixels
    pub pos: DVec2,
    pub size: DVec2,
    /// Texture slot in the level's texture table
    pub texture: u8,
    pub kind: BrickKind,
    hit_count: u32,
    value: u32,
}

impl Brick {
    pub fn new(pos: DVec2, size: DVec2, texture: u8, flags: u8, base_value: u32) -> Self {
        let kind = BrickKind::from_flags(flags);
        Self {
            pos,
            size,
            texture,
            kind,
            hit_count: kind.hit_count(),
            value: kind.value(base_value),
        }
    }

    pub fn hit_count(&self) -> u32 {
        self.hit_count
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// Still collidable (walls always are)
    pub fn is_active(&self) -> bool {
        self.hit_count > 0
    }

    /// Counts towards clearing the level
    pub fn is_destructible_and_alive(&self) -> bool {
        !self.is_wall() && self.hit_count > 0
    }

    pub fn is_wall(&self) -> bool {
        self.kind == BrickKind::Wall
    }

    pub fn is_extra_life(&self) -> bool {
        self.kind == BrickKind::ExtraLife
    }

    pub fn is_quad_destroy(&self) -> bool {
        self.kind == BrickKind::AreaQuad
    }

    pub fn is_all_brick_destroy(&self) -> bool {
        self.kind == BrickKind::AreaAll
    }

    /// Register a hit: walls ignore it, dead bricks stay at zero
    pub fn collision(&mut self) {
        if self.is_wall() {
            return;
        }
        self.hit_count = self.hit_count.saturating_sub(1);
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::moving(self.pos, self.size, DVec2::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brick(flags: u8) -> Brick {
        Brick::new(DVec2::ZERO, DVec2::new(40.0, 20.0), 1, flags, 10)
    }

    #[test]
    fn test_multi_hit_scales_hits_only() {
        for (flags, hits) in [(0x02, 2), (0x03, 3), (0x04, 4), (0x05, 5)] {
            let b = brick(flags);
            assert_eq!(b.hit_count(), hits);
            assert_eq!(b.value(), 10);
        }
    }

    #[test]
    fn test_score_multiplier_scales_value_only() {
        for (flags, value) in [(0x10, 20), (0x11, 30), (0x12, 40), (0x13, 100), (0x14, 1000)] {
            let b = brick(flags);
            assert_eq!(b.hit_count(), 1);
            assert_eq!(b.value(), value);
        }
    }

    #[test]
    fn test_wall_is_worthless_and_immutable() {
        let mut b = brick(BrickKind::FLAG_WALL);
        assert!(b.is_wall());
        assert_eq!(b.value(), 0);
        for _ in 0..10 {
            b.collision();
        }
        assert_eq!(b.hit_count(), 1);
        assert!(b.is_active());
        assert!(!b.is_destructible_and_alive());
    }

    #[test]
    fn test_hit_count_never_negative() {
        let mut b = brick(0x00);
        b.collision();
        assert_eq!(b.hit_count(), 0);
        b.collision();
        assert_eq!(b.hit_count(), 0);
        assert!(!b.is_active());
    }

    #[test]
    fn test_predicates() {
        assert!(brick(0x80).is_extra_life());
        assert!(brick(0x81).is_quad_destroy());
        assert!(brick(0x82).is_all_brick_destroy());
        assert_eq!(brick(0x42).kind, BrickKind::Plain);
    }
}
