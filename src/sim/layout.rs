//! Level layout text format
//!
//! Line oriented:
//!
//! ```text
//! "Level name"          (quotes optional)
//! 10                    base brick value
//! 10 40 60 80 90 94 99  bonus probability, then six cumulative tier thresholds
//! 1.0                   initial speed ratio
//! music.ogg             background music (empty = none)
//! hit.wav               brick hit sound
//! paddle.wav            paddle hit sound
//! loss.wav              ball loss sound
//! 3                     texture count (at least 2)
//! background.png        texture 0
//! red.png               texture 1..
//! ...
//! 01000102...           one row per grid row, 4 hex digits per brick
//! ```
//!
//! Each 4-digit group is `(texture index, flags)`. Texture index 0 leaves the
//! slot empty.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::brick::BrickKind;
use crate::consts::*;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("level file ended before the {0} line")]
    MissingLine(&'static str),
    #[error("level needs at least 2 textures, found {0}")]
    TooFewTextures(usize),
    #[error("texture {0} line missing")]
    MissingTexture(usize),
    #[error("grid row {0} missing")]
    MissingRow(usize),
    #[error("grid row {row} has {len} characters, needs {needed}")]
    RowTooShort { row: usize, len: usize, needed: usize },
    #[error("grid row {row} column {col}: invalid hex digit {found:?}")]
    InvalidHex { row: usize, col: usize, found: char },
}

/// Chance of a plain brick becoming a bonus brick, and which bonus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusTable {
    /// Percent chance (0..=100) that an unflagged brick gets a bonus
    pub probability: u32,
    /// Cumulative thresholds for x2, x3, x4, x10, x100, area-quad; above the
    /// last threshold the bonus is an extra life
    pub tiers: [u32; 6],
}

impl Default for BonusTable {
    fn default() -> Self {
        Self {
            probability: DEFAULT_BONUS_PROBABILITY,
            tiers: DEFAULT_BONUS_TIERS,
        }
    }
}

impl BonusTable {
    const TIER_FLAGS: [u8; 6] = [
        BrickKind::FLAG_DOUBLE_SCORE,
        BrickKind::FLAG_TRIPLE_SCORE,
        BrickKind::FLAG_QUAD_SCORE,
        BrickKind::FLAG_TEN_SCORE,
        BrickKind::FLAG_HUNDRED_SCORE,
        BrickKind::FLAG_AREA_QUAD,
    ];

    /// Flags for a cell, assigning a random bonus to unflagged bricks
    pub fn apply<R: Rng>(&self, rng: &mut R, texture: u8, flags: u8) -> u8 {
        if flags != 0 || texture == 0 {
            return flags;
        }
        if rng.random_range(0..=100u32) <= self.probability {
            self.roll(rng)
        } else {
            flags
        }
    }

    /// Pick a bonus flag according to the tier thresholds
    pub fn roll<R: Rng>(&self, rng: &mut R) -> u8 {
        let bonus = rng.random_range(0..=100u32);
        self.tiers
            .iter()
            .zip(Self::TIER_FLAGS)
            .find(|(threshold, _)| bonus < **threshold)
            .map(|(_, flag)| flag)
            .unwrap_or(BrickKind::FLAG_EXTRA_LIFE)
    }
}

/// One grid slot as written in the layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LayoutCell {
    pub texture: u8,
    pub flags: u8,
}

/// A parsed level file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelLayout {
    pub name: String,
    pub base_value: u32,
    pub bonus: BonusTable,
    pub speed_ratio: f64,
    pub music: Option<String>,
    pub brick_hit_sound: Option<String>,
    pub paddle_hit_sound: Option<String>,
    pub ball_loss_sound: Option<String>,
    /// Texture ids; slot 0 is the background
    pub textures: Vec<String>,
    /// `bricks_high` rows of `bricks_wide` cells
    pub rows: Vec<Vec<LayoutCell>>,
}

impl LevelLayout {
    pub fn parse(text: &str, bricks_wide: usize, bricks_high: usize) -> Result<Self, LayoutError> {
        let mut lines = text.lines().map(|l| l.trim_end_matches('\r'));
        let mut next = |what: &'static str| lines.next().ok_or(LayoutError::MissingLine(what));

        let name = strip_quotes(next("level name")?);
        log::info!("Level name: {}", name);

        let base_line = next("base value")?;
        let base_value = match base_line.trim().parse::<u32>() {
            Ok(v) => v,
            Err(_) => {
                log::warn!("Base brick value {:?} failed to convert, using {}", base_line, DEFAULT_BASE_VALUE);
                DEFAULT_BASE_VALUE
            }
        };

        let bonus = parse_bonus(next("bonus probability")?);

        let speed_line = next("speed ratio")?;
        let speed_ratio = match speed_line.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                log::warn!("Initial speed ratio {:?} failed to convert, using {}", speed_line, DEFAULT_SPEED_RATIO);
                DEFAULT_SPEED_RATIO
            }
        };

        let music = optional(next("background music")?);
        let brick_hit_sound = optional(next("brick hit sound")?);
        let paddle_hit_sound = optional(next("paddle hit sound")?);
        let ball_loss_sound = optional(next("ball loss sound")?);

        let count_line = next("texture count")?;
        let texture_count = count_line.trim().parse::<usize>().unwrap_or(0);
        if texture_count < 2 {
            return Err(LayoutError::TooFewTextures(texture_count));
        }
        let mut textures = Vec::with_capacity(texture_count);
        for i in 0..texture_count {
            let id = lines.next().ok_or(LayoutError::MissingTexture(i))?;
            textures.push(id.trim().to_string());
        }

        let mut rows = Vec::with_capacity(bricks_high);
        for row in 0..bricks_high {
            let line = lines.next().ok_or(LayoutError::MissingRow(row))?;
            log::debug!("Row {}: {}", row, line);
            rows.push(parse_row(row, line, bricks_wide)?);
        }

        Ok(Self {
            name,
            base_value,
            bonus,
            speed_ratio,
            music,
            brick_hit_sound,
            paddle_hit_sound,
            ball_loss_sound,
            textures,
            rows,
        })
    }
}

fn strip_quotes(line: &str) -> String {
    let line = line.trim();
    if line.len() >= 2 && line.starts_with('"') && line.ends_with('"') {
        line[1..line.len() - 1].to_string()
    } else {
        line.to_string()
    }
}

fn optional(line: &str) -> Option<String> {
    let line = line.trim();
    (!line.is_empty()).then(|| line.to_string())
}

/// Probability then up to six tier thresholds; bad fields keep their defaults
fn parse_bonus(line: &str) -> BonusTable {
    let mut table = BonusTable::default();
    let mut fields = line.split_whitespace();

    match fields.next().map(str::parse::<u32>) {
        Some(Ok(p)) => table.probability = p,
        _ => {
            log::warn!("Bonus probability {:?} failed to convert", line);
            return table;
        }
    }
    for (i, field) in fields.take(table.tiers.len()).enumerate() {
        match field.parse::<u32>() {
            Ok(v) => table.tiers[i] = v,
            Err(_) => log::warn!("Bonus tier {} value {:?} failed to convert", i, field),
        }
    }
    log::info!("Bonus probability {} tiers {:?}", table.probability, table.tiers);
    table
}

fn parse_row(row: usize, line: &str, bricks_wide: usize) -> Result<Vec<LayoutCell>, LayoutError> {
    let needed = bricks_wide * 4;
    let chars: Vec<char> = line.chars().collect();
    if chars.len() < needed {
        return Err(LayoutError::RowTooShort {
            row,
            len: chars.len(),
            needed,
        });
    }

    let digit = |col: usize, c: char| -> Result<u8, LayoutError> {
        c.to_digit(16)
            .map(|d| d as u8)
            .ok_or(LayoutError::InvalidHex { row, col, found: c })
    };

    (0..bricks_wide)
        .map(|col| {
            let group = &chars[col * 4..col * 4 + 4];
            Ok(LayoutCell {
                texture: (digit(col, group[0])? << 4) | digit(col, group[1])?,
                flags: (digit(col, group[2])? << 4) | digit(col, group[3])?,
            })
        })
        .collect()
}
