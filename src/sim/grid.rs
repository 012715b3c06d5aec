//! Fixed brick grid, row-major with empty slots
//!
//! Destroyed bricks stay in their slot with a hit count of zero; slots are
//! only cleared when the grid itself is dropped, so indices stay valid for
//! the whole level.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::brick::Brick;

/// Row/column address of a grid slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrickGrid {
    wide: usize,
    high: usize,
    slots: Vec<Option<Brick>>,
}

impl BrickGrid {
    pub fn new(wide: usize, high: usize) -> Self {
        Self {
            wide,
            high,
            slots: vec![None; wide * high],
        }
    }

    pub fn wide(&self) -> usize {
        self.wide
    }

    pub fn high(&self) -> usize {
        self.high
    }

    /// Total slot count (used to scale the per-hit speed ramp)
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        (cell.row < self.high && cell.col < self.wide).then(|| cell.row * self.wide + cell.col)
    }

    pub fn set(&mut self, cell: Cell, brick: Option<Brick>) {
        if let Some(i) = self.index(cell) {
            self.slots[i] = brick;
        }
    }

    /// Brick at `cell`; out-of-range cells read as empty
    pub fn get(&self, cell: Cell) -> Option<&Brick> {
        self.index(cell).and_then(|i| self.slots[i].as_ref())
    }

    pub fn get_mut(&mut self, cell: Cell) -> Option<&mut Brick> {
        self.index(cell).and_then(|i| self.slots[i].as_mut())
    }

    /// Every occupied slot in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (Cell, &Brick)> {
        let wide = self.wide;
        self.slots.iter().enumerate().filter_map(move |(i, slot)| {
            slot.as_ref().map(|b| {
                (
                    Cell {
                        row: i / wide,
                        col: i % wide,
                    },
                    b,
                )
            })
        })
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.high).flat_map(move |row| (0..self.wide).map(move |col| Cell { row, col }))
    }

    /// Non-wall bricks still standing
    pub fn active_count(&self) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|b| b.is_destructible_and_alive())
            .count()
    }

    /// All slots ordered so that rows and columns ahead of `heading` come first
    ///
    /// Moving down scans top to bottom, moving right scans left to right, and
    /// the reverse otherwise. Among equal contact times the first slot found
    /// wins, so this order is the tie-break towards the nearest brick.
    pub fn scan_order(&self, heading: DVec2) -> Vec<Cell> {
        let rows: Vec<usize> = if heading.y > 0.0 {
            (0..self.high).collect()
        } else {
            (0..self.high).rev().collect()
        };
        let cols: Vec<usize> = if heading.x > 0.0 {
            (0..self.wide).collect()
        } else {
            (0..self.wide).rev().collect()
        };
        rows.iter()
            .flat_map(|&row| cols.iter().map(move |&col| Cell { row, col }))
            .collect()
    }

    /// The up to eight in-range slots around `cell`
    pub fn neighbours(&self, cell: Cell) -> Vec<Cell> {
        let mut out = Vec::with_capacity(8);
        for dr in -1i64..=1 {
            for dc in -1i64..=1 {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let row = cell.row as i64 + dr;
                let col = cell.col as i64 + dc;
                if row < 0 || col < 0 || row >= self.high as i64 || col >= self.wide as i64 {
                    continue;
                }
                out.push(Cell {
                    row: row as usize,
                    col: col as usize,
                });
            }
        }
        out
    }
}
