//! High score table
//!
//! Bounded, sorted best-first, persisted as JSON next to the game data.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

fn default_capacity() -> usize {
    MAX_HIGH_SCORES
}

#[derive(Debug, Error)]
pub enum HighScoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("high score file {path} is corrupt: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: u64,
    /// Levels started when the game ended
    pub level: u32,
    /// Unix timestamp (seconds) when achieved
    pub timestamp: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighScoreTable {
    pub entries: Vec<HighScoreEntry>,
    #[serde(skip, default = "default_capacity")]
    capacity: usize,
}

impl Default for HighScoreTable {
    fn default() -> Self {
        Self::new(MAX_HIGH_SCORES)
    }
}

impl HighScoreTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check if a score would make it into the table
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < self.capacity {
            return true;
        }
        self.lowest_score().is_none_or(|lowest| score > lowest)
    }

    /// Get the rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a score if it qualifies, returning its rank (1-indexed)
    ///
    /// Ties rank below existing entries with the same score.
    pub fn add_score(&mut self, name: impl Into<String>, score: u64, level: u32, timestamp: u64) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries.insert(
            rank - 1,
            HighScoreEntry {
                name: name.into(),
                score,
                level,
                timestamp,
            },
        );
        self.entries.truncate(self.capacity);
        log::info!("High score {} ranked {}", score, rank);
        Some(rank)
    }

    pub fn lowest_score(&self) -> Option<u64> {
        self.entries.last().map(|e| e.score)
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load a table; a missing file is an empty table
    pub fn load(path: impl AsRef<Path>, capacity: usize) -> Result<Self, HighScoreError> {
        let path = path.as_ref();
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No high scores found, starting fresh");
                return Ok(Self::new(capacity));
            }
            Err(source) => {
                return Err(HighScoreError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let mut table: Self = serde_json::from_str(&json).map_err(|source| HighScoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        table.capacity = capacity.max(1);
        table.entries.sort_by(|a, b| b.score.cmp(&a.score));
        table.entries.truncate(table.capacity);
        log::info!("Loaded {} high scores", table.entries.len());
        Ok(table)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), HighScoreError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|source| HighScoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| HighScoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_and_bounded() {
        let mut table = HighScoreTable::new(3);
        assert_eq!(table.add_score("a", 100, 1, 0), Some(1));
        assert_eq!(table.add_score("b", 300, 2, 0), Some(1));
        assert_eq!(table.add_score("c", 200, 2, 0), Some(2));
        assert_eq!(table.add_score("d", 50, 1, 0), None);
        assert_eq!(table.add_score("e", 150, 1, 0), Some(3));

        let scores: Vec<u64> = table.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![300, 200, 150]);
        assert_eq!(table.lowest_score(), Some(150));
        assert_eq!(table.top_score(), Some(300));
    }

    #[test]
    fn test_zero_never_qualifies() {
        let table = HighScoreTable::new(5);
        assert!(!table.qualifies(0));
        assert!(table.qualifies(1));
    }

    #[test]
    fn test_tie_ranks_below_existing() {
        let mut table = HighScoreTable::new(5);
        table.add_score("first", 100, 1, 0);
        assert_eq!(table.add_score("second", 100, 1, 0), Some(2));
        assert_eq!(table.entries[0].name, "first");
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("brickfall-scores-{}.json", std::process::id()));
        let mut table = HighScoreTable::new(10);
        table.add_score("ada", 1200, 3, 1_700_000_000);
        table.add_score("bob", 800, 2, 1_700_000_100);
        table.save(&path).unwrap();

        let loaded = HighScoreTable::load(&path, 1).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded.capacity(), 1);
        assert_eq!(loaded.entries.len(), 1);
        assert_eq!(loaded.entries[0].name, "ada");
    }

    #[test]
    fn test_missing_file_is_empty() {
        let path = std::env::temp_dir().join("brickfall-no-such-scores.json");
        let table = HighScoreTable::load(&path, 10).unwrap();
        assert!(table.is_empty());
    }
}
