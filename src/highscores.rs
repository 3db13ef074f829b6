//! High score leaderboard
//!
//! Tracks the top 10 runs. Persisted as JSON through any `Storage` backend.

use serde::{Deserialize, Serialize};

use crate::persistence::{Storage, StorageError, load_json, save_json};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Storage key for the leaderboard
pub const STORAGE_KEY: &str = "invader_rush_highscores";

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Final score of the run
    pub score: u64,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, score: u64, timestamp: f64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry { score, timestamp };

        // Sorted descending; ties keep the earlier run ahead
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load the leaderboard; a missing key is an empty board
    pub fn load<S: Storage + ?Sized>(storage: &S) -> Result<Self, StorageError> {
        let scores: Self = load_json(storage, STORAGE_KEY)?.unwrap_or_default();
        log::info!("Loaded {} high scores", scores.entries.len());
        Ok(scores)
    }

    pub fn save<S: Storage + ?Sized>(&self, storage: &mut S) -> Result<(), StorageError> {
        save_json(storage, STORAGE_KEY, self)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

/// The narrow persistence surface the game needs
pub trait HighScoreStore {
    /// Best stored score, 0 when nothing is stored or storage fails
    fn read_high_score(&mut self) -> u64;
    /// Record a finished run's score
    fn write_high_score(&mut self, score: u64);
}

/// `HighScoreStore` backed by a leaderboard in `Storage`
///
/// Storage failures are logged and swallowed; the game never sees them.
pub struct ScoreBook<S: Storage> {
    storage: S,
    now_ms: fn() -> f64,
}

impl<S: Storage> ScoreBook<S> {
    pub fn new(storage: S) -> Self {
        Self::with_clock(storage, crate::platform::now_epoch_ms)
    }

    /// Use a custom timestamp source for new entries
    pub fn with_clock(storage: S, now_ms: fn() -> f64) -> Self {
        Self { storage, now_ms }
    }

    /// Current leaderboard, empty on storage failure
    pub fn leaderboard(&self) -> HighScores {
        HighScores::load(&self.storage).unwrap_or_else(|err| {
            log::warn!("Could not read high scores: {err}");
            HighScores::new()
        })
    }
}

impl<S: Storage> HighScoreStore for ScoreBook<S> {
    fn read_high_score(&mut self) -> u64 {
        self.leaderboard().top_score().unwrap_or(0)
    }

    fn write_high_score(&mut self, score: u64) {
        let mut board = self.leaderboard();
        match board.add_score(score, (self.now_ms)()) {
            Some(rank) => {
                log::info!("Score {score} entered the leaderboard at #{rank}");
                if let Err(err) = board.save(&mut self.storage) {
                    log::warn!("Could not save high scores: {err}");
                }
            }
            None => log::debug!("Score {score} did not qualify for the leaderboard"),
        }
    }
}
