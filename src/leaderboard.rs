//! Run-time leaderboards
//!
//! One top-5 list per (difficulty, mini, endless) combination, longest run first.
//! Each list is stored as a JSON array and replaced wholesale on every write.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_LEADERBOARD_ENTRIES;
use crate::difficulty::Difficulty;
use crate::persistence::{KeyValueStore, load_json, save_json};

/// Which leaderboard a run belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LeaderboardKey {
    pub difficulty: Difficulty,
    pub mini: bool,
    pub endless: bool,
}

impl LeaderboardKey {
    pub fn new(difficulty: Difficulty, mini: bool, endless: bool) -> Self {
        Self {
            difficulty,
            mini,
            endless,
        }
    }

    /// Storage key, e.g. `wave_dash_leaderboard_hard_mini`
    pub fn storage_key(&self) -> String {
        let mut key = format!("wave_dash_leaderboard_{}", self.difficulty.as_str());
        if self.mini {
            key.push_str("_mini");
        }
        if self.endless {
            key.push_str("_endless");
        }
        key
    }
}

/// A single completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Survival time in seconds (2 decimals)
    pub time: f64,
    /// Consistency percentage, e.g. "92%"
    pub consistency: String,
    /// Local date the run finished
    pub date: String,
}

impl LeaderboardEntry {
    /// One display line, e.g. `1. 9.90s  87%  2026-10-16`
    pub fn row_label(&self, rank: usize) -> String {
        format!(
            "{}. {:.2}s  {}  {}",
            rank, self.time, self.consistency, self.date
        )
    }
}

/// Round elapsed milliseconds to seconds with two decimals
pub fn round_time(elapsed_ms: f64) -> f64 {
    (elapsed_ms / 10.0).round() / 100.0
}

/// Top runs for one key, sorted descending by time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a run; returns the 1-indexed rank, or None if it fell off the list
    ///
    /// Ties rank below existing entries with the same time.
    pub fn add_entry(&mut self, entry: LeaderboardEntry) -> Option<usize> {
        let pos = self
            .entries
            .iter()
            .position(|e| entry.time > e.time)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_LEADERBOARD_ENTRIES);
        (pos < MAX_LEADERBOARD_ENTRIES).then_some(pos + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Longest time on the board, 0 when empty
    pub fn best_time(&self) -> f64 {
        self.entries.first().map(|e| e.time).unwrap_or(0.0)
    }

    /// Load the list for `key`; missing or corrupt data yields an empty list
    pub fn load(store: &impl KeyValueStore, key: &LeaderboardKey) -> Self {
        let storage_key = key.storage_key();
        let mut board = load_json::<Leaderboard>(store, &storage_key).unwrap_or_default();
        // Stored data may predate the size cap or be hand-edited
        board.entries.sort_by(|a, b| b.time.total_cmp(&a.time));
        board.entries.truncate(MAX_LEADERBOARD_ENTRIES);
        log::info!("Loaded {} entries for {}", board.len(), storage_key);
        board
    }

    /// Persist the list for `key`; failures are logged
    pub fn save(&self, store: &mut impl KeyValueStore, key: &LeaderboardKey) {
        let storage_key = key.storage_key();
        match save_json(store, &storage_key, self) {
            Ok(()) => log::info!("Leaderboard saved ({} entries)", self.len()),
            Err(e) => log::warn!("Failed to save {storage_key}: {e}"),
        }
    }

    /// Wipe the list for `key`
    pub fn clear(&mut self, store: &mut impl KeyValueStore, key: &LeaderboardKey) {
        self.entries.clear();
        let storage_key = key.storage_key();
        if let Err(e) = store.remove(&storage_key) {
            log::warn!("Failed to clear {storage_key}: {e}");
        }
    }
}
