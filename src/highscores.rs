//! High score leaderboard
//!
//! Persisted as a JSON array under a fixed key, sorted by score descending and
//! capped at 10 entries.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, StorageError, load_json, save_json};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single leaderboard record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Level reached
    pub level: u32,
    /// Locale date string when achieved
    pub date: String,
    /// Locale time string when achieved
    pub time: String,
}

/// High score leaderboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub const STORAGE_KEY: &'static str = "bulletHellScores";

    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an arbitrary list, restoring order and the size cap
    pub fn from_entries(mut entries: Vec<HighScoreEntry>) -> Self {
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_HIGH_SCORES);
        Self { entries }
    }

    /// Check if a score would make the board
    pub fn qualifies(&self, score: u64) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// A score that beats every recorded one
    pub fn is_new_record(&self, score: u64) -> bool {
        score > 0 && self.top_score().is_none_or(|top| score > top)
    }

    /// Insert a score, keeping the board sorted and capped.
    /// Returns the rank achieved (1-indexed) or None if it fell off the end.
    pub fn record(&mut self, entry: HighScoreEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }

        // Ties keep the earlier entry ahead
        let pos = self
            .entries
            .iter()
            .position(|e| entry.score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(pos + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load the board; missing or unreadable data yields an empty board
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match load_json::<Vec<HighScoreEntry>>(store, Self::STORAGE_KEY) {
            Ok(Some(entries)) => {
                log::info!("Loaded {} high scores", entries.len());
                Self::from_entries(entries)
            }
            Ok(None) => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("Discarding leaderboard: {}", e);
                Self::new()
            }
        }
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        save_json(store, Self::STORAGE_KEY, self)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use proptest::prelude::*;

    fn entry(score: u64) -> HighScoreEntry {
        HighScoreEntry {
            score,
            level: 1,
            date: "1/1/2026".to_string(),
            time: "12:00:00".to_string(),
        }
    }

    #[test]
    fn test_record_keeps_order() {
        let mut scores = HighScores::new();
        assert_eq!(scores.record(entry(500)), Some(1));
        assert_eq!(scores.record(entry(900)), Some(1));
        assert_eq!(scores.record(entry(700)), Some(2));
        let order: Vec<u64> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(order, vec![900, 700, 500]);
    }

    #[test]
    fn test_cap_at_ten() {
        let mut scores = HighScores::new();
        for s in 1..=12 {
            scores.record(entry(s * 100));
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.top_score(), Some(1200));
        assert_eq!(scores.entries.last().map(|e| e.score), Some(300));
        assert_eq!(scores.record(entry(100)), None);
    }

    #[test]
    fn test_new_record_flag() {
        let mut scores = HighScores::new();
        assert!(scores.is_new_record(10));
        assert!(!scores.is_new_record(0));
        scores.record(entry(1000));
        assert!(!scores.is_new_record(1000));
        assert!(scores.is_new_record(1001));
    }

    #[test]
    fn test_persisted_as_plain_array() {
        let store = MemoryStore::new();
        let mut scores = HighScores::new();
        scores.record(entry(300));
        scores.save(&store).expect("save");

        let raw = store.get(HighScores::STORAGE_KEY).expect("get").expect("present");
        assert!(raw.starts_with('['));
        assert!(raw.contains("\"level\":1"));
        assert_eq!(HighScores::load(&store), scores);
    }

    #[test]
    fn test_unsorted_storage_is_normalized() {
        let store = MemoryStore::new();
        let raw = r#"[{"score":5,"level":1,"date":"d","time":"t"},{"score":50,"level":2,"date":"d","time":"t"}]"#;
        store.set(HighScores::STORAGE_KEY, raw).expect("set");
        let scores = HighScores::load(&store);
        assert_eq!(scores.top_score(), Some(50));
    }

    #[test]
    fn test_corrupt_storage_yields_empty_board() {
        let store = MemoryStore::new();
        store.set(HighScores::STORAGE_KEY, "garbage").expect("set");
        assert!(HighScores::load(&store).is_empty());
    }

    proptest! {
        #[test]
        fn prop_board_sorted_and_capped(raw in proptest::collection::vec(0u64..100_000, 0..40)) {
            let mut scores = HighScores::new();
            for s in raw {
                scores.record(entry(s));
            }
            prop_assert!(scores.entries.len() <= MAX_HIGH_SCORES);
            prop_assert!(scores.entries.windows(2).all(|w| w[0].score >= w[1].score));
        }
    }
}
