//! High score leaderboard
//!
//! Persisted through a `KeyValueStore`, keeps the top 10 runs.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, load_or_default, save_best_effort};

/// Maximum number of entries to keep
pub const MAX_ENTRIES: usize = 10;

/// Player names are cut to this many characters
pub const MAX_NAME_LEN: usize = 12;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u64,
    /// Level reached
    pub level: u32,
    /// Calendar date the run ended (display string)
    pub date: String,
}

impl LeaderboardEntry {
    pub fn new(name: &str, score: u64, level: u32, date: &str) -> Self {
        Self {
            name: truncate_name(name),
            score,
            level,
            date: date.to_string(),
        }
    }
}

/// Trim whitespace and cut to `MAX_NAME_LEN` characters; blank becomes "Player"
pub fn truncate_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return "Player".to_string();
    }
    trimmed.chars().take(MAX_NAME_LEN).collect()
}

/// Ranked list, descending by score
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "circuit_runner_leaderboard";

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build from arbitrary entries, enforcing order, name length and size
    pub fn from_entries(entries: Vec<LeaderboardEntry>) -> Self {
        let mut board = Self { entries };
        board.normalize();
        board
    }

    /// Check if a score would make the board
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_ENTRIES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert an entry if it qualifies. Returns the rank achieved.
    pub fn add(&mut self, entry: LeaderboardEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }
        let mut entry = entry;
        entry.name = truncate_name(&entry.name);

        // Ties keep the earlier run ahead
        let pos = self.entries.iter().position(|e| entry.score > e.score);
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
        self.entries.truncate(MAX_ENTRIES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Sort descending (stable), clamp names, keep the top `MAX_ENTRIES`
    fn normalize(&mut self) {
        for entry in &mut self.entries {
            entry.name = truncate_name(&entry.name);
        }
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_ENTRIES);
    }

    /// Read the stored board; anything unreadable is an empty board
    pub fn read<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let mut board: Leaderboard = load_or_default(store, Self::STORAGE_KEY);
        board.normalize();
        log::info!("Loaded {} leaderboard entries", board.entries.len());
        board
    }

    /// Store `entries` sorted descending and cut to the top 10
    pub fn write<S: KeyValueStore + ?Sized>(store: &S, entries: Vec<LeaderboardEntry>) -> Self {
        let board = Self::from_entries(entries);
        board.save(store);
        board
    }

    /// Persist this board; returns false if storage refused it
    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &S) -> bool {
        let saved = save_best_effort(store, Self::STORAGE_KEY, self);
        if saved {
            log::info!("Leaderboard saved ({} entries)", self.entries.len());
        }
        saved
    }

    /// Add a finished run and persist the result. Returns the rank achieved.
    pub fn record<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &S,
        entry: LeaderboardEntry,
    ) -> Option<usize> {
        let rank = self.add(entry)?;
        self.save(store);
        Some(rank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryStore, NullStore};

    fn entry(name: &str, score: u64) -> LeaderboardEntry {
        LeaderboardEntry::new(name, score, 1, "2026-01-01")
    }

    #[test]
    fn test_write_eleven_keeps_ten_sorted() {
        let store = MemoryStore::new();
        let entries = (1..=11).map(|i| entry("p", i * 10)).collect();
        Leaderboard::write(&store, entries);

        let board = Leaderboard::read(&store);
        assert_eq!(board.entries.len(), 10);
        assert!(board.entries.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(board.top_score(), Some(110));
        assert_eq!(board.entries.last().map(|e| e.score), Some(20));
    }

    #[test]
    fn test_read_empty_store() {
        let board = Leaderboard::read(&MemoryStore::new());
        assert!(board.is_empty());
    }

    #[test]
    fn test_unavailable_storage_reads_empty() {
        let board = Leaderboard::read(&NullStore);
        assert!(board.is_empty());
        assert!(!board.save(&NullStore));
    }

    #[test]
    fn test_names_are_truncated() {
        let e = entry("AVeryLongPlayerName", 5);
        assert_eq!(e.name.chars().count(), MAX_NAME_LEN);
        assert_eq!(e.name, "AVeryLongPla");
        assert_eq!(entry("   ", 5).name, "Player");
    }

    #[test]
    fn test_qualifies_and_rank() {
        let mut board = Leaderboard::new();
        assert!(!board.qualifies(0));
        for i in 1..=10 {
            board.add(entry("p", i * 100));
        }
        assert!(!board.qualifies(100));
        assert!(board.qualifies(101));
        assert_eq!(board.potential_rank(1001), Some(1));
        assert_eq!(board.potential_rank(550), Some(6));
        assert_eq!(board.potential_rank(50), None);
    }

    #[test]
    fn test_add_returns_rank() {
        let mut board = Leaderboard::new();
        assert_eq!(board.add(entry("a", 100)), Some(1));
        assert_eq!(board.add(entry("b", 300)), Some(1));
        assert_eq!(board.add(entry("c", 200)), Some(2));
        // Tie goes behind the existing score
        assert_eq!(board.add(entry("d", 200)), Some(3));
        let names: Vec<_> = board.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["b", "c", "d", "a"]);
    }

    #[test]
    fn test_record_persists() {
        let store = MemoryStore::new();
        let mut board = Leaderboard::read(&store);
        assert_eq!(board.record(&store, entry("ace", 900)), Some(1));
        assert_eq!(Leaderboard::read(&store), board);
    }
}
