//! Per-game high score leaderboards
//!
//! Stored in the key-value store under one key per game, top 10 scores each.

use serde::{Deserialize, Serialize};

use crate::platform::KeyValueStore;

/// Maximum number of high scores to keep per game
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Final session score
    pub score: u64,
    /// Reward reported to the host for that session
    pub reward: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard for one game
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

    fn storage_key(game: &str) -> String {
        format!("office_arcade_highscores_{game}")
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Must beat the lowest entry
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a score if it qualifies; returns the rank achieved (1-indexed)
    pub fn add_score(&mut self, score: u64, reward: u32, timestamp: f64) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries.insert(
            rank - 1,
            HighScoreEntry {
                score,
                reward,
                timestamp,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best score so far (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load a game's leaderboard; storage problems start it fresh
    pub fn load<S: KeyValueStore>(store: &S, game: &str) -> Self {
        match store.load_json::<HighScores>(&Self::storage_key(game)) {
            Ok(Some(scores)) => {
                log::info!("Loaded {} high scores for {}", scores.entries.len(), game);
                scores
            }
            Ok(None) => Self::new(),
            Err(e) => {
                log::warn!("High scores for {game} unreadable, starting fresh: {e}");
                Self::new()
            }
        }
    }

    pub fn save<S: KeyValueStore>(&self, store: &mut S, game: &str) {
        match store.save_json(&Self::storage_key(game), self) {
            Ok(()) => log::info!("High scores saved for {} ({} entries)", game, self.entries.len()),
            Err(e) => log::warn!("Failed to save high scores for {game}: {e}"),
        }
    }
}

/// Relative age of a timestamp ("3 mins ago"); both values in ms
pub fn format_age(timestamp: f64, now: f64) -> String {
    let diff_mins = ((now - timestamp) / 60_000.0).max(0.0);
    let diff_hours = diff_mins / 60.0;
    let diff_days = diff_hours / 24.0;

    if diff_days >= 1.0 {
        match diff_days.floor() as i64 {
            1 => "Yesterday".to_string(),
            days => format!("{days} days ago"),
        }
    } else if diff_hours >= 1.0 {
        match diff_hours.floor() as i64 {
            1 => "1 hour ago".to_string(),
            hours => format!("{hours} hours ago"),
        }
    } else if diff_mins >= 1.0 {
        match diff_mins.floor() as i64 {
            1 => "1 min ago".to_string(),
            mins => format!("{mins} mins ago"),
        }
    } else {
        "Just now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[test]
    fn test_sorted_insert_and_rank() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(50, 100, 0.0), Some(1));
        assert_eq!(scores.add_score(80, 160, 1.0), Some(1));
        assert_eq!(scores.add_score(60, 120, 2.0), Some(2));
        let order: Vec<_> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(order, vec![80, 60, 50]);
        assert_eq!(scores.top_score(), Some(80));
    }

    #[test]
    fn test_zero_never_qualifies() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(0, 10, 0.0), None);
        assert!(scores.is_empty());
    }

    #[test]
    fn test_full_board_keeps_ten() {
        let mut scores = HighScores::new();
        for s in 1..=12 {
            scores.add_score(s * 10, 0, 0.0);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert!(!scores.qualifies(30));
        assert_eq!(scores.potential_rank(35), Some(10));
        assert_eq!(scores.entries.last().map(|e| e.score), Some(30));
    }

    #[test]
    fn test_per_game_storage() {
        let mut store = MemoryStore::new();
        let mut racer = HighScores::new();
        racer.add_score(900, 900, 0.0);
        racer.save(&mut store, "racer");
        assert_eq!(HighScores::load(&store, "racer"), racer);
        assert!(HighScores::load(&store, "runner").is_empty());
    }

    #[test]
    fn test_format_age() {
        let now = 10.0 * 86_400_000.0;
        assert_eq!(format_age(now - 5_000.0, now), "Just now");
        assert_eq!(format_age(now - 60_000.0, now), "1 min ago");
        assert_eq!(format_age(now - 3.0 * 3_600_000.0, now), "3 hours ago");
        assert_eq!(format_age(now - 86_400_000.0, now), "Yesterday");
        assert_eq!(format_age(now - 4.0 * 86_400_000.0, now), "4 days ago");
    }
}
