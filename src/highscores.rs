//! Leaderboard of finished runs
//!
//! Sorted by score, then level, kills, survival time and recency. Persisted
//! inside the run save and sanitized entry by entry on load.

use std::cmp::Ordering;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::consts::AVATAR_COUNT;
use crate::persistence::sanitize::{self, Object};

/// Maximum number of entries kept
pub const MAX_LEADERBOARD_ENTRIES: usize = 20;
/// Longest account label kept
const MAX_ACCOUNT_LEN: usize = 64;

/// A single finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Run identity
    pub id: String,
    /// Account label (wallet address or guest name)
    pub account: String,
    pub avatar: u8,
    pub score: u64,
    pub kills: u32,
    pub level: u32,
    pub survival_secs: f32,
    /// Unix timestamp (ms) when the run ended
    pub timestamp: f64,
}

impl LeaderboardEntry {
    /// Sanitize one untrusted entry. Entries without identity or a finite
    /// score are rejected; everything else falls back or is clamped.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        let id = match obj.get("id") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return None,
        };
        let score = sanitize::num(obj, "score").filter(|s| *s >= 0.0)?;

        let mut account = sanitize::string(obj, "account").unwrap_or_else(|| "guest".to_string());
        if account.chars().count() > MAX_ACCOUNT_LEN {
            account = account.chars().take(MAX_ACCOUNT_LEN).collect();
        }

        Some(Self {
            id,
            account,
            avatar: sanitize::u8_or(obj, "avatar", 0).min(AVATAR_COUNT - 1),
            score: score.floor().min(u64::MAX as f64) as u64,
            kills: sanitize::u32_or(obj, "kills", 0),
            level: sanitize::u32_or(obj, "level", 1).max(1),
            survival_secs: sanitize::f32_or(obj, "survival_secs", 0.0).max(0.0),
            timestamp: sanitize::f64_or(obj, "timestamp", 0.0).max(0.0),
        })
    }
}

/// Leaderboard ordering: score, level, kills, survival, newest first; id last
/// so the order is total.
pub fn compare_entries(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.score
        .cmp(&a.score)
        .then(b.level.cmp(&a.level))
        .then(b.kills.cmp(&a.kills))
        .then(b.survival_secs.total_cmp(&a.survival_secs))
        .then(b.timestamp.total_cmp(&a.timestamp))
        .then(a.id.cmp(&b.id))
}

/// Sorted, bounded leaderboard
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl<'de> Deserialize<'de> for Leaderboard {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Leaderboard::from_value(&value))
    }
}

impl Leaderboard {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build from untrusted JSON. Accepts a bare array or `{ "entries": [...] }`;
    /// anything else yields an empty board.
    pub fn from_value(value: &Value) -> Self {
        let items = match value {
            Value::Array(items) => items.as_slice(),
            Value::Object(obj) => entries_of(obj),
            _ => &[],
        };

        let mut board = Self::new();
        let before = items.len();
        for entry in items.iter().filter_map(LeaderboardEntry::from_value) {
            board.insert_sorted(entry);
        }
        let dropped = before.saturating_sub(board.entries.len());
        if dropped > 0 {
            log::warn!("Leaderboard: discarded {} malformed or surplus entries", dropped);
        }
        board
    }

    /// Parse untrusted JSON text
    pub fn from_json(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Self::from_value(&value),
            Err(e) => {
                log::warn!("Leaderboard snapshot unreadable: {}", e);
                Self::new()
            }
        }
    }

    fn insert_sorted(&mut self, entry: LeaderboardEntry) {
        if self.entries.iter().any(|e| e.id == entry.id) {
            return;
        }
        self.entries.push(entry);
        self.entries.sort_by(compare_entries);
        self.entries.truncate(MAX_LEADERBOARD_ENTRIES);
    }

    /// Insert a run result. A run id already on the board is never added twice.
    /// Returns the 1-based rank, or None if the entry did not make the cut.
    pub fn submit(&mut self, entry: LeaderboardEntry) -> Option<usize> {
        let id = entry.id.clone();
        self.insert_sorted(entry);
        self.rank(&id)
    }

    /// 1-based position of a run
    pub fn rank(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id).map(|i| i + 1)
    }

    /// Fold another board in (cold-start seeding)
    pub fn merge(&mut self, other: Leaderboard) {
        for entry in other.entries {
            self.insert_sorted(entry);
        }
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    /// Top `n` entries
    pub fn top(&self, n: usize) -> &[LeaderboardEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

fn entries_of(obj: &Object) -> &[Value] {
    match obj.get("entries") {
        Some(Value::Array(items)) => items.as_slice(),
        _ => &[],
    }
}
