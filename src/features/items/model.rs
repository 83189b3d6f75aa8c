//! Item records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::content::{ContentPayload, ContentType};

/// Store-assigned item identifier (SQLite rowid, monotonic)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ItemId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(ItemId)
    }
}

/// A saved unit of content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Submitting user; never changes after creation
    pub owner: String,
    pub category: String,
    pub subject: String,
    pub payload: ContentPayload,
    /// Free-text annotation, empty when absent
    pub note: String,
    pub pinned: bool,
    /// Outstanding reminder; in the past means due
    pub reminder_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    pub fn content_type(&self) -> ContentType {
        self.payload.content_type()
    }

    pub fn note(&self) -> Option<&str> {
        (!self.note.is_empty()).then_some(self.note.as_str())
    }

    pub fn has_reminder(&self) -> bool {
        self.reminder_at.is_some()
    }

    /// Whether the reminder is due at `now`
    pub fn reminder_due(&self, now: DateTime<Utc>) -> bool {
        self.reminder_at.is_some_and(|at| at <= now)
    }
}

/// Fields needed to insert an item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub owner: String,
    pub category: String,
    pub subject: String,
    pub payload: ContentPayload,
}

/// Per-owner counters shown on the settings screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStats {
    pub total_items: i64,
    pub pinned_items: i64,
    pub total_categories: i64,
    pub active_reminders: i64,
    pub items_with_notes: i64,
}
