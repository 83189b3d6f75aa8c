//! # SQLite Persistence
//!
//! Single-connection SQLite store shared behind an async mutex. Every public method is
//! one self-contained unit of work, so concurrent conversations never hold the
//! connection across a user's think-time.
//!
//! - **Version**: 1.3.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.3.0: Subscriptions table for billing reminders
//! - 1.2.0: Distinguish backend failures from missing rows (StoreError)
//! - 1.1.0: Partial index on reminder_at for due-reminder scans
//! - 1.0.0: Initial items table

mod items;
mod subscriptions;

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use log::info;
use sqlite::Connection;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core::StoreError;

pub use subscriptions::NewSubscription;

/// Default cap on search results
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

/// Timestamps are stored as fixed-width UTC text so they sort lexicographically
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const DATE_FORMAT: &str = "%Y-%m-%d";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner TEXT NOT NULL,
        category TEXT NOT NULL CHECK (length(category) > 0),
        subject TEXT NOT NULL CHECK (length(subject) > 0),
        content_type TEXT NOT NULL,
        content TEXT NOT NULL DEFAULT '',
        file_ref TEXT NOT NULL DEFAULT '',
        file_name TEXT NOT NULL DEFAULT '',
        caption TEXT NOT NULL DEFAULT '',
        note TEXT NOT NULL DEFAULT '',
        pinned INTEGER NOT NULL DEFAULT 0,
        reminder_at TEXT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_items_owner_category
        ON items(owner, category);

    CREATE INDEX IF NOT EXISTS idx_items_owner_search
        ON items(owner, subject, content);

    CREATE INDEX IF NOT EXISTS idx_items_reminder
        ON items(reminder_at)
        WHERE reminder_at IS NOT NULL;

    CREATE TABLE IF NOT EXISTS subscriptions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner TEXT NOT NULL,
        service_name TEXT NOT NULL CHECK (length(service_name) > 0),
        billing_day INTEGER NOT NULL CHECK (billing_day BETWEEN 1 AND 31),
        cost REAL NOT NULL DEFAULT 0,
        currency TEXT NOT NULL DEFAULT '',
        last_notified_for TEXT NULL,
        created_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_subscriptions_billing_day
        ON subscriptions(billing_day);
";

/// Handle to the bot's database; cheap to clone
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    search_limit: usize,
}

impl Database {
    /// Open (or create) the database file and apply the schema
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let conn = sqlite::open(path)?;
        conn.execute("PRAGMA journal_mode = WAL;")?;
        conn.execute("PRAGMA busy_timeout = 5000;")?;
        let db = Self::from_connection(conn)?;
        info!("🗄️ Database ready at {path}");
        Ok(db)
    }

    /// Private in-memory database, gone when the last clone is dropped
    pub async fn in_memory() -> Result<Self, StoreError> {
        Self::from_connection(sqlite::open(":memory:")?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            search_limit: DEFAULT_SEARCH_LIMIT,
        })
    }

    /// Override the search result cap
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit.max(1);
        self
    }

    pub fn search_limit(&self) -> usize {
        self.search_limit
    }
}

/// Current time at storage precision, so written values read back unchanged
pub(crate) fn db_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_PARSE_FORMAT)
        .map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc))
        .map_err(|e| StoreError::Corrupt(format!("bad timestamp {raw:?}: {e}")))
}

pub(crate) fn format_date(date: chrono::NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
