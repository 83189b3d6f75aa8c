//! Item CRUD, search and reminder queries
//!
//! Absent rows are reported through the `Ok` value (`None`, `false`); only backend
//! failures become errors.

use chrono::{DateTime, Utc};
use log::debug;
use sqlite::{Connection, State, Statement};

use super::{db_now, format_timestamp, parse_timestamp, Database};
use crate::core::StoreError;
use crate::features::items::{ContentPayload, ContentType, Item, ItemId, ItemStats, NewItem};

const ITEM_COLUMNS: &str = "id, owner, category, subject, content_type, content, file_ref, \
                            file_name, caption, note, pinned, reminder_at, created_at, updated_at";

/// Pinned first, then newest first; id breaks ties between rows created in the same instant
const PIN_THEN_RECENT: &str = "ORDER BY pinned DESC, created_at DESC, id DESC";

impl Database {
    /// Insert a new item: unpinned, no note, no reminder
    pub async fn create(&self, item: &NewItem) -> Result<ItemId, StoreError> {
        let category = item.category.trim();
        let subject = item.subject.trim();
        if category.is_empty() || subject.is_empty() {
            return Err(StoreError::Rejected(
                "category and subject must not be empty".to_string(),
            ));
        }

        let now = format_timestamp(db_now());
        let payload = &item.payload;
        let conn = self.conn.lock().await;

        let mut statement = conn.prepare(
            "INSERT INTO items (owner, category, subject, content_type, content, file_ref, \
             file_name, caption, note, pinned, reminder_at, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, '', 0, NULL, ?, ?)",
        )?;
        statement.bind((1, item.owner.as_str()))?;
        statement.bind((2, category))?;
        statement.bind((3, subject))?;
        statement.bind((4, payload.content_type().as_str()))?;
        statement.bind((5, payload.body()))?;
        statement.bind((6, payload.file_ref()))?;
        statement.bind((7, payload.file_name()))?;
        statement.bind((8, payload.caption()))?;
        statement.bind((9, now.as_str()))?;
        statement.bind((10, now.as_str()))?;
        statement.next()?;
        drop(statement);

        let id = last_insert_id(&conn)?;
        debug!("Saved item {id} for owner {}", item.owner);
        Ok(id)
    }

    pub async fn get(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        let conn = self.conn.lock().await;
        let mut statement =
            conn.prepare(format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?"))?;
        statement.bind((1, id.0))?;
        if let State::Row = statement.next()? {
            Ok(Some(read_item(&statement)?))
        } else {
            Ok(None)
        }
    }

    /// Distinct categories for an owner, lexicographically ordered
    pub async fn list_categories(&self, owner: &str) -> Result<Vec<String>, StoreError> {
        let conn = self.conn.lock().await;
        let mut statement = conn.prepare(
            "SELECT DISTINCT category FROM items WHERE owner = ? ORDER BY category",
        )?;
        statement.bind((1, owner))?;

        let mut categories = Vec::new();
        while let State::Row = statement.next()? {
            categories.push(statement.read::<String, _>("category")?);
        }
        Ok(categories)
    }

    pub async fn category_count(&self, owner: &str, category: &str) -> Result<i64, StoreError> {
        let conn = self.conn.lock().await;
        let mut statement = conn.prepare(
            "SELECT COUNT(*) AS total FROM items WHERE owner = ? AND category = ?",
        )?;
        statement.bind((1, owner))?;
        statement.bind((2, category))?;
        statement.next()?;
        Ok(statement.read::<i64, _>("total")?)
    }

    /// Items in one category, pinned first then newest first
    pub async fn list_by_category(
        &self,
        owner: &str,
        category: &str,
    ) -> Result<Vec<Item>, StoreError> {
        let conn = self.conn.lock().await;
        let mut statement = conn.prepare(format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE owner = ? AND category = ? {PIN_THEN_RECENT}"
        ))?;
        statement.bind((1, owner))?;
        statement.bind((2, category))?;
        read_items(&mut statement)
    }

    /// Substring search over category, subject, text body, caption and note
    ///
    /// Matching is case-insensitive for ASCII. An empty query matches every item.
    /// At most `search_limit` rows come back, pinned first then newest first.
    pub async fn search(&self, owner: &str, query: &str) -> Result<Vec<Item>, StoreError> {
        let pattern = format!("%{}%", escape_like(query.trim()));
        let conn = self.conn.lock().await;
        let mut statement = conn.prepare(format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE owner = ? AND ( \
                 category LIKE ?2 ESCAPE '\\' OR \
                 subject LIKE ?2 ESCAPE '\\' OR \
                 content LIKE ?2 ESCAPE '\\' OR \
                 caption LIKE ?2 ESCAPE '\\' OR \
                 note LIKE ?2 ESCAPE '\\' \
             ) {PIN_THEN_RECENT} LIMIT ?3"
        ))?;
        statement.bind((1, owner))?;
        statement.bind((2, pattern.as_str()))?;
        statement.bind((3, self.search_limit as i64))?;
        read_items(&mut statement)
    }

    /// Flip the pin flag; returns the new state, or `None` when the item does not exist
    pub async fn toggle_pin(&self, id: ItemId) -> Result<Option<bool>, StoreError> {
        let conn = self.conn.lock().await;
        let now = format_timestamp(db_now());
        if update(
            &conn,
            "UPDATE items SET pinned = 1 - pinned, updated_at = ? WHERE id = ?",
            &now,
            id,
        )? == 0
        {
            return Ok(None);
        }

        let mut statement = conn.prepare("SELECT pinned FROM items WHERE id = ?")?;
        statement.bind((1, id.0))?;
        statement.next()?;
        Ok(Some(statement.read::<i64, _>("pinned")? != 0))
    }

    /// Arm (or re-arm) the item's reminder
    pub async fn set_reminder(&self, id: ItemId, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let mut statement =
            conn.prepare("UPDATE items SET reminder_at = ?, updated_at = ? WHERE id = ?")?;
        statement.bind((1, format_timestamp(at).as_str()))?;
        statement.bind((2, format_timestamp(db_now()).as_str()))?;
        statement.bind((3, id.0))?;
        statement.next()?;
        Ok(conn.change_count() > 0)
    }

    pub async fn clear_reminder(&self, id: ItemId) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let now = format_timestamp(db_now());
        Ok(update(
            &conn,
            "UPDATE items SET reminder_at = NULL, updated_at = ? WHERE id = ?",
            &now,
            id,
        )? > 0)
    }

    /// Clear the reminder only if it is still the one that fired
    ///
    /// A reminder re-armed while the notification was in flight stays set.
    pub async fn clear_fired_reminder(
        &self,
        id: ItemId,
        fired_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let mut statement = conn.prepare(
            "UPDATE items SET reminder_at = NULL, updated_at = ? WHERE id = ? AND reminder_at = ?",
        )?;
        statement.bind((1, format_timestamp(db_now()).as_str()))?;
        statement.bind((2, id.0))?;
        statement.bind((3, format_timestamp(fired_at).as_str()))?;
        statement.next()?;
        Ok(conn.change_count() > 0)
    }

    /// Replace the item's content entirely
    pub async fn update_content(
        &self,
        id: ItemId,
        payload: &ContentPayload,
    ) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let mut statement = conn.prepare(
            "UPDATE items SET content_type = ?, content = ?, file_ref = ?, file_name = ?, \
             caption = ?, updated_at = ? WHERE id = ?",
        )?;
        statement.bind((1, payload.content_type().as_str()))?;
        statement.bind((2, payload.body()))?;
        statement.bind((3, payload.file_ref()))?;
        statement.bind((4, payload.file_name()))?;
        statement.bind((5, payload.caption()))?;
        statement.bind((6, format_timestamp(db_now()).as_str()))?;
        statement.bind((7, id.0))?;
        statement.next()?;
        Ok(conn.change_count() > 0)
    }

    pub async fn update_note(&self, id: ItemId, note: &str) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let mut statement =
            conn.prepare("UPDATE items SET note = ?, updated_at = ? WHERE id = ?")?;
        statement.bind((1, note))?;
        statement.bind((2, format_timestamp(db_now()).as_str()))?;
        statement.bind((3, id.0))?;
        statement.next()?;
        Ok(conn.change_count() > 0)
    }

    pub async fn clear_note(&self, id: ItemId) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let now = format_timestamp(db_now());
        Ok(update(
            &conn,
            "UPDATE items SET note = '', updated_at = ? WHERE id = ?",
            &now,
            id,
        )? > 0)
    }

    /// Remove an item; true iff a row was deleted
    pub async fn delete(&self, id: ItemId) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let mut statement = conn.prepare("DELETE FROM items WHERE id = ?")?;
        statement.bind((1, id.0))?;
        statement.next()?;
        Ok(conn.change_count() > 0)
    }

    /// Items whose reminder is set and due at `now`, oldest reminder first. Read-only.
    pub async fn due_reminders(&self, now: DateTime<Utc>) -> Result<Vec<Item>, StoreError> {
        let conn = self.conn.lock().await;
        let mut statement = conn.prepare(format!(
            "SELECT {ITEM_COLUMNS} FROM items \
             WHERE reminder_at IS NOT NULL AND reminder_at <= ? \
             ORDER BY reminder_at, id"
        ))?;
        statement.bind((1, format_timestamp(now).as_str()))?;
        read_items(&mut statement)
    }

    /// Clear reminders that have stayed unfired since before `older_than`
    pub async fn purge_stale_reminders(
        &self,
        older_than: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        let conn = self.conn.lock().await;
        let mut statement = conn.prepare(
            "UPDATE items SET reminder_at = NULL, updated_at = ? \
             WHERE reminder_at IS NOT NULL AND reminder_at < ?",
        )?;
        statement.bind((1, format_timestamp(db_now()).as_str()))?;
        statement.bind((2, format_timestamp(older_than).as_str()))?;
        statement.next()?;
        Ok(conn.change_count())
    }

    pub async fn stats(&self, owner: &str) -> Result<ItemStats, StoreError> {
        let conn = self.conn.lock().await;
        let mut statement = conn.prepare(
            "SELECT \
                COUNT(*) AS total_items, \
                COALESCE(SUM(pinned != 0), 0) AS pinned_items, \
                COUNT(DISTINCT category) AS total_categories, \
                COALESCE(SUM(reminder_at IS NOT NULL), 0) AS active_reminders, \
                COALESCE(SUM(note != ''), 0) AS items_with_notes \
             FROM items WHERE owner = ?",
        )?;
        statement.bind((1, owner))?;
        statement.next()?;
        Ok(ItemStats {
            total_items: statement.read::<i64, _>("total_items")?,
            pinned_items: statement.read::<i64, _>("pinned_items")?,
            total_categories: statement.read::<i64, _>("total_categories")?,
            active_reminders: statement.read::<i64, _>("active_reminders")?,
            items_with_notes: statement.read::<i64, _>("items_with_notes")?,
        })
    }

    /// Every item of an owner, by category then creation order
    pub async fn export_all(&self, owner: &str) -> Result<Vec<Item>, StoreError> {
        let conn = self.conn.lock().await;
        let mut statement = conn.prepare(format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE owner = ? ORDER BY category, created_at, id"
        ))?;
        statement.bind((1, owner))?;
        read_items(&mut statement)
    }
}

/// Run `UPDATE ... SET ..., updated_at = ? WHERE id = ?` and return the changed row count
fn update(conn: &Connection, sql: &str, now: &str, id: ItemId) -> Result<usize, StoreError> {
    let mut statement = conn.prepare(sql)?;
    statement.bind((1, now))?;
    statement.bind((2, id.0))?;
    statement.next()?;
    Ok(conn.change_count())
}

pub(super) fn last_insert_id(conn: &Connection) -> Result<ItemId, StoreError> {
    let mut statement = conn.prepare("SELECT last_insert_rowid() AS id")?;
    statement.next()?;
    Ok(ItemId(statement.read::<i64, _>("id")?))
}

fn read_items(statement: &mut Statement<'_>) -> Result<Vec<Item>, StoreError> {
    let mut items = Vec::new();
    while let State::Row = statement.next()? {
        items.push(read_item(statement)?);
    }
    Ok(items)
}

fn read_item(statement: &Statement<'_>) -> Result<Item, StoreError> {
    let content_type = statement
        .read::<String, _>("content_type")?
        .parse::<ContentType>()
        .map_err(|e| StoreError::Corrupt(e.to_string()))?;

    let payload = ContentPayload::from_columns(
        content_type,
        statement.read::<String, _>("content")?,
        statement.read::<String, _>("file_ref")?,
        statement.read::<String, _>("file_name")?,
        statement.read::<String, _>("caption")?,
    );

    let reminder_at = statement
        .read::<Option<String>, _>("reminder_at")?
        .map(|raw| parse_timestamp(&raw))
        .transpose()?;

    Ok(Item {
        id: ItemId(statement.read::<i64, _>("id")?),
        owner: statement.read::<String, _>("owner")?,
        category: statement.read::<String, _>("category")?,
        subject: statement.read::<String, _>("subject")?,
        payload,
        note: statement.read::<String, _>("note")?,
        pinned: statement.read::<i64, _>("pinned")? != 0,
        reminder_at,
        created_at: parse_timestamp(&statement.read::<String, _>("created_at")?)?,
        updated_at: parse_timestamp(&statement.read::<String, _>("updated_at")?)?,
    })
}

/// Escape LIKE wildcards so user input matches literally
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
