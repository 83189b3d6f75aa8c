//! Subscription rows used by the billing reminder

use chrono::NaiveDate;
use sqlite::{State, Statement};

use super::{db_now, format_date, format_timestamp, parse_timestamp, Database};
use crate::core::StoreError;
use crate::features::subscriptions::{billing_days_for, Subscription};

const SUBSCRIPTION_COLUMNS: &str =
    "id, owner, service_name, billing_day, cost, currency, last_notified_for, created_at";

/// Fields needed to register a subscription
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubscription {
    pub owner: String,
    pub service_name: String,
    pub billing_day: u32,
    pub cost: f64,
    pub currency: String,
}

impl Database {
    pub async fn add_subscription(&self, sub: &NewSubscription) -> Result<i64, StoreError> {
        if sub.service_name.trim().is_empty() {
            return Err(StoreError::Rejected("service name must not be empty".into()));
        }
        if !(1..=31).contains(&sub.billing_day) {
            return Err(StoreError::Rejected(format!(
                "billing day {} is outside 1-31",
                sub.billing_day
            )));
        }

        let conn = self.conn.lock().await;
        let mut statement = conn.prepare(
            "INSERT INTO subscriptions (owner, service_name, billing_day, cost, currency, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )?;
        statement.bind((1, sub.owner.as_str()))?;
        statement.bind((2, sub.service_name.trim()))?;
        statement.bind((3, i64::from(sub.billing_day)))?;
        statement.bind((4, sub.cost))?;
        statement.bind((5, sub.currency.as_str()))?;
        statement.bind((6, format_timestamp(db_now()).as_str()))?;
        statement.next()?;
        drop(statement);

        Ok(super::items::last_insert_id(&conn)?.0)
    }

    pub async fn list_subscriptions(&self, owner: &str) -> Result<Vec<Subscription>, StoreError> {
        let conn = self.conn.lock().await;
        let mut statement = conn.prepare(format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE owner = ? \
             ORDER BY billing_day, id"
        ))?;
        statement.bind((1, owner))?;
        read_subscriptions(&mut statement)
    }

    /// Delete one of the owner's subscriptions; false when no such row belongs to them
    pub async fn delete_subscription(&self, id: i64, owner: &str) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let mut statement = conn.prepare("DELETE FROM subscriptions WHERE id = ? AND owner = ?")?;
        statement.bind((1, id))?;
        statement.bind((2, owner))?;
        statement.next()?;
        Ok(conn.change_count() > 0)
    }

    /// Subscriptions billing on `date` that have not been notified for it yet
    pub async fn subscriptions_billing_on(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<Subscription>, StoreError> {
        let days = billing_days_for(date);
        let placeholders = vec!["?"; days.len()].join(", ");
        let date_key = format_date(date);

        let conn = self.conn.lock().await;
        let mut statement = conn.prepare(format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions \
             WHERE billing_day IN ({placeholders}) \
             AND (last_notified_for IS NULL OR last_notified_for != ?) \
             ORDER BY id"
        ))?;
        for (idx, day) in days.iter().enumerate() {
            statement.bind((idx + 1, i64::from(*day)))?;
        }
        statement.bind((days.len() + 1, date_key.as_str()))?;
        read_subscriptions(&mut statement)
    }

    /// Record that the owner was told about the charge on `date`
    pub async fn mark_subscription_notified(
        &self,
        id: i64,
        date: NaiveDate,
    ) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let mut statement =
            conn.prepare("UPDATE subscriptions SET last_notified_for = ? WHERE id = ?")?;
        statement.bind((1, format_date(date).as_str()))?;
        statement.bind((2, id))?;
        statement.next()?;
        Ok(conn.change_count() > 0)
    }
}

fn read_subscriptions(statement: &mut Statement<'_>) -> Result<Vec<Subscription>, StoreError> {
    let mut subs = Vec::new();
    while let State::Row = statement.next()? {
        let last_notified_for = statement
            .read::<Option<String>, _>("last_notified_for")?
            .map(|raw| {
                NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .map_err(|e| StoreError::Corrupt(format!("bad date {raw:?}: {e}")))
            })
            .transpose()?;
        let billing_day = u32::try_from(statement.read::<i64, _>("billing_day")?)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        subs.push(Subscription {
            id: statement.read::<i64, _>("id")?,
            owner: statement.read::<String, _>("owner")?,
            service_name: statement.read::<String, _>("service_name")?,
            billing_day,
            cost: statement.read::<f64, _>("cost")?,
            currency: statement.read::<String, _>("currency")?,
            last_notified_for,
            created_at: parse_timestamp(&statement.read::<String, _>("created_at")?)?,
        });
    }
    Ok(subs)
}
