//! Reminder jobs and delay parsing

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::core::BotError;
use crate::features::items::ItemId;

/// Fixed choices offered in the reminder submenu, in hours
pub const QUICK_REMINDER_HOURS: [i64; 3] = [1, 3, 24];

/// A reminder to deliver for an item
///
/// Carries only what is needed to fetch the item again at fire time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderJob {
    pub item_id: ItemId,
    pub owner: String,
    pub firing_time: DateTime<Utc>,
}

impl ReminderJob {
    pub fn new(item_id: ItemId, owner: impl Into<String>, firing_time: DateTime<Utc>) -> Self {
        Self {
            item_id,
            owner: owner.into(),
            firing_time,
        }
    }

    /// Time left until the job is due; zero once it is
    pub fn delay_from(&self, now: DateTime<Utc>) -> std::time::Duration {
        (self.firing_time - now)
            .to_std()
            .unwrap_or(std::time::Duration::ZERO)
    }
}

/// Allowed range for user-chosen reminder delays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderBounds {
    pub min_hours: i64,
    pub max_hours: i64,
}

impl Default for ReminderBounds {
    fn default() -> Self {
        Self {
            min_hours: 1,
            max_hours: 168,
        }
    }
}

impl ReminderBounds {
    pub fn new(min_hours: i64, max_hours: i64) -> Self {
        Self {
            min_hours,
            max_hours,
        }
    }

    /// Parse a typed number of hours
    pub fn parse(&self, input: &str) -> Result<i64, BotError> {
        let hours = input.trim().parse::<i64>().map_err(|_| {
            BotError::Validation(format!(
                "Please send a whole number of hours between {} and {}.",
                self.min_hours, self.max_hours
            ))
        })?;
        self.check(hours)
    }

    pub fn check(&self, hours: i64) -> Result<i64, BotError> {
        if hours < self.min_hours || hours > self.max_hours {
            return Err(BotError::Validation(format!(
                "Reminders can be set between {} and {} hours ahead.",
                self.min_hours, self.max_hours
            )));
        }
        Ok(hours)
    }

    /// Firing time for a validated delay
    pub fn firing_time(&self, now: DateTime<Utc>, hours: i64) -> Result<DateTime<Utc>, BotError> {
        let hours = self.check(hours)?;
        Duration::try_hours(hours)
            .and_then(|delay| now.checked_add_signed(delay))
            .ok_or_else(|| BotError::Validation(format!("{hours} hours is too far ahead.")))
    }
}

/// Format seconds as a human-readable duration
pub fn format_duration(seconds: i64) -> String {
    fn unit(value: i64, name: &str) -> String {
        format!("{} {}{}", value, name, if value == 1 { "" } else { "s" })
    }

    if seconds < 60 {
        unit(seconds.max(0), "second")
    } else if seconds < 3600 {
        unit(seconds / 60, "minute")
    } else if seconds < 86400 {
        let hours = seconds / 3600;
        let mins = (seconds % 3600) / 60;
        if mins > 0 {
            format!("{} {}", unit(hours, "hour"), unit(mins, "minute"))
        } else {
            unit(hours, "hour")
        }
    } else {
        let days = seconds / 86400;
        let hours = (seconds % 86400) / 3600;
        if hours > 0 {
            format!("{} {}", unit(days, "day"), unit(hours, "hour"))
        } else {
            unit(days, "day")
        }
    }
}
