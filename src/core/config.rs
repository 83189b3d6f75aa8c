//! Environment-driven configuration
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Subscription reminder settings and session timeout
//! - 1.0.0: Initial release with database, logging and reminder settings

use anyhow::{Context, Result};
use chrono::Duration;
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;

// Accepted ranges; zero intervals stall tokio timers and huge ones overflow durations
const SWEEP_INTERVAL_SECS: RangeInclusive<u64> = 1..=86_400;
const PURGE_INTERVAL_HOURS: RangeInclusive<u64> = 1..=720;
const SUBSCRIPTION_CHECK_MINUTES: RangeInclusive<u64> = 1..=1_440;
const RETENTION_DAYS: RangeInclusive<i64> = 1..=3_650;
const LEAD_DAYS: RangeInclusive<i64> = 0..=31;
const MAX_REMINDER_HOURS_LIMIT: i64 = 87_600;
const SESSION_TIMEOUT_MINUTES: RangeInclusive<i64> = 0..=525_600;

/// Runtime configuration for the bot process
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub database_path: String,
    pub log_level: String,

    /// Steady interval between reminder sweeps
    pub reminder_sweep_interval_secs: u64,
    /// Reminders still unfired this long after their due time are purged
    pub stale_reminder_retention_days: i64,
    pub reminder_purge_interval_hours: u64,
    pub min_reminder_hours: i64,
    pub max_reminder_hours: i64,

    pub search_result_limit: usize,

    /// Inactivity after which a conversation falls back to idle. Zero disables expiry.
    pub session_timeout_minutes: i64,

    pub subscriptions_enabled: bool,
    pub subscription_lead_days: i64,
    pub subscription_check_interval_minutes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discord_token: String::new(),
            database_path: "stashbot.db".to_string(),
            log_level: "info".to_string(),
            reminder_sweep_interval_secs: 60,
            stale_reminder_retention_days: 7,
            reminder_purge_interval_hours: 6,
            min_reminder_hours: 1,
            max_reminder_hours: 168,
            search_result_limit: 50,
            session_timeout_minutes: 30,
            subscriptions_enabled: true,
            subscription_lead_days: 1,
            subscription_check_interval_minutes: 60,
        }
    }
}

impl Config {
    /// Load configuration from process environment
    ///
    /// `DISCORD_TOKEN` is required; everything else falls back to [`Config::default`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup
    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .context("DISCORD_TOKEN must be set")?;

        let config = Self {
            discord_token,
            database_path: lookup("DATABASE_PATH").unwrap_or(defaults.database_path),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            reminder_sweep_interval_secs: parse_var(
                &lookup,
                "REMINDER_SWEEP_INTERVAL_SECS",
                defaults.reminder_sweep_interval_secs,
            )?,
            stale_reminder_retention_days: parse_var(
                &lookup,
                "STALE_REMINDER_RETENTION_DAYS",
                defaults.stale_reminder_retention_days,
            )?,
            reminder_purge_interval_hours: parse_var(
                &lookup,
                "REMINDER_PURGE_INTERVAL_HOURS",
                defaults.reminder_purge_interval_hours,
            )?,
            min_reminder_hours: parse_var(&lookup, "MIN_REMINDER_HOURS", defaults.min_reminder_hours)?,
            max_reminder_hours: parse_var(&lookup, "MAX_REMINDER_HOURS", defaults.max_reminder_hours)?,
            search_result_limit: parse_var(
                &lookup,
                "SEARCH_RESULT_LIMIT",
                defaults.search_result_limit,
            )?,
            session_timeout_minutes: parse_var(
                &lookup,
                "SESSION_TIMEOUT_MINUTES",
                defaults.session_timeout_minutes,
            )?,
            subscriptions_enabled: parse_var(
                &lookup,
                "SUBSCRIPTIONS_ENABLED",
                defaults.subscriptions_enabled,
            )?,
            subscription_lead_days: parse_var(
                &lookup,
                "SUBSCRIPTION_LEAD_DAYS",
                defaults.subscription_lead_days,
            )?,
            subscription_check_interval_minutes: parse_var(
                &lookup,
                "SUBSCRIPTION_CHECK_INTERVAL_MINUTES",
                defaults.subscription_check_interval_minutes,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        check_range(
            "REMINDER_SWEEP_INTERVAL_SECS",
            self.reminder_sweep_interval_secs,
            SWEEP_INTERVAL_SECS,
        )?;
        check_range(
            "REMINDER_PURGE_INTERVAL_HOURS",
            self.reminder_purge_interval_hours,
            PURGE_INTERVAL_HOURS,
        )?;
        check_range(
            "SUBSCRIPTION_CHECK_INTERVAL_MINUTES",
            self.subscription_check_interval_minutes,
            SUBSCRIPTION_CHECK_MINUTES,
        )?;
        check_range(
            "STALE_REMINDER_RETENTION_DAYS",
            self.stale_reminder_retention_days,
            RETENTION_DAYS,
        )?;
        check_range("SUBSCRIPTION_LEAD_DAYS", self.subscription_lead_days, LEAD_DAYS)?;
        check_range(
            "SESSION_TIMEOUT_MINUTES",
            self.session_timeout_minutes,
            SESSION_TIMEOUT_MINUTES,
        )?;
        check_range(
            "MAX_REMINDER_HOURS",
            self.max_reminder_hours,
            1..=MAX_REMINDER_HOURS_LIMIT,
        )?;
        if self.min_reminder_hours < 1 || self.min_reminder_hours > self.max_reminder_hours {
            anyhow::bail!(
                "Invalid reminder bounds: MIN_REMINDER_HOURS={} MAX_REMINDER_HOURS={}",
                self.min_reminder_hours,
                self.max_reminder_hours
            );
        }
        if self.search_result_limit == 0 {
            anyhow::bail!("SEARCH_RESULT_LIMIT must be at least 1");
        }
        Ok(())
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.reminder_sweep_interval_secs)
    }

    pub fn purge_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.reminder_purge_interval_hours.saturating_mul(3_600))
    }

    pub fn subscription_check_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.subscription_check_interval_minutes.saturating_mul(60))
    }

    /// Session inactivity timeout, `None` when expiry is disabled
    pub fn session_timeout(&self) -> Option<Duration> {
        (self.session_timeout_minutes > 0).then(|| Duration::minutes(self.session_timeout_minutes))
    }

    pub fn stale_reminder_retention(&self) -> Duration {
        Duration::days(self.stale_reminder_retention_days)
    }
}

fn check_range<T>(key: &str, value: T, range: RangeInclusive<T>) -> Result<()>
where
    T: PartialOrd + Display,
{
    if !range.contains(&value) {
        anyhow::bail!(
            "{key} must be between {} and {}, got {value}",
            range.start(),
            range.end()
        );
    }
    Ok(())
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid value for {key} ({raw:?}): {e}")),
        _ => Ok(default),
    }
}
