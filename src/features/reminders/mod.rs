//! # Feature: Reminders
//!
//! Durable one-shot reminders on saved items. The item's `reminder_at` column is the
//! source of truth; in-process timers only shorten the delay until the next sweep.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Reminders bound to items; sweep on start and at a steady interval
//! - 1.1.0: Stale reminder purge
//! - 1.0.0: Initial timer-based reminders

pub mod job;
pub mod scheduler;

pub use job::{format_duration, ReminderBounds, ReminderJob, QUICK_REMINDER_HOURS};
pub use scheduler::{FireOutcome, ReminderScheduler, SweepReport};
