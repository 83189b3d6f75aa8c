//! # Feature: Subscription Reminders
//!
//! Warns owners ahead of recurring monthly charges. Only the firing side lives here;
//! subscriptions are registered through the store.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.4.0
//! - **Toggleable**: true (`SUBSCRIPTIONS_ENABLED`)

pub mod checker;
pub mod model;

pub use checker::{CheckReport, SubscriptionReminder};
pub use model::{billing_days_for, days_in_month, Subscription};
