//! # Features Layer
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Items, conversation flow, reminders and subscription reminders
//! - 1.0.0: Initial feature split

pub mod conversation;
pub mod items;
pub mod reminders;
pub mod subscriptions;

pub use conversation::{ConversationEngine, ConversationState, PendingDraft, Session, SessionStore};
pub use items::{ContentPayload, ContentType, Item, ItemId, ItemStats, NewItem};
pub use reminders::{ReminderJob, ReminderScheduler};
pub use subscriptions::{Subscription, SubscriptionReminder};
