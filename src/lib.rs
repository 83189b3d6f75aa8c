// Core layer - shared types and configuration
pub mod core;

// Features layer - items, conversation flow, reminders
pub mod features;

// Presentation - reply and keyboard builders
pub mod message_components;

// Infrastructure
pub mod database;
pub mod gateway;

// Application layer
pub mod commands;

pub use core::{BotError, Config, Reply, StoreError};
pub use commands::{BotContext, Dispatcher};
pub use database::Database;
pub use features::{
    ConversationEngine, ConversationState, ContentPayload, Item, ItemId, ReminderScheduler,
    SessionStore, SubscriptionReminder,
};
pub use gateway::{InboundEvent, MemorySink, ReplySink};
