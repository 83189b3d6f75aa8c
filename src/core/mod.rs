//! # Core Module
//!
//! Core domain types, configuration, and error handling for the stash bot.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Add reply module with transport-neutral keyboards
//! - 1.1.0: Add error taxonomy (StoreError, BotError)
//! - 1.0.0: Initial creation with config and response modules

pub mod config;
pub mod error;
pub mod reply;
pub mod response;

// Re-export commonly used items
pub use config::Config;
pub use error::{BotError, StoreError};
pub use reply::{Button, Keyboard, Reply, ReplyFile};
pub use response::{chunk_for_message, truncate_chars, truncate_label, MESSAGE_LIMIT};
