//! # Feature: Conversation Flow
//!
//! Per-user multi-step flows: collecting a new item (content, category, subject,
//! confirmation) and the secondary edit, note, custom-reminder and search prompts.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Inactivity expiry for sessions and drafts
//! - 1.1.0: Session-scoped drafts replace the shared pending map
//! - 1.0.0: Initial state machine

pub mod engine;
pub mod sessions;
pub mod state;

pub use engine::{ConversationEngine, ConversationLimits};
pub use sessions::SessionStore;
pub use state::{ConversationState, PendingDraft, Session};
