//! Error taxonomy
//!
//! Store failures are kept apart from "nothing there": a missing row is an `Ok(None)` /
//! `Ok(false)` from the database, a broken backend is a [`StoreError`].
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use thiserror::Error;

use crate::features::items::ItemId;

/// Failure of the backing store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Backend(#[from] sqlite::Error),

    /// A row exists but cannot be decoded into a domain value
    #[error("corrupt row: {0}")]
    Corrupt(String),

    /// A write that would break a table invariant (empty subject, bad billing day)
    #[error("rejected write: {0}")]
    Rejected(String),
}

/// Errors surfaced while handling a user event
#[derive(Debug, Error)]
pub enum BotError {
    /// Bad user input; recovered by re-prompting in the same state
    #[error("invalid input: {0}")]
    Validation(String),

    /// The referenced item no longer exists (or belongs to someone else)
    #[error("item {0} not found")]
    NotFound(ItemId),

    /// Payload is none of text, photo, document, voice or video
    #[error("unsupported content type")]
    UnsupportedContent,

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl BotError {
    /// Whether the error is recovered locally without leaving the current state
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BotError::Validation(_) | BotError::UnsupportedContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(BotError::Validation("empty".into()).is_recoverable());
        assert!(BotError::UnsupportedContent.is_recoverable());
        assert!(!BotError::NotFound(ItemId(3)).is_recoverable());
        assert!(!BotError::Storage(StoreError::Corrupt("x".into())).is_recoverable());
    }

    #[test]
    fn test_not_found_message_names_item() {
        assert_eq!(BotError::NotFound(ItemId(42)).to_string(), "item 42 not found");
    }
}
