//! Conversation state, drafts and sessions

use chrono::{DateTime, Duration, Utc};

use crate::features::items::{ContentPayload, ItemId, NewItem};

/// Where a user currently is in a flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationState {
    #[default]
    Idle,
    AwaitingContent,
    AwaitingCategory,
    AwaitingSubject,
    AwaitingEdit { item_id: ItemId },
    AwaitingNote { item_id: ItemId },
    AwaitingReminderHours { item_id: ItemId },
    AwaitingSearchQuery,
}

impl std::fmt::Display for ConversationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversationState::Idle => write!(f, "idle"),
            ConversationState::AwaitingContent => write!(f, "awaiting_content"),
            ConversationState::AwaitingCategory => write!(f, "awaiting_category"),
            ConversationState::AwaitingSubject => write!(f, "awaiting_subject"),
            ConversationState::AwaitingEdit { item_id } => write!(f, "awaiting_edit({item_id})"),
            ConversationState::AwaitingNote { item_id } => write!(f, "awaiting_note({item_id})"),
            ConversationState::AwaitingReminderHours { item_id } => {
                write!(f, "awaiting_reminder_hours({item_id})")
            }
            ConversationState::AwaitingSearchQuery => write!(f, "awaiting_search_query"),
        }
    }
}

/// An item under construction; never persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDraft {
    pub payload: ContentPayload,
    pub category: Option<String>,
    pub subject: Option<String>,
    pub started_at: DateTime<Utc>,
}

impl PendingDraft {
    pub fn new(payload: ContentPayload, now: DateTime<Utc>) -> Self {
        Self {
            payload,
            category: None,
            subject: None,
            started_at: now,
        }
    }

    /// Whether category and subject are both filled in
    pub fn is_complete(&self) -> bool {
        self.category.is_some() && self.subject.is_some()
    }

    /// Convert a complete draft into an insertable item
    pub fn into_new_item(self, owner: &str) -> Option<NewItem> {
        Some(NewItem {
            owner: owner.to_string(),
            category: self.category?,
            subject: self.subject?,
            payload: self.payload,
        })
    }
}

/// Per-user conversation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub state: ConversationState,
    pub draft: Option<PendingDraft>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            state: ConversationState::Idle,
            draft: None,
            last_activity: now,
        }
    }

    /// Back to idle, dropping any draft or in-progress edit
    pub fn reset(&mut self) {
        self.state = ConversationState::Idle;
        self.draft = None;
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
    }

    /// Nothing in progress: idle without a draft
    pub fn is_empty(&self) -> bool {
        self.state == ConversationState::Idle && self.draft.is_none()
    }

    /// Reset the session if it has been inactive for longer than `timeout`
    ///
    /// Returns true when something in progress was dropped.
    pub fn expire_if_idle(&mut self, now: DateTime<Utc>, timeout: Option<Duration>) -> bool {
        let Some(timeout) = timeout else {
            return false;
        };
        if self.is_empty() || now - self.last_activity <= timeout {
            return false;
        }
        self.reset();
        true
    }
}
