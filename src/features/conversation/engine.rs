//! Conversation transitions
//!
//! Every method takes the caller's locked [`Session`]. Errors leave the session as it
//! was: validation failures re-prompt in the same state, and the dispatcher decides how
//! "not found" and storage failures are reported.

use chrono::{DateTime, Utc};
use log::debug;

use super::state::{ConversationState, PendingDraft, Session};
use crate::core::{BotError, Config, Reply};
use crate::database::Database;
use crate::features::items::{ContentPayload, Item, ItemId};
use crate::features::reminders::{ReminderBounds, ReminderJob, ReminderScheduler};
use crate::gateway::InboundEvent;
use crate::message_components as ui;

/// Category names must fit in a button payload
pub const MAX_CATEGORY_CHARS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversationLimits {
    pub reminders: ReminderBounds,
    pub max_category_chars: usize,
}

impl Default for ConversationLimits {
    fn default() -> Self {
        Self {
            reminders: ReminderBounds::default(),
            max_category_chars: MAX_CATEGORY_CHARS,
        }
    }
}

impl ConversationLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            reminders: ReminderBounds::new(config.min_reminder_hours, config.max_reminder_hours),
            max_category_chars: MAX_CATEGORY_CHARS,
        }
    }
}

#[derive(Clone)]
pub struct ConversationEngine {
    database: Database,
    scheduler: ReminderScheduler,
    limits: ConversationLimits,
}

impl ConversationEngine {
    pub fn new(database: Database, scheduler: ReminderScheduler, limits: ConversationLimits) -> Self {
        Self {
            database,
            scheduler,
            limits,
        }
    }

    pub fn limits(&self) -> &ConversationLimits {
        &self.limits
    }

    /// Fetch an item the owner may act on; anything else is reported as not found
    pub async fn owned_item(&self, owner: &str, item_id: ItemId) -> Result<Item, BotError> {
        match self.database.get(item_id).await? {
            Some(item) if item.owner == owner => Ok(item),
            _ => Err(BotError::NotFound(item_id)),
        }
    }

    /// Item card for one of the owner's items
    pub async fn show_item(&self, owner: &str, item_id: ItemId) -> Result<Reply, BotError> {
        Ok(ui::item_card(&self.owned_item(owner, item_id).await?))
    }

    /// Begin collecting a new item, dropping anything in progress
    pub fn start_add(&self, session: &mut Session) -> Reply {
        session.reset();
        session.state = ConversationState::AwaitingContent;
        ui::ask_for_content()
    }

    pub fn start_search(&self, session: &mut Session) -> Reply {
        session.reset();
        session.state = ConversationState::AwaitingSearchQuery;
        ui::ask_search_query()
    }

    /// Handle a message (not a button press) according to the session's state
    pub async fn on_message(
        &self,
        session: &mut Session,
        event: &InboundEvent,
        now: DateTime<Utc>,
    ) -> Result<Vec<Reply>, BotError> {
        let owner = event.sender.as_str();
        debug!("Message from {owner} in state {}", session.state);

        match session.state {
            ConversationState::Idle => Ok(vec![ui::menu_reply()]),
            ConversationState::AwaitingContent => self.receive_content(session, event, now).await,
            ConversationState::AwaitingCategory => {
                let name = require_text(event, "Please type the category name.")?;
                self.attach_category(session, name)
            }
            ConversationState::AwaitingSubject => {
                let subject = require_text(event, "Please type a subject.")?;
                self.attach_subject(session, subject)
            }
            ConversationState::AwaitingEdit { item_id } => {
                let payload = ContentPayload::classify(event)?;
                self.owned_item(owner, item_id).await?;
                if !self.database.update_content(item_id, &payload).await? {
                    return Err(BotError::NotFound(item_id));
                }
                session.reset();
                Ok(vec![
                    Reply::text("✏️ Content updated."),
                    self.show_item(owner, item_id).await?,
                ])
            }
            ConversationState::AwaitingNote { item_id } => {
                let note = require_text(event, "Please send the note as text.")?;
                if note.is_empty() {
                    return Err(BotError::Validation(
                        "The note must not be empty. Type the note:".into(),
                    ));
                }
                self.owned_item(owner, item_id).await?;
                if !self.database.update_note(item_id, note).await? {
                    return Err(BotError::NotFound(item_id));
                }
                session.reset();
                Ok(vec![
                    Reply::text("📝 Note saved."),
                    self.show_item(owner, item_id).await?,
                ])
            }
            ConversationState::AwaitingReminderHours { item_id } => {
                let raw = require_text(event, "Please send the number of hours.")?;
                let hours = self.limits.reminders.parse(raw)?;
                let replies = self.set_reminder(owner, item_id, hours, now).await?;
                session.reset();
                Ok(replies)
            }
            ConversationState::AwaitingSearchQuery => {
                let query = require_text(event, "Please type what to search for.")?;
                let results = self.database.search(owner, query).await?;
                session.reset();
                Ok(vec![ui::search_results(query, &results)])
            }
        }
    }

    async fn receive_content(
        &self,
        session: &mut Session,
        event: &InboundEvent,
        now: DateTime<Utc>,
    ) -> Result<Vec<Reply>, BotError> {
        let payload = ContentPayload::classify(event)?;
        let categories = self.database.list_categories(&event.sender).await?;

        debug!("Draft for {} holds {}", event.sender, payload.content_type());
        session.draft = Some(PendingDraft::new(payload, now));
        session.state = ConversationState::AwaitingCategory;
        Ok(vec![ui::category_selection(&categories, 0)])
    }

    fn validate_category(&self, raw: &str) -> Result<String, BotError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(BotError::Validation(
                "The category name must not be empty. Type a name:".into(),
            ));
        }
        if name.chars().count() > self.limits.max_category_chars {
            return Err(BotError::Validation(format!(
                "Category names can be at most {} characters. Type a shorter name:",
                self.limits.max_category_chars
            )));
        }
        Ok(name.to_string())
    }

    fn attach_category(&self, session: &mut Session, raw: &str) -> Result<Vec<Reply>, BotError> {
        let name = self.validate_category(raw)?;
        let Some(draft) = session.draft.as_mut() else {
            session.reset();
            return Ok(vec![ui::no_pending_draft()]);
        };
        draft.category = Some(name.clone());
        session.state = ConversationState::AwaitingSubject;
        Ok(vec![ui::ask_subject(&name)])
    }

    fn attach_subject(&self, session: &mut Session, raw: &str) -> Result<Vec<Reply>, BotError> {
        let subject = raw.trim();
        if subject.is_empty() {
            return Err(BotError::Validation(
                "The subject must not be empty. Type a subject:".into(),
            ));
        }
        let Some(draft) = session.draft.as_mut() else {
            session.reset();
            return Ok(vec![ui::no_pending_draft()]);
        };
        draft.subject = Some(subject.to_string());
        let reply = ui::draft_confirmation(draft);
        session.state = ConversationState::Idle;
        Ok(vec![reply])
    }

    /// An existing category picked from the keyboard
    ///
    /// Accepted while a draft is being assembled; a later pick replaces an earlier one.
    pub fn select_category(
        &self,
        session: &mut Session,
        category: &str,
    ) -> Result<Vec<Reply>, BotError> {
        let assembling = matches!(
            session.state,
            ConversationState::AwaitingCategory | ConversationState::AwaitingSubject
        );
        if !assembling || session.draft.is_none() {
            return Ok(vec![ui::no_pending_draft()]);
        }
        self.attach_category(session, category)
    }

    /// "New category" chosen: wait for a typed name
    pub fn request_new_category(&self, session: &mut Session) -> Vec<Reply> {
        if session.draft.is_none() {
            return vec![ui::no_pending_draft()];
        }
        session.state = ConversationState::AwaitingCategory;
        vec![ui::ask_new_category()]
    }

    /// Commit the complete draft as a new item
    pub async fn confirm(&self, session: &mut Session, owner: &str) -> Result<Vec<Reply>, BotError> {
        let Some(new_item) = session
            .draft
            .as_ref()
            .filter(|d| d.is_complete())
            .and_then(|d| d.clone().into_new_item(owner))
        else {
            return Ok(vec![ui::no_pending_draft()]);
        };

        let item_id = self.database.create(&new_item).await?;
        session.reset();
        let item = self.owned_item(owner, item_id).await?;
        Ok(ui::item_saved(&item))
    }

    pub async fn begin_edit(
        &self,
        session: &mut Session,
        owner: &str,
        item_id: ItemId,
    ) -> Result<Vec<Reply>, BotError> {
        let item = self.owned_item(owner, item_id).await?;
        session.reset();
        session.state = ConversationState::AwaitingEdit { item_id };
        Ok(vec![ui::ask_edit(&item)])
    }

    pub async fn begin_note(
        &self,
        session: &mut Session,
        owner: &str,
        item_id: ItemId,
    ) -> Result<Vec<Reply>, BotError> {
        let item = self.owned_item(owner, item_id).await?;
        session.reset();
        session.state = ConversationState::AwaitingNote { item_id };
        Ok(vec![ui::ask_note(&item)])
    }

    pub async fn begin_custom_reminder(
        &self,
        session: &mut Session,
        owner: &str,
        item_id: ItemId,
    ) -> Result<Vec<Reply>, BotError> {
        self.owned_item(owner, item_id).await?;
        session.reset();
        session.state = ConversationState::AwaitingReminderHours { item_id };
        Ok(vec![ui::ask_custom_hours(&self.limits.reminders)])
    }

    /// Arm a reminder `hours` from `now` and show the refreshed item
    pub async fn set_reminder(
        &self,
        owner: &str,
        item_id: ItemId,
        hours: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Reply>, BotError> {
        let firing_time = self.limits.reminders.firing_time(now, hours)?;
        self.owned_item(owner, item_id).await?;

        if !self
            .scheduler
            .arm(ReminderJob::new(item_id, owner, firing_time))
            .await?
        {
            return Err(BotError::NotFound(item_id));
        }
        Ok(vec![
            ui::reminder_set(firing_time, now),
            self.show_item(owner, item_id).await?,
        ])
    }
}

fn require_text<'a>(event: &'a InboundEvent, prompt: &str) -> Result<&'a str, BotError> {
    event
        .trimmed_text()
        .ok_or_else(|| BotError::Validation(prompt.to_string()))
}
