//! Action handler trait
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 2.0.0: Handlers answer button presses with replies instead of talking to Discord
//! - 1.0.0: Initial implementation for modular command handling

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::warn;

use super::action::CallbackData;
use super::context::BotContext;
use crate::core::Reply;
use crate::features::conversation::Session;
use crate::features::items::ItemId;

/// One button press being handled
pub struct ActionRequest<'a> {
    pub request_id: &'a str,
    pub owner: &'a str,
    pub data: &'a CallbackData,
    pub now: DateTime<Utc>,
}

impl ActionRequest<'_> {
    /// Item id carried by the token; a malformed token is logged and yields `None`
    pub fn item_id(&self) -> Option<ItemId> {
        let id = self.data.item_id();
        if id.is_none() {
            warn!(
                "[{}] Action {} from {} carries no item id: {:?}",
                self.request_id, self.data.action, self.owner, self.data.rest
            );
        }
        id
    }
}

/// Handler for one or more callback actions
///
/// Handlers are registered with an [`ActionRegistry`](super::ActionRegistry) and looked up
/// by the action name at the front of the callback token. Errors that are a
/// [`BotError`](crate::core::BotError) are turned into user-facing replies by the dispatcher.
///
/// # Example
///
/// ```ignore
/// pub struct StatsHandler;
///
/// #[async_trait]
/// impl ActionHandler for StatsHandler {
///     fn action_names(&self) -> &'static [&'static str] {
///         &["stats"]
///     }
///
///     async fn handle(
///         &self,
///         ctx: &BotContext,
///         session: &mut Session,
///         request: &ActionRequest<'_>,
///     ) -> Result<Vec<Reply>> {
///         let stats = ctx.database.stats(request.owner).await?;
///         Ok(vec![ui::stats_reply(&stats)])
///     }
/// }
/// ```
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Action name(s) this handler processes
    fn action_names(&self) -> &'static [&'static str];

    /// Handle the button press with the sender's session locked
    async fn handle(
        &self,
        ctx: &BotContext,
        session: &mut Session,
        request: &ActionRequest<'_>,
    ) -> Result<Vec<Reply>>;
}
