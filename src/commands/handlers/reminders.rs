//! Reminder submenu actions

use anyhow::Result;
use async_trait::async_trait;
use log::warn;

use crate::commands::action;
use crate::commands::context::BotContext;
use crate::commands::handler::{ActionHandler, ActionRequest};
use crate::core::Reply;
use crate::features::conversation::Session;
use crate::message_components as ui;

pub struct ReminderHandler;

#[async_trait]
impl ActionHandler for ReminderHandler {
    fn action_names(&self) -> &'static [&'static str] {
        &[action::REMIND, action::SET_REMINDER, action::CUSTOM_REMINDER]
    }

    async fn handle(
        &self,
        ctx: &BotContext,
        session: &mut Session,
        request: &ActionRequest<'_>,
    ) -> Result<Vec<Reply>> {
        let Some(item_id) = request.item_id() else {
            return Ok(Vec::new());
        };
        let owner = request.owner;

        match request.data.action.as_str() {
            action::REMIND => {
                ctx.engine.owned_item(owner, item_id).await?;
                Ok(vec![ui::reminder_menu(item_id)])
            }
            action::SET_REMINDER => {
                let Some(hours) = request.data.extra(0).and_then(|h| h.parse::<i64>().ok()) else {
                    warn!(
                        "[{}] Reminder button without hours: {:?}",
                        request.request_id, request.data.rest
                    );
                    return Ok(Vec::new());
                };
                Ok(ctx
                    .engine
                    .set_reminder(owner, item_id, hours, request.now)
                    .await?)
            }
            _ => Ok(ctx
                .engine
                .begin_custom_reminder(session, owner, item_id)
                .await?),
        }
    }
}
