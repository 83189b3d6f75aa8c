//! Deletion submenu actions

use anyhow::Result;
use async_trait::async_trait;
use log::info;

use crate::commands::action;
use crate::commands::context::BotContext;
use crate::commands::handler::{ActionHandler, ActionRequest};
use crate::core::{BotError, Reply};
use crate::features::conversation::Session;
use crate::message_components as ui;

pub struct DeleteHandler;

#[async_trait]
impl ActionHandler for DeleteHandler {
    fn action_names(&self) -> &'static [&'static str] {
        &[action::DELETE, action::DELETE_CONTENT, action::DELETE_NOTE]
    }

    async fn handle(
        &self,
        ctx: &BotContext,
        _session: &mut Session,
        request: &ActionRequest<'_>,
    ) -> Result<Vec<Reply>> {
        let Some(item_id) = request.item_id() else {
            return Ok(Vec::new());
        };
        let owner = request.owner;
        let item = ctx.engine.owned_item(owner, item_id).await?;

        match request.data.action.as_str() {
            action::DELETE_CONTENT => {
                if !ctx.database.delete(item_id).await? {
                    return Err(BotError::NotFound(item_id).into());
                }
                ctx.scheduler.cancel(item_id);
                info!("[{}] {} deleted item {}", request.request_id, owner, item_id);
                Ok(vec![ui::item_deleted()])
            }
            action::DELETE_NOTE => {
                if !ctx.database.clear_note(item_id).await? {
                    return Err(BotError::NotFound(item_id).into());
                }
                Ok(vec![
                    Reply::text("📝 Note deleted."),
                    ctx.engine.show_item(owner, item_id).await?,
                ])
            }
            _ => Ok(vec![ui::delete_menu(&item)]),
        }
    }
}
