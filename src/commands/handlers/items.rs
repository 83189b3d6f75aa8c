//! Item card actions: show, back, pin, edit and note

use anyhow::Result;
use async_trait::async_trait;

use crate::commands::action;
use crate::commands::context::BotContext;
use crate::commands::handler::{ActionHandler, ActionRequest};
use crate::core::{BotError, Reply};
use crate::features::conversation::Session;

pub struct ItemHandler;

#[async_trait]
impl ActionHandler for ItemHandler {
    fn action_names(&self) -> &'static [&'static str] {
        &[
            action::SHOW_ITEM,
            action::BACK,
            action::PIN,
            action::EDIT,
            action::NOTE,
        ]
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
            action::PIN => {
                ctx.engine.owned_item(owner, item_id).await?;
                let pinned = ctx
                    .database
                    .toggle_pin(item_id)
                    .await?
                    .ok_or(BotError::NotFound(item_id))?;
                let note = if pinned { "📌 Pinned." } else { "📍 Unpinned." };
                Ok(vec![
                    Reply::text(note),
                    ctx.engine.show_item(owner, item_id).await?,
                ])
            }
            action::EDIT => Ok(ctx.engine.begin_edit(session, owner, item_id).await?),
            action::NOTE => Ok(ctx.engine.begin_note(session, owner, item_id).await?),
            // show and back both redisplay the item
            _ => Ok(vec![ctx.engine.show_item(owner, item_id).await?]),
        }
    }
}
