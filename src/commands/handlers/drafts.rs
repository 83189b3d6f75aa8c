//! Draft buttons: category choice and confirmation

use anyhow::Result;
use async_trait::async_trait;
use log::warn;

use crate::commands::action;
use crate::commands::context::BotContext;
use crate::commands::handler::{ActionHandler, ActionRequest};
use crate::core::Reply;
use crate::features::conversation::Session;
use crate::message_components as ui;

pub struct DraftHandler;

#[async_trait]
impl ActionHandler for DraftHandler {
    fn action_names(&self) -> &'static [&'static str] {
        &[
            action::CONFIRM,
            action::NEW_CATEGORY,
            action::SELECT_CATEGORY,
            action::CATEGORY_PAGE,
        ]
    }

    async fn handle(
        &self,
        ctx: &BotContext,
        session: &mut Session,
        request: &ActionRequest<'_>,
    ) -> Result<Vec<Reply>> {
        let data = request.data;
        match data.action.as_str() {
            action::CONFIRM if data.is_token(action::CONFIRM_SAVE) => {
                Ok(ctx.engine.confirm(session, request.owner).await?)
            }
            action::NEW_CATEGORY => Ok(ctx.engine.request_new_category(session)),
            action::SELECT_CATEGORY => Ok(ctx.engine.select_category(session, &data.rest)?),
            action::CATEGORY_PAGE => {
                let (_, page) = data.paged_rest();
                let categories = ctx.database.list_categories(request.owner).await?;
                Ok(vec![ui::category_selection(&categories, page)])
            }
            _ => {
                warn!("[{}] Unhandled draft action {:?}", request.request_id, data);
                Ok(Vec::new())
            }
        }
    }
}
