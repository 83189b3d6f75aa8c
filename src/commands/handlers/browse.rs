//! Category browsing, one page at a time

use anyhow::Result;
use async_trait::async_trait;

use crate::commands::action;
use crate::commands::context::BotContext;
use crate::commands::handler::{ActionHandler, ActionRequest};
use crate::core::Reply;
use crate::features::conversation::Session;
use crate::message_components as ui;

pub struct BrowseHandler;

#[async_trait]
impl ActionHandler for BrowseHandler {
    fn action_names(&self) -> &'static [&'static str] {
        &[action::SHOW_CATEGORY, action::LIST_CATEGORIES]
    }

    async fn handle(
        &self,
        ctx: &BotContext,
        _session: &mut Session,
        request: &ActionRequest<'_>,
    ) -> Result<Vec<Reply>> {
        let (category, page) = request.data.paged_rest();
        if request.data.action == action::LIST_CATEGORIES {
            let overview = ctx.category_overview(request.owner).await?;
            return Ok(vec![ui::category_list(&overview, page)]);
        }

        let items = ctx.database.list_by_category(request.owner, category).await?;
        Ok(vec![ui::category_items(category, &items, page)])
    }
}
