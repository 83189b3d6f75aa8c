//! Statistics and data export

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;

use crate::commands::action;
use crate::commands::context::BotContext;
use crate::commands::handler::{ActionHandler, ActionRequest};
use crate::core::Reply;
use crate::features::conversation::Session;
use crate::message_components as ui;

pub struct SettingsHandler;

#[async_trait]
impl ActionHandler for SettingsHandler {
    fn action_names(&self) -> &'static [&'static str] {
        &[action::STATS, action::EXPORT]
    }

    async fn handle(
        &self,
        ctx: &BotContext,
        _session: &mut Session,
        request: &ActionRequest<'_>,
    ) -> Result<Vec<Reply>> {
        let owner = request.owner;
        if request.data.action == action::EXPORT {
            let items = ctx.database.export_all(owner).await?;
            info!(
                "[{}] Exporting {} item(s) for {}",
                request.request_id,
                items.len(),
                owner
            );
            let reply = ui::export_reply(&items).context("Failed to serialize export")?;
            return Ok(vec![reply]);
        }

        let stats = ctx.database.stats(owner).await?;
        Ok(vec![ui::stats_reply(&stats)])
    }
}
