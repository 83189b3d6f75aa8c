//! Main menu entries

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, warn};

use crate::commands::action;
use crate::commands::context::BotContext;
use crate::commands::handler::{ActionHandler, ActionRequest};
use crate::commands::menu::MenuCommand;
use crate::core::Reply;
use crate::features::conversation::Session;
use crate::message_components as ui;

/// Run a menu entry, abandoning any flow in progress
pub async fn run_menu(
    ctx: &BotContext,
    session: &mut Session,
    owner: &str,
    command: MenuCommand,
) -> Result<Vec<Reply>> {
    debug!("Menu {command} for {owner} (was {})", session.state);
    let reply = match command {
        MenuCommand::Start => {
            session.reset();
            ui::welcome()
        }
        MenuCommand::Cancel => {
            session.reset();
            ui::cancelled()
        }
        MenuCommand::Main => {
            session.reset();
            ui::menu_reply()
        }
        MenuCommand::Add => ctx.engine.start_add(session),
        MenuCommand::Search => ctx.engine.start_search(session),
        MenuCommand::Browse => {
            let overview = ctx.category_overview(owner).await?;
            session.reset();
            ui::category_list(&overview, 0)
        }
        MenuCommand::Settings => {
            session.reset();
            ui::settings_menu()
        }
    };
    Ok(vec![reply])
}

pub struct MenuHandler;

#[async_trait]
impl ActionHandler for MenuHandler {
    fn action_names(&self) -> &'static [&'static str] {
        &[action::MENU]
    }

    async fn handle(
        &self,
        ctx: &BotContext,
        session: &mut Session,
        request: &ActionRequest<'_>,
    ) -> Result<Vec<Reply>> {
        match MenuCommand::from_entry(&request.data.rest) {
            Some(command) => run_menu(ctx, session, request.owner, command).await,
            None => {
                warn!(
                    "[{}] Unknown menu entry {:?}",
                    request.request_id, request.data.rest
                );
                Ok(Vec::new())
            }
        }
    }
}
