//! Per-action handler implementations
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 3.0.0: Item, reminder, deletion, browsing and settings actions
//! - 2.0.0: Handlers grouped by feature
//! - 1.0.0: Initial extraction from the monolithic handler

pub mod browse;
pub mod delete;
pub mod drafts;
pub mod items;
pub mod menu;
pub mod reminders;
pub mod settings;

use std::sync::Arc;

use super::handler::ActionHandler;

/// Create all registered action handlers
pub fn create_all_handlers() -> Vec<Arc<dyn ActionHandler>> {
    vec![
        Arc::new(menu::MenuHandler),
        Arc::new(drafts::DraftHandler),
        Arc::new(items::ItemHandler),
        Arc::new(reminders::ReminderHandler),
        Arc::new(delete::DeleteHandler),
        Arc::new(browse::BrowseHandler),
        Arc::new(settings::SettingsHandler),
    ]
}
