//! Shared context for action handlers
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 2.0.0: Store, scheduler and conversation engine replace the per-command services
//! - 1.0.0: Initial implementation with core shared state

use std::sync::Arc;

use crate::core::{Config, StoreError};
use crate::database::Database;
use crate::features::conversation::{ConversationEngine, ConversationLimits};
use crate::features::reminders::ReminderScheduler;
use crate::gateway::ReplySink;

/// Services every handler can reach
#[derive(Clone)]
pub struct BotContext {
    pub database: Database,
    pub scheduler: ReminderScheduler,
    pub engine: ConversationEngine,
    pub config: Config,
}

impl BotContext {
    /// Wire the scheduler and conversation engine around a database and outbound sink
    pub fn new(config: Config, database: Database, sink: Arc<dyn ReplySink>) -> Self {
        let scheduler = ReminderScheduler::new(database.clone(), sink).with_intervals(
            config.sweep_interval(),
            config.purge_interval(),
            config.stale_reminder_retention(),
        );
        let engine = ConversationEngine::new(
            database.clone(),
            scheduler.clone(),
            ConversationLimits::from_config(&config),
        );
        Self {
            database,
            scheduler,
            engine,
            config,
        }
    }

    /// The owner's categories with their item counts
    pub async fn category_overview(&self, owner: &str) -> Result<Vec<(String, i64)>, StoreError> {
        let mut overview = Vec::new();
        for category in self.database.list_categories(owner).await? {
            let count = self.database.category_count(owner, &category).await?;
            overview.push((category, count));
        }
        Ok(overview)
    }
}
