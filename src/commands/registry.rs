//! Action handler registry
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 2.0.0: Keyed by callback action name
//! - 1.0.0: Initial implementation for handler dispatch

use std::collections::HashMap;
use std::sync::Arc;

use super::handler::ActionHandler;

/// Registry mapping action names to handlers
///
/// Multiple action names can map to the same handler if they share logic.
#[derive(Clone)]
pub struct ActionRegistry {
    handlers: HashMap<&'static str, Arc<dyn ActionHandler>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registry holding every built-in handler
    pub fn with_all_handlers() -> Self {
        let mut registry = Self::new();
        for handler in super::handlers::create_all_handlers() {
            registry.register(handler);
        }
        registry
    }

    /// Register a handler for all names returned by `action_names()`
    pub fn register(&mut self, handler: Arc<dyn ActionHandler>) {
        for name in handler.action_names() {
            self.handlers.insert(name, Arc::clone(&handler));
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ActionHandler>> {
        self.handlers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Number of registered action names (not unique handlers)
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn action_names(&self) -> impl Iterator<Item = &&'static str> {
        self.handlers.keys()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::action;
    use crate::commands::context::BotContext;
    use crate::commands::handler::ActionRequest;
    use crate::core::Reply;
    use crate::features::conversation::Session;
    use anyhow::Result;
    use async_trait::async_trait;

    struct MockHandler {
        names: &'static [&'static str],
    }

    #[async_trait]
    impl ActionHandler for MockHandler {
        fn action_names(&self) -> &'static [&'static str] {
            self.names
        }

        async fn handle(
            &self,
            _ctx: &BotContext,
            _session: &mut Session,
            _request: &ActionRequest<'_>,
        ) -> Result<Vec<Reply>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry = ActionRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_registry_register_multiple_names() {
        let mut registry = ActionRegistry::new();
        registry.register(Arc::new(MockHandler {
            names: &["pin", "edit", "note"],
        }));

        assert_eq!(registry.len(), 3);
        assert!(registry.contains("pin"));
        assert!(registry.contains("note"));
        assert!(!registry.contains("delete"));
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_all_handlers_cover_every_button_action() {
        let registry = ActionRegistry::with_all_handlers();
        for name in [
            action::CONFIRM,
            action::NEW_CATEGORY,
            action::SELECT_CATEGORY,
            action::CATEGORY_PAGE,
            action::SHOW_CATEGORY,
            action::LIST_CATEGORIES,
            action::SHOW_ITEM,
            action::BACK,
            action::PIN,
            action::EDIT,
            action::NOTE,
            action::REMIND,
            action::SET_REMINDER,
            action::CUSTOM_REMINDER,
            action::DELETE,
            action::DELETE_CONTENT,
            action::DELETE_NOTE,
            action::STATS,
            action::EXPORT,
            action::MENU,
        ] {
            assert!(registry.contains(name), "no handler for {name}");
        }
    }

    #[test]
    fn test_registry_default() {
        assert!(ActionRegistry::default().is_empty());
    }
}
