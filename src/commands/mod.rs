//! # Command System
//!
//! Routing of inbound events: button callbacks, menu commands and conversation input.
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 3.0.0: Callback-token actions and the per-user dispatcher
//! - 2.1.0: Add modular handler infrastructure (handler trait, context, registry)
//! - 1.0.0: Initial reorganization with modular command structure

pub mod action;
pub mod context;
pub mod dispatcher;
pub mod handler;
pub mod handlers;
pub mod menu;
pub mod registry;

pub use action::CallbackData;
pub use context::BotContext;
pub use dispatcher::Dispatcher;
pub use handler::{ActionHandler, ActionRequest};
pub use menu::MenuCommand;
pub use registry::ActionRegistry;
