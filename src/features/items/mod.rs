//! # Feature: Saved Items
//!
//! Domain types for saved content: the item record, its closed content variant,
//! and per-owner statistics.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Replace optional payload fields with the ContentPayload variant
//! - 1.0.0: Initial item model

pub mod content;
pub mod model;

pub use content::{ContentPayload, ContentType};
pub use model::{Item, ItemId, ItemStats, NewItem};
