//! # Messaging Gateway
//!
//! Boundary between the bot core and the chat transport: the inbound event shape the
//! transport hands us, and the [`ReplySink`] the core pushes unsolicited messages through.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//! - **Toggleable**: false

pub mod discord;
pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::Reply;

pub use memory::MemorySink;

/// Reference to an uploaded document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub file_ref: String,
    pub file_name: String,
}

/// Binary payload fields of an inbound message; at most one is normally set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundPayload {
    pub photo: Option<String>,
    pub document: Option<DocumentRef>,
    pub voice: Option<String>,
    pub video: Option<String>,
    pub caption: Option<String>,
    /// Kind of an attachment the transport could not map (sticker, poll, ...)
    pub unsupported: Option<String>,
}

/// One user action delivered by the transport: a message or a button press
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub sender: String,
    pub text: Option<String>,
    pub payload: InboundPayload,
    pub callback_data: Option<String>,
}

impl InboundEvent {
    /// Plain text message
    pub fn text(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Button press carrying a callback token
    pub fn callback(sender: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            callback_data: Some(data.into()),
            ..Default::default()
        }
    }

    /// Message carrying a binary payload and no text
    pub fn payload(sender: impl Into<String>, payload: InboundPayload) -> Self {
        Self {
            sender: sender.into(),
            payload,
            ..Default::default()
        }
    }

    /// Trimmed message text, if any
    pub fn trimmed_text(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim)
    }
}

/// Outbound channel for messages the bot sends on its own (reminders, billing notices)
#[async_trait]
pub trait ReplySink: Send + Sync {
    /// Deliver a reply to a user. An error means the message was not handed to the transport.
    async fn send(&self, owner: &str, reply: Reply) -> Result<()>;
}
