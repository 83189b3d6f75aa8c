//! Outbound replies
//!
//! Transport-neutral reply shape: text plus an optional ordered list of button rows.
//! The gateway adapter decides how rows are rendered.

use serde::{Deserialize, Serialize};

/// A single button: visible label and the callback token sent back when pressed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub action: String,
}

impl Button {
    pub fn new(label: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: action.into(),
        }
    }
}

/// Ordered rows of buttons
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row with one button
    pub fn button(mut self, label: impl Into<String>, action: impl Into<String>) -> Self {
        self.rows.push(vec![Button::new(label, action)]);
        self
    }

    /// Append a row with several buttons
    pub fn row(mut self, buttons: Vec<Button>) -> Self {
        if !buttons.is_empty() {
            self.rows.push(buttons);
        }
        self
    }

    /// Append buttons packed into rows of at most `width`
    pub fn grid(mut self, buttons: Vec<Button>, width: usize) -> Self {
        let width = width.max(1);
        let mut buttons = buttons.into_iter().peekable();
        while buttons.peek().is_some() {
            self.rows.push(buttons.by_ref().take(width).collect());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.is_empty())
    }

    /// Every callback token on the keyboard, row by row
    pub fn actions(&self) -> Vec<&str> {
        self.rows
            .iter()
            .flatten()
            .map(|b| b.action.as_str())
            .collect()
    }
}

/// File sent along with a reply (used by the data export)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// A message going back to the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<Keyboard>,
    pub file: Option<ReplyFile>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
            file: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = (!keyboard.is_empty()).then_some(keyboard);
        self
    }

    pub fn with_file(mut self, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.file = Some(ReplyFile {
            file_name: file_name.into(),
            bytes,
        });
        self
    }

    /// Callback tokens on this reply's keyboard, empty when there is none
    pub fn actions(&self) -> Vec<&str> {
        self.keyboard
            .as_ref()
            .map(|k| k.actions())
            .unwrap_or_default()
    }
}
