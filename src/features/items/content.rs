//! Content payloads
//!
//! Inbound messages arrive as an open bag of optional fields; saved items hold exactly one
//! of five content kinds. [`ContentPayload::classify`] is the only bridge between the two.

use serde::{Deserialize, Serialize};

use crate::core::BotError;
use crate::gateway::InboundEvent;

/// Kind of saved content, as stored in the `content_type` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Text,
    Photo,
    Document,
    Voice,
    Video,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Photo => "photo",
            ContentType::Document => "document",
            ContentType::Voice => "voice",
            ContentType::Video => "video",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ContentType::Text => "📝",
            ContentType::Photo => "🖼️",
            ContentType::Document => "📄",
            ContentType::Voice => "🎙️",
            ContentType::Video => "🎬",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ContentType::Text),
            "photo" => Ok(ContentType::Photo),
            "document" => Ok(ContentType::Document),
            "voice" => Ok(ContentType::Voice),
            "video" => Ok(ContentType::Video),
            _ => Err(anyhow::anyhow!("Invalid content type: {}", s)),
        }
    }
}

/// The content of an item
///
/// `file_ref` values are opaque references into the messaging platform's storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPayload {
    Text {
        body: String,
    },
    Photo {
        file_ref: String,
        caption: String,
    },
    Document {
        file_ref: String,
        file_name: String,
        caption: String,
    },
    Voice {
        file_ref: String,
        caption: String,
    },
    Video {
        file_ref: String,
        caption: String,
    },
}

impl ContentPayload {
    pub fn text(body: impl Into<String>) -> Self {
        ContentPayload::Text { body: body.into() }
    }

    /// Classify an inbound message
    ///
    /// Checks text, photo, document, voice and video in that order and takes the first
    /// non-empty one. Anything else is [`BotError::UnsupportedContent`].
    pub fn classify(event: &InboundEvent) -> Result<Self, BotError> {
        let payload = &event.payload;
        let caption = payload.caption.clone().unwrap_or_default();

        if let Some(text) = event.text.as_deref().filter(|t| !t.trim().is_empty()) {
            return Ok(ContentPayload::Text {
                body: text.to_string(),
            });
        }
        if let Some(file_ref) = non_empty(&payload.photo) {
            return Ok(ContentPayload::Photo { file_ref, caption });
        }
        if let Some(doc) = payload.document.as_ref().filter(|d| !d.file_ref.is_empty()) {
            return Ok(ContentPayload::Document {
                file_ref: doc.file_ref.clone(),
                file_name: doc.file_name.clone(),
                caption,
            });
        }
        if let Some(file_ref) = non_empty(&payload.voice) {
            return Ok(ContentPayload::Voice { file_ref, caption });
        }
        if let Some(file_ref) = non_empty(&payload.video) {
            return Ok(ContentPayload::Video { file_ref, caption });
        }

        Err(BotError::UnsupportedContent)
    }

    pub fn content_type(&self) -> ContentType {
        match self {
            ContentPayload::Text { .. } => ContentType::Text,
            ContentPayload::Photo { .. } => ContentType::Photo,
            ContentPayload::Document { .. } => ContentType::Document,
            ContentPayload::Voice { .. } => ContentType::Voice,
            ContentPayload::Video { .. } => ContentType::Video,
        }
    }

    /// Inline text body; empty for binary content
    pub fn body(&self) -> &str {
        match self {
            ContentPayload::Text { body } => body,
            _ => "",
        }
    }

    pub fn file_ref(&self) -> &str {
        match self {
            ContentPayload::Text { .. } => "",
            ContentPayload::Photo { file_ref, .. }
            | ContentPayload::Document { file_ref, .. }
            | ContentPayload::Voice { file_ref, .. }
            | ContentPayload::Video { file_ref, .. } => file_ref,
        }
    }

    pub fn file_name(&self) -> &str {
        match self {
            ContentPayload::Document { file_name, .. } => file_name,
            _ => "",
        }
    }

    pub fn caption(&self) -> &str {
        match self {
            ContentPayload::Text { .. } => "",
            ContentPayload::Photo { caption, .. }
            | ContentPayload::Document { caption, .. }
            | ContentPayload::Voice { caption, .. }
            | ContentPayload::Video { caption, .. } => caption,
        }
    }

    /// Rebuild a payload from its stored columns
    pub fn from_columns(
        content_type: ContentType,
        content: String,
        file_ref: String,
        file_name: String,
        caption: String,
    ) -> Self {
        match content_type {
            ContentType::Text => ContentPayload::Text { body: content },
            ContentType::Photo => ContentPayload::Photo { file_ref, caption },
            ContentType::Document => ContentPayload::Document {
                file_ref,
                file_name,
                caption,
            },
            ContentType::Voice => ContentPayload::Voice { file_ref, caption },
            ContentType::Video => ContentPayload::Video { file_ref, caption },
        }
    }

    /// Short human-readable preview: the text body, else the caption, else the file name
    pub fn preview(&self) -> &str {
        match self {
            ContentPayload::Text { body } => body,
            ContentPayload::Document {
                caption, file_name, ..
            } if caption.is_empty() => file_name,
            _ => self.caption(),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{DocumentRef, InboundPayload};

    fn event_with(text: Option<&str>, payload: InboundPayload) -> InboundEvent {
        InboundEvent {
            sender: "u1".to_string(),
            text: text.map(str::to_string),
            payload,
            callback_data: None,
        }
    }

    #[test]
    fn test_content_type_roundtrip_strings() {
        for ct in [
            ContentType::Text,
            ContentType::Photo,
            ContentType::Document,
            ContentType::Voice,
            ContentType::Video,
        ] {
            assert_eq!(ct.as_str().parse::<ContentType>().unwrap(), ct);
        }
        assert!("sticker".parse::<ContentType>().is_err());
    }

    #[test]
    fn test_classify_text() {
        let event = event_with(Some("buy milk"), InboundPayload::default());
        assert_eq!(
            ContentPayload::classify(&event).unwrap(),
            ContentPayload::text("buy milk")
        );
    }

    #[test]
    fn test_classify_priority_photo_before_document() {
        let payload = InboundPayload {
            photo: Some("photo-ref".into()),
            document: Some(DocumentRef {
                file_ref: "doc-ref".into(),
                file_name: "a.pdf".into(),
            }),
            caption: Some("receipt".into()),
            ..Default::default()
        };
        let classified = ContentPayload::classify(&event_with(None, payload)).unwrap();
        assert_eq!(
            classified,
            ContentPayload::Photo {
                file_ref: "photo-ref".into(),
                caption: "receipt".into()
            }
        );
    }

    #[test]
    fn test_classify_document_keeps_name() {
        let payload = InboundPayload {
            document: Some(DocumentRef {
                file_ref: "doc-ref".into(),
                file_name: "a.pdf".into(),
            }),
            ..Default::default()
        };
        let classified = ContentPayload::classify(&event_with(Some("   "), payload)).unwrap();
        assert_eq!(classified.content_type(), ContentType::Document);
        assert_eq!(classified.file_name(), "a.pdf");
        assert_eq!(classified.caption(), "");
        assert_eq!(classified.preview(), "a.pdf");
    }

    #[test]
    fn test_classify_voice_and_video() {
        let voice = InboundPayload {
            voice: Some("v".into()),
            video: Some("x".into()),
            ..Default::default()
        };
        assert_eq!(
            ContentPayload::classify(&event_with(None, voice))
                .unwrap()
                .content_type(),
            ContentType::Voice
        );

        let video = InboundPayload {
            video: Some("x".into()),
            ..Default::default()
        };
        assert_eq!(
            ContentPayload::classify(&event_with(None, video))
                .unwrap()
                .content_type(),
            ContentType::Video
        );
    }

    #[test]
    fn test_classify_unsupported() {
        let payload = InboundPayload {
            unsupported: Some("sticker".into()),
            ..Default::default()
        };
        assert!(matches!(
            ContentPayload::classify(&event_with(None, payload)),
            Err(BotError::UnsupportedContent)
        ));
        assert!(matches!(
            ContentPayload::classify(&event_with(Some(""), InboundPayload::default())),
            Err(BotError::UnsupportedContent)
        ));
    }

    #[test]
    fn test_from_columns_matches_accessors() {
        let payload = ContentPayload::from_columns(
            ContentType::Document,
            String::new(),
            "ref".into(),
            "notes.txt".into(),
            "cap".into(),
        );
        assert_eq!(payload.file_ref(), "ref");
        assert_eq!(payload.file_name(), "notes.txt");
        assert_eq!(payload.caption(), "cap");
        assert_eq!(payload.body(), "");
        assert_eq!(payload.preview(), "cap");
    }
}
