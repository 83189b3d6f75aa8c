//! Discord transport
//!
//! Direct messages only. Messages and button presses are turned into [`InboundEvent`]s;
//! replies go out as new DM messages with the keyboard packed into Discord's 5x5 grid.

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use log::{debug, warn};
use serenity::http::Http;
use serenity::model::application::component::ButtonStyle;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::channel::{Attachment, AttachmentType, Message};
use serenity::model::id::UserId;
use std::borrow::Cow;
use std::sync::Arc;

use super::{DocumentRef, InboundEvent, InboundPayload, ReplySink};
use crate::core::{chunk_for_message, truncate_label, Button, Keyboard, Reply};

/// Discord allows five action rows of five buttons each
const MAX_ROWS: usize = 5;
const MAX_BUTTONS_PER_ROW: usize = 5;
/// Longest `custom_id` Discord accepts
const MAX_CUSTOM_ID: usize = 100;

/// Kind of payload an attachment becomes, decided by its MIME type
fn payload_for_attachment(
    content_type: Option<&str>,
    file_ref: String,
    file_name: String,
    caption: Option<String>,
) -> InboundPayload {
    let mime = content_type.unwrap_or_default().to_ascii_lowercase();
    let mut payload = InboundPayload {
        caption,
        ..Default::default()
    };
    if mime.starts_with("image/") {
        payload.photo = Some(file_ref);
    } else if mime.starts_with("audio/") {
        payload.voice = Some(file_ref);
    } else if mime.starts_with("video/") {
        payload.video = Some(file_ref);
    } else {
        payload.document = Some(DocumentRef {
            file_ref,
            file_name,
        });
    }
    payload
}

fn payload_from(attachment: &Attachment, caption: Option<String>) -> InboundPayload {
    payload_for_attachment(
        attachment.content_type.as_deref(),
        attachment.url.clone(),
        attachment.filename.clone(),
        caption,
    )
}

/// Event for a direct message; `None` for bot authors and guild messages
pub fn inbound_from_message(msg: &Message) -> Option<InboundEvent> {
    if msg.author.bot || msg.guild_id.is_some() {
        return None;
    }

    let sender = msg.author.id.to_string();
    let text = (!msg.content.trim().is_empty()).then(|| msg.content.clone());

    let Some(attachment) = msg.attachments.first() else {
        return Some(InboundEvent {
            sender,
            text,
            ..Default::default()
        });
    };
    if msg.attachments.len() > 1 {
        debug!(
            "Message from {} has {} attachments, using the first",
            sender,
            msg.attachments.len()
        );
    }

    // Text sent with an attachment is its caption
    Some(InboundEvent::payload(sender, payload_from(attachment, text)))
}

/// Event for a button press
pub fn inbound_from_component(interaction: &MessageComponentInteraction) -> InboundEvent {
    InboundEvent::callback(
        interaction.user.id.to_string(),
        interaction.data.custom_id.clone(),
    )
}

/// Re-pack keyboard rows to fit Discord's component limits
///
/// Rows wider than five buttons wrap; buttons past the fifth row are dropped.
pub fn pack_rows(keyboard: &Keyboard) -> Vec<Vec<Button>> {
    let mut rows: Vec<Vec<Button>> = Vec::new();
    for row in &keyboard.rows {
        for chunk in row.chunks(MAX_BUTTONS_PER_ROW) {
            rows.push(chunk.to_vec());
        }
    }

    let total: usize = rows.iter().map(Vec::len).sum();
    if rows.len() > MAX_ROWS {
        rows.truncate(MAX_ROWS);
        let kept: usize = rows.iter().map(Vec::len).sum();
        warn!("Keyboard too large for Discord, dropped {} button(s)", total - kept);
    }

    for row in &mut rows {
        row.retain(|b| {
            let fits = b.action.chars().count() <= MAX_CUSTOM_ID;
            if !fits {
                warn!("Dropping button {:?}: custom id too long", b.label);
            }
            fits
        });
        for button in row.iter_mut() {
            button.label = truncate_label(&button.label);
        }
    }
    rows.retain(|r| !r.is_empty());
    rows
}

/// Sends replies as direct messages
pub struct DiscordSink {
    http: Arc<Http>,
}

impl DiscordSink {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ReplySink for DiscordSink {
    async fn send(&self, owner: &str, reply: Reply) -> Result<()> {
        let user_id: u64 = owner
            .parse()
            .with_context(|| format!("Not a Discord user id: {owner}"))?;
        let dm = UserId(user_id)
            .create_dm_channel(&self.http)
            .await
            .with_context(|| format!("Failed to open DM with {owner}"))?;

        let mut chunks = chunk_for_message(&reply.text);
        if chunks.is_empty() {
            chunks.push(String::new());
        }
        let rows = reply.keyboard.as_ref().map(pack_rows).unwrap_or_default();
        let last = chunks.len() - 1;

        for (index, chunk) in chunks.into_iter().enumerate() {
            let is_last = index == last;
            let rows = if is_last { rows.clone() } else { Vec::new() };
            let file = if is_last { reply.file.clone() } else { None };

            dm.send_message(&self.http, |m| {
                if !chunk.is_empty() {
                    m.content(&chunk);
                }
                if !rows.is_empty() {
                    m.components(|c| {
                        for row in &rows {
                            c.create_action_row(|r| {
                                for button in row {
                                    r.create_button(|b| {
                                        b.custom_id(&button.action)
                                            .label(&button.label)
                                            .style(ButtonStyle::Secondary)
                                    });
                                }
                                r
                            });
                        }
                        c
                    });
                }
                if let Some(file) = file {
                    m.add_file(AttachmentType::Bytes {
                        data: Cow::Owned(file.bytes),
                        filename: file.file_name,
                    });
                }
                m
            })
            .await
            .with_context(|| format!("Failed to send DM to {owner}"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::items::{ContentPayload, Item, ItemId};
    use crate::message_components as ui;

    fn keyboard_with(rows: &[usize]) -> Keyboard {
        let mut keyboard = Keyboard::new();
        for (r, width) in rows.iter().enumerate() {
            keyboard = keyboard.row(
                (0..*width)
                    .map(|i| Button::new(format!("b{r}{i}"), format!("a_{r}_{i}")))
                    .collect(),
            );
        }
        keyboard
    }

    #[test]
    fn test_mime_mapping() {
        let photo = payload_for_attachment(Some("image/png"), "u".into(), "a.png".into(), None);
        assert_eq!(photo.photo.as_deref(), Some("u"));

        let voice = payload_for_attachment(Some("audio/ogg"), "u".into(), "v.ogg".into(), None);
        assert_eq!(voice.voice.as_deref(), Some("u"));

        let video = payload_for_attachment(Some("video/mp4"), "u".into(), "v.mp4".into(), None);
        assert_eq!(video.video.as_deref(), Some("u"));

        let doc = payload_for_attachment(
            Some("application/pdf"),
            "u".into(),
            "list.pdf".into(),
            Some("caption".into()),
        );
        let document = doc.document.unwrap();
        assert_eq!(document.file_name, "list.pdf");
        assert_eq!(doc.caption.as_deref(), Some("caption"));

        let unknown = payload_for_attachment(None, "u".into(), "blob".into(), None);
        assert!(unknown.document.is_some());
    }

    #[test]
    fn test_pack_rows_wraps_wide_rows() {
        let rows = pack_rows(&keyboard_with(&[7, 2]));
        let widths: Vec<usize> = rows.iter().map(Vec::len).collect();
        assert_eq!(widths, vec![5, 2, 2]);
    }

    #[test]
    fn test_pack_rows_caps_row_count() {
        let rows = pack_rows(&keyboard_with(&[1, 1, 1, 1, 1, 1, 1]));
        assert_eq!(rows.len(), MAX_ROWS);
    }

    fn packed_actions(reply: &Reply) -> Vec<String> {
        let keyboard = reply.keyboard.as_ref().unwrap();
        pack_rows(keyboard)
            .into_iter()
            .flatten()
            .map(|b| b.action)
            .collect()
    }

    fn items(count: i64) -> Vec<Item> {
        let now = chrono::Utc::now();
        (1..=count)
            .map(|id| Item {
                id: ItemId(id),
                owner: "u1".into(),
                category: "errands".into(),
                subject: format!("subject {id}"),
                payload: ContentPayload::text("x"),
                note: String::new(),
                pinned: false,
                reminder_at: None,
                created_at: now,
                updated_at: now,
            })
            .collect()
    }

    #[test]
    fn test_list_keyboards_survive_packing() {
        assert_eq!(ui::ROW_WIDTH, MAX_BUTTONS_PER_ROW);

        let category = ui::category_items("errands", &items(8), 0);
        let packed = packed_actions(&category);
        assert_eq!(packed, category.actions());
        assert_eq!(packed.len(), 9);
        assert!(packed.contains(&"show_8".to_string()));
        assert!(packed.contains(&"menu_main".to_string()));

        let names: Vec<String> = (1..=6).map(|n| format!("cat{n}")).collect();
        let selection = ui::category_selection(&names, 0);
        let packed = packed_actions(&selection);
        assert!(packed.contains(&"cat_cat6".to_string()));
        assert!(packed.contains(&"newcat".to_string()));

        let search = ui::search_results("subject", &items(12));
        let shown = packed_actions(&search)
            .iter()
            .filter(|a| a.starts_with("show_"))
            .count();
        assert_eq!(shown, ui::SEARCH_BUTTONS);
    }

    #[test]
    fn test_full_pages_fit_the_grid() {
        let category = ui::category_items("errands", &items(60), 1);
        let rows = pack_rows(category.keyboard.as_ref().unwrap());
        assert!(rows.len() <= MAX_ROWS);
        assert_eq!(
            rows.iter().flatten().count(),
            category.actions().len(),
            "no button may be dropped"
        );

        let overview: Vec<(String, i64)> = (1..=50).map(|n| (format!("c{n}"), 1)).collect();
        let list = ui::category_list(&overview, 1);
        assert_eq!(packed_actions(&list), list.actions());
    }

    #[test]
    fn test_pack_rows_counts_custom_id_in_characters() {
        let id = format!("cat_{}", "é".repeat(64));
        assert!(id.len() > MAX_CUSTOM_ID);
        let rows = pack_rows(&Keyboard::new().button("é", id.clone()));
        assert_eq!(rows[0][0].action, id);
    }

    #[test]
    fn test_pack_rows_truncates_labels_and_drops_long_ids() {
        let keyboard = Keyboard::new()
            .button("x".repeat(120), "ok")
            .button("long", "y".repeat(150));
        let rows = pack_rows(&keyboard);
        assert_eq!(rows.len(), 1);
        assert!(rows[0][0].label.chars().count() <= 80);
    }
}
