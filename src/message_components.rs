//! # Message Components
//!
//! Builders for every reply and keyboard the bot shows. Callback tokens come from
//! [`crate::commands::action`] so the dispatcher and the buttons agree on the format.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Transport-neutral `Reply`/`Keyboard` builders
//! - 1.0.0: Initial button handlers

use chrono::{DateTime, NaiveDate, Utc};

use crate::commands::action::{self, item_token, token};
use crate::core::{truncate_chars, Button, Keyboard, Reply};
use crate::features::conversation::PendingDraft;
use crate::features::items::{Item, ItemId, ItemStats};
use crate::features::reminders::{format_duration, ReminderBounds, QUICK_REMINDER_HOURS};
use crate::features::subscriptions::Subscription;

/// Search replies list at most this many items as buttons
pub const SEARCH_BUTTONS: usize = 10;

/// Buttons per keyboard row; Discord renders at most five
pub const ROW_WIDTH: usize = 5;

/// Entries per list page: four full rows, the fifth is navigation
pub const PAGE_SIZE: usize = 4 * ROW_WIDTH;

/// Name of the JSON file produced by the data export
pub const EXPORT_FILE_NAME: &str = "stashbot-export.json";

const PREVIEW_CHARS: usize = 300;

fn menu_token(entry: &str) -> String {
    token(action::MENU, &[entry])
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn item_label(item: &Item) -> String {
    let pin = if item.pinned { "📌 " } else { "" };
    format!("{pin}{} {}", item.content_type().icon(), item.subject)
}

fn back_to_menu() -> Button {
    Button::new("🏠 Menu", menu_token("main"))
}

/// One page of a list
struct Page {
    index: usize,
    count: usize,
    start: usize,
    end: usize,
}

impl Page {
    /// Clamp `requested` to the pages that exist for `total` entries
    fn of(total: usize, requested: usize) -> Self {
        let count = total.div_ceil(PAGE_SIZE).max(1);
        let index = requested.min(count - 1);
        let start = index * PAGE_SIZE;
        Self {
            index,
            count,
            start,
            end: (start + PAGE_SIZE).min(total),
        }
    }

    fn suffix(&self) -> String {
        if self.count > 1 {
            format!(" (page {} of {})", self.index + 1, self.count)
        } else {
            String::new()
        }
    }

    /// Previous and next buttons around `middle`
    fn nav_row(&self, middle: Button, page_token: impl Fn(usize) -> String) -> Vec<Button> {
        let mut row = Vec::with_capacity(3);
        if self.index > 0 {
            row.push(Button::new("◀️ Previous", page_token(self.index - 1)));
        }
        row.push(middle);
        if self.index + 1 < self.count {
            row.push(Button::new("Next ▶️", page_token(self.index + 1)));
        }
        row
    }
}

fn category_token(category: &str, page: usize) -> String {
    token(action::SHOW_CATEGORY, &[category, page.to_string().as_str()])
}

// Menu

pub fn main_menu() -> Keyboard {
    Keyboard::new()
        .row(vec![
            Button::new("➕ Add content", menu_token("add")),
            Button::new("🔍 Search", menu_token("search")),
        ])
        .row(vec![
            Button::new("📂 Browse categories", menu_token("browse")),
            Button::new("⚙️ Settings", menu_token("settings")),
        ])
}

pub fn welcome() -> Reply {
    Reply::text(
        "👋 Hi! I keep things for you: notes, photos, documents, voice messages and videos.\n\
         Save something, tag it with a category and a subject, and I'll remind you about it when you ask.",
    )
    .with_keyboard(main_menu())
}

pub fn menu_reply() -> Reply {
    Reply::text("What would you like to do?").with_keyboard(main_menu())
}

pub fn cancelled() -> Reply {
    Reply::text("Cancelled. Nothing in progress anymore.").with_keyboard(main_menu())
}

// Draft flow

pub fn ask_for_content() -> Reply {
    Reply::text("Send me what you want to save: text, a photo, a document, a voice message or a video.")
}

pub fn unsupported_content() -> Reply {
    Reply::text(
        "I can't save that kind of message. Send text, a photo, a document, a voice message or a video.",
    )
}

/// Existing categories as buttons plus a "new category" option, one page at a time
pub fn category_selection(categories: &[String], page: usize) -> Reply {
    let page = Page::of(categories.len(), page);
    let buttons = categories[page.start..page.end]
        .iter()
        .map(|category| {
            Button::new(
                format!("📁 {category}"),
                token(action::SELECT_CATEGORY, &[category.as_str()]),
            )
        })
        .collect();
    let nav = page.nav_row(
        Button::new("➕ New category", action::NEW_CATEGORY),
        |p| token(action::CATEGORY_PAGE, &[p.to_string().as_str()]),
    );

    let text = if categories.is_empty() {
        "Got it. You have no categories yet, create one:".to_string()
    } else {
        format!("Got it. Pick a category or create a new one{}:", page.suffix())
    };
    Reply::text(text).with_keyboard(Keyboard::new().grid(buttons, ROW_WIDTH).row(nav))
}

pub fn ask_new_category() -> Reply {
    Reply::text("Type the name of the new category:")
}

pub fn ask_subject(category: &str) -> Reply {
    Reply::text(format!("Category: {category}\nNow type a subject for this item:"))
}

pub fn draft_confirmation(draft: &PendingDraft) -> Reply {
    let category = draft.category.as_deref().unwrap_or("-");
    let subject = draft.subject.as_deref().unwrap_or("-");
    let preview = truncate_chars(draft.payload.preview(), PREVIEW_CHARS);

    let mut text = format!(
        "Ready to save:\n{} {}\n📁 {}\n🏷️ {}",
        draft.payload.content_type().icon(),
        draft.payload.content_type(),
        category,
        subject
    );
    if !preview.is_empty() {
        text.push_str(&format!("\n\n{preview}"));
    }

    Reply::text(text).with_keyboard(Keyboard::new().row(vec![
        Button::new("✅ Save", action::CONFIRM_SAVE),
        Button::new("✖️ Cancel", menu_token("cancel")),
    ]))
}

pub fn no_pending_draft() -> Reply {
    Reply::text("There is nothing waiting to be saved. Start again with Add content.")
        .with_keyboard(main_menu())
}

// Items

/// Action menu for an item, reflecting its current pin and note state
pub fn item_actions(item: &Item) -> Keyboard {
    let id = item.id;
    let pin_label = if item.pinned { "📍 Unpin" } else { "📌 Pin" };
    let note_label = if item.note().is_some() {
        "📝 Edit note"
    } else {
        "📝 Add note"
    };

    Keyboard::new()
        .row(vec![
            Button::new(pin_label, item_token(action::PIN, id)),
            Button::new("⏰ Remind", item_token(action::REMIND, id)),
        ])
        .row(vec![
            Button::new("✏️ Edit", item_token(action::EDIT, id)),
            Button::new(note_label, item_token(action::NOTE, id)),
        ])
        .row(vec![
            Button::new("🗑️ Delete", item_token(action::DELETE, id)),
            back_to_menu(),
        ])
}

pub fn item_card(item: &Item) -> Reply {
    let mut text = format!(
        "{} {}\n📁 {}\n",
        item.content_type().icon(),
        item.subject,
        item.category
    );
    if item.pinned {
        text.push_str("📌 Pinned\n");
    }
    if let Some(note) = item.note() {
        text.push_str(&format!("📝 {note}\n"));
    }
    text.push_str(&format!("🕒 Saved {}\n", timestamp(item.created_at)));
    if let Some(at) = item.reminder_at {
        text.push_str(&format!("⏰ Reminder {}\n", timestamp(at)));
    }

    let preview = item.payload.preview();
    if !preview.is_empty() {
        text.push('\n');
        text.push_str(preview);
    }

    Reply::text(text).with_keyboard(item_actions(item))
}

pub fn item_saved(item: &Item) -> Vec<Reply> {
    vec![Reply::text("✅ Saved!"), item_card(item)]
}

pub fn item_not_found() -> Reply {
    Reply::text("That item no longer exists.").with_keyboard(main_menu())
}

pub fn ask_edit(item: &Item) -> Reply {
    Reply::text(format!(
        "Send the new content for \"{}\". It replaces the current content.",
        item.subject
    ))
}

pub fn ask_note(item: &Item) -> Reply {
    let text = match item.note() {
        Some(note) => format!("Current note: {note}\nType the new note:"),
        None => "Type a note for this item:".to_string(),
    };
    Reply::text(text)
}

// Reminders

pub fn reminder_menu(item_id: ItemId) -> Reply {
    let id = item_id.to_string();
    let quick: Vec<Button> = QUICK_REMINDER_HOURS
        .iter()
        .map(|hours| {
            Button::new(
                format!("{hours}h"),
                token(action::SET_REMINDER, &[id.as_str(), hours.to_string().as_str()]),
            )
        })
        .collect();

    let keyboard = Keyboard::new()
        .row(quick)
        .row(vec![
            Button::new("✍️ Custom", item_token(action::CUSTOM_REMINDER, item_id)),
            Button::new("⬅️ Back", item_token(action::BACK, item_id)),
        ]);
    Reply::text("When should I remind you?").with_keyboard(keyboard)
}

pub fn ask_custom_hours(bounds: &ReminderBounds) -> Reply {
    Reply::text(format!(
        "In how many hours? Send a number between {} and {}.",
        bounds.min_hours, bounds.max_hours
    ))
}

pub fn reminder_set(at: DateTime<Utc>, now: DateTime<Utc>) -> Reply {
    Reply::text(format!(
        "⏰ Reminder set for {} (in {}).",
        timestamp(at),
        format_duration((at - now).num_seconds())
    ))
}

pub fn reminder_notification(item: &Item) -> Reply {
    let mut text = format!(
        "🔔 Reminder!\n\n{} {}\n📁 {}",
        item.content_type().icon(),
        item.subject,
        item.category
    );
    if let Some(note) = item.note() {
        text.push_str(&format!("\n📝 {note}"));
    }
    let preview = truncate_chars(item.payload.preview(), PREVIEW_CHARS);
    if !preview.is_empty() {
        text.push_str(&format!("\n\n{preview}"));
    }

    Reply::text(text).with_keyboard(
        Keyboard::new().button("📂 Open", item_token(action::SHOW_ITEM, item.id)),
    )
}

// Deletion

pub fn delete_menu(item: &Item) -> Reply {
    let mut row = vec![Button::new(
        "🗑️ Delete item",
        item_token(action::DELETE_CONTENT, item.id),
    )];
    if item.note().is_some() {
        row.push(Button::new(
            "📝 Delete note only",
            item_token(action::DELETE_NOTE, item.id),
        ));
    }

    Reply::text(format!("Delete \"{}\"?", item.subject)).with_keyboard(
        Keyboard::new()
            .row(row)
            .button("⬅️ Back", item_token(action::BACK, item.id)),
    )
}

pub fn item_deleted() -> Reply {
    Reply::text("🗑️ Item deleted.").with_keyboard(main_menu())
}

// Browsing and search

pub fn category_list(categories: &[(String, i64)], page: usize) -> Reply {
    if categories.is_empty() {
        return Reply::text("You haven't saved anything yet.").with_keyboard(main_menu());
    }

    let page = Page::of(categories.len(), page);
    let buttons = categories[page.start..page.end]
        .iter()
        .map(|(category, count)| {
            Button::new(format!("📁 {category} ({count})"), category_token(category, 0))
        })
        .collect();
    let nav = page.nav_row(back_to_menu(), |p| {
        token(action::LIST_CATEGORIES, &[p.to_string().as_str()])
    });

    Reply::text(format!("Your categories{}:", page.suffix()))
        .with_keyboard(Keyboard::new().grid(buttons, ROW_WIDTH).row(nav))
}

pub fn category_items(category: &str, items: &[Item], page: usize) -> Reply {
    if items.is_empty() {
        return Reply::text(format!("Category \"{category}\" is empty.")).with_keyboard(main_menu());
    }

    let page = Page::of(items.len(), page);
    let buttons = items[page.start..page.end]
        .iter()
        .map(|item| Button::new(item_label(item), item_token(action::SHOW_ITEM, item.id)))
        .collect();
    let nav = page.nav_row(back_to_menu(), |p| category_token(category, p));

    Reply::text(format!(
        "📁 {category} ({} items){}",
        items.len(),
        page.suffix()
    ))
    .with_keyboard(Keyboard::new().grid(buttons, ROW_WIDTH).row(nav))
}

pub fn ask_search_query() -> Reply {
    Reply::text("What are you looking for?")
}

pub fn search_results(query: &str, items: &[Item]) -> Reply {
    if items.is_empty() {
        return Reply::text(format!("Nothing matches \"{query}\".")).with_keyboard(main_menu());
    }

    let mut text = format!("Found {} item(s) for \"{query}\"", items.len());
    if items.len() > SEARCH_BUTTONS {
        text.push_str(&format!(", showing the first {SEARCH_BUTTONS}"));
    }
    text.push(':');

    let buttons = items
        .iter()
        .take(SEARCH_BUTTONS)
        .map(|item| {
            Button::new(
                format!("{} · {}", item_label(item), item.category),
                item_token(action::SHOW_ITEM, item.id),
            )
        })
        .collect();
    Reply::text(text).with_keyboard(
        Keyboard::new()
            .grid(buttons, ROW_WIDTH)
            .row(vec![back_to_menu()]),
    )
}

// Settings

pub fn settings_menu() -> Reply {
    Reply::text("⚙️ Settings").with_keyboard(
        Keyboard::new()
            .row(vec![
                Button::new("📊 Statistics", action::STATS),
                Button::new("📦 Export data", action::EXPORT),
            ])
            .row(vec![back_to_menu()]),
    )
}

pub fn stats_reply(stats: &ItemStats) -> Reply {
    Reply::text(format!(
        "📊 Statistics\n\
         Items: {}\n\
         Pinned: {}\n\
         Categories: {}\n\
         Active reminders: {}\n\
         With notes: {}",
        stats.total_items,
        stats.pinned_items,
        stats.total_categories,
        stats.active_reminders,
        stats.items_with_notes
    ))
    .with_keyboard(Keyboard::new().row(vec![back_to_menu()]))
}

/// JSON export of every item the owner has
pub fn export_reply(items: &[Item]) -> serde_json::Result<Reply> {
    if items.is_empty() {
        return Ok(Reply::text("Nothing to export yet.").with_keyboard(main_menu()));
    }
    let bytes = serde_json::to_vec_pretty(items)?;
    Ok(Reply::text(format!("📦 Exported {} item(s).", items.len()))
        .with_file(EXPORT_FILE_NAME, bytes))
}

pub fn generic_failure() -> Reply {
    Reply::text("Something went wrong on my side. Please try again in a moment.")
}

// Subscriptions

pub fn subscription_notice(sub: &Subscription, billing_date: NaiveDate, days_until: i64) -> Reply {
    let when = match days_until {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        n => format!("in {n} days"),
    };
    Reply::text(format!(
        "💳 {} bills {} ({}): {:.2} {}",
        sub.service_name,
        when,
        billing_date.format("%Y-%m-%d"),
        sub.cost,
        sub.currency
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::items::ContentPayload;

    fn item(id: i64) -> Item {
        let now = Utc::now();
        Item {
            id: ItemId(id),
            owner: "u1".into(),
            category: "errands".into(),
            subject: format!("subject {id}"),
            payload: ContentPayload::text("buy milk"),
            note: String::new(),
            pinned: false,
            reminder_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_main_menu_tokens() {
        assert_eq!(
            main_menu().actions(),
            vec!["menu_add", "menu_search", "menu_browse", "menu_settings"]
        );
    }

    #[test]
    fn test_item_actions_follow_pin_and_note_state() {
        let mut it = item(7);
        let kb = item_actions(&it);
        assert_eq!(kb.rows[0][0].label, "📌 Pin");
        assert_eq!(kb.rows[1][1].label, "📝 Add note");
        assert_eq!(
            kb.actions(),
            vec!["pin_7", "remind_7", "edit_7", "note_7", "delete_7", "menu_main"]
        );

        it.pinned = true;
        it.note = "call first".into();
        let kb = item_actions(&it);
        assert_eq!(kb.rows[0][0].label, "📍 Unpin");
        assert_eq!(kb.rows[1][1].label, "📝 Edit note");
    }

    #[test]
    fn test_reminder_menu_tokens() {
        assert_eq!(
            reminder_menu(ItemId(3)).actions(),
            vec!["setremind_3_1", "setremind_3_3", "setremind_3_24", "customremind_3", "back_3"]
        );
    }

    #[test]
    fn test_delete_menu_offers_note_only_when_present() {
        let mut it = item(4);
        assert_eq!(delete_menu(&it).actions(), vec!["delcontent_4", "back_4"]);
        it.note = "n".into();
        assert_eq!(
            delete_menu(&it).actions(),
            vec!["delcontent_4", "delnote_4", "back_4"]
        );
    }

    #[test]
    fn test_category_selection_has_new_option() {
        let reply = category_selection(&["home".to_string(), "to_do".to_string()], 0);
        assert_eq!(reply.actions(), vec!["cat_home", "cat_to_do", "newcat"]);
        assert_eq!(category_selection(&[], 0).actions(), vec!["newcat"]);
    }

    #[test]
    fn test_category_items_marks_pinned() {
        let mut pinned = item(1);
        pinned.pinned = true;
        let reply = category_items("errands", &[pinned, item(2)], 0);
        let keyboard = reply.keyboard.unwrap();
        assert!(keyboard.rows[0][0].label.starts_with("📌 "));
        assert!(!keyboard.rows[0][1].label.starts_with("📌"));
        assert_eq!(keyboard.rows[0][0].action, "show_1");
        assert_eq!(keyboard.rows[1], vec![back_to_menu()]);
    }

    #[test]
    fn test_search_results_cap_buttons() {
        let items: Vec<Item> = (1..=12).map(item).collect();
        let reply = search_results("milk", &items);
        assert!(reply.text.starts_with("Found 12 item(s)"));
        let shown = reply.actions().iter().filter(|a| a.starts_with("show_")).count();
        assert_eq!(shown, SEARCH_BUTTONS);
    }

    #[test]
    fn test_category_items_pages() {
        let items: Vec<Item> = (1..=45).map(item).collect();

        let first = category_items("to_do", &items, 0);
        assert!(first.text.ends_with("(page 1 of 3)"));
        let actions = first.actions();
        assert_eq!(actions.len(), PAGE_SIZE + 2);
        assert_eq!(actions[PAGE_SIZE..], ["menu_main", "showcat_to_do_1"]);

        let middle = category_items("to_do", &items, 1);
        let actions = middle.actions();
        assert_eq!(actions[0], "show_21");
        assert_eq!(
            actions[PAGE_SIZE..],
            ["showcat_to_do_0", "menu_main", "showcat_to_do_2"]
        );

        // Out-of-range pages clamp to the last one
        let last = category_items("to_do", &items, 9);
        let actions = last.actions();
        assert_eq!(actions[..5], ["show_41", "show_42", "show_43", "show_44", "show_45"]);
        assert_eq!(actions[5..], ["showcat_to_do_1", "menu_main"]);
    }

    #[test]
    fn test_category_selection_keeps_new_option_on_every_page() {
        let categories: Vec<String> = (1..=26).map(|n| format!("c{n}")).collect();
        let first = category_selection(&categories, 0);
        assert!(first.actions().ends_with(&["newcat", "catpage_1"]));
        let second = category_selection(&categories, 1);
        assert_eq!(
            second.actions(),
            vec!["cat_c21", "cat_c22", "cat_c23", "cat_c24", "cat_c25", "cat_c26", "catpage_0", "newcat"]
        );
    }

    #[test]
    fn test_category_list_pages() {
        let categories: Vec<(String, i64)> = (1..=21).map(|n| (format!("c{n}"), n)).collect();
        let reply = category_list(&categories, 0);
        assert_eq!(reply.actions()[0], "showcat_c1_0");
        assert!(reply.actions().ends_with(&["menu_main", "browse_1"]));
        assert_eq!(category_list(&categories, 1).actions(), vec!["showcat_c21_0", "browse_0", "menu_main"]);
    }

    #[test]
    fn test_item_card_shows_reminder_and_note() {
        let mut it = item(5);
        it.note = "aisle 3".into();
        it.reminder_at = Some(Utc::now());
        let card = item_card(&it);
        assert!(card.text.contains("📝 aisle 3"));
        assert!(card.text.contains("⏰ Reminder"));
        assert!(card.text.contains("buy milk"));
    }

    #[test]
    fn test_export_is_json_file() {
        let reply = export_reply(&[item(1), item(2)]).unwrap();
        let file = reply.file.unwrap();
        assert_eq!(file.file_name, EXPORT_FILE_NAME);
        let parsed: serde_json::Value = serde_json::from_slice(&file.bytes).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[0]["payload"]["type"], "text");
    }

    #[test]
    fn test_reminder_notification_links_item() {
        let reply = reminder_notification(&item(9));
        assert!(reply.text.starts_with("🔔 Reminder!"));
        assert_eq!(reply.actions(), vec!["show_9"]);
    }
}
