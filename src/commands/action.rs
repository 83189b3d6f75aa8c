//! Callback payloads
//!
//! Buttons carry tokens of the form `action[_itemId[_extra...]]`. The action name never
//! contains the delimiter; everything after the first delimiter is the action's argument.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: Page numbers on list tokens (`showcat_<name>_<page>`, `browse_<page>`, `catpage_<page>`)
//! - 1.1.0: Category actions keep the raw remainder so names may contain `_`
//! - 1.0.0: Initial token format

use crate::features::items::ItemId;

pub const DELIMITER: char = '_';

// Draft flow
pub const CONFIRM: &str = "confirm";
pub const CONFIRM_SAVE: &str = "confirm_save";
pub const NEW_CATEGORY: &str = "newcat";
pub const SELECT_CATEGORY: &str = "cat";
pub const CATEGORY_PAGE: &str = "catpage";

// Browsing
pub const SHOW_CATEGORY: &str = "showcat";
pub const LIST_CATEGORIES: &str = "browse";
pub const SHOW_ITEM: &str = "show";
pub const BACK: &str = "back";

// Item actions
pub const PIN: &str = "pin";
pub const EDIT: &str = "edit";
pub const NOTE: &str = "note";

// Reminders
pub const REMIND: &str = "remind";
pub const SET_REMINDER: &str = "setremind";
pub const CUSTOM_REMINDER: &str = "customremind";

// Deletion
pub const DELETE: &str = "delete";
pub const DELETE_CONTENT: &str = "delcontent";
pub const DELETE_NOTE: &str = "delnote";

// Settings and menu
pub const STATS: &str = "stats";
pub const EXPORT: &str = "export";
pub const MENU: &str = "menu";

/// Build a token from an action and its arguments
pub fn token(action: &str, args: &[&str]) -> String {
    let mut out = action.to_string();
    for arg in args {
        out.push(DELIMITER);
        out.push_str(arg);
    }
    out
}

/// Token for an item-scoped action
pub fn item_token(action: &str, item_id: ItemId) -> String {
    token(action, &[&item_id.to_string()])
}

/// A parsed button payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackData {
    /// Action name (text before the first delimiter)
    pub action: String,
    /// Everything after the first delimiter, verbatim
    pub rest: String,
}

impl CallbackData {
    /// Split a raw token; `None` for an empty or action-less token
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (action, rest) = match raw.split_once(DELIMITER) {
            Some((action, rest)) => (action, rest),
            None => (raw, ""),
        };
        if action.is_empty() {
            return None;
        }
        Some(Self {
            action: action.to_string(),
            rest: rest.to_string(),
        })
    }

    /// Remaining delimiter-separated segments
    pub fn segments(&self) -> Vec<&str> {
        if self.rest.is_empty() {
            Vec::new()
        } else {
            self.rest.split(DELIMITER).collect()
        }
    }

    /// Whether this payload is exactly `token`
    pub fn is_token(&self, token: &str) -> bool {
        Self::parse(token).as_ref() == Some(self)
    }

    /// Remainder split into its text and a trailing page number
    ///
    /// List tokens always end in a page, so `showcat_to_do_2` is page 2 of `to_do`.
    /// A remainder without a numeric tail is page 0.
    pub fn paged_rest(&self) -> (&str, usize) {
        match self.rest.rsplit_once(DELIMITER) {
            Some((head, page)) => match page.parse() {
                Ok(page) => (head, page),
                Err(_) => (self.rest.as_str(), 0),
            },
            None => match self.rest.parse() {
                Ok(page) => ("", page),
                Err(_) => (self.rest.as_str(), 0),
            },
        }
    }

    /// First segment as an item id
    pub fn item_id(&self) -> Option<ItemId> {
        self.segments().first().and_then(|s| s.parse().ok())
    }

    /// Segment after the item id
    pub fn extra(&self, index: usize) -> Option<&str> {
        self.segments().get(index + 1).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item_action() {
        let data = CallbackData::parse("pin_12").unwrap();
        assert_eq!(data.action, "pin");
        assert_eq!(data.item_id(), Some(ItemId(12)));
        assert_eq!(data.extra(0), None);
    }

    #[test]
    fn test_parse_with_extra() {
        let data = CallbackData::parse("setremind_5_24").unwrap();
        assert_eq!(data.action, SET_REMINDER);
        assert_eq!(data.item_id(), Some(ItemId(5)));
        assert_eq!(data.extra(0), Some("24"));
    }

    #[test]
    fn test_category_name_keeps_delimiters() {
        let data = CallbackData::parse("cat_to_do_list").unwrap();
        assert_eq!(data.action, SELECT_CATEGORY);
        assert_eq!(data.rest, "to_do_list");
        assert_eq!(data.item_id(), None);
    }

    #[test]
    fn test_paged_rest() {
        let data = CallbackData::parse("showcat_to_do_2").unwrap();
        assert_eq!(data.paged_rest(), ("to_do", 2));

        let data = CallbackData::parse("showcat_list_2_0").unwrap();
        assert_eq!(data.paged_rest(), ("list_2", 0));

        let data = CallbackData::parse("showcat_errands").unwrap();
        assert_eq!(data.paged_rest(), ("errands", 0));

        let data = CallbackData::parse("browse_3").unwrap();
        assert_eq!(data.paged_rest(), ("", 3));
        assert_eq!(CallbackData::parse("browse").unwrap().paged_rest(), ("", 0));
    }

    #[test]
    fn test_bare_action() {
        let data = CallbackData::parse("stats").unwrap();
        assert_eq!(data.action, STATS);
        assert!(data.rest.is_empty());
        assert!(data.segments().is_empty());
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(CallbackData::parse("").is_none());
        assert!(CallbackData::parse("_12").is_none());
    }

    #[test]
    fn test_tokens_roundtrip_through_parse() {
        let raw = item_token(DELETE_NOTE, ItemId(9));
        assert_eq!(raw, "delnote_9");
        let data = CallbackData::parse(&raw).unwrap();
        assert_eq!(data.action, DELETE_NOTE);
        assert_eq!(data.item_id(), Some(ItemId(9)));

        assert_eq!(token(SET_REMINDER, &["3", "24"]), "setremind_3_24");
        assert_eq!(CONFIRM_SAVE, token(CONFIRM, &["save"]));
        assert!(CallbackData::parse("confirm_save").unwrap().is_token(CONFIRM_SAVE));
        assert!(!CallbackData::parse("confirm_other").unwrap().is_token(CONFIRM_SAVE));
    }
}
