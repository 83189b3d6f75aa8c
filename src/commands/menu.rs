//! Main menu entries
//!
//! Reachable as typed commands (`/add`) and as `menu_<entry>` buttons. Every entry
//! abandons whatever flow the user was in.

/// A main menu entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    /// Welcome screen; restarts the conversation
    Start,
    /// Restart without the welcome text
    Cancel,
    /// Show the menu
    Main,
    Add,
    Search,
    Browse,
    Settings,
}

impl MenuCommand {
    /// Parse a typed command such as `/add`
    pub fn parse_text(text: &str) -> Option<Self> {
        let command = text.trim().strip_prefix('/')?;
        // Ignore arguments and a trailing @mention
        let command = command.split_whitespace().next()?;
        let command = command.split('@').next()?.to_ascii_lowercase();
        match command.as_str() {
            "start" => Some(MenuCommand::Start),
            "cancel" => Some(MenuCommand::Cancel),
            "menu" => Some(MenuCommand::Main),
            "add" => Some(MenuCommand::Add),
            "search" => Some(MenuCommand::Search),
            "browse" => Some(MenuCommand::Browse),
            "settings" => Some(MenuCommand::Settings),
            _ => None,
        }
    }

    /// Parse the argument of a `menu_<entry>` button
    pub fn from_entry(entry: &str) -> Option<Self> {
        match entry {
            "main" => Some(MenuCommand::Main),
            "cancel" => Some(MenuCommand::Cancel),
            "add" => Some(MenuCommand::Add),
            "search" => Some(MenuCommand::Search),
            "browse" => Some(MenuCommand::Browse),
            "settings" => Some(MenuCommand::Settings),
            _ => None,
        }
    }
}

impl std::fmt::Display for MenuCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MenuCommand::Start => "start",
            MenuCommand::Cancel => "cancel",
            MenuCommand::Main => "menu",
            MenuCommand::Add => "add",
            MenuCommand::Search => "search",
            MenuCommand::Browse => "browse",
            MenuCommand::Settings => "settings",
        };
        write!(f, "/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_commands() {
        assert_eq!(MenuCommand::parse_text("/start"), Some(MenuCommand::Start));
        assert_eq!(MenuCommand::parse_text(" /ADD "), Some(MenuCommand::Add));
        assert_eq!(
            MenuCommand::parse_text("/search@stashbot"),
            Some(MenuCommand::Search)
        );
        assert_eq!(MenuCommand::parse_text("/cancel now"), Some(MenuCommand::Cancel));
        assert_eq!(MenuCommand::parse_text("start"), None);
        assert_eq!(MenuCommand::parse_text("/unknown"), None);
        assert_eq!(MenuCommand::parse_text("/"), None);
    }

    #[test]
    fn test_entries() {
        assert_eq!(MenuCommand::from_entry("browse"), Some(MenuCommand::Browse));
        assert_eq!(MenuCommand::from_entry("start"), None);
        assert_eq!(MenuCommand::Settings.to_string(), "/settings");
    }
}
