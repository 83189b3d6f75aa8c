//! Message length utilities
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Add truncate_label for button labels
//! - 1.0.0: Message chunking for long item bodies

/// Discord message content limit
pub const MESSAGE_LIMIT: usize = 2000;
/// Discord button label limit
pub const LABEL_LIMIT: usize = 80;

/// Split text into message-sized pieces, preferring line boundaries (UTF-8 safe)
pub fn chunk_text(text: &str, max_size: usize) -> Vec<String> {
    if text.len() <= max_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.split('\n') {
        let needed = if current.is_empty() { line.len() } else { line.len() + 1 };
        if current.len() + needed <= max_size {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }

        if line.len() <= max_size {
            current.push_str(line);
        } else {
            // Lines longer than a whole chunk are cut on char boundaries
            for ch in line.chars() {
                if current.len() + ch.len_utf8() > max_size {
                    chunks.push(std::mem::take(&mut current));
                }
                current.push(ch);
            }
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Chunk text for message content (2000 byte limit)
pub fn chunk_for_message(text: &str) -> Vec<String> {
    chunk_text(text, MESSAGE_LIMIT)
}

/// Shorten a button label, adding an ellipsis when it had to be cut
pub fn truncate_label(label: &str) -> String {
    truncate_chars(label, LABEL_LIMIT)
}

/// Truncate to at most `max_chars` characters including the trailing "..."
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}
