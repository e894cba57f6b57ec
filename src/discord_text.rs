use crate::config::DISCORD_MESSAGE_LIMIT;

pub fn strip_bot_mentions(input: &str, bot_id: u64) -> String {
    let mention = format!("<@{}>", bot_id);
    let mention_nick = format!("<@!{}>", bot_id);

    input
        .replace(&mention, "")
        .replace(&mention_nick, "")
        .trim()
        .to_string()
}

/// Split long responses into Discord-sized chunks, preferring newline
/// boundaries so code blocks and lists stay readable.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        if rest.len() <= max_len {
            chunks.push(rest.to_string());
            break;
        }

        let boundary = floor_char_boundary(rest, max_len);
        let split_pos = match rest[..boundary].rfind('\n') {
            Some(pos) if pos > 0 => pos,
            _ => boundary,
        };

        chunks.push(rest[..split_pos].to_string());
        rest = rest[split_pos..].trim_start_matches('\n');
    }

    chunks
}

pub fn split_for_discord(text: &str) -> Vec<String> {
    split_message(text, DISCORD_MESSAGE_LIMIT)
}

/// Shorten a reminder message for list display.
pub fn truncate_snippet(message: &str, max_chars: usize) -> String {
    let mut snippet: String = message.chars().take(max_chars).collect();
    if message.chars().count() > max_chars {
        snippet.push_str("...");
    }
    snippet
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_both_mention_forms() {
        assert_eq!(strip_bot_mentions("<@42> hello", 42), "hello");
        assert_eq!(strip_bot_mentions("<@!42> hello", 42), "hello");
        assert_eq!(strip_bot_mentions("hello <@42>", 42), "hello");
        assert_eq!(strip_bot_mentions("<@42>", 42), "");
    }

    #[test]
    fn short_messages_are_untouched() {
        assert_eq!(split_message("hello", 100), vec!["hello"]);
    }

    #[test]
    fn splits_prefer_newlines() {
        let text = "line one\nline two\nline three";
        let chunks = split_message(text, 12);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= 12, "chunk too long: {chunk:?}");
        }
        assert_eq!(chunks.join("\n"), text);
    }

    #[test]
    fn splits_hard_when_no_newline_available() {
        let text = "a".repeat(25);
        let chunks = split_message(&text, 10);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn split_respects_char_boundaries() {
        let text = "é".repeat(30);
        for chunk in split_message(&text, 7) {
            assert!(chunk.len() <= 7);
            assert!(!chunk.is_empty());
        }
    }

    #[test]
    fn snippets_get_ellipsis() {
        assert_eq!(truncate_snippet("short", 10), "short");
        assert_eq!(truncate_snippet("a longer message", 8), "a longer...");
    }
}
