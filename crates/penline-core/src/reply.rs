//! Assistant replies with inline `[OPEN_PROJECT:<id>]` tags.
//!
//! The display text and the referenced project ids are separated once, up
//! front, so the view never has to look at tag syntax.

use serde::{Deserialize, Serialize};

const TAG_OPEN: &str = "[OPEN_PROJECT:";
const TAG_CLOSE: char = ']';

/// Characters allowed in a project id: ASCII letters, digits and `_`.
pub fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReply {
    pub text: String,
    /// Unique ids in order of first mention.
    pub referenced_ids: Vec<String>,
}

impl ParsedReply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            referenced_ids: Vec::new(),
        }
    }
}

/// Splits `input` into display text and referenced project ids.
///
/// Anything that looks like the start of a tag but is not a complete
/// `[OPEN_PROJECT:<word chars>]` stays in the text unchanged.
pub fn parse_reply(input: &str) -> ParsedReply {
    let mut text = String::with_capacity(input.len());
    let mut referenced_ids: Vec<String> = Vec::new();
    let mut rest = input;

    while let Some(start) = rest.find(TAG_OPEN) {
        text.push_str(&rest[..start]);
        let after = &rest[start + TAG_OPEN.len()..];
        let id_len = after.find(|c: char| !is_id_char(c)).unwrap_or(after.len());

        if id_len > 0 && after[id_len..].starts_with(TAG_CLOSE) {
            let id = &after[..id_len];
            if !referenced_ids.iter().any(|seen| seen == id) {
                referenced_ids.push(id.to_string());
            }
            rest = &after[id_len + TAG_CLOSE.len_utf8()..];
            // "a [TAG] b" reads as "a b", not "a  b"
            if text.ends_with(' ') && rest.starts_with(' ') {
                rest = &rest[1..];
            }
        } else {
            text.push('[');
            rest = &rest[start + 1..];
        }
    }
    text.push_str(rest);

    ParsedReply {
        text: text.trim().to_string(),
        referenced_ids,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Only assistant messages carry tags; user text is shown verbatim.
    pub fn parsed(&self) -> ParsedReply {
        match self.role {
            Role::Assistant => parse_reply(&self.content),
            Role::User => ParsedReply::plain(self.content.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_trailing_tag() {
        let reply = parse_reply("The STRUCTURA study is quite experimental! [OPEN_PROJECT:4]");
        assert_eq!(reply.text, "The STRUCTURA study is quite experimental!");
        assert_eq!(reply.referenced_ids, vec!["4"]);
    }

    #[test]
    fn extracts_inline_tags_in_order_without_duplicates() {
        let reply = parse_reply("Compare [OPEN_PROJECT:2] with [OPEN_PROJECT:1] and [OPEN_PROJECT:2] again");
        assert_eq!(reply.text, "Compare with and again");
        assert_eq!(reply.referenced_ids, vec!["2", "1"]);
    }

    #[test]
    fn malformed_tags_stay_literal() {
        for input in [
            "[OPEN_PROJECT:]",
            "[OPEN_PROJECT:a-b]",
            "[OPEN_PROJECT:4",
            "[open_project:4]",
        ] {
            let reply = parse_reply(input);
            assert_eq!(reply.text, input, "input {input:?}");
            assert!(reply.referenced_ids.is_empty());
        }
    }

    #[test]
    fn tag_after_stray_bracket() {
        let reply = parse_reply("[[OPEN_PROJECT:brand_01]]");
        assert_eq!(reply.text, "[]");
        assert_eq!(reply.referenced_ids, vec!["brand_01"]);
    }

    #[test]
    fn handles_non_ascii_text() {
        let reply = parse_reply("Café ✨ [OPEN_PROJECT:3] voilà");
        assert_eq!(reply.text, "Café ✨ voilà");
        assert_eq!(reply.referenced_ids, vec!["3"]);
    }

    #[test]
    fn user_messages_are_not_parsed() {
        let message = ChatMessage::user("open [OPEN_PROJECT:1] please");
        assert_eq!(message.parsed().text, "open [OPEN_PROJECT:1] please");
        assert!(message.parsed().referenced_ids.is_empty());
        assert_eq!(ChatMessage::assistant("[OPEN_PROJECT:1]").parsed().referenced_ids, vec!["1"]);
    }
}
