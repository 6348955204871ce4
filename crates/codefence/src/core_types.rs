//! Core type definitions for the extraction and execution contract
//!
//! This module defines the fundamental data structures exchanged between the
//! extractor, the executors, and the calling agent framework. The design
//! prioritizes compatibility with multimodal message formats while keeping the
//! execution-facing types minimal: a code block is just source text plus a
//! language tag, and a result is just an exit code plus combined output.

use serde::{Deserialize, Serialize};

/// A single fenced code snippet recovered from a message.
///
/// `code` is the fenced body exactly as written, including its trailing
/// newline. `language` is the tag declared on the opening fence, unchanged,
/// or the inferred language when no tag was declared, or an empty string when
/// inference fails. It is never the literal sentinel `"unknown"`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub code: String,
    pub language: String,
}

/// The outcome of executing one batch of code blocks.
///
/// `exit_code` is `0` only if every block in the batch succeeded. `output` is
/// the concatenation, in execution order, of each executed block's output,
/// including the output of the failing block when one exists. Blocks after a
/// failure are never executed and contribute nothing.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CodeResult {
    pub exit_code: i32,
    pub output: String,
}

impl CodeResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// One part of a structured multimodal message.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    Image { url: String },
}

/// Message content as produced by an assistant: either a plain string or an
/// ordered sequence of heterogeneous parts. Absent content is represented by
/// the caller passing `None` to the extractor.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Reduces the content to a single string by concatenating textual parts
    /// in original order. Non-textual parts are discarded without error.
    pub fn as_text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::Image { .. } => None,
                })
                .collect(),
        }
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        MessageContent::Text(text)
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        MessageContent::Text(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_text_plain_string() {
        let content = MessageContent::from("hello world");
        assert_eq!(content.as_text(), "hello world");
    }

    #[test]
    fn test_as_text_skips_non_text_parts() {
        let content = MessageContent::Parts(vec![
            ContentPart::Text {
                text: "before ".to_string(),
            },
            ContentPart::Image {
                url: "https://example.com/plot.png".to_string(),
            },
            ContentPart::Text {
                text: "after".to_string(),
            },
        ]);
        assert_eq!(content.as_text(), "before after");
    }

    #[test]
    fn test_message_content_deserializes_untagged() {
        let plain: MessageContent = serde_json::from_str("\"just text\"").unwrap();
        assert_eq!(plain, MessageContent::Text("just text".to_string()));

        let parts: MessageContent = serde_json::from_str(
            r#"[{"type": "text", "text": "a"}, {"type": "image", "url": "u"}]"#,
        )
        .unwrap();
        assert_eq!(parts.as_text(), "a");
    }

    #[test]
    fn test_code_result_success() {
        let ok = CodeResult {
            exit_code: 0,
            output: String::new(),
        };
        let failed = CodeResult {
            exit_code: 1,
            output: "boom".to_string(),
        };
        assert!(ok.success());
        assert!(!failed.success());
    }
}
