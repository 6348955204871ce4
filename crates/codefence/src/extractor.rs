//! Fenced code block extraction from assistant messages
//!
//! The extractor is the stateless half of the pipeline: it reduces message
//! content of any shape to text, scans for triple-backtick fenced regions, and
//! resolves a language for each one. It never fails; content with no fences,
//! empty content, and absent content all yield an empty list. Extraction is
//! pure and safe to call concurrently from any number of tasks.

use regex::Regex;

use crate::core_types::{CodeBlock, MessageContent};
use crate::language::{infer_language, LanguageInference};

/// The sentinel some inference strategies use for "could not determine".
/// Normalized to an empty string before it ever reaches a [`CodeBlock`].
pub const UNKNOWN: &str = "unknown";

/// Opening fence with an optional language tag glued to it (no space), a body
/// spanning any number of lines, and a matching closing fence. The body
/// capture keeps its trailing newline so the block round-trips verbatim.
const CODE_BLOCK_PATTERN: &str = r"(?s)```[ \t]*(\w+)?[ \t]*\r?\n(.*?\r?\n)[ \t]*```";

/// Extracts code blocks from a message. Implementations must be pure: no
/// side effects, deterministic for identical input, and an empty vec (never
/// an error) for content without fences.
pub trait CodeExtractor: Send + Sync {
    fn extract_code_blocks(&self, message: Option<&MessageContent>) -> Vec<CodeBlock>;
}

/// Extracts fenced code blocks using Markdown triple-backtick syntax.
pub struct MarkdownCodeExtractor {
    pattern: Regex,
    infer: LanguageInference,
}

impl MarkdownCodeExtractor {
    pub fn new() -> Self {
        Self {
            // The pattern is a compile-time constant; it always parses.
            pattern: Regex::new(CODE_BLOCK_PATTERN).unwrap(),
            infer: infer_language,
        }
    }

    /// Replaces the language-inference strategy used for untagged fences.
    pub fn with_inference(mut self, infer: LanguageInference) -> Self {
        self.infer = infer;
        self
    }
}

impl Default for MarkdownCodeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeExtractor for MarkdownCodeExtractor {
    fn extract_code_blocks(&self, message: Option<&MessageContent>) -> Vec<CodeBlock> {
        let text = match message {
            Some(content) => content.as_text(),
            None => return Vec::new(),
        };

        self.pattern
            .captures_iter(&text)
            .map(|caps| {
                let code = caps[2].to_string();
                let declared = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                let language = if declared.is_empty() {
                    match (self.infer)(&code) {
                        Some(lang) if lang != UNKNOWN => lang,
                        _ => String::new(),
                    }
                } else {
                    declared.to_string()
                };
                CodeBlock { code, language }
            })
            .collect()
    }
}
