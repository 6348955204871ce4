//! Fenced code extraction and execution contract for AI agent frameworks.
//!
//! This crate sits between a language-model-driven agent and an execution
//! backend. It turns free-form assistant messages into executable code
//! fragments and runs those fragments in a controlled environment, reporting
//! one structured result per batch back to the conversation.
//!
//! # Architecture Overview
//!
//! Two components, composed in sequence by the caller:
//!
//! - **Extraction**: [`MarkdownCodeExtractor`] is a stateless, pure function
//!   from message content to an ordered list of [`CodeBlock`] values. It never
//!   fails; content without fences yields an empty list.
//! - **Execution**: implementations of [`CodeExecutor`] run an ordered batch
//!   of blocks and return one [`CodeResult`]. Backend state (working
//!   directory artifacts, interpreter environment) persists across batches
//!   until `restart()` resets it. Blocks run strictly in order and a failing
//!   block short-circuits the rest of its batch.
//!
//! Two backends ship with the crate: [`LocalCommandExecutor`] (script files
//! run with `tokio::process`) and [`DockerCodeExecutor`] (one short-lived
//! container per block via bollard). Both pair with the Markdown extractor
//! and expose an [`AgentCapability`] that teaches an agent the fenced-block
//! convention.

pub mod capability;
pub mod core_types;
pub mod errors;
pub mod executors;
pub mod extractor;
pub mod language;

pub use capability::{AgentCapability, CodeBlockUsageCapability, InstructableAgent};
pub use core_types::{CodeBlock, CodeResult, ContentPart, MessageContent};
pub use errors::ExecutorError;
pub use executors::{CodeExecutor, DockerCodeExecutor, LocalCommandExecutor};
pub use extractor::{CodeExtractor, MarkdownCodeExtractor};
pub use language::{infer_language, LanguageInference};
