//! Execution contract for running extracted code in a controlled environment.
//!
//! An executor is the stateful half of the pipeline: it takes an ordered batch
//! of code blocks, runs them against a backend-specific environment (local
//! process, container), and returns one aggregated result. Backend state, such
//! as files written into the working directory, persists across batches until
//! [`CodeExecutor::restart`] resets it to a fresh baseline.
//!
//! Every backend must honor the same semantics so that implementations are
//! interchangeable: blocks run strictly in order, a failing block ends the
//! batch immediately, and ordinary execution failures are reported as a
//! nonzero exit code plus diagnostic output rather than as errors. Only
//! infrastructure faults (backend unreachable, temp dir creation failure)
//! escape as [`ExecutorError`].
//!
//! A single executor instance is not safe for concurrent use; callers must
//! serialize `execute_code_blocks` and `restart` on a given instance.
//! Independent instances share nothing and may run concurrently.

use async_trait::async_trait;

use crate::capability::AgentCapability;
use crate::core_types::{CodeBlock, CodeResult};
use crate::errors::ExecutorError;
use crate::extractor::CodeExtractor;

#[async_trait]
pub trait CodeExecutor: Send + Sync {
    /// The extractor this executor pairs with, so callers can extract without
    /// knowing which extractor implementation is in use.
    fn code_extractor(&self) -> &dyn CodeExtractor;

    /// A capability that, attached to an agent, describes how to format code
    /// so this executor can consume it.
    fn user_capability(&self) -> Box<dyn AgentCapability>;

    /// Executes the batch strictly in order and returns one aggregated result.
    ///
    /// Execution stops at the first block that fails; the result's `output`
    /// contains the output of every executed block, the failing one included,
    /// and its `exit_code` is zero only if the whole batch succeeded. An empty
    /// batch succeeds without touching the backend.
    async fn execute_code_blocks(
        &self,
        code_blocks: &[CodeBlock],
    ) -> Result<CodeResult, ExecutorError>;

    /// Resets all backend-held state to a fresh baseline, as if the executor
    /// had just been constructed. Safe to call at any time, including before
    /// any execution, and idempotent.
    async fn restart(&self) -> Result<(), ExecutorError>;
}

pub mod docker;
pub mod local;

pub use docker::DockerCodeExecutor;
pub use local::LocalCommandExecutor;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CodeBlockUsageCapability;
    use crate::extractor::MarkdownCodeExtractor;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Test double with scripted outcomes: a block whose code starts with
    /// "fail" exits nonzero, "set NAME" stores NAME in backend state, "get
    /// NAME" fails unless NAME was stored in a prior block. Counts every
    /// block it actually runs.
    struct ScriptedExecutor {
        extractor: MarkdownCodeExtractor,
        executed: AtomicUsize,
        state: Mutex<HashSet<String>>,
    }

    impl ScriptedExecutor {
        fn new() -> Self {
            Self {
                extractor: MarkdownCodeExtractor::new(),
                executed: AtomicUsize::new(0),
                state: Mutex::new(HashSet::new()),
            }
        }

        fn run_block(&self, block: &CodeBlock) -> (i32, String) {
            self.executed.fetch_add(1, Ordering::SeqCst);
            let code = block.code.trim();
            if let Some(name) = code.strip_prefix("set ") {
                self.state.lock().unwrap().insert(name.to_string());
                (0, format!("set {}\n", name))
            } else if let Some(name) = code.strip_prefix("get ") {
                if self.state.lock().unwrap().contains(name) {
                    (0, format!("{} is set\n", name))
                } else {
                    (1, format!("{} is not defined\n", name))
                }
            } else if code.starts_with("fail") {
                (1, format!("error: {}\n", code))
            } else {
                (0, format!("ok: {}\n", code))
            }
        }
    }

    #[async_trait]
    impl CodeExecutor for ScriptedExecutor {
        fn code_extractor(&self) -> &dyn CodeExtractor {
            &self.extractor
        }

        fn user_capability(&self) -> Box<dyn AgentCapability> {
            Box::new(CodeBlockUsageCapability::new(vec!["sh".to_string()]))
        }

        async fn execute_code_blocks(
            &self,
            code_blocks: &[CodeBlock],
        ) -> Result<CodeResult, ExecutorError> {
            let mut output = String::new();
            for block in code_blocks {
                let (exit_code, block_output) = self.run_block(block);
                output.push_str(&block_output);
                if exit_code != 0 {
                    return Ok(CodeResult { exit_code, output });
                }
            }
            Ok(CodeResult {
                exit_code: 0,
                output,
            })
        }

        async fn restart(&self) -> Result<(), ExecutorError> {
            self.state.lock().unwrap().clear();
            Ok(())
        }
    }

    fn batch(codes: &[&str]) -> Vec<CodeBlock> {
        codes
            .iter()
            .map(|code| CodeBlock {
                code: code.to_string(),
                language: "sh".to_string(),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_all_blocks_succeed() {
        let executor = ScriptedExecutor::new();
        let result = executor
            .execute_code_blocks(&batch(&["a", "b", "c"]))
            .await
            .unwrap();

        assert_eq!(result.exit_code, 0);
        assert_eq!(result.output, "ok: a\nok: b\nok: c\n");
        assert_eq!(executor.executed.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failing_block_short_circuits() {
        let executor = ScriptedExecutor::new();
        let result = executor
            .execute_code_blocks(&batch(&["a", "fail here", "never", "never"]))
            .await
            .unwrap();

        assert_ne!(result.exit_code, 0);
        // Outputs of blocks up to and including the failure, nothing after.
        assert_eq!(result.output, "ok: a\nerror: fail here\n");
        assert_eq!(executor.executed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_batch_succeeds_without_execution() {
        let executor = ScriptedExecutor::new();
        let result = executor.execute_code_blocks(&[]).await.unwrap();

        assert_eq!(result.exit_code, 0);
        assert_eq!(result.output, "");
        assert_eq!(executor.executed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_state_shared_across_batches_until_restart() {
        let executor = ScriptedExecutor::new();

        let first = executor
            .execute_code_blocks(&batch(&["set x", "get x"]))
            .await
            .unwrap();
        assert_eq!(first.exit_code, 0);

        let second = executor.execute_code_blocks(&batch(&["get x"])).await.unwrap();
        assert_eq!(second.exit_code, 0);

        executor.restart().await.unwrap();

        let third = executor.execute_code_blocks(&batch(&["get x"])).await.unwrap();
        assert_ne!(third.exit_code, 0);
        assert!(third.output.contains("not defined"));
    }

    #[tokio::test]
    async fn test_restart_before_any_execution_is_idempotent() {
        let executor = ScriptedExecutor::new();
        executor.restart().await.unwrap();
        executor.restart().await.unwrap();

        let result = executor.execute_code_blocks(&batch(&["a"])).await.unwrap();
        assert_eq!(result.exit_code, 0);
    }

    #[tokio::test]
    async fn test_extractor_feeds_executor() {
        let executor = ScriptedExecutor::new();
        let content = "```sh\na\n```\n```sh\nb\n```".into();
        let blocks = executor.code_extractor().extract_code_blocks(Some(&content));
        assert_eq!(blocks.len(), 2);

        let result = executor.execute_code_blocks(&blocks).await.unwrap();
        assert_eq!(result.output, "ok: a\nok: b\n");
    }
}
