//! Local process execution backend.
//!
//! Each block is written to a script file in a persistent working directory
//! and run with the interpreter matching its language. The working directory
//! is the cross-batch state: files created by one batch are visible to the
//! next, until `restart()` replaces the directory with a fresh one.

use async_trait::async_trait;
use tempfile::{Builder, TempDir};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::CodeExecutor;
use crate::capability::{AgentCapability, CodeBlockUsageCapability};
use crate::core_types::{CodeBlock, CodeResult};
use crate::errors::ExecutorError;
use crate::extractor::{CodeExtractor, MarkdownCodeExtractor};

pub struct LocalCommandExecutor {
    extractor: MarkdownCodeExtractor,
    work_dir: Mutex<TempDir>,
}

impl LocalCommandExecutor {
    pub fn new() -> Result<Self, ExecutorError> {
        Ok(Self {
            extractor: MarkdownCodeExtractor::new(),
            work_dir: Mutex::new(Self::create_work_dir()?),
        })
    }

    fn create_work_dir() -> Result<TempDir, ExecutorError> {
        Builder::new()
            .prefix("codefence-exec-")
            .tempdir()
            .map_err(|e| ExecutorError::TempFileError(e.to_string()))
    }

    fn interpreter_for(language: &str) -> Option<(&'static str, &'static str)> {
        match language {
            "sh" | "bash" | "shell" => Some(("sh", "sh")),
            "python" | "python3" => Some(("python3", "py")),
            _ => None,
        }
    }

    async fn run_block(
        &self,
        work_dir: &TempDir,
        block: &CodeBlock,
    ) -> Result<(i32, String), ExecutorError> {
        let (program, extension) = match Self::interpreter_for(&block.language) {
            Some(pair) => pair,
            None => {
                return Ok((
                    1,
                    format!("unsupported language: {}\n", block.language),
                ))
            }
        };

        let script_filename = format!("script_{}.{}", Uuid::new_v4(), extension);
        let script_path = work_dir.path().join(&script_filename);

        let mut file = fs::File::create(&script_path).await?;
        file.write_all(block.code.as_bytes()).await?;
        file.flush().await?;

        log::debug!("running {} block via {}", block.language, program);
        let output = Command::new(program)
            .arg(&script_path)
            .current_dir(work_dir.path())
            .output()
            .await?;

        // Block output is batch data even when it is not valid UTF-8; decode
        // lossily rather than escalate to an infrastructure fault.
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        // A signal-terminated child has no exit code; report it as a failure.
        let exit_code = output.status.code().unwrap_or(-1);
        Ok((exit_code, combined))
    }
}

#[async_trait]
impl CodeExecutor for LocalCommandExecutor {
    fn code_extractor(&self) -> &dyn CodeExtractor {
        &self.extractor
    }

    fn user_capability(&self) -> Box<dyn AgentCapability> {
        Box::new(CodeBlockUsageCapability::new(vec![
            "sh".to_string(),
            "python".to_string(),
        ]))
    }

    async fn execute_code_blocks(
        &self,
        code_blocks: &[CodeBlock],
    ) -> Result<CodeResult, ExecutorError> {
        let work_dir = self.work_dir.lock().await;
        let mut output = String::new();

        for block in code_blocks {
            let (exit_code, block_output) = self.run_block(&work_dir, block).await?;
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
        let fresh = Self::create_work_dir()?;
        let mut work_dir = self.work_dir.lock().await;
        *work_dir = fresh;
        Ok(())
    }
}
