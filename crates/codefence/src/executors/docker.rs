//! Containerized execution backend.
//!
//! Runs each block in its own container, removed after its logs are
//! collected, with a persistent host directory bind-mounted at the container
//! working directory so files written by one block (or one batch) are visible
//! to later ones. `restart()` wipes that directory. Container exit codes are
//! batch data; only Docker-level failures and timeouts surface as
//! [`ExecutorError`].

use async_trait::async_trait;
use bollard::container::LogOutput;
use bollard::models::ContainerCreateBody;
use bollard::query_parameters::{
    CreateContainerOptions as BollardCreateContainerOptionsQuery,
    LogsOptions as BollardLogsOptionsQuery,
    RemoveContainerOptions as BollardRemoveContainerOptionsQuery,
    StartContainerOptions as BollardStartContainerOptionsQuery,
    StopContainerOptions as BollardStopContainerOptionsQuery,
    WaitContainerOptions as BollardWaitContainerOptionsQuery,
};
use bollard::Docker;
use futures_util::stream::StreamExt;
use std::default::Default;
use tempfile::{Builder, TempDir};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::CodeExecutor;
use crate::capability::{AgentCapability, CodeBlockUsageCapability};
use crate::core_types::{CodeBlock, CodeResult};
use crate::errors::ExecutorError;
use crate::extractor::{CodeExtractor, MarkdownCodeExtractor};

const CONTAINER_WORK_DIR: &str = "/workspace";

pub struct DockerCodeExecutor {
    docker: Docker,
    extractor: MarkdownCodeExtractor,
    timeout_seconds: u64,
    work_dir: Mutex<TempDir>,
}

impl DockerCodeExecutor {
    pub async fn new(timeout_seconds: u64) -> Result<Self, ExecutorError> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self {
            docker,
            extractor: MarkdownCodeExtractor::new(),
            timeout_seconds,
            work_dir: Mutex::new(Self::create_work_dir()?),
        })
    }

    fn create_work_dir() -> Result<TempDir, ExecutorError> {
        Builder::new()
            .prefix("codefence-exec-")
            .tempdir()
            .map_err(|e| ExecutorError::TempFileError(e.to_string()))
    }

    fn image_for(language: &str) -> Option<(&'static str, &'static str, &'static str)> {
        match language {
            "python" | "python3" => Some(("python:3.10-slim", "python", "py")),
            "sh" | "bash" | "shell" => Some(("alpine:latest", "sh", "sh")),
            _ => None,
        }
    }

    async fn run_block(
        &self,
        work_dir: &TempDir,
        block: &CodeBlock,
    ) -> Result<(i32, String), ExecutorError> {
        let (image_name, program, extension) = match Self::image_for(&block.language) {
            Some(triple) => triple,
            None => {
                return Ok((
                    1,
                    format!("unsupported language: {}\n", block.language),
                ))
            }
        };

        let script_filename = format!("script_{}.{}", Uuid::new_v4(), extension);
        let script_path_in_container = format!("{}/{}", CONTAINER_WORK_DIR, script_filename);
        let cmd_strings = vec![program.to_string(), script_path_in_container];

        let host_script_path = work_dir.path().join(&script_filename);
        let mut file = fs::File::create(&host_script_path).await?;
        file.write_all(block.code.as_bytes()).await?;
        file.flush().await?;

        let host_work_dir = work_dir
            .path()
            .to_str()
            .ok_or_else(|| ExecutorError::TempFileError("Invalid temp path".to_string()))?
            .to_string();

        let options = Some(BollardCreateContainerOptionsQuery {
            name: Some(format!("codefence-exec-{}", Uuid::new_v4())),
            ..Default::default()
        });

        let config = ContainerCreateBody {
            image: Some(image_name.to_string()),
            cmd: Some(cmd_strings),
            working_dir: Some(CONTAINER_WORK_DIR.to_string()),
            // Removal is explicit, after log collection; auto-remove would
            // race the log request once the wait completes.
            host_config: Some(bollard::models::HostConfig {
                binds: Some(vec![format!("{}:{}", host_work_dir, CONTAINER_WORK_DIR)]),
                ..Default::default()
            }),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            ..Default::default()
        };

        let container = self.docker.create_container(options, config).await?;
        self.docker
            .start_container(&container.id, None::<BollardStartContainerOptionsQuery>)
            .await?;

        let mut wait_stream = self
            .docker
            .wait_container(&container.id, None::<BollardWaitContainerOptionsQuery>);
        let timeout_future =
            tokio::time::sleep(tokio::time::Duration::from_secs(self.timeout_seconds));

        let wait_outcome = tokio::select! {
            res = wait_stream.next() => res,
            _ = timeout_future => {
                log::warn!("execution timed out for container {}", container.id);
                let _ = self
                    .docker
                    .stop_container(&container.id, None::<BollardStopContainerOptionsQuery>)
                    .await;
                self.remove_container(&container.id).await;
                return Err(ExecutorError::Timeout);
            }
        };

        let exit_code = match wait_outcome {
            Some(Ok(response)) => response.status_code,
            // A nonzero exit surfaces through the wait stream as an error
            // carrying the status code; that is batch data, not a fault.
            Some(Err(bollard::errors::Error::DockerContainerWaitError { code, .. })) => code,
            Some(Err(e)) => {
                self.remove_container(&container.id).await;
                return Err(ExecutorError::BollardError(e));
            }
            None => {
                self.remove_container(&container.id).await;
                return Err(ExecutorError::UnexpectedTermination(
                    "container wait stream ended unexpectedly".to_string(),
                ));
            }
        };

        let mut log_stream = self.docker.logs(
            &container.id,
            Some(BollardLogsOptionsQuery {
                stdout: true,
                stderr: true,
                ..Default::default()
            }),
        );

        let mut output = String::new();
        while let Some(log_result) = log_stream.next().await {
            match log_result {
                Ok(LogOutput::StdOut { message }) | Ok(LogOutput::StdErr { message }) => {
                    output.push_str(&String::from_utf8_lossy(&message))
                }
                Ok(_) => {}
                Err(e) => {
                    self.remove_container(&container.id).await;
                    return Err(ExecutorError::BollardError(e));
                }
            }
        }

        self.remove_container(&container.id).await;
        Ok((exit_code as i32, output))
    }

    async fn remove_container(&self, container_id: &str) {
        if let Err(e) = self
            .docker
            .remove_container(
                container_id,
                Some(BollardRemoveContainerOptionsQuery {
                    force: true,
                    ..Default::default()
                }),
            )
            .await
        {
            log::warn!("failed to remove container {}: {}", container_id, e);
        }
    }
}

#[async_trait]
impl CodeExecutor for DockerCodeExecutor {
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
