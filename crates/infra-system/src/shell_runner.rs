// Shell command runner implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{info, warn};

use cfgprobe_core::port::{CommandOutput, CommandRunner, RunError};

/// Runs command strings through `sh -c`, inheriting the caller's ambient
/// environment, with optional overrides, working directory, and deadline.
pub struct ShellCommandRunner {
    env_overrides: HashMap<String, String>,
    working_dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl ShellCommandRunner {
    pub fn new() -> Self {
        Self {
            env_overrides: HashMap::new(),
            working_dir: None,
            timeout: None,
        }
    }

    /// Add environment variables on top of the inherited environment.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env_overrides.extend(env);
        self
    }

    /// Run commands from `dir` instead of the current directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Enforce a deadline on the spawned command.
    pub fn with_timeout(mut self, deadline: Duration) -> Self {
        self.timeout = Some(deadline);
        self
    }

    /// Spawn the shell and wait for captured output
    async fn spawn_and_wait(&self, command: &str) -> Result<std::process::Output, RunError> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .envs(&self.env_overrides)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let child = cmd
            .spawn()
            .map_err(|e| RunError::SpawnFailed(e.to_string()))?;

        if let Some(deadline) = self.timeout {
            match timeout(deadline, child.wait_with_output()).await {
                Ok(Ok(output)) => Ok(output),
                Ok(Err(e)) => Err(RunError::Io(e.to_string())),
                Err(_) => Err(RunError::Timeout(deadline.as_millis() as u64)),
            }
        } else {
            child
                .wait_with_output()
                .await
                .map_err(|e| RunError::Io(e.to_string()))
        }
    }

    /// Build the port-level output from process output
    fn build_output(output: std::process::Output) -> CommandOutput {
        CommandOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

impl Default for ShellCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for ShellCommandRunner {
    async fn run(&self, command: &str) -> Result<CommandOutput, RunError> {
        info!(
            command_len = command.len(),
            working_dir = ?self.working_dir,
            timeout = ?self.timeout,
            "Starting shell command"
        );

        let output = match self.spawn_and_wait(command).await {
            Ok(output) => output,
            Err(e) => {
                warn!(error = %e, "Shell command did not run");
                return Err(e);
            }
        };

        let result = Self::build_output(output);

        info!(
            success = result.success,
            exit_code = ?result.exit_code,
            "Shell command completed"
        );

        Ok(result)
    }
}
