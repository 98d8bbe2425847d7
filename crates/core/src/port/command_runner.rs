// Command Runner Port
// Abstraction for running one command string under the caller's environment

use async_trait::async_trait;
use thiserror::Error;

/// Captured outcome of one command invocation
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Derived from the process exit status
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    /// Captured for diagnostics only, never parsed for results
    pub stderr: String,
}

/// Invocation errors
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Command timeout after {0}ms")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(String),
}

/// Command Runner trait
///
/// Implementations:
/// - ShellCommandRunner (cfgprobe-infra-system): runs the string via `sh -c`
/// - mocks::MockCommandRunner: scripted outcomes for tests
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command string and capture its stdout plus the exit outcome.
    ///
    /// # Errors
    /// - RunError::SpawnFailed if the process cannot be started
    /// - RunError::Timeout if the adapter enforces a deadline and it passes
    /// - RunError::Io if waiting on the process or capturing output fails
    async fn run(&self, command: &str) -> Result<CommandOutput, RunError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock runner behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Return canned stdout with the given success flag
        Output { stdout: String, success: bool },
        /// Fail with a spawn error
        Fail(String),
    }

    /// Mock Command Runner for testing
    pub struct MockCommandRunner {
        behavior: Arc<Mutex<MockBehavior>>,
        call_count: Arc<Mutex<usize>>,
        last_command: Arc<Mutex<Option<String>>>,
    }

    impl MockCommandRunner {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                call_count: Arc::new(Mutex::new(0)),
                last_command: Arc::new(Mutex::new(None)),
            }
        }

        pub fn new_output(stdout: impl Into<String>, success: bool) -> Self {
            Self::new(MockBehavior::Output {
                stdout: stdout.into(),
                success,
            })
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }

        pub fn last_command(&self) -> Option<String> {
            self.last_command.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandRunner for MockCommandRunner {
        async fn run(&self, command: &str) -> Result<CommandOutput, RunError> {
            *self.call_count.lock().unwrap() += 1;
            *self.last_command.lock().unwrap() = Some(command.to_string());

            let behavior = self.behavior.lock().unwrap().clone();

            match behavior {
                MockBehavior::Output { stdout, success } => Ok(CommandOutput {
                    success,
                    exit_code: Some(if success { 0 } else { 1 }),
                    stdout,
                    stderr: String::new(),
                }),
                MockBehavior::Fail(msg) => Err(RunError::SpawnFailed(msg)),
            }
        }
    }
}
