// Probe Batch - collects fragments, runs the composed command exactly once

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::domain::error::{ProbeError, Result};
use crate::domain::probe::Tag;
use crate::domain::script::RuntimeTarget;
use crate::port::CommandRunner;

/// Memoized outcome of the single batched invocation
#[derive(Debug)]
struct Execution {
    output: String,
    succeeded: bool,
}

/// Fragment list, registered tags, and the seal flag share one lock so a
/// registration racing the first read either lands before the seal or is
/// rejected - it is never silently dropped from the composed command.
#[derive(Debug, Default)]
struct Fragments {
    list: Vec<String>,
    tags: HashSet<Tag>,
    sealed: bool,
}

/// Collects command fragments for registered probes and runs the composed
/// command at most once, lazily, on first access to output-dependent state.
///
/// State machine: Empty -> Collecting (register*) -> Executed (read-only).
/// The Collecting -> Executed transition fires on the first `output()` or
/// `succeeded()` call, including calls made through a bound [`ConfigProbe`].
///
/// [`ConfigProbe`]: crate::application::ConfigProbe
pub struct ProbeBatch {
    target: RuntimeTarget,
    runner: Arc<dyn CommandRunner>,
    fragments: Mutex<Fragments>,
    execution: OnceCell<Execution>,
}

impl ProbeBatch {
    pub fn new(target: RuntimeTarget, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            target,
            runner,
            fragments: Mutex::new(Fragments::default()),
            execution: OnceCell::new(),
        }
    }

    /// Append one probe's fragment, in registration order.
    ///
    /// # Errors
    /// - ProbeError::LateRegistration if the batched command already ran
    /// - ProbeError::DuplicateKey if the tag is already registered
    pub fn register(&self, tag: &Tag, fragment: impl Into<String>) -> Result<()> {
        let mut fragments = self.fragments.lock().unwrap();
        if fragments.sealed {
            return Err(ProbeError::LateRegistration(format!(
                "probe '{}' registered after the batched command ran",
                tag
            )));
        }
        if !fragments.tags.insert(tag.clone()) {
            return Err(ProbeError::DuplicateKey(tag.to_string()));
        }
        fragments.list.push(fragment.into());
        Ok(())
    }

    /// The full command in registration order, wrapped for the target runtime.
    pub fn composed_command(&self) -> String {
        let fragments = self.fragments.lock().unwrap();
        self.target.command_for(&fragments.list.join(" "))
    }

    /// Captured stdout of the batched command, executing it first if needed.
    ///
    /// Idempotent: later calls return the cached text without re-invoking
    /// the process, even when the invocation failed.
    pub async fn output(&self) -> &str {
        &self.execution().await.output
    }

    /// Overall outcome of the batched command, forcing execution if needed.
    pub async fn succeeded(&self) -> bool {
        self.execution().await.succeeded
    }

    async fn execution(&self) -> &Execution {
        self.execution
            .get_or_init(|| async { self.run().await })
            .await
    }

    async fn run(&self) -> Execution {
        let (command, fragment_count) = {
            let mut fragments = self.fragments.lock().unwrap();
            fragments.sealed = true;
            (
                self.target.command_for(&fragments.list.join(" ")),
                fragments.list.len(),
            )
        };

        debug!(command = %command, "composed batched probe command");
        info!(fragment_count, "executing batched probe command");

        match self.runner.run(&command).await {
            Ok(output) => {
                info!(
                    success = output.success,
                    exit_code = ?output.exit_code,
                    "batched probe command finished"
                );
                if !output.stderr.is_empty() {
                    debug!(stderr = %output.stderr, "batched probe command stderr");
                }
                Execution {
                    output: output.stdout,
                    succeeded: output.success,
                }
            }
            Err(err) => {
                // Observed, never raised: callers read it as "no answer".
                warn!(error = %err, "batched probe command could not be run");
                Execution {
                    output: String::new(),
                    succeeded: false,
                }
            }
        }
    }
}
