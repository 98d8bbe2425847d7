// Config Probe - one registered probe and its view of the shared output

use std::sync::Arc;

use crate::application::batch::ProbeBatch;
use crate::domain::error::Result;
use crate::domain::probe::{self, ProbeKey, Tag};
use crate::domain::script;

/// One configuration probe, bound to the batch that will run it.
///
/// Immutable after registration: holds its own key and tag plus a shared
/// reference to the batch whose cached output it reads.
pub struct ConfigProbe {
    key: ProbeKey,
    tag: Tag,
    expression: String,
    batch: Arc<ProbeBatch>,
}

impl ConfigProbe {
    /// Validate the key and expression, derive the tag, and append this
    /// probe's fragment to the batch.
    ///
    /// The expression is embedded inert; it is interpreted by the target
    /// runtime, never by this crate.
    ///
    /// # Errors
    /// - ProbeError::InvalidKey / InvalidExpression on malformed input
    /// - ProbeError::DuplicateKey if the key is already registered
    /// - ProbeError::LateRegistration if the batch already ran
    pub fn register(
        key: impl Into<String>,
        expression: &str,
        batch: &Arc<ProbeBatch>,
    ) -> Result<Self> {
        let key = ProbeKey::parse(key)?;
        probe::validate_expression(expression)?;

        let tag = Tag::for_key(&key);
        let fragment = probe::render_fragment(&tag, expression);
        batch.register(&tag, fragment)?;

        Ok(Self {
            key,
            tag,
            expression: expression.to_string(),
            batch: Arc::clone(batch),
        })
    }

    pub fn key(&self) -> &ProbeKey {
        &self.key
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// The fragment this probe contributed to the batched command.
    pub fn fragment(&self) -> String {
        probe::render_fragment(&self.tag, &self.expression)
    }

    /// The value this probe recovered, if its result line is present.
    pub async fn value(&self) -> Option<String> {
        script::value_of(self.batch.output().await, &self.tag).map(str::to_string)
    }

    /// True iff the batched command succeeded overall and this probe's tag is
    /// present in the shared output. Distinguishes "the process ran but this
    /// probe had no answer" from "this probe answered".
    pub async fn succeeded(&self) -> bool {
        self.batch.succeeded().await
            && script::value_of(self.batch.output().await, &self.tag).is_some()
    }

    /// True iff the shared output contains the exact line `tag=expected`.
    /// Verbatim comparison, not gated on [`succeeded`](Self::succeeded).
    pub async fn matches(&self, expected: &str) -> bool {
        script::is_match(self.batch.output().await, &self.tag, expected)
    }
}
