// Output encoding and target-runtime command wrapping

use crate::domain::probe::Tag;

/// Command-execution entry point of the target runtime.
///
/// The composed script body is double-quoted and appended to the entry
/// point, e.g. `bin/rails runner "<script>"`.
#[derive(Debug, Clone)]
pub struct RuntimeTarget {
    entrypoint: String,
}

impl RuntimeTarget {
    pub fn new(entrypoint: impl Into<String>) -> Self {
        Self {
            entrypoint: entrypoint.into(),
        }
    }

    /// The primary target: a Rails app's runner entry point.
    pub fn rails() -> Self {
        Self::new("bin/rails runner")
    }

    pub fn entrypoint(&self) -> &str {
        &self.entrypoint
    }

    /// Wrap a composed script body into one executable command string.
    pub fn command_for(&self, script: &str) -> String {
        format!("{} \"{}\"", self.entrypoint, script)
    }
}

/// First value recovered for `tag`, if the output contains a result line
/// for it. A result line is a line starting with `<tag>=`; scanning is
/// line-based and exact, never substring-based.
pub fn value_of<'a>(output: &'a str, tag: &Tag) -> Option<&'a str> {
    output
        .lines()
        .find_map(|line| line.strip_prefix(tag.as_str())?.strip_prefix('='))
}

/// Whole-line match: some line equals `<tag>=<expected>` verbatim.
pub fn is_match(output: &str, tag: &Tag, expected: &str) -> bool {
    output.lines().any(|line| {
        line.strip_prefix(tag.as_str())
            .and_then(|rest| rest.strip_prefix('='))
            .is_some_and(|value| value == expected)
    })
}
