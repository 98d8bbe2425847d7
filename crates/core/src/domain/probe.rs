// Probe Domain Model

use crate::domain::error::{ProbeError, Result};

/// Namespace prefix for result tags. Long enough that a valid tag cannot
/// collide with unrelated lines printed by the target application.
pub const TAG_NAMESPACE: &str = "cfgprobe.detecting.config.for";

/// Caller-supplied dotted identifier naming one probe
/// (e.g. `"active_storage.service"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProbeKey(String);

impl ProbeKey {
    /// Validate and wrap a raw key.
    ///
    /// Keys are restricted to ASCII alphanumerics, `_` and `.`, with no
    /// leading or trailing dot. The restriction keeps the derived tag free of
    /// newlines and `=`, which the line encoding relies on.
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(ProbeError::InvalidKey("key is empty".to_string()));
        }
        if raw.starts_with('.') || raw.ends_with('.') {
            return Err(ProbeError::InvalidKey(format!(
                "key '{}' may not start or end with '.'",
                raw
            )));
        }
        if let Some(bad) = raw
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '_' && *c != '.')
        {
            return Err(ProbeError::InvalidKey(format!(
                "key '{}' contains unsupported character '{}'",
                raw, bad
            )));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProbeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Namespaced marker locating one probe's result line in the shared output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag(String);

impl Tag {
    /// Derive the tag for a key: `<namespace>.<key>`.
    pub fn for_key(key: &ProbeKey) -> Self {
        Self(format!("{}.{}", TAG_NAMESPACE, key.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reject expressions that would escape the composed command.
///
/// The probe expression is embedded inert inside a double-quoted script body
/// handed to the host shell, so shell-significant characters and newlines are
/// refused outright. `#` would start a comment in the single-line script and
/// swallow every sibling fragment after it.
pub fn validate_expression(expression: &str) -> Result<()> {
    if expression.trim().is_empty() {
        return Err(ProbeError::InvalidExpression(
            "expression is empty".to_string(),
        ));
    }
    if let Some(bad) = expression
        .chars()
        .find(|c| matches!(c, '"' | '\\' | '`' | '$' | '#' | '\n' | '\r'))
    {
        return Err(ProbeError::InvalidExpression(format!(
            "expression '{}' contains unsupported character '{}'",
            expression, bad
        )));
    }
    Ok(())
}

/// Render one probe's command fragment.
///
/// The fragment evaluates the expression inside its own rescue boundary and
/// prints `tag=value` only when the value is non-nil. A raising or nil probe
/// emits nothing for its tag and cannot abort sibling fragments.
pub fn render_fragment(tag: &Tag, expression: &str) -> String {
    format!(
        "begin; __cfgprobe_value = ({}); \
         puts %Q{{{}=#{{__cfgprobe_value}}}} unless __cfgprobe_value.nil?; \
         rescue StandardError, ScriptError; end;",
        expression, tag
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_keys() {
        for raw in ["active_storage.service", "a.b", "x", "a1.b2_c3"] {
            assert!(ProbeKey::parse(raw).is_ok(), "expected '{}' to parse", raw);
        }
    }

    #[test]
    fn test_parse_rejects_empty_key() {
        let result = ProbeKey::parse("");
        assert!(matches!(result, Err(ProbeError::InvalidKey(_))));
    }

    #[test]
    fn test_parse_rejects_bad_characters() {
        for raw in ["a b", "a=b", "a.b\n", "tag{}", "päth"] {
            let result = ProbeKey::parse(raw);
            assert!(
                matches!(result, Err(ProbeError::InvalidKey(_))),
                "expected '{}' to be rejected",
                raw.escape_debug()
            );
        }
    }

    #[test]
    fn test_parse_rejects_edge_dots() {
        assert!(ProbeKey::parse(".a").is_err());
        assert!(ProbeKey::parse("a.").is_err());
    }

    #[test]
    fn test_tag_derivation() {
        let key = ProbeKey::parse("active_storage.service").unwrap();
        assert_eq!(
            Tag::for_key(&key).as_str(),
            "cfgprobe.detecting.config.for.active_storage.service"
        );
    }

    #[test]
    fn test_validate_expression_rejects_shell_significant_characters() {
        for expr in [
            "",
            "   ",
            "puts \"x\"",
            "a\\b",
            "`rm -rf .`",
            "$PATH",
            "x # y",
            "line\nbreak",
        ] {
            assert!(
                validate_expression(expr).is_err(),
                "expected '{}' to be rejected",
                expr.escape_debug()
            );
        }
    }

    #[test]
    fn test_render_fragment_shape() {
        let key = ProbeKey::parse("a.b").unwrap();
        let tag = Tag::for_key(&key);
        let fragment = render_fragment(&tag, "Rails.application.config.a.b");

        assert!(fragment.starts_with("begin;"));
        assert!(fragment.ends_with("rescue StandardError, ScriptError; end;"));
        assert!(fragment.contains("(Rails.application.config.a.b)"));
        assert!(fragment.contains("%Q{cfgprobe.detecting.config.for.a.b=#{__cfgprobe_value}}"));
        assert!(fragment.contains("unless __cfgprobe_value.nil?"));
        assert!(!fragment.contains('\n'));
    }
}
