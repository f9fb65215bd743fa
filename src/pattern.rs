//! Path expression compiler.
//!
//! A path expression is literal text with placeholders:
//!
//! | Placeholder | Captures | Compiles to |
//! |-------------|----------|-------------|
//! | `<>` | one segment, unnamed | `(?:[^/]+)` |
//! | `<name>` | one segment as `name` | named group over `[^/]+` |
//! | `<name:subexpr>` | `subexpr` as `name` (may span `/`) | named group over `subexpr` |
//!
//! Literal runs are percent-encoded the way URL paths are, then escaped, so
//! `/café` matches `/caf%C3%A9` and `.` or `+` match themselves.
//! Named placeholders become *named* capture groups (`__nr_v0`, `__nr_v1`, ..)
//! which keeps variable extraction aligned even when a `subexpr` contains
//! groups of its own.
//!
//! # Example
//!
//! ```
//! use neuro_router::pattern::{to_pattern, CompiledPattern};
//!
//! let pattern = to_pattern("/messages/<message_id>");
//! assert_eq!(pattern.variables(), ["message_id"]);
//!
//! let compiled = CompiledPattern::compile("/messages/<message_id>").unwrap();
//! let vars = compiled.captures("/messages/1234").unwrap();
//! assert_eq!(vars.get("message_id"), Some("1234"));
//! ```

use crate::error::RouterError;
use crate::params::PathVariables;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Pattern used for placeholders without a sub-expression: one path segment.
pub const SEGMENT_PATTERN: &str = "[^/]+";

/// Characters the `url` crate percent-encodes in a path.
const PATH_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Prefix of the generated capture group names.
pub(crate) const GROUP_PREFIX: &str = "__nr_v";

/// `<name>`, `<name:subexpr>`, `<>` and `<:subexpr>`.
fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"<(\w*)(?::([^>]+))?>").expect("placeholder grammar"))
}

/// One lexical piece of a path expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    Literal(&'a str),
    Placeholder {
        name: Option<&'a str>,
        subexpr: Option<&'a str>,
    },
}

/// Split an expression into literal runs and placeholders, left to right.
pub(crate) fn tokenize(expression: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut last = 0;

    for caps in placeholder_regex().captures_iter(expression) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            tokens.push(Token::Literal(&expression[last..whole.start()]));
        }
        tokens.push(Token::Placeholder {
            name: caps.get(1).map(|m| m.as_str()).filter(|n| !n.is_empty()),
            subexpr: caps.get(2).map(|m| m.as_str()),
        });
        last = whole.end();
    }

    if last < expression.len() {
        tokens.push(Token::Literal(&expression[last..]));
    }

    tokens
}

/// The uncompiled result of [`to_pattern`]: regex source plus variable names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    variables: Vec<String>,
}

impl PathPattern {
    /// Regex source, unanchored.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Variable names in declaration order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }
}

/// Translate a path expression into regex source and its variable names.
///
/// Pure: the same expression always yields the same output. Whether the
/// result compiles is checked by [`CompiledPattern::compile`].
pub fn to_pattern(expression: &str) -> PathPattern {
    let mut source = String::with_capacity(expression.len() + 16);
    let mut variables = Vec::new();

    for token in tokenize(expression) {
        match token {
            Token::Literal(text) => {
                let encoded = utf8_percent_encode(text, PATH_ENCODE_SET).to_string();
                source.push_str(&regex::escape(&encoded));
            }
            Token::Placeholder {
                name: None,
                subexpr,
            } => {
                source.push_str("(?:");
                source.push_str(subexpr.unwrap_or(SEGMENT_PATTERN));
                source.push(')');
            }
            Token::Placeholder {
                name: Some(name),
                subexpr,
            } => {
                source.push_str("(?P<");
                source.push_str(GROUP_PREFIX);
                source.push_str(&variables.len().to_string());
                source.push('>');
                source.push_str(subexpr.unwrap_or(SEGMENT_PATTERN));
                source.push(')');
                variables.push(name.to_string());
            }
        }
    }

    PathPattern { source, variables }
}

/// Collect the named groups of `caps` into [`PathVariables`].
pub(crate) fn collect_variables(caps: &Captures<'_>, names: &[String]) -> PathVariables {
    let mut variables = PathVariables::new();
    for (index, name) in names.iter().enumerate() {
        let group = format!("{GROUP_PREFIX}{index}");
        if let Some(value) = caps.name(&group) {
            variables.insert(name.clone(), value.as_str().to_string());
        }
    }
    variables
}

/// A path expression compiled to an anchored regex.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pattern: PathPattern,
    regex: Regex,
}

impl CompiledPattern {
    /// Compile `expression`, failing with [`RouterError::PatternCompile`]
    /// when a sub-expression is not a valid regex.
    pub fn compile(expression: &str) -> Result<Self, RouterError> {
        let pattern = to_pattern(expression);
        let regex = Regex::new(&format!("^(?:{})$", pattern.source)).map_err(|source| {
            RouterError::PatternCompile {
                expression: expression.to_string(),
                source,
            }
        })?;
        Ok(Self { pattern, regex })
    }

    /// The uncompiled pattern.
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Variable names in declaration order.
    pub fn variables(&self) -> &[String] {
        &self.pattern.variables
    }

    /// Anchored match against the whole `path`.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Match `path` and return its variables, or `None` if it does not match.
    pub fn captures(&self, path: &str) -> Option<PathVariables> {
        let caps = self.regex.captures(path)?;
        Some(collect_variables(&caps, &self.pattern.variables))
    }
}

// ============================================================================
// Tests
// ============================================================================
