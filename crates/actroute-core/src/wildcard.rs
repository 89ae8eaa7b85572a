//! Wildcard action-name patterns and `{N}` capture substitution
//!
//! Syntax:
//! - `*` matches zero or more characters, excluding `/`
//! - `**` matches zero or more characters, including `/`
//! - `\` escapes the next character
//!
//! Captures are index based: `{0}` is the whole matched name, `{1}`.. the
//! wildcard segments from left to right.

use crate::error::{RouteError, RouteResult};
use regex::Regex;

/// Returns true when `pattern` contains at least one unescaped `*`
pub fn is_wildcard(pattern: &str) -> bool {
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '*' => return true,
            _ => {}
        }
    }
    false
}

/// Segments captured by a successful wildcard match
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Captures {
    groups: Vec<String>,
}

impl Captures {
    /// Captures for a literal match: only `{0}` is set.
    pub fn whole(name: &str) -> Self {
        Self { groups: vec![name.to_string()] }
    }

    /// Captures where every index holds `value`; used to check templates
    /// before any action name has been matched.
    pub(crate) fn filled(value: &str) -> Self {
        Self { groups: vec![value.to_string(); 10] }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.groups.get(index).map(String::as_str)
    }

    /// Number of wildcard segments, `{0}` excluded
    pub fn segments(&self) -> usize {
        self.groups.len().saturating_sub(1)
    }
}

/// A compiled wildcard pattern
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    source: String,
    regex: Regex,
}

impl WildcardPattern {
    pub fn compile(pattern: &str) -> RouteResult<Self> {
        let mut expr = String::with_capacity(pattern.len() * 2 + 2);
        expr.push('^');

        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some(escaped) => expr.push_str(&regex::escape(&escaped.to_string())),
                    None => expr.push_str(&regex::escape("\\")),
                },
                '*' => {
                    if chars.peek() == Some(&'*') {
                        chars.next();
                        expr.push_str("(.*?)");
                    } else {
                        expr.push_str("([^/]*?)");
                    }
                }
                other => expr.push_str(&regex::escape(&other.to_string())),
            }
        }
        expr.push('$');

        let regex = Regex::new(&expr)
            .map_err(|e| RouteError::InvalidPattern(format!("{}: {}", pattern, e)))?;
        Ok(Self { source: pattern.to_string(), regex })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, name: &str) -> Option<Captures> {
        let caps = self.regex.captures(name)?;
        let groups = caps
            .iter()
            .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
            .collect();
        Some(Captures { groups })
    }
}

/// Replace `{0}`..`{9}` placeholders in `template` with captured segments.
/// A placeholder whose index was not captured becomes the empty string.
pub fn substitute(template: &str, captures: &Captures) -> String {
    substitute_with(template, captures, str::to_string)
}

/// Like [`substitute`], but every captured segment is passed through
/// `escape` before it is inserted.
pub fn substitute_with<F>(template: &str, captures: &Captures, escape: F) -> String
where
    F: Fn(&str) -> String,
{
    if !has_placeholder(template) {
        return template.to_string();
    }

    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    let mut i = 0;
    while i < bytes.len() {
        if i + 2 < bytes.len()
            && bytes[i] == b'{'
            && bytes[i + 1].is_ascii_digit()
            && bytes[i + 2] == b'}'
        {
            out.push_str(&template[last..i]);
            let index = (bytes[i + 1] - b'0') as usize;
            out.push_str(&escape(captures.get(index).unwrap_or("")));
            i += 3;
            last = i;
        } else {
            i += 1;
        }
    }
    out.push_str(&template[last..]);
    out
}

/// Escape `text` so a wildcard pattern matches it literally
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '*' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// True when `template` contains at least one `{N}` placeholder
pub fn has_placeholder(template: &str) -> bool {
    template
        .as_bytes()
        .windows(3)
        .any(|w| w[0] == b'{' && w[1].is_ascii_digit() && w[2] == b'}')
}
