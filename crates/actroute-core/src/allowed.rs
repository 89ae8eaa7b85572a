//! Allowed-method policies for strict method invocation

use crate::error::{RouteError, RouteResult};
use crate::wildcard::{self, Captures, WildcardPattern};
use regex::Regex;
use std::fmt;

const REGEX_PREFIX: &str = "regex:";

/// A single allowed-method rule
#[derive(Debug, Clone)]
pub enum MethodRule {
    /// Exact method name
    Literal(String),
    /// Wildcard such as `on*`
    Glob(WildcardPattern),
    /// `regex:<expr>`, anchored on the whole method name
    Regex { source: String, regex: Regex },
}

impl MethodRule {
    pub fn parse(rule: &str) -> RouteResult<Self> {
        let rule = rule.trim();
        if let Some(expr) = rule.strip_prefix(REGEX_PREFIX) {
            return Self::compile_regex(expr);
        }
        if wildcard::is_wildcard(rule) {
            return Ok(Self::Glob(WildcardPattern::compile(rule)?));
        }
        Ok(Self::Literal(rule.to_string()))
    }

    /// Parse a rule containing `{N}` placeholders. The rule kind comes from
    /// the template; captured text is always inserted as literal text.
    pub fn from_template(template: &str, captures: &Captures) -> RouteResult<Self> {
        let template = template.trim();
        if let Some(expr) = template.strip_prefix(REGEX_PREFIX) {
            let expr = wildcard::substitute_with(expr, captures, regex::escape);
            return Self::compile_regex(&expr);
        }
        if wildcard::is_wildcard(template) {
            let glob = wildcard::substitute_with(template, captures, wildcard::escape);
            return Ok(Self::Glob(WildcardPattern::compile(&glob)?));
        }
        Ok(Self::Literal(wildcard::substitute(template, captures)))
    }

    fn compile_regex(expr: &str) -> RouteResult<Self> {
        let source = format!("{}{}", REGEX_PREFIX, expr);
        let regex = Regex::new(&format!("^(?:{})$", expr))
            .map_err(|e| RouteError::InvalidPattern(format!("{}: {}", source, e)))?;
        Ok(Self::Regex { source, regex })
    }

    pub fn matches(&self, method: &str) -> bool {
        match self {
            Self::Literal(name) => name == method,
            Self::Glob(pattern) => pattern.matches(method).is_some(),
            Self::Regex { regex, .. } => regex.is_match(method),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(name) => name,
            Self::Glob(pattern) => pattern.as_str(),
            Self::Regex { source, .. } => source,
        }
    }
}

/// Which methods an action may be invoked with when strict mode is active
#[derive(Debug, Clone, Default)]
pub enum AllowedMethods {
    /// Every method is permitted
    #[default]
    Unrestricted,
    /// Only methods matching at least one rule are permitted
    Restricted(Vec<MethodRule>),
}

impl AllowedMethods {
    /// Build a restricted policy from raw rules. Blank entries are skipped and
    /// duplicates collapse to their first occurrence.
    pub fn restricted<I, S>(rules: I) -> RouteResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::collect(rules, MethodRule::parse)
    }

    fn collect<I, S, F>(rules: I, parse: F) -> RouteResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> RouteResult<MethodRule>,
    {
        let mut parsed: Vec<MethodRule> = Vec::new();
        for rule in rules {
            let rule = rule.as_ref().trim();
            if rule.is_empty() {
                continue;
            }
            let rule = parse(rule)?;
            if !parsed.iter().any(|r| r.as_str() == rule.as_str()) {
                parsed.push(rule);
            }
        }
        Ok(Self::Restricted(parsed))
    }

    /// Parse a comma separated list such as `execute,input,on*`
    pub fn parse_list(list: &str) -> RouteResult<Self> {
        Self::restricted(list.split(','))
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Unrestricted)
    }

    pub fn is_allowed(&self, method: &str) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Restricted(rules) => rules.iter().any(|rule| rule.matches(method)),
        }
    }
}

/// Allowed-method rules that reference wildcard captures (`{1}`, `on{2}`,
/// `regex:{1}|list`). They stay unparsed until an action name is matched.
#[derive(Debug, Clone)]
pub struct AllowedTemplate {
    rules: Vec<String>,
}

impl AllowedTemplate {
    /// Keep `rules` for later substitution. Each rule is checked up front with
    /// every placeholder standing for a plain segment.
    pub fn new<I, S>(rules: I) -> RouteResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let template = Self {
            rules: rules
                .into_iter()
                .map(|r| r.as_ref().trim().to_string())
                .filter(|r| !r.is_empty())
                .collect(),
        };
        template.apply(&Captures::filled("x"))?;
        Ok(template)
    }

    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    /// Substitute `captures` into every rule and parse the result
    pub fn apply(&self, captures: &Captures) -> RouteResult<AllowedMethods> {
        AllowedMethods::collect(&self.rules, |rule| MethodRule::from_template(rule, captures))
    }
}

impl fmt::Display for AllowedMethods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrestricted => write!(f, "*"),
            Self::Restricted(rules) => {
                let names: Vec<&str> = rules.iter().map(MethodRule::as_str).collect();
                write!(f, "{}", names.join(","))
            }
        }
    }
}
