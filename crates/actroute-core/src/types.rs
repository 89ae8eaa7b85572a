use crate::wildcard::{self, Captures};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Method invoked when neither the caller nor the configuration names one
pub const DEFAULT_METHOD: &str = "execute";

/// Methods every strict package allows unless it overrides the list
pub const DEFAULT_GLOBAL_ALLOWED_METHODS: &[&str] =
    &["execute", "input", "back", "cancel", "browse", "save", "delete", "list", "index"];

/// Package-level configuration shared by the actions it owns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageConfig {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    /// When false every action of the package is unrestricted
    #[serde(default = "default_strict")]
    pub strict_method_invocation: bool,
    #[serde(default = "default_global_allowed_methods")]
    pub global_allowed_methods: Vec<String>,
}

fn default_strict() -> bool {
    true
}

fn default_global_allowed_methods() -> Vec<String> {
    DEFAULT_GLOBAL_ALLOWED_METHODS.iter().map(|m| m.to_string()).collect()
}

impl PackageConfig {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            strict_method_invocation: default_strict(),
            global_allowed_methods: default_global_allowed_methods(),
        }
    }

    pub fn with_strict_method_invocation(mut self, strict: bool) -> Self {
        self.strict_method_invocation = strict;
        self
    }

    pub fn with_global_allowed_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.global_allowed_methods = methods.into_iter().map(Into::into).collect();
        self
    }
}

/// Configuration of a single action, as supplied by the configuration owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionConfig {
    /// Literal action name or wildcard pattern (e.g. `Wild-*`)
    pub name: String,
    /// Owning package
    pub package: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Method declared in configuration; may contain `{N}` placeholders
    #[serde(default, rename = "method", skip_serializing_if = "Option::is_none")]
    pub declared_method: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_methods: Vec<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub params: IndexMap<String, String>,
}

impl ActionConfig {
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            class_name: None,
            declared_method: None,
            allowed_methods: Vec::new(),
            params: IndexMap::new(),
        }
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.declared_method = Some(method.into());
        self
    }

    pub fn allow(mut self, method: impl Into<String>) -> Self {
        self.allowed_methods.push(method.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Declared method, ignoring blank values
    pub fn declared_method(&self) -> Option<&str> {
        self.declared_method.as_deref().filter(|m| !m.trim().is_empty())
    }

    pub fn is_wildcard(&self) -> bool {
        wildcard::is_wildcard(&self.name)
    }

    /// Copy of this config with `{N}` placeholders replaced by `captures`.
    /// The name becomes the concrete action name (`{0}`).
    pub fn materialize(&self, captures: &Captures) -> Self {
        let sub = |value: &str| wildcard::substitute(value, captures);
        Self {
            name: captures.get(0).unwrap_or(self.name.as_str()).to_string(),
            package: self.package.clone(),
            class_name: self.class_name.as_deref().map(sub),
            declared_method: self.declared_method.as_deref().map(sub),
            allowed_methods: self.allowed_methods.iter().map(|m| sub(m)).collect(),
            params: self.params.iter().map(|(k, v)| (k.clone(), sub(v))).collect(),
        }
    }
}

/// A single method-resolution request, built per action invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRequest {
    pub namespace: String,
    pub action_name: String,
    pub explicit_method: Option<String>,
    /// Enforce the action's allowed methods
    pub strict: bool,
    /// Check the resolved method against the method-name pattern
    pub validate: bool,
}

impl ResolutionRequest {
    pub fn new(namespace: impl Into<String>, action_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            action_name: action_name.into(),
            explicit_method: None,
            strict: false,
            validate: false,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.explicit_method = Some(method.into());
        self
    }

    pub fn with_optional_method(mut self, method: Option<&str>) -> Self {
        self.explicit_method = method.map(str::to_string);
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Explicit method, ignoring blank values
    pub fn explicit_method(&self) -> Option<&str> {
        self.explicit_method.as_deref().filter(|m| !m.trim().is_empty())
    }
}

/// Outcome of a successful resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult {
    pub method: String,
    /// False only when the method defaulted to [`DEFAULT_METHOD`]
    pub method_specified: bool,
    /// Namespace the action was found in (may be the fallback namespace)
    pub namespace: String,
    /// Matched action config with wildcard captures applied
    pub action: ActionConfig,
}
