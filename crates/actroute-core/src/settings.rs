//! Resolver settings

use serde::{Deserialize, Serialize};

/// Default pattern a method name must match when validation is requested
pub const DEFAULT_METHOD_NAME_PATTERN: &str = "[A-Za-z_$][A-Za-z0-9_$]*";

/// Tunables for [`crate::MethodResolver`] and [`crate::ActionProxyFactory`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Namespace searched when an action is missing from the requested one
    pub default_namespace: String,
    /// Retry lookups in `default_namespace`
    pub namespace_fallback: bool,
    /// Anchored pattern used by method-name validation
    pub method_name_pattern: String,
    /// Strict flag applied to requests built by the proxy factory
    pub strict_by_default: bool,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            default_namespace: String::new(),
            namespace_fallback: true,
            method_name_pattern: DEFAULT_METHOD_NAME_PATTERN.to_string(),
            strict_by_default: true,
        }
    }
}

impl ResolverSettings {
    /// Namespace to retry in, if fallback applies to `namespace`
    pub fn fallback_for(&self, namespace: &str) -> Option<&str> {
        if self.namespace_fallback && namespace != self.default_namespace {
            Some(&self.default_namespace)
        } else {
            None
        }
    }
}
