//! Action method resolution
//!
//! Priority, highest first:
//! 1. an explicit, non-empty method supplied by the caller
//! 2. the method declared on the matched config (wildcard placeholders applied)
//! 3. [`DEFAULT_METHOD`], reported as not specified
//!
//! Afterwards the method may be checked against the method-name pattern
//! (`validate`) and the action's allowed methods (`strict`).

use crate::{
    error::{RouteError, RouteResult},
    registry::ActionRegistry,
    settings::{ResolverSettings, DEFAULT_METHOD_NAME_PATTERN},
    types::{ResolutionRequest, ResolutionResult, DEFAULT_METHOD},
};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

static DEFAULT_METHOD_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&anchored(DEFAULT_METHOD_NAME_PATTERN))
        .expect("default method-name pattern is valid")
});

fn anchored(pattern: &str) -> String {
    format!("^(?:{})$", pattern)
}

/// Stateless resolver; safe to share across threads
#[derive(Debug, Clone)]
pub struct MethodResolver {
    settings: ResolverSettings,
    method_name: Regex,
}

impl Default for MethodResolver {
    fn default() -> Self {
        Self { settings: ResolverSettings::default(), method_name: DEFAULT_METHOD_NAME.clone() }
    }
}

impl MethodResolver {
    pub fn new(settings: ResolverSettings) -> RouteResult<Self> {
        let method_name = if settings.method_name_pattern == DEFAULT_METHOD_NAME_PATTERN {
            DEFAULT_METHOD_NAME.clone()
        } else {
            Regex::new(&anchored(&settings.method_name_pattern)).map_err(|e| {
                RouteError::InvalidPattern(format!("{}: {}", settings.method_name_pattern, e))
            })?
        };
        Ok(Self { settings, method_name })
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    pub fn resolve(
        &self,
        request: &ResolutionRequest,
        registry: &ActionRegistry,
    ) -> RouteResult<ResolutionResult> {
        let action_name = request.action_name.as_str();
        let matched = registry.lookup(
            &request.namespace,
            action_name,
            self.settings.fallback_for(&request.namespace),
        )?;

        let (method, method_specified) = match request.explicit_method() {
            Some(explicit) => (explicit.to_string(), true),
            None => match matched.config.declared_method() {
                Some(declared) => (declared.to_string(), true),
                None => (DEFAULT_METHOD.to_string(), false),
            },
        };

        if request.validate && !self.method_name.is_match(&method) {
            warn!(
                namespace = %request.namespace,
                action = action_name,
                method = %method,
                "invalid method name"
            );
            return Err(RouteError::invalid_method_name(&method, action_name));
        }

        if request.strict && !matched.allowed.is_allowed(&method) {
            warn!(
                namespace = %request.namespace,
                action = action_name,
                method = %method,
                allowed = %matched.allowed,
                "method rejected by strict method invocation"
            );
            return Err(RouteError::method_not_allowed(&method, action_name));
        }

        debug!(
            namespace = %matched.namespace,
            action = action_name,
            method = %method,
            method_specified,
            wildcard = matched.is_wildcard(),
            "action method resolved"
        );

        Ok(ResolutionResult {
            method,
            method_specified,
            namespace: matched.namespace,
            action: matched.config,
        })
    }
}
