use thiserror::Error;

pub type RouteResult<T> = Result<T, RouteError>;

#[derive(Debug, Error)]
pub enum RouteError {
    /// Configuration mismatch detected while resolving an action.
    /// The message is surfaced verbatim to callers.
    #[error("{0}")]
    Configuration(String),
    #[error("There is no Action mapped for namespace [{namespace}] and action name [{name}]")]
    ActionNotFound { namespace: String, name: String },
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("duplicate package: {0}")]
    DuplicatePackage(String),
    #[error("unknown package: {0}")]
    UnknownPackage(String),
    /// Raised by [`crate::ActionInvocation`] implementations
    #[error("invocation failed: {0}")]
    Invocation(String),
}

impl RouteError {
    pub fn method_not_allowed(method: &str, action: &str) -> Self {
        Self::Configuration(format!("Method {} for action {} is not allowed!", method, action))
    }

    pub fn invalid_method_name(method: &str, action: &str) -> Self {
        Self::Configuration(format!(
            "Method {} for action {} is not a valid method name!",
            method, action
        ))
    }

    pub fn action_not_found(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::ActionNotFound { namespace: namespace.into(), name: name.into() }
    }
}
