pub mod allowed;
pub mod error;
pub mod proxy;
pub mod registry;
pub mod resolver;
pub mod settings;
pub mod types;
pub mod wildcard;

// Re-export commonly used types
pub use allowed::{AllowedMethods, AllowedTemplate, MethodRule};
pub use error::{RouteError, RouteResult};
pub use proxy::{ActionInvocation, ActionProxy, ActionProxyFactory};
pub use registry::{ActionRegistry, ActionRegistryBuilder, MatchedAction, RegistryHandle};
pub use resolver::MethodResolver;
pub use settings::{ResolverSettings, DEFAULT_METHOD_NAME_PATTERN};
pub use types::{
    ActionConfig, PackageConfig, ResolutionRequest, ResolutionResult,
    DEFAULT_GLOBAL_ALLOWED_METHODS, DEFAULT_METHOD,
};
pub use wildcard::{Captures, WildcardPattern};
