//! Settings loading for the actroute resolver

pub mod env_resolver;
pub mod error;
pub mod loader;

// Re-export commonly used types
pub use env_resolver::{EnvResolver, EnvResolverError};
pub use error::{ConfigError, ConfigResult};
pub use loader::{FileFormat, SettingsLoader, ENV_PREFIX, SETTINGS_PATH_VAR};
