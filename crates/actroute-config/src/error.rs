use actroute_core::RouteError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Environment error: {0}")]
    Env(#[from] crate::env_resolver::EnvResolverError),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}

impl From<ConfigError> for RouteError {
    fn from(err: ConfigError) -> Self {
        RouteError::Configuration(err.to_string())
    }
}

impl From<RouteError> for ConfigError {
    fn from(err: RouteError) -> Self {
        ConfigError::Validation(err.to_string())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
