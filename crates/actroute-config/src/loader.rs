use crate::env_resolver::EnvResolver;
use crate::error::{ConfigError, ConfigResult};
use actroute_core::{MethodResolver, ResolverSettings};
use anyhow::Context;
use serde_json::Value as JsonValue;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming a settings file for [`SettingsLoader::load_default`]
pub const SETTINGS_PATH_VAR: &str = "ACTROUTE_SETTINGS";

/// Prefix of per-field environment overrides
pub const ENV_PREFIX: &str = "ACTROUTE_";

/// Supported file formats for settings documents
#[derive(Debug, Clone, PartialEq)]
pub enum FileFormat {
    Yaml,
    Json,
}

impl FileFormat {
    /// Detect file format from extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        match path.as_ref().extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Ok(FileFormat::Yaml),
            Some("json") => Ok(FileFormat::Json),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }
}

/// Loads [`ResolverSettings`] from documents and the environment.
///
/// Precedence, lowest first: built-in defaults, the settings document,
/// `ACTROUTE_*` overrides.
#[derive(Debug, Clone, Default)]
pub struct SettingsLoader {
    env_resolver: EnvResolver,
    skip_env_overrides: bool,
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_env_resolver(mut self, env_resolver: EnvResolver) -> Self {
        self.env_resolver = env_resolver;
        self
    }

    /// Ignore `ACTROUTE_*` overrides (documents may still reference variables)
    pub fn without_env_overrides(mut self) -> Self {
        self.skip_env_overrides = true;
        self
    }

    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<ResolverSettings> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let format = FileFormat::from_path(path)?;
        debug!(path = %path.display(), ?format, "loading resolver settings");
        self.parse_content(&content, format)
    }

    pub fn parse_content(
        &self,
        content: &str,
        format: FileFormat,
    ) -> ConfigResult<ResolverSettings> {
        let root: JsonValue = if content.trim().is_empty() {
            JsonValue::Null
        } else {
            match format {
                FileFormat::Yaml => serde_yaml::from_str(content)?,
                FileFormat::Json => serde_json::from_str(content)?,
            }
        };

        // Empty documents and bare `~` mean "all defaults"
        let root = match root {
            JsonValue::Null => JsonValue::Object(Default::default()),
            JsonValue::Object(_) => root,
            _ => {
                return Err(ConfigError::Validation(
                    "settings document must be a mapping".to_string(),
                ))
            }
        };

        let resolved = self.env_resolver.resolve(&root)?;
        let settings: ResolverSettings = serde_json::from_value(resolved)?;
        self.finish(settings)
    }

    /// Defaults plus environment overrides, without any document
    pub fn load_from_env(&self) -> ConfigResult<ResolverSettings> {
        self.finish(ResolverSettings::default())
    }

    fn finish(&self, mut settings: ResolverSettings) -> ConfigResult<ResolverSettings> {
        if !self.skip_env_overrides {
            apply_env_overrides(&mut settings)?;
        }
        validate(&settings)?;
        Ok(settings)
    }

    /// Load from the file named by `ACTROUTE_SETTINGS`, or from the
    /// environment alone when it is unset.
    pub fn load_default(&self) -> anyhow::Result<ResolverSettings> {
        match env::var(SETTINGS_PATH_VAR) {
            Ok(path) => {
                let path = PathBuf::from(path);
                let settings = self
                    .load_from_file(&path)
                    .with_context(|| format!("failed to load settings from {}", path.display()))?;
                info!(path = %path.display(), "resolver settings loaded");
                Ok(settings)
            }
            Err(_) => self.load_from_env().context("failed to load settings from environment"),
        }
    }
}

fn apply_env_overrides(settings: &mut ResolverSettings) -> ConfigResult<()> {
    if let Some(value) = env_value("DEFAULT_NAMESPACE") {
        settings.default_namespace = value;
    }
    if let Some(value) = env_value("NAMESPACE_FALLBACK") {
        settings.namespace_fallback = parse_bool("NAMESPACE_FALLBACK", &value)?;
    }
    if let Some(value) = env_value("METHOD_NAME_PATTERN") {
        settings.method_name_pattern = value;
    }
    if let Some(value) = env_value("STRICT_BY_DEFAULT") {
        settings.strict_by_default = parse_bool("STRICT_BY_DEFAULT", &value)?;
    }
    Ok(())
}

fn env_value(key: &str) -> Option<String> {
    env::var(format!("{}{}", ENV_PREFIX, key)).ok()
}

fn parse_bool(key: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: format!("{}{}", ENV_PREFIX, key),
            value: value.to_string(),
        }),
    }
}

/// Reject settings the resolver could not be built from
fn validate(settings: &ResolverSettings) -> ConfigResult<()> {
    if settings.method_name_pattern.trim().is_empty() {
        return Err(ConfigError::Validation(
            "method_name_pattern must not be empty".to_string(),
        ));
    }
    MethodResolver::new(settings.clone())?;
    Ok(())
}
