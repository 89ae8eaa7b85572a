//! Environment variable interpolation with whitelist and default value support

use regex::Regex;
use serde_json::Value as JsonValue;
use std::env;
use thiserror::Error;

/// Errors that can occur during environment variable resolution
#[derive(Debug, Error)]
pub enum EnvResolverError {
    #[error("Environment variable '{0}' not found and no default provided")]
    VarNotFound(String),
    #[error("Environment variable '{0}' is not in whitelist. Allowed prefixes: {1:?}")]
    VarNotWhitelisted(String, Vec<String>),
}

/// Resolves `${VAR}` and `${VAR:default}` references inside settings documents
#[derive(Debug, Clone)]
pub struct EnvResolver {
    /// Allowed prefixes for referenced variables. Empty means no restrictions
    allowed_prefixes: Vec<String>,
    reference: Regex,
}

impl Default for EnvResolver {
    fn default() -> Self {
        Self::new(vec!["ACTROUTE_".to_string(), "APP_".to_string()])
    }
}

impl EnvResolver {
    pub fn new(allowed_prefixes: Vec<String>) -> Self {
        Self {
            allowed_prefixes,
            reference: Regex::new(r"\$\{([^}:]+)(?::([^}]*))?\}")
                .expect("reference pattern is valid"),
        }
    }

    /// Resolver that accepts any variable name
    pub fn unrestricted() -> Self {
        Self::new(vec![])
    }

    /// Resolve references in every string of `value`. A string consisting of a
    /// single reference is re-typed, so `"${ACTROUTE_STRICT:true}"` becomes a
    /// boolean.
    pub fn resolve(&self, value: &JsonValue) -> Result<JsonValue, EnvResolverError> {
        match value {
            JsonValue::String(s) => self.resolve_string(s),
            JsonValue::Object(obj) => {
                let mut resolved = serde_json::Map::new();
                for (key, val) in obj {
                    resolved.insert(key.clone(), self.resolve(val)?);
                }
                Ok(JsonValue::Object(resolved))
            }
            JsonValue::Array(arr) => arr
                .iter()
                .map(|item| self.resolve(item))
                .collect::<Result<Vec<_>, _>>()
                .map(JsonValue::Array),
            other => Ok(other.clone()),
        }
    }

    fn resolve_string(&self, input: &str) -> Result<JsonValue, EnvResolverError> {
        if !input.contains("${") {
            return Ok(JsonValue::String(input.to_string()));
        }

        let whole_reference = self
            .reference
            .find(input)
            .map(|m| m.start() == 0 && m.end() == input.len())
            .unwrap_or(false);

        let mut result = String::with_capacity(input.len());
        let mut last = 0;
        for caps in self.reference.captures_iter(input) {
            let Some(full) = caps.get(0) else { continue };
            let var_name = &caps[1];
            let default_value = caps.get(2).map(|m| m.as_str());

            self.validate_var_name(var_name)?;
            let value = match env::var(var_name) {
                Ok(value) => value,
                Err(_) => match default_value {
                    Some(default) => default.to_string(),
                    None => return Err(EnvResolverError::VarNotFound(var_name.to_string())),
                },
            };

            result.push_str(&input[last..full.start()]);
            result.push_str(&value);
            last = full.end();
        }
        result.push_str(&input[last..]);

        if whole_reference {
            Ok(coerce_scalar(result))
        } else {
            Ok(JsonValue::String(result))
        }
    }

    fn validate_var_name(&self, var_name: &str) -> Result<(), EnvResolverError> {
        if self.allowed_prefixes.is_empty()
            || self.allowed_prefixes.iter().any(|prefix| var_name.starts_with(prefix))
        {
            return Ok(());
        }
        Err(EnvResolverError::VarNotWhitelisted(
            var_name.to_string(),
            self.allowed_prefixes.clone(),
        ))
    }
}

fn coerce_scalar(raw: String) -> JsonValue {
    if let Ok(flag) = raw.parse::<bool>() {
        JsonValue::Bool(flag)
    } else if let Ok(int) = raw.parse::<i64>() {
        JsonValue::Number(int.into())
    } else {
        JsonValue::String(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_basic_variable_resolution() {
        env::set_var("ACTROUTE_TEST_NAMESPACE", "shop");

        let resolver = EnvResolver::default();
        let result = resolver.resolve(&json!("${ACTROUTE_TEST_NAMESPACE}")).unwrap();
        assert_eq!(result, json!("shop"));

        env::remove_var("ACTROUTE_TEST_NAMESPACE");
    }

    #[test]
    fn test_default_value_and_typing() {
        env::remove_var("ACTROUTE_TEST_UNSET_FLAG");

        let resolver = EnvResolver::default();
        let result = resolver.resolve(&json!("${ACTROUTE_TEST_UNSET_FLAG:false}")).unwrap();
        assert_eq!(result, json!(false));
    }

    #[test]
    fn test_embedded_reference_stays_string() {
        env::remove_var("ACTROUTE_TEST_UNSET_PREFIX");

        let resolver = EnvResolver::default();
        let result = resolver.resolve(&json!("do${ACTROUTE_TEST_UNSET_PREFIX:[A-Z]}\\w*")).unwrap();
        assert_eq!(result, json!("do[A-Z]\\w*"));
    }

    #[test]
    fn test_missing_variable_error() {
        env::remove_var("ACTROUTE_TEST_MISSING");

        let resolver = EnvResolver::default();
        let result = resolver.resolve(&json!("${ACTROUTE_TEST_MISSING}"));
        assert!(matches!(result, Err(EnvResolverError::VarNotFound(_))));
    }

    #[test]
    fn test_whitelist() {
        let resolver = EnvResolver::default();
        let result = resolver.resolve(&json!({ "a": ["${HOME}"] }));
        assert!(matches!(
            result,
            Err(EnvResolverError::VarNotWhitelisted(name, _)) if name == "HOME"
        ));

        let resolver = EnvResolver::unrestricted();
        assert!(resolver.resolve(&json!("${ACTROUTE_TEST_ANY:x}")).is_ok());
    }
}
