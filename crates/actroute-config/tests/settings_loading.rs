use actroute_config::{ConfigError, FileFormat, SettingsLoader, SETTINGS_PATH_VAR};
use actroute_core::{
    ActionConfig, ActionProxyFactory, ActionRegistry, PackageConfig, RegistryHandle,
    ResolverSettings,
};
use std::env;
use std::fs;
use tempfile::tempdir;

#[test]
fn yaml_settings_file_is_loaded() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("resolver.yaml");
    fs::write(
        &path,
        r#"
default_namespace: /
namespace_fallback: false
method_name_pattern: "[a-z]+"
strict_by_default: false
"#,
    )
    .unwrap();

    let settings = SettingsLoader::new().without_env_overrides().load_from_file(&path).unwrap();
    assert_eq!(
        settings,
        ResolverSettings {
            default_namespace: "/".to_string(),
            namespace_fallback: false,
            method_name_pattern: "[a-z]+".to_string(),
            strict_by_default: false,
        }
    );
}

#[test]
fn partial_json_keeps_defaults() {
    let settings = SettingsLoader::new()
        .without_env_overrides()
        .parse_content(r#"{"strict_by_default": false}"#, FileFormat::Json)
        .unwrap();

    assert!(!settings.strict_by_default);
    assert!(settings.namespace_fallback);
    assert_eq!(settings.method_name_pattern, ResolverSettings::default().method_name_pattern);
}

#[test]
fn document_references_are_interpolated() {
    env::set_var("ACTROUTE_IT_ROOT_NAMESPACE", "/shop");
    env::remove_var("ACTROUTE_IT_FALLBACK");

    let settings = SettingsLoader::new()
        .without_env_overrides()
        .parse_content(
            "default_namespace: ${ACTROUTE_IT_ROOT_NAMESPACE}\n\
             namespace_fallback: ${ACTROUTE_IT_FALLBACK:false}\n",
            FileFormat::Yaml,
        )
        .unwrap();

    assert_eq!(settings.default_namespace, "/shop");
    assert!(!settings.namespace_fallback);

    env::remove_var("ACTROUTE_IT_ROOT_NAMESPACE");
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("resolver.ini");
    fs::write(&path, "strict_by_default=false").unwrap();

    let err = SettingsLoader::new().load_from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat(ext) if ext == "ini"));
}

#[test]
fn malformed_yaml_is_reported() {
    let err = SettingsLoader::new()
        .without_env_overrides()
        .parse_content("namespace_fallback: [", FileFormat::Yaml)
        .unwrap_err();
    assert!(matches!(err, ConfigError::Yaml(_)));
}

// All process-wide ACTROUTE_* overrides are exercised in this one test so
// parallel tests never observe them.
#[test]
fn environment_overrides_and_default_loading() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("resolver.json");
    fs::write(&path, r#"{"default_namespace": "/file", "strict_by_default": true}"#).unwrap();

    env::set_var("ACTROUTE_STRICT_BY_DEFAULT", "off");
    env::set_var(SETTINGS_PATH_VAR, &path);

    let settings = SettingsLoader::new().load_default().unwrap();
    assert_eq!(settings.default_namespace, "/file");
    assert!(!settings.strict_by_default);

    env::remove_var(SETTINGS_PATH_VAR);
    let settings = SettingsLoader::new().load_default().unwrap();
    assert_eq!(settings.default_namespace, "");
    assert!(!settings.strict_by_default);

    env::set_var("ACTROUTE_STRICT_BY_DEFAULT", "sometimes");
    let err = SettingsLoader::new().load_from_env().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));

    env::set_var(SETTINGS_PATH_VAR, dir.path().join("missing.yaml"));
    let err = SettingsLoader::new().load_default().unwrap_err();
    assert!(err.to_string().starts_with("failed to load settings from"));

    env::remove_var(SETTINGS_PATH_VAR);
    env::remove_var("ACTROUTE_STRICT_BY_DEFAULT");
}

#[tokio::test]
async fn loaded_settings_drive_the_proxy_factory() {
    let settings = SettingsLoader::new()
        .without_env_overrides()
        .parse_content("namespace_fallback: false\n", FileFormat::Yaml)
        .unwrap();

    let registry = ActionRegistry::builder()
        .package(PackageConfig::new("root", "").with_strict_method_invocation(false))
        .action(ActionConfig::new("Home", "root"))
        .build()
        .unwrap();
    let factory = ActionProxyFactory::new(settings, RegistryHandle::new(registry)).unwrap();

    let request = factory.request("/shop", "Home");
    assert!(request.strict);

    struct Unused;
    #[async_trait::async_trait]
    impl actroute_core::ActionInvocation for Unused {
        async fn invoke(
            &self,
            _action: &actroute_core::ResolutionResult,
        ) -> actroute_core::RouteResult<String> {
            Ok("unused".to_string())
        }
    }

    let mut proxy = factory.create_proxy_for(std::sync::Arc::new(Unused), request).await;
    assert!(proxy.prepare().is_err());
}
