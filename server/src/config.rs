//! Configuration management

use ratt_core::{Error, Result, RootBehavior, ServiceConfig};
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// What `/` does: redirect to the login page or render the home page
    #[serde(default)]
    pub root_behavior: RootBehavior,

    /// Id of the element the application is mounted into
    #[serde(default = "default_mount_target")]
    pub mount_target: String,

    /// Host document replacing the built-in index page
    #[serde(default)]
    pub index_html: Option<String>,

    /// Directory served under `/static`
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Backend project the services connect to
    #[serde(default)]
    pub services: ServiceConfig,
}

fn default_mount_target() -> String {
    "app".to_string()
}

fn default_static_dir() -> String {
    "server/static".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_behavior: RootBehavior::default(),
            mount_target: default_mount_target(),
            index_html: None,
            static_dir: default_static_dir(),
            services: ServiceConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file or environment
    pub fn load(path: Option<&str>) -> Result<Self> {
        if let Some(p) = path {
            Self::load_from_file(p)
        } else {
            Self::load_from_env()
        }
    }

    /// Load from configuration file
    fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Load from environment variables
    fn load_from_env() -> Result<Self> {
        Self::from_lookup(get_secret)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();

        let root_behavior = match lookup("RATT_ROOT_BEHAVIOR") {
            Some(value) => value.parse()?,
            None => defaults.root_behavior,
        };

        let mut services = ServiceConfig {
            api_key: lookup("FIREBASE_API_KEY").unwrap_or_default(),
            auth_domain: lookup("FIREBASE_AUTH_DOMAIN").unwrap_or_default(),
            project_id: lookup("FIREBASE_PROJECT_ID").unwrap_or_default(),
            storage_bucket: lookup("FIREBASE_STORAGE_BUCKET").unwrap_or_default(),
            messaging_sender_id: lookup("FIREBASE_MESSAGING_SENDER_ID").unwrap_or_default(),
            app_id: lookup("FIREBASE_APP_ID").unwrap_or_default(),
            measurement_id: lookup("FIREBASE_MEASUREMENT_ID"),
            ..ServiceConfig::default()
        };

        // Endpoint overrides (local emulators)
        if let Some(auth) = lookup("FIREBASE_AUTH_ENDPOINT") {
            services.endpoints.auth = auth;
        }
        if let Some(firestore) = lookup("FIREBASE_FIRESTORE_ENDPOINT") {
            services.endpoints.firestore = firestore;
        }
        if let Some(storage) = lookup("FIREBASE_STORAGE_ENDPOINT") {
            services.endpoints.storage = storage;
        }

        Ok(Config {
            root_behavior,
            mount_target: lookup("RATT_MOUNT_TARGET").unwrap_or(defaults.mount_target),
            index_html: lookup("RATT_INDEX_HTML"),
            static_dir: lookup("STATIC_DIR").unwrap_or(defaults.static_dir),
            services,
        })
    }
}

/// Get secret from environment variable or file
///
/// Supports both direct environment variables and file-based secrets (Docker/Kubernetes pattern).
/// If `VAR_NAME` is not found, tries `VAR_NAME_FILE` which should point to a file containing the secret.
pub fn get_secret(var_name: &str) -> Option<String> {
    // Try environment variable first
    if let Ok(value) = std::env::var(var_name) {
        return Some(value);
    }

    // Try file-based secret (Docker secrets / Kubernetes)
    let file_var = format!("{}_FILE", var_name);
    if let Ok(path) = std::env::var(&file_var) {
        if let Ok(contents) = std::fs::read_to_string(&path) {
            return Some(contents.trim().to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_env_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.root_behavior, RootBehavior::Redirect);
        assert_eq!(config.mount_target, "app");
        assert_eq!(config.static_dir, "server/static");
        assert!(config.index_html.is_none());
        assert_eq!(config.services, ServiceConfig::default());
    }

    #[test]
    fn test_env_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("RATT_ROOT_BEHAVIOR", "home"),
            ("RATT_MOUNT_TARGET", "root"),
            ("FIREBASE_API_KEY", "key"),
            ("FIREBASE_PROJECT_ID", "ratt-805fc"),
            ("FIREBASE_STORAGE_BUCKET", "ratt-805fc.firebasestorage.app"),
            ("FIREBASE_FIRESTORE_ENDPOINT", "http://localhost:8081/v1"),
        ]))
        .unwrap();

        assert_eq!(config.root_behavior, RootBehavior::Home);
        assert_eq!(config.mount_target, "root");
        assert_eq!(config.services.api_key, "key");
        assert_eq!(config.services.project_id, "ratt-805fc");
        assert!(config.services.measurement_id.is_none());
        assert_eq!(config.services.endpoints.firestore, "http://localhost:8081/v1");
    }

    #[test]
    fn test_env_invalid_root_behavior() {
        let result = Config::from_lookup(lookup_from(&[("RATT_ROOT_BEHAVIOR", "landing")]));
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_toml_config() {
        let config = Config::from_toml(
            r#"
            root_behavior = "home"
            index_html = "public/index.html"

            [services]
            apiKey = "key"
            project_id = "ratt-805fc"
            measurement_id = "G-H1V8MXB28C"
            "#,
        )
        .unwrap();

        assert_eq!(config.root_behavior, RootBehavior::Home);
        assert_eq!(config.mount_target, "app");
        assert_eq!(config.index_html.as_deref(), Some("public/index.html"));
        assert_eq!(config.services.api_key, "key");
        assert_eq!(config.services.measurement_id.as_deref(), Some("G-H1V8MXB28C"));
    }

    #[test]
    fn test_toml_and_env_accept_same_root_spelling() {
        let from_file = Config::from_toml(r#"root_behavior = "Home""#).unwrap();
        let from_env = Config::from_lookup(lookup_from(&[("RATT_ROOT_BEHAVIOR", "Home")])).unwrap();

        assert_eq!(from_file.root_behavior, RootBehavior::Home);
        assert_eq!(from_env.root_behavior, from_file.root_behavior);
    }

    #[test]
    fn test_toml_invalid_root_behavior() {
        let result = Config::from_toml(r#"root_behavior = "landing""#);
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = Config::load(Some("/nonexistent/ratt.toml"));
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }
}
