//! # Framework Configuration
//!
//! [`FrameworkConfig`] is read from a TOML file and then overridden by
//! environment variables:
//!
//! | Variable                     | Field               |
//! |------------------------------|---------------------|
//! | `BRRTMVC_DEV`                | `dev`               |
//! | `BRRTMVC_ROUTES`             | `routes_file`       |
//! | `BRRTMVC_DEFAULT_HANDLER`    | `default_handler`   |
//! | `BRRTMVC_NOT_FOUND_HANDLER`  | `not_found_handler` |
//! | `BRRTMVC_TEMPLATES`          | `templates_dir`     |
//! | `BRRTMVC_METHOD_SUFFIX`      | `method_suffix`     |
//! | `BRRTMVC_DEFAULT_METHOD`     | `default_method`    |
//!
//! ```toml
//! name = "shop"
//! dev = true
//! routes_file = "config/routes.yaml"
//! not_found_handler = "Errors:notFound"
//! ```

use crate::handler_spec::{ParseOptions, DEFAULT_METHOD, DEFAULT_METHOD_SUFFIX};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Handler used by the CLI router when no token is given.
pub const DEFAULT_HANDLER: &str = "Index";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameworkConfig {
    /// Project name handed to controllers
    pub name: String,
    /// Development mode: error responses carry diagnostic detail
    pub dev: bool,
    /// Declarative routes file (YAML, JSON or TOML)
    pub routes_file: Option<PathBuf>,
    /// Directory of templates for the built-in renderer
    pub templates_dir: Option<PathBuf>,
    /// CLI handler when no token is supplied
    pub default_handler: String,
    /// Handler dispatched instead of answering `404`
    pub not_found_handler: Option<String>,
    /// Suffix appended to every method name
    pub method_suffix: String,
    /// Method used when a notation names only a class
    pub default_method: String,
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            name: "app".to_string(),
            dev: false,
            routes_file: None,
            templates_dir: None,
            default_handler: DEFAULT_HANDLER.to_string(),
            not_found_handler: None,
            method_suffix: DEFAULT_METHOD_SUFFIX.to_string(),
            default_method: DEFAULT_METHOD.to_string(),
        }
    }
}

impl FrameworkConfig {
    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).context("invalid framework configuration")
    }

    /// Read a TOML file without applying environment overrides
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Defaults overridden by the environment
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Read `path` if given, then apply environment overrides
    pub fn load_with_env(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(p) => Self::load(p)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("BRRTMVC_DEV") {
            self.dev = parse_bool(&v);
        }
        if let Some(v) = lookup("BRRTMVC_ROUTES") {
            self.routes_file = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("BRRTMVC_TEMPLATES") {
            self.templates_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("BRRTMVC_DEFAULT_HANDLER") {
            self.default_handler = v;
        }
        if let Some(v) = lookup("BRRTMVC_NOT_FOUND_HANDLER") {
            self.not_found_handler = if v.is_empty() { None } else { Some(v) };
        }
        if let Some(v) = lookup("BRRTMVC_METHOD_SUFFIX") {
            self.method_suffix = v;
        }
        if let Some(v) = lookup("BRRTMVC_DEFAULT_METHOD") {
            self.default_method = v;
        }
    }

    /// Handler-notation parse options derived from this configuration
    #[must_use]
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions::new(&self.method_suffix, &self.default_method)
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = FrameworkConfig::default();
        assert!(!config.dev);
        assert_eq!(config.method_suffix, "Action");
        assert_eq!(config.default_method, "default");
        assert_eq!(config.default_handler, "Index");
        assert!(config.not_found_handler.is_none());
    }

    #[test]
    fn test_partial_toml() {
        let config = FrameworkConfig::from_toml_str(
            r#"
            name = "shop"
            dev = true
            method_suffix = "Cmd"
            not_found_handler = "Errors:notFound"
            "#,
        )
        .unwrap();
        assert_eq!(config.name, "shop");
        assert!(config.dev);
        assert_eq!(config.method_suffix, "Cmd");
        assert_eq!(config.default_method, "default");
        assert_eq!(config.not_found_handler.as_deref(), Some("Errors:notFound"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(FrameworkConfig::from_toml_str("colour = \"blue\"").is_err());
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "routes_file = \"config/routes.yaml\"").unwrap();
        let config = FrameworkConfig::load(file.path()).unwrap();
        assert_eq!(config.routes_file, Some(PathBuf::from("config/routes.yaml")));

        let err = FrameworkConfig::load(Path::new("/definitely/missing.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("BRRTMVC_DEV", "yes"),
            ("BRRTMVC_DEFAULT_HANDLER", "Help"),
            ("BRRTMVC_NOT_FOUND_HANDLER", ""),
            ("BRRTMVC_DEFAULT_METHOD", "index"),
        ]
        .into_iter()
        .collect();
        let mut config = FrameworkConfig {
            not_found_handler: Some("Errors".into()),
            ..FrameworkConfig::default()
        };
        config.apply_overrides(|k| vars.get(k).map(|v| (*v).to_string()));
        assert!(config.dev);
        assert_eq!(config.default_handler, "Help");
        assert!(config.not_found_handler.is_none());

        let options = config.parse_options();
        assert_eq!(options.default_method, "index");
        assert_eq!(options.method_suffix, "Action");
    }
}
