//! File-based config discovery for CLI use
//!
//! Handles finding and loading kiln configuration files from the filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{ConfigError, Result};
use crate::plugin_config::PluginConfig;

/// File-based configuration discovery
///
/// Searches for kiln configuration files in conventional locations and loads them.
/// This is primarily for CLI use - library users should use `PluginConfig::from_value()` directly.
///
/// # Example
///
/// ```no_run
/// use kiln_config::ConfigDiscovery;
///
/// let discovery = ConfigDiscovery::new(".");
/// let config = discovery.load().unwrap();
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Find a config file in the root directory
    ///
    /// Searches in this order:
    /// 1. kiln.toml
    /// 2. kiln.json
    /// 3. package.json (kiln field)
    pub fn find(&self) -> Option<PathBuf> {
        for name in ["kiln.toml", "kiln.json"] {
            let path = self.root.join(name);
            if path.exists() {
                return Some(path);
            }
        }

        let pkg_path = self.root.join("package.json");
        if pkg_path.exists() {
            if let Ok(content) = fs::read_to_string(&pkg_path) {
                if let Ok(parsed) = serde_json::from_str::<Value>(&content) {
                    if parsed.get("kiln").is_some_and(|kiln| !kiln.is_null()) {
                        return Some(pkg_path);
                    }
                }
            }
        }

        None
    }

    /// Load the discovered config as an untyped value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if no config file is found.
    pub fn load_value(&self) -> Result<Value> {
        let path = self.find().ok_or(ConfigError::NotFound)?;
        tracing::debug!("Loading kiln config from {}", path.display());
        load_value_from(&path)
    }

    /// Load and parse the discovered config.
    pub fn load(&self) -> Result<PluginConfig> {
        PluginConfig::from_value(self.load_value()?)
    }
}

/// Load a config value from a specific file.
pub fn load_value_from(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;

    if path.file_name() == Some(std::ffi::OsStr::new("package.json")) {
        let parsed: Value = serde_json::from_str(&content)
            .map_err(|e| ConfigError::invalid("package.json", format!("Invalid JSON: {e}")))?;

        return match parsed.get("kiln") {
            Some(Value::Null) | None => Err(ConfigError::invalid(
                "kiln",
                "Add a 'kiln' field to your package.json",
            )),
            Some(value) => Ok(value.clone()),
        };
    }

    parse_config_str(path, &content)
}

/// Parse config file contents as TOML or JSON, chosen by `path`'s extension.
pub(crate) fn parse_config_str(path: &Path, content: &str) -> Result<Value> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => {
            let toml_val: toml::Value = toml::from_str(content)
                .map_err(|e| ConfigError::invalid("toml", format!("Invalid TOML syntax: {e}")))?;
            serde_json::to_value(toml_val).map_err(|e| {
                ConfigError::invalid("toml", format!("TOML to JSON conversion failed: {e}"))
            })
        }
        Some("json") => serde_json::from_str(content)
            .map_err(|e| ConfigError::invalid("json", format!("Invalid JSON: {e}"))),
        other => Err(ConfigError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn find_returns_none_when_no_config() {
        let dir = TempDir::new().unwrap();
        let discovery = ConfigDiscovery::new(dir.path());
        assert!(discovery.find().is_none());
    }

    #[test]
    fn load_returns_not_found_when_no_config() {
        let dir = TempDir::new().unwrap();
        let result = ConfigDiscovery::new(dir.path()).load();
        assert!(matches!(result.unwrap_err(), ConfigError::NotFound));
    }

    #[test]
    fn package_json_without_kiln_field_is_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), r#"{ "name": "app" }"#).unwrap();
        assert!(ConfigDiscovery::new(dir.path()).find().is_none());
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kiln.yaml");
        fs::write(&path, "output: out").unwrap();
        assert!(matches!(
            load_value_from(&path),
            Err(ConfigError::UnsupportedFormat(ext)) if ext == "yaml"
        ));
    }
}
