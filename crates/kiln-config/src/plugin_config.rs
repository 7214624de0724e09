//! The plugin configuration root.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::entry::{parse_entry_points, EntryPoint, EntryPointOptions};
use crate::error::{ConfigError, Result};
use crate::source::ConfigSource;

/// Output directory name, relative to the project root.
pub const DEFAULT_OUTPUT: &str = ".webpack";

/// Dev server port when none is configured.
pub const DEFAULT_PORT: u16 = 3000;

/// Log viewer port when none is configured.
pub const DEFAULT_LOGGER_PORT: u16 = 9000;

/// Content security policy sent by the dev server when none is configured.
pub const DEFAULT_CSP: &str = "default-src 'self' 'unsafe-inline' data:; script-src 'self' 'unsafe-eval' 'unsafe-inline' data:";

/// Root configuration handed to the generator and the pipeline.
///
/// # Example
///
/// ```
/// use kiln_config::PluginConfig;
/// use serde_json::json;
///
/// let config = PluginConfig::from_value(json!({
///     "mainConfig": { "entry": "./src/main.ts" },
///     "renderer": {
///         "config": "./webpack.renderer.json",
///         "entryPoints": [
///             { "name": "main_window", "html": "./src/index.html", "js": "./src/renderer.ts" }
///         ]
///     }
/// }))
/// .unwrap();
///
/// assert_eq!(config.output, ".webpack");
/// assert_eq!(config.port().unwrap(), 3000);
/// assert_eq!(config.renderer.entry_points().unwrap().len(), 1);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    #[serde(default = "default_output")]
    pub output: String,

    /// Base config for the main process; must declare an `entry`
    #[serde(default)]
    pub main_config: ConfigSource,

    #[serde(default)]
    pub renderer: RendererOptions,

    /// User overrides merged over the dev server defaults
    #[serde(default)]
    pub dev_server: Option<Value>,

    #[serde(default)]
    pub dev_content_security_policy: Option<String>,

    /// Write `stats-*.json` for the main process build
    #[serde(default)]
    pub json_stats: bool,

    /// Keep `*.js.map` files in the packaged application
    #[serde(default)]
    pub package_source_maps: bool,

    #[serde(default)]
    pub port: Option<u32>,

    #[serde(default)]
    pub logger_port: Option<u32>,
}

fn default_output() -> String {
    DEFAULT_OUTPUT.to_string()
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            main_config: ConfigSource::default(),
            renderer: RendererOptions::default(),
            dev_server: None,
            dev_content_security_policy: None,
            json_stats: false,
            package_source_maps: false,
            port: None,
            logger_port: None,
        }
    }
}

impl PluginConfig {
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::invalid("plugin config", e))
    }

    /// Validated dev server port.
    pub fn port(&self) -> Result<u16> {
        self.port.map_or(Ok(DEFAULT_PORT), validate_port)
    }

    /// Validated log viewer port.
    pub fn logger_port(&self) -> Result<u16> {
        self.logger_port.map_or(Ok(DEFAULT_LOGGER_PORT), validate_port)
    }

    pub fn content_security_policy(&self) -> &str {
        self.dev_content_security_policy
            .as_deref()
            .unwrap_or(DEFAULT_CSP)
    }
}

/// Renderer section of the plugin configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RendererOptions {
    /// Base config shared by every renderer and preload build
    #[serde(default)]
    pub config: ConfigSource,

    /// `None` when the key is missing or is not a list
    #[serde(default, deserialize_with = "entry_points_if_list")]
    pub entry_points: Option<Vec<EntryPointOptions>>,

    /// Default for entries that do not set `nodeIntegration`
    #[serde(default)]
    pub node_integration: bool,

    #[serde(default)]
    pub json_stats: bool,
}

impl RendererOptions {
    /// Validated entry points in configuration order.
    ///
    /// Fails before looking at any entry if the list is missing, not a
    /// list, or empty.
    pub fn entry_points(&self) -> Result<Vec<EntryPoint>> {
        match &self.entry_points {
            Some(options) if !options.is_empty() => parse_entry_points(options.clone()),
            _ => Err(ConfigError::MissingEntryPoints),
        }
    }
}

fn entry_points_if_list<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<EntryPointOptions>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        value @ Value::Array(_) => serde_json::from_value(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// Check that `port` is an unprivileged TCP port.
pub fn validate_port(port: u32) -> Result<u16> {
    if port < 1024 {
        return Err(ConfigError::PrivilegedPort(port));
    }
    u16::try_from(port).map_err(|_| ConfigError::InvalidPort(port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_apply_to_an_empty_object() {
        let config = PluginConfig::from_value(json!({})).unwrap();
        assert_eq!(config.output, DEFAULT_OUTPUT);
        assert_eq!(config.port().unwrap(), DEFAULT_PORT);
        assert_eq!(config.logger_port().unwrap(), DEFAULT_LOGGER_PORT);
        assert_eq!(config.content_security_policy(), DEFAULT_CSP);
        assert!(!config.renderer.node_integration);
    }

    #[test]
    fn port_boundaries() {
        assert!(matches!(validate_port(1023), Err(ConfigError::PrivilegedPort(1023))));
        assert_eq!(validate_port(1024).unwrap(), 1024);
        assert_eq!(validate_port(65535).unwrap(), 65535);
        assert!(matches!(validate_port(65536), Err(ConfigError::InvalidPort(65536))));
    }

    #[test]
    fn port_messages() {
        assert_eq!(
            validate_port(80).unwrap_err().to_string(),
            "Cannot specify port (80) below 1024, as they are privileged"
        );
        assert_eq!(
            validate_port(70000).unwrap_err().to_string(),
            "Port specified (70000) is not a valid TCP port."
        );
    }

    #[test]
    fn entry_points_that_are_not_a_list_count_as_missing() {
        let config = PluginConfig::from_value(json!({
            "renderer": { "entryPoints": { "name": "oops" } }
        }))
        .unwrap();
        assert!(config.renderer.entry_points.is_none());
        assert!(matches!(
            config.renderer.entry_points(),
            Err(ConfigError::MissingEntryPoints)
        ));
    }

    #[test]
    fn empty_entry_point_list_is_missing() {
        let config = PluginConfig::from_value(json!({ "renderer": { "entryPoints": [] } })).unwrap();
        assert!(matches!(
            config.renderer.entry_points(),
            Err(ConfigError::MissingEntryPoints)
        ));
    }

    #[test]
    fn config_sources_accept_paths_and_objects() {
        let config = PluginConfig::from_value(json!({
            "mainConfig": "./webpack.main.json",
            "renderer": { "config": { "module": { "rules": [] } } }
        }))
        .unwrap();
        assert!(matches!(config.main_config, ConfigSource::Path(_)));
        assert!(matches!(config.renderer.config, ConfigSource::Inline(_)));
    }
}
