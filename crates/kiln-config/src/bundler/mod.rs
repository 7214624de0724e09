//! Typed bundler configuration shared by every kiln crate.
//!
//! A [`BundlerConfig`] is the bundler-ready object produced for one build
//! (main, one renderer entry, or one preload). Keys kiln computes are typed;
//! anything else a user puts in a base config (`module`, `resolve`, ...) is
//! kept in [`BundlerConfig::extra`] and merged like the typed keys.

mod plugin;

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use path_clean::PathClean;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ConfigError, Result};

pub use plugin::{
    has_capability, strip_capabilities, AssetRelocatorOptions, CssExtractOptions, CustomPlugin,
    DefineTable, HtmlPluginOptions, LoggingOptions, PluginCapability, PluginSpec,
};

/// Bundler configuration for a single build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundlerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<Entry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devtool: Option<Devtool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<BundleMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<NodeOptions>,

    /// Plugins in application order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<PluginSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infrastructure_logging: Option<Value>,

    /// Bundler keys kiln does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BundlerConfig {
    /// Create from a JSON value. `null` yields the empty configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use kiln_config::{BundlerConfig, Target};
    /// use serde_json::json;
    ///
    /// let config = BundlerConfig::from_value(json!({
    ///     "target": "electron-main",
    ///     "module": { "rules": [] }
    /// }))
    /// .unwrap();
    /// assert_eq!(config.target, Some(Target::ElectronMain));
    /// assert!(config.extra.contains_key("module"));
    /// ```
    pub fn from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value).map_err(|e| ConfigError::invalid("bundler config", e))
    }

    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| ConfigError::invalid("bundler config", e))
    }

    /// True when nothing at all has been configured.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Plugins carrying the given capability.
    pub fn plugins_with(&self, capability: PluginCapability) -> impl Iterator<Item = &PluginSpec> {
        self.plugins
            .iter()
            .filter(move |plugin| plugin.capability() == Some(capability))
    }
}

/// Bundle entry: one module, an ordered list, or named chunks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entry {
    Single(String),
    Many(Vec<String>),
    Named(IndexMap<String, Entry>),
}

impl Entry {
    /// Rewrite every module starting with `./` to an absolute path under `root`.
    ///
    /// Anything else (absolute paths, package specifiers, `../` paths) passes
    /// through unchanged.
    pub fn rewrite_relative(self, root: &Path) -> Self {
        match self {
            Entry::Single(module) => Entry::Single(rewrite_module(module, root)),
            Entry::Many(modules) => Entry::Many(
                modules
                    .into_iter()
                    .map(|module| rewrite_module(module, root))
                    .collect(),
            ),
            Entry::Named(chunks) => Entry::Named(
                chunks
                    .into_iter()
                    .map(|(name, entry)| (name, entry.rewrite_relative(root)))
                    .collect(),
            ),
        }
    }

    /// All modules referenced by this entry, in declaration order.
    pub fn modules(&self) -> Vec<&str> {
        match self {
            Entry::Single(module) => vec![module.as_str()],
            Entry::Many(modules) => modules.iter().map(String::as_str).collect(),
            Entry::Named(chunks) => chunks.values().flat_map(Entry::modules).collect(),
        }
    }
}

fn rewrite_module(module: String, root: &Path) -> String {
    if module.starts_with("./") {
        root.join(&module).clean().to_string_lossy().into_owned()
    } else {
        module
    }
}

/// Runtime environment a bundle is compiled for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Target {
    /// Privileged main process with full native APIs
    ElectronMain,
    /// Renderer with native APIs (node integration enabled)
    ElectronRenderer,
    /// Preload bridge: sandboxed but privileged
    ElectronPreload,
    /// Plain sandboxed web page
    Web,
    #[serde(untagged)]
    Other(String),
    /// Several targets at once, e.g. `["web", "es2020"]`
    #[serde(untagged)]
    Many(Vec<String>),
}

/// Source map strategy (`devtool`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Devtool {
    SourceMap,
    EvalSourceMap,
    #[serde(untagged)]
    Other(String),
    /// `devtool: false` turns source maps off
    #[serde(untagged)]
    Flag(bool),
}

impl Devtool {
    pub const DISABLED: Devtool = Devtool::Flag(false);
}

/// Build mode handed to the bundler and to config factories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Production,
    Development,
}

impl Mode {
    pub fn from_prod(is_prod: bool) -> Self {
        if is_prod {
            Mode::Production
        } else {
            Mode::Development
        }
    }

    pub fn is_prod(self) -> bool {
        self == Mode::Production
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Production => "production",
            Mode::Development => "development",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `mode` key of a bundler configuration.
///
/// Unlike [`Mode`] it admits `none`, which a user config may set to opt out
/// of the bundler's mode defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleMode {
    Production,
    Development,
    None,
}

impl From<Mode> for BundleMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Production => BundleMode::Production,
            Mode::Development => BundleMode::Development,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_module_filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_target: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_object: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_path: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Node.js global shims the bundler may inject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeOptions {
    #[serde(rename = "__dirname", default, skip_serializing_if = "Option::is_none")]
    pub dirname: Option<bool>,

    #[serde(rename = "__filename", default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<bool>,
}

impl NodeOptions {
    /// Leave `__dirname`/`__filename` alone; the native runtime provides real ones.
    pub fn native_globals() -> Self {
        Self {
            dirname: Some(false),
            filename: Some(false),
        }
    }
}
