use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a plugin is responsible for.
///
/// Only plugins kiln knows how to build carry a capability. Duplicate
/// detection compares capabilities, so a user's own HTML plugin and the one
/// kiln would add are recognised as the same responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginCapability {
    HtmlGeneration,
    CssExtraction,
    ConstantInjection,
    AssetRelocation,
    BuildLogging,
}

/// A bundler plugin declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "plugin", rename_all = "kebab-case")]
pub enum PluginSpec {
    /// Generates the HTML document for a window
    Html(HtmlPluginOptions),

    /// Extracts imported CSS into separate files
    CssExtract(CssExtractOptions),

    /// Compile-time constant substitution
    Define { definitions: DefineTable },

    /// Fixes native asset references for the chosen target
    AssetRelocatorPatch(AssetRelocatorOptions),

    /// Forwards compiler output to a development log tab
    Logging(LoggingOptions),

    /// Anything else; passed through to the bundler untouched
    Custom(CustomPlugin),
}

impl PluginSpec {
    pub fn capability(&self) -> Option<PluginCapability> {
        match self {
            PluginSpec::Html(_) => Some(PluginCapability::HtmlGeneration),
            PluginSpec::CssExtract(_) => Some(PluginCapability::CssExtraction),
            PluginSpec::Define { .. } => Some(PluginCapability::ConstantInjection),
            PluginSpec::AssetRelocatorPatch(_) => Some(PluginCapability::AssetRelocation),
            PluginSpec::Logging(_) => Some(PluginCapability::BuildLogging),
            PluginSpec::Custom(_) => None,
        }
    }

    pub fn define(definitions: DefineTable) -> Self {
        PluginSpec::Define { definitions }
    }
}

/// True if any plugin in the list carries `capability`.
pub fn has_capability(plugins: &[PluginSpec], capability: PluginCapability) -> bool {
    plugins
        .iter()
        .any(|plugin| plugin.capability() == Some(capability))
}

/// Remove every plugin carrying one of `capabilities`, keeping the order of the rest.
pub fn strip_capabilities(plugins: &mut Vec<PluginSpec>, capabilities: &[PluginCapability]) {
    plugins.retain(|plugin| {
        plugin
            .capability()
            .is_none_or(|capability| !capabilities.contains(&capability))
    });
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlPluginOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Chunks injected into the page
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chunks: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CssExtractOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_filename: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRelocatorOptions {
    pub is_prod: bool,
    pub node_integration: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingOptions {
    pub tab: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomPlugin {
    pub name: String,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub options: Value,
}

/// Symbol name to source-text literal, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefineTable(IndexMap<String, String>);

impl DefineTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a definition, returning the literal it replaced.
    pub fn insert(&mut self, key: impl Into<String>, literal: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), literal.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
