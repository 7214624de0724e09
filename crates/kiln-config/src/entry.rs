//! Renderer entry points.
//!
//! [`EntryPointOptions`] is what a user writes. [`classify`] sorts it into
//! one of three shapes by the presence of `html`, `js` and `preload`, and
//! [`EntryPoint::try_from`] turns it into a validated [`EntryPoint`] whose
//! [`EntryKind`] cannot describe an unknown shape.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{ConfigError, Result};
use crate::source::ConfigSource;

/// An entry point as written in the plugin configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPointOptions {
    /// Unique name; also the define stem and the output directory segment
    pub name: String,

    /// The one entry whose output is not nested under its name
    #[serde(default)]
    pub is_main: bool,

    /// HTML template. Present means the entry is a window.
    #[serde(default)]
    pub html: Option<PathBuf>,

    /// Script module
    #[serde(default)]
    pub js: Option<String>,

    #[serde(default)]
    pub preload: Option<PreloadOptions>,

    /// Overrides `renderer.nodeIntegration` for this entry
    #[serde(default)]
    pub node_integration: Option<bool>,

    /// Extra chunks injected into the generated HTML
    #[serde(default)]
    pub additional_chunks: Vec<String>,

    /// Modules prepended to the entry's bundle (e.g. hot-reload shims)
    #[serde(default)]
    pub prefixed_entries: Vec<String>,
}

impl EntryPointOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn main(mut self) -> Self {
        self.is_main = true;
        self
    }

    pub fn html(mut self, template: impl Into<PathBuf>) -> Self {
        self.html = Some(template.into());
        self
    }

    pub fn js(mut self, module: impl Into<String>) -> Self {
        self.js = Some(module.into());
        self
    }

    pub fn preload(mut self, preload: PreloadOptions) -> Self {
        self.preload = Some(preload);
        self
    }

    pub fn node_integration(mut self, enabled: bool) -> Self {
        self.node_integration = Some(enabled);
        self
    }

    fn has_html(&self) -> bool {
        self.html
            .as_ref()
            .is_some_and(|template| !template.as_os_str().is_empty())
    }

    fn has_js(&self) -> bool {
        self.js.as_deref().is_some_and(|module| !module.is_empty())
    }
}

/// Preload bridge script for an entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreloadOptions {
    pub js: String,

    /// Base config for this preload; falls back to `renderer.config`
    #[serde(default)]
    pub config: Option<ConfigSource>,

    #[serde(default)]
    pub prefixed_entries: Vec<String>,
}

impl PreloadOptions {
    pub fn new(js: impl Into<String>) -> Self {
        Self {
            js: js.into(),
            ..Self::default()
        }
    }

    pub fn with_config(mut self, config: impl Into<ConfigSource>) -> Self {
        self.config = Some(config.into());
        self
    }
}

/// Result of classifying an entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryShape {
    /// Has a UI surface built from HTML (and optionally JS and a preload)
    Window,
    /// JS only: no UI and no preload
    Background,
    /// Only a preload bridge, no visible surface
    PreloadOnly,
    /// None of the above
    Unknown,
}

/// Classify an entry by which of `html`, `js` and `preload` are present.
///
/// Pure; empty paths count as absent.
pub fn classify(options: &EntryPointOptions) -> EntryShape {
    match (options.has_html(), options.has_js(), options.preload.is_some()) {
        (true, _, _) => EntryShape::Window,
        (false, true, _) => EntryShape::Background,
        (false, false, true) => EntryShape::PreloadOnly,
        (false, false, false) => EntryShape::Unknown,
    }
}

/// Validated preload bridge.
#[derive(Debug, Clone)]
pub struct PreloadEntry {
    pub js: String,
    pub config: Option<ConfigSource>,
    pub prefixed_entries: Vec<String>,
}

impl From<PreloadOptions> for PreloadEntry {
    fn from(options: PreloadOptions) -> Self {
        Self {
            js: options.js,
            config: options.config,
            prefixed_entries: options.prefixed_entries,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WindowEntry {
    pub html: PathBuf,
    pub js: Option<String>,
    pub preload: Option<PreloadEntry>,
    pub additional_chunks: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum EntryKind {
    Window(WindowEntry),
    Background { js: String },
    PreloadOnly(PreloadEntry),
}

/// A validated entry point.
#[derive(Debug, Clone)]
pub struct EntryPoint {
    pub name: String,
    pub is_main: bool,
    pub node_integration: Option<bool>,
    pub prefixed_entries: Vec<String>,
    pub kind: EntryKind,
}

impl EntryPoint {
    pub fn shape(&self) -> EntryShape {
        match self.kind {
            EntryKind::Window(_) => EntryShape::Window,
            EntryKind::Background { .. } => EntryShape::Background,
            EntryKind::PreloadOnly(_) => EntryShape::PreloadOnly,
        }
    }

    /// The preload bridge, if this entry builds one.
    pub fn preload(&self) -> Option<&PreloadEntry> {
        match &self.kind {
            EntryKind::Window(window) => window.preload.as_ref(),
            EntryKind::PreloadOnly(preload) => Some(preload),
            EntryKind::Background { .. } => None,
        }
    }

    pub fn is_window(&self) -> bool {
        matches!(self.kind, EntryKind::Window(_))
    }

    /// Script module of the renderer bundle, if any.
    pub fn js(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::Window(window) => window.js.as_deref(),
            EntryKind::Background { js } => Some(js),
            EntryKind::PreloadOnly(_) => None,
        }
    }

    /// Upper-cased name with spaces replaced by underscores.
    pub fn define_stem(&self) -> String {
        self.name.to_uppercase().replace(' ', "_")
    }

    /// Directory segment under `renderer/` and `preload/`; empty for the main entry.
    pub fn output_segment(&self) -> &str {
        if self.is_main {
            ""
        } else {
            &self.name
        }
    }

    /// File the renderer build emits for this entry.
    pub fn bundle_basename(&self) -> &'static str {
        if self.is_window() {
            "index.html"
        } else {
            "index.js"
        }
    }
}

impl TryFrom<EntryPointOptions> for EntryPoint {
    type Error = ConfigError;

    fn try_from(options: EntryPointOptions) -> Result<Self> {
        if options.name.trim().is_empty() {
            return Err(ConfigError::EmptyEntryName);
        }

        let kind = match classify(&options) {
            EntryShape::Window => EntryKind::Window(WindowEntry {
                html: options.html.clone().unwrap_or_default(),
                js: options.js.clone().filter(|js| !js.is_empty()),
                preload: options.preload.clone().map(PreloadEntry::from),
                additional_chunks: options.additional_chunks.clone(),
            }),
            EntryShape::Background => {
                if options.preload.is_some() {
                    return Err(ConfigError::PreloadWithoutWindow { name: options.name });
                }
                EntryKind::Background {
                    js: options.js.clone().unwrap_or_default(),
                }
            }
            EntryShape::PreloadOnly => match options.preload.clone() {
                Some(preload) => EntryKind::PreloadOnly(preload.into()),
                None => return Err(ConfigError::UnknownEntryPointType { name: options.name }),
            },
            EntryShape::Unknown => {
                return Err(ConfigError::UnknownEntryPointType { name: options.name });
            }
        };

        Ok(Self {
            name: options.name,
            is_main: options.is_main,
            node_integration: options.node_integration,
            prefixed_entries: options.prefixed_entries,
            kind,
        })
    }
}

/// Validate a whole entry list.
///
/// Rejects duplicate names and a second `isMain` entry, since both would
/// make two builds write to the same output directory. Names that differ
/// but share a define stem (`main window` and `MAIN_WINDOW`) are rejected
/// too.
pub fn parse_entry_points(options: Vec<EntryPointOptions>) -> Result<Vec<EntryPoint>> {
    let mut seen = HashSet::with_capacity(options.len());
    let mut stems: HashMap<String, String> = HashMap::with_capacity(options.len());
    let mut main: Option<String> = None;
    let mut entries = Vec::with_capacity(options.len());

    for option in options {
        let entry = EntryPoint::try_from(option)?;

        if !seen.insert(entry.name.clone()) {
            return Err(ConfigError::DuplicateEntryName { name: entry.name });
        }

        let stem = entry.define_stem();
        if let Some(first) = stems.get(&stem) {
            return Err(ConfigError::DefineKeyCollision {
                first: first.clone(),
                second: entry.name,
                stem,
            });
        }
        stems.insert(stem, entry.name.clone());

        if entry.is_main {
            if let Some(first) = &main {
                return Err(ConfigError::MultipleMainEntries {
                    first: first.clone(),
                    second: entry.name,
                });
            }
            main = Some(entry.name.clone());
        }

        entries.push(entry);
    }

    if main.is_none() && !entries.is_empty() {
        tracing::debug!("No entry point is marked isMain; every entry is nested under its name");
    }

    Ok(entries)
}
