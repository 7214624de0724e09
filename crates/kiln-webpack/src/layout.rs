//! On-disk layout of a build.
//!
//! ```text
//! <output>/main/index.js
//! <output>/renderer/[<entry>/]index.js    (+ index.html, index.css for windows)
//! <output>/preload/[<entry>/]preload.js
//! ```
//!
//! The main entry is never nested under its own name; every other entry is.

use std::fmt;
use std::path::{Path, PathBuf};

use kiln_config::{EntryPoint, Mode};
use path_clean::PathClean;

/// Which process a bundle is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessKind {
    Main,
    Renderer,
    Preload,
}

impl ProcessKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProcessKind::Main => "main",
            ProcessKind::Renderer => "renderer",
            ProcessKind::Preload => "preload",
        }
    }
}

impl fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output paths and filename patterns for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    project_dir: PathBuf,
    webpack_dir: PathBuf,
    output: String,
}

impl OutputLayout {
    pub const MAIN_FILENAME: &'static str = "index.js";
    pub const PRELOAD_FILENAME: &'static str = "preload.js";
    pub const ASSET_MODULE_FILENAME: &'static str = "assets/[contenthash][ext][query]";

    /// `output` is resolved against `project_dir`.
    pub fn new(project_dir: impl Into<PathBuf>, output: impl Into<String>) -> Self {
        let project_dir = project_dir.into();
        let output = output.into();
        let webpack_dir = project_dir.join(&output).clean();
        Self {
            project_dir,
            webpack_dir,
            output,
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Absolute output root.
    pub fn webpack_dir(&self) -> &Path {
        &self.webpack_dir
    }

    /// Output directory name as configured.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn process_dir(&self, kind: ProcessKind) -> PathBuf {
        self.webpack_dir.join(kind.as_str())
    }

    pub fn main_dir(&self) -> PathBuf {
        self.process_dir(ProcessKind::Main)
    }

    pub fn renderer_dir(&self) -> PathBuf {
        self.process_dir(ProcessKind::Renderer)
    }

    /// `preload/` for the main entry, `preload/<name>/` otherwise.
    pub fn preload_dir(&self, entry: &EntryPoint) -> PathBuf {
        join_segment(self.process_dir(ProcessKind::Preload), entry.output_segment())
    }

    /// Renderer bundle filename; `[name]` is substituted by the bundler.
    pub fn renderer_filename(&self, entry: &EntryPoint) -> String {
        format!("{}index.js", name_prefix(entry, "[name]/"))
    }

    pub fn html_filename(&self, entry: &EntryPoint) -> String {
        format!("{}index.html", name_prefix(entry, &format!("{}/", entry.name)))
    }

    pub fn css_filename(&self, entry: &EntryPoint) -> String {
        format!("{}index.css", name_prefix(entry, &format!("{}/", entry.name)))
    }

    /// Chunks are content-hashed in production and stable in development.
    pub fn chunk_filename(mode: Mode) -> &'static str {
        if mode.is_prod() {
            "[name].[contenthash:8].chunk.js"
        } else {
            "[name].chunk.js"
        }
    }

    pub fn css_chunk_filename(mode: Mode) -> &'static str {
        if mode.is_prod() {
            "[name].[contenthash:8].chunk.css"
        } else {
            "[name].chunk.css"
        }
    }

    /// `<output>/<kind>/stats-<suffix>.json`
    pub fn stats_file(&self, kind: ProcessKind, suffix: &str) -> PathBuf {
        self.process_dir(kind).join(format!("stats-{suffix}.json"))
    }
}

fn name_prefix(entry: &EntryPoint, nested: &str) -> String {
    if entry.is_main {
        String::new()
    } else {
        nested.to_string()
    }
}

fn join_segment(base: PathBuf, segment: &str) -> PathBuf {
    if segment.is_empty() {
        base
    } else {
        base.join(segment)
    }
}
