//! Compile-time constants that let application code find its own bundles.
//!
//! Every entry contributes `<NAME>_WEBPACK_ENTRY` and
//! `<NAME>_PRELOAD_WEBPACK_ENTRY`, each also emitted as
//! `process.env.<KEY>` with the same literal. Values are source text: a
//! quoted URL or path in development, a runtime path expression in
//! production, or `undefined` for entries without a preload.

use kiln_config::{DefineTable, EntryPoint, Mode};

use crate::layout::{OutputLayout, ProcessKind};

const ENTRY_SUFFIX: &str = "_WEBPACK_ENTRY";
const PRELOAD_SUFFIX: &str = "_PRELOAD_WEBPACK_ENTRY";

/// Literal used for entries that have no preload script.
pub const NO_PRELOAD: &str = "undefined";

/// Symbol naming an entry's renderer bundle.
pub fn entry_key(entry: &EntryPoint) -> String {
    format!("{}{ENTRY_SUFFIX}", entry.define_stem())
}

/// Symbol naming an entry's preload script.
pub fn preload_key(entry: &EntryPoint) -> String {
    format!("{}{PRELOAD_SUFFIX}", entry.define_stem())
}

/// Builds the define table for one build mode.
#[derive(Debug, Clone, Copy)]
pub struct DefineTableBuilder<'a> {
    layout: &'a OutputLayout,
    mode: Mode,
    port: u16,
}

impl<'a> DefineTableBuilder<'a> {
    pub fn new(layout: &'a OutputLayout, mode: Mode, port: u16) -> Self {
        Self { layout, mode, port }
    }

    /// Define table for `entries`.
    ///
    /// `in_renderer_dir` selects `renderer` (from the main bundle) or `.`
    /// (from a renderer bundle) as the directory the production expression
    /// steps into.
    pub fn build(&self, entries: &[EntryPoint], in_renderer_dir: bool) -> DefineTable {
        let mut table = DefineTable::new();
        for entry in entries {
            let entry_value = self.entry_value(entry, in_renderer_dir);
            insert_both(&mut table, entry_key(entry), entry_value);
            insert_both(&mut table, preload_key(entry), self.preload_value(entry));
        }
        table
    }

    /// Location of the entry's renderer bundle.
    pub fn entry_value(&self, entry: &EntryPoint, in_renderer_dir: bool) -> String {
        let basename = entry.bundle_basename();

        if self.mode.is_prod() {
            let dir = if in_renderer_dir {
                ProcessKind::Renderer.as_str()
            } else {
                "."
            };
            let args = runtime_resolve_args(&["..", dir, entry.output_segment(), basename]);
            return format!("`file://${{require('path').resolve(__dirname, {args})}}`");
        }

        let mut url = format!("http://localhost:{}", self.port);
        if !entry.is_main {
            url.push('/');
            url.push_str(&entry.name);
        }
        if basename != "index.html" {
            url.push('/');
            url.push_str(basename);
        }
        quote(&url)
    }

    /// Location of the entry's preload script, or [`NO_PRELOAD`].
    pub fn preload_value(&self, entry: &EntryPoint) -> String {
        if entry.preload().is_none() {
            return NO_PRELOAD.to_string();
        }

        if self.mode.is_prod() {
            let args = runtime_resolve_args(&[
                "..",
                ProcessKind::Preload.as_str(),
                entry.output_segment(),
                OutputLayout::PRELOAD_FILENAME,
            ]);
            return format!("require('path').resolve(__dirname, {args})");
        }

        let path = self
            .layout
            .preload_dir(entry)
            .join(OutputLayout::PRELOAD_FILENAME);
        quote(&path.to_string_lossy())
    }
}

fn insert_both(table: &mut DefineTable, key: String, value: String) {
    let namespaced = format!("process.env.{key}");
    table.insert(key, value.clone());
    table.insert(namespaced, value);
}

/// Quoted, comma-separated `path.resolve` arguments; empty segments are skipped.
fn runtime_resolve_args(segments: &[&str]) -> String {
    segments
        .iter()
        .filter(|segment| !segment.is_empty())
        .map(|segment| quote(segment))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Single-quoted string literal safe to embed in generated source.
fn quote(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}
