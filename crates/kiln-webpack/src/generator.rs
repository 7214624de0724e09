//! Bundler configurations for the main process, renderers and preloads.
//!
//! Every configuration is computed defaults merged with the user's base
//! config, defaults first. Preload builds additionally force their target
//! in a final layer so no base config can override it.

use std::sync::Arc;

use futures::future::try_join_all;
use kiln_config::{
    has_capability, merge_configs, strip_capabilities, AssetRelocatorOptions, BundlerConfig,
    ConfigError, ConfigResolver, CssExtractOptions, DefineTable, Devtool, Entry, EntryKind,
    EntryPoint, HtmlPluginOptions, ModuleLoader, Mode, NodeOptions, OutputOptions,
    PluginCapability, PluginConfig, PluginSpec, Target, WindowEntry,
};

use crate::defines::DefineTableBuilder;
use crate::error::Result;
use crate::layout::OutputLayout;

/// Produces bundler configurations for one project and build mode.
///
/// Holds no build state; every call starts from the plugin configuration
/// and the user's base configs.
#[derive(Debug, Clone)]
pub struct ConfigGenerator {
    config: Arc<PluginConfig>,
    layout: OutputLayout,
    mode: Mode,
    port: u16,
    resolver: ConfigResolver,
}

impl ConfigGenerator {
    pub fn new(
        config: impl Into<Arc<PluginConfig>>,
        project_dir: impl Into<std::path::PathBuf>,
        mode: Mode,
        port: u16,
    ) -> Self {
        let project_dir = project_dir.into();
        let resolver = ConfigResolver::new(project_dir.clone(), mode);
        Self::with_resolver(config, project_dir, mode, port, resolver)
    }

    /// Like [`ConfigGenerator::new`] but loads path-referenced configs through `loader`.
    pub fn with_loader(
        config: impl Into<Arc<PluginConfig>>,
        project_dir: impl Into<std::path::PathBuf>,
        mode: Mode,
        port: u16,
        loader: Arc<dyn ModuleLoader>,
    ) -> Self {
        let project_dir = project_dir.into();
        let resolver = ConfigResolver::with_loader(project_dir.clone(), mode, loader);
        Self::with_resolver(config, project_dir, mode, port, resolver)
    }

    fn with_resolver(
        config: impl Into<Arc<PluginConfig>>,
        project_dir: std::path::PathBuf,
        mode: Mode,
        port: u16,
        resolver: ConfigResolver,
    ) -> Self {
        let config = config.into();
        let layout = OutputLayout::new(project_dir, config.output.clone());
        tracing::debug!("Config mode: {}", mode);
        Self {
            config,
            layout,
            mode,
            port,
            resolver,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    pub fn plugin_config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn renderer_source_map(&self) -> Devtool {
        if self.mode.is_prod() {
            Devtool::SourceMap
        } else {
            Devtool::EvalSourceMap
        }
    }

    /// Node integration for an entry: its own setting, else the renderer default.
    pub fn node_integration(&self, entry: &EntryPoint) -> bool {
        entry
            .node_integration
            .unwrap_or(self.config.renderer.node_integration)
    }

    pub fn renderer_target(&self, entry: &EntryPoint) -> Target {
        if self.node_integration(entry) {
            Target::ElectronRenderer
        } else {
            Target::Web
        }
    }

    /// Define table for every configured entry point.
    ///
    /// Fails before computing anything if `renderer.entryPoints` is missing
    /// or not a list.
    pub fn get_defines(&self, in_renderer_dir: bool) -> Result<DefineTable> {
        let entries = self.config.renderer.entry_points()?;
        Ok(self.defines_for(&entries, in_renderer_dir))
    }

    fn defines_for(&self, entries: &[EntryPoint], in_renderer_dir: bool) -> DefineTable {
        DefineTableBuilder::new(&self.layout, self.mode, self.port).build(entries, in_renderer_dir)
    }

    /// Main process configuration.
    pub async fn get_main_config(&self) -> Result<BundlerConfig> {
        let mut main_config = self.resolver.resolve(&self.config.main_config).await?;

        let entry = main_config.entry.take().ok_or(ConfigError::MissingMainEntry)?;
        main_config.entry = Some(entry.rewrite_relative(self.layout.project_dir()));

        let defaults = BundlerConfig {
            devtool: Some(Devtool::SourceMap),
            target: Some(Target::ElectronMain),
            mode: Some(self.mode.into()),
            output: Some(OutputOptions {
                path: Some(self.layout.main_dir()),
                filename: Some(OutputLayout::MAIN_FILENAME.to_string()),
                library_target: Some("commonjs2".to_string()),
                ..OutputOptions::default()
            }),
            plugins: vec![PluginSpec::define(self.get_defines(true)?)],
            node: Some(NodeOptions::native_globals()),
            ..BundlerConfig::default()
        };

        Ok(merge_configs([defaults, main_config])?)
    }

    /// One configuration per entry, in input order.
    ///
    /// Entries are resolved concurrently; the first failure fails the batch.
    pub async fn get_renderer_config(&self, entries: &[EntryPoint]) -> Result<Vec<BundlerConfig>> {
        let base = self.resolver.resolve(&self.config.renderer.config).await?;
        let defines = self.defines_for(&self.config.renderer.entry_points()?, false);

        try_join_all(entries.iter().map(|entry| {
            let base = &base;
            let defines = &defines;
            async move {
                match &entry.kind {
                    EntryKind::PreloadOnly(_) => self.get_preload_config_for_entry_point(entry).await,
                    EntryKind::Window(window) => {
                        self.renderer_entry_config(entry, Some(window), base, defines)
                    }
                    EntryKind::Background { .. } => {
                        self.renderer_entry_config(entry, None, base, defines)
                    }
                }
            }
        }))
        .await
    }

    fn renderer_entry_config(
        &self,
        entry: &EntryPoint,
        window: Option<&WindowEntry>,
        base: &BundlerConfig,
        defines: &DefineTable,
    ) -> Result<BundlerConfig> {
        let mut plugins = Vec::new();

        if let Some(window) = window {
            if has_capability(&base.plugins, PluginCapability::HtmlGeneration) {
                tracing::debug!("Renderer config already generates HTML; skipping for {}", entry.name);
            } else {
                let mut chunks = vec![entry.name.clone()];
                chunks.extend(window.additional_chunks.iter().cloned());
                plugins.push(PluginSpec::Html(HtmlPluginOptions {
                    title: Some(entry.name.clone()),
                    template: Some(window.html.clone()),
                    filename: Some(self.layout.html_filename(entry)),
                    chunks,
                }));
            }

            if !has_capability(&base.plugins, PluginCapability::CssExtraction) {
                plugins.push(PluginSpec::CssExtract(CssExtractOptions {
                    filename: Some(self.layout.css_filename(entry)),
                    chunk_filename: Some(OutputLayout::css_chunk_filename(self.mode).to_string()),
                }));
            }
        }

        plugins.push(PluginSpec::define(defines.clone()));
        plugins.push(PluginSpec::AssetRelocatorPatch(AssetRelocatorOptions {
            is_prod: self.mode.is_prod(),
            node_integration: self.node_integration(entry),
        }));

        let defaults = BundlerConfig {
            entry: renderer_entry(entry),
            target: Some(self.renderer_target(entry)),
            devtool: Some(self.renderer_source_map()),
            mode: Some(self.mode.into()),
            output: Some(OutputOptions {
                path: Some(self.layout.renderer_dir()),
                filename: Some(self.layout.renderer_filename(entry)),
                chunk_filename: Some(OutputLayout::chunk_filename(self.mode).to_string()),
                asset_module_filename: Some(OutputLayout::ASSET_MODULE_FILENAME.to_string()),
                global_object: Some("self".to_string()),
                public_path: (!self.mode.is_prod()).then(|| "/".to_string()),
                ..OutputOptions::default()
            }),
            node: Some(NodeOptions::native_globals()),
            plugins,
            ..BundlerConfig::default()
        };

        Ok(merge_configs([defaults, base.clone()])?)
    }

    /// Preload configuration for `entry`; empty if it has no preload.
    pub async fn get_preload_config_for_entry_point(&self, entry: &EntryPoint) -> Result<BundlerConfig> {
        let Some(preload) = entry.preload() else {
            return Ok(BundlerConfig::default());
        };

        let source = preload.config.as_ref().unwrap_or(&self.config.renderer.config);
        let mut base = self.resolver.resolve(source).await?;
        strip_capabilities(
            &mut base.plugins,
            &[PluginCapability::HtmlGeneration, PluginCapability::CssExtraction],
        );

        let mut modules = preload.prefixed_entries.clone();
        modules.push(preload.js.clone());

        let defaults = BundlerConfig {
            entry: Some(Entry::Many(modules)),
            devtool: Some(self.renderer_source_map()),
            mode: Some(self.mode.into()),
            output: Some(OutputOptions {
                path: Some(self.layout.preload_dir(entry)),
                filename: Some(OutputLayout::PRELOAD_FILENAME.to_string()),
                chunk_filename: Some(OutputLayout::chunk_filename(self.mode).to_string()),
                asset_module_filename: Some(OutputLayout::ASSET_MODULE_FILENAME.to_string()),
                ..OutputOptions::default()
            }),
            node: Some(NodeOptions::native_globals()),
            ..BundlerConfig::default()
        };
        let forced = BundlerConfig {
            target: Some(Target::ElectronPreload),
            ..BundlerConfig::default()
        };

        Ok(merge_configs([defaults, base, forced])?)
    }
}

/// `{ <name>: [...prefixedEntries, js] }`, or nothing for a window without scripts.
fn renderer_entry(entry: &EntryPoint) -> Option<Entry> {
    let mut modules = entry.prefixed_entries.clone();
    modules.extend(entry.js().map(str::to_string));
    if modules.is_empty() {
        return None;
    }
    Some(Entry::Named(
        [(entry.name.clone(), Entry::Many(modules))].into_iter().collect(),
    ))
}
