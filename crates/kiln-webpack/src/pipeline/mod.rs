//! Build orchestration around the external bundler, dev server and log viewer.
//!
//! [`WebpackPipeline`] asks the [`ConfigGenerator`] for configurations and
//! hands them to a [`Compiler`]. One-shot builds fail on compilation
//! errors; watch builds report to a log tab and keep running until
//! [`WebpackPipeline::shutdown`].

pub mod compiler;
pub mod dev_server;
pub mod logging;
pub mod packaging;
pub mod stats;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use kiln_config::{
    BundlerConfig, EntryKind, EntryPoint, LoggingOptions, ModuleLoader, Mode, PluginConfig,
    PluginSpec,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::error::{BuildError, Result};
use crate::fs::{FileSystem, NativeFs};
use crate::generator::ConfigGenerator;
use crate::layout::{OutputLayout, ProcessKind};

pub use compiler::{BatchStats, CompileStats, Compiler, WatchEvent, WatchHandle, WatchSession};
pub use dev_server::{dev_server_options, DevServer, DevServerRequest, ServerHandle};
pub use logging::{LogSink, LogTab, TracingLogSink};
pub use packaging::{check_package_main, PackagerIgnore};
pub use stats::write_json_stats;

const MAIN_TAB: &str = "Main Process";
const RENDERERS_TAB: &str = "Renderers";

pub struct WebpackPipeline {
    config: Arc<PluginConfig>,
    generator: ConfigGenerator,
    compiler: Arc<dyn Compiler>,
    dev_server: Option<Arc<dyn DevServer>>,
    fs: Arc<dyn FileSystem>,
    logger_port: u16,
    watchers: Mutex<Vec<Box<dyn WatchHandle>>>,
    servers: Mutex<Vec<Box<dyn ServerHandle>>>,
    loggers: Mutex<Vec<Arc<dyn LogSink>>>,
    started: AtomicBool,
}

impl WebpackPipeline {
    /// Validates both ports before anything is built.
    pub fn new(
        config: PluginConfig,
        project_dir: impl Into<PathBuf>,
        mode: Mode,
        compiler: Arc<dyn Compiler>,
    ) -> Result<Self> {
        let port = config.port()?;
        let logger_port = config.logger_port()?;
        let config = Arc::new(config);
        let generator = ConfigGenerator::new(Arc::clone(&config), project_dir, mode, port);

        Ok(Self {
            config,
            generator,
            compiler,
            dev_server: None,
            fs: Arc::new(NativeFs),
            logger_port,
            watchers: Mutex::new(Vec::new()),
            servers: Mutex::new(Vec::new()),
            loggers: Mutex::new(Vec::new()),
            started: AtomicBool::new(false),
        })
    }

    pub fn with_dev_server(mut self, dev_server: Arc<dyn DevServer>) -> Self {
        self.dev_server = Some(dev_server);
        self
    }

    pub fn with_file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_module_loader(mut self, loader: Arc<dyn ModuleLoader>) -> Self {
        self.generator = ConfigGenerator::with_loader(
            Arc::clone(&self.config),
            self.generator.layout().project_dir().to_path_buf(),
            self.generator.mode(),
            self.generator.port(),
            loader,
        );
        self
    }

    pub fn generator(&self) -> &ConfigGenerator {
        &self.generator
    }

    pub fn layout(&self) -> &OutputLayout {
        self.generator.layout()
    }

    pub fn port(&self) -> u16 {
        self.generator.port()
    }

    pub fn logger_port(&self) -> u16 {
        self.logger_port
    }

    /// Build the main process bundle.
    ///
    /// With `watch`, resolves after the first build and keeps rebuilding;
    /// compilation errors are then only logged.
    pub async fn compile_main(&self, watch: bool, sink: Option<&dyn LogSink>) -> Result<()> {
        let tab = sink.map(|sink| sink.create_tab(MAIN_TAB));
        let main_config = self.generator.get_main_config().await?;
        let stats_suffix = self.config.json_stats.then(|| ProcessKind::Main.to_string());

        if watch {
            return self
                .watch_until_first_build(ProcessKind::Main, main_config, tab, stats_suffix)
                .await;
        }

        let stats_options = main_config.stats.clone();
        let stats = self.compiler.run(vec![main_config]).await?;
        if let Some(tab) = &tab {
            tab.log(&stats.render(true));
        }
        if let Some(suffix) = &stats_suffix {
            for entry_stats in stats.iter() {
                self.write_json_stats(ProcessKind::Main, entry_stats, stats_options.as_ref(), suffix)
                    .await?;
            }
        }
        if stats.has_errors() {
            return Err(BuildError::MainCompilation {
                details: stats.render(false),
            });
        }
        Ok(())
    }

    /// Build every renderer once, then every preload.
    pub async fn compile_renderers(&self, watch: bool) -> Result<()> {
        let entries = self.config.renderer.entry_points()?;
        let configs = self.generator.get_renderer_config(&entries).await?;
        let (names, configs) = renderer_batch(&entries, configs);

        if !configs.is_empty() {
            let stats_options: Vec<Option<Value>> =
                configs.iter().map(|config| config.stats.clone()).collect();
            let stats = self.compiler.run(configs).await?;

            if self.config.renderer.json_stats {
                for ((entry_stats, name), options) in stats.iter().zip(&names).zip(&stats_options) {
                    self.write_json_stats(ProcessKind::Renderer, entry_stats, options.as_ref(), name)
                        .await?;
                }
            }

            if stats.has_errors() {
                let details = stats.render(false);
                if !watch {
                    return Err(BuildError::RendererCompilation { details });
                }
                tracing::warn!("Compilation errors in the renderer: {}", details);
            }
        }

        for entry in entries.iter().filter(|entry| entry.preload().is_some()) {
            let config = self.generator.get_preload_config_for_entry_point(entry).await?;
            let stats = self.compiler.run(vec![config]).await?;
            if stats.has_errors() {
                let details = stats.render(false);
                if !watch {
                    return Err(BuildError::PreloadCompilation {
                        name: entry.name.clone(),
                        details,
                    });
                }
                tracing::warn!("Compilation errors in the preload ({}): {}", entry.name, details);
            }
        }

        Ok(())
    }

    /// Serve every renderer from the dev server and watch every preload.
    pub async fn launch_renderer_dev_servers(&self, sink: &dyn LogSink) -> Result<()> {
        let tab = sink.create_tab(RENDERERS_TAB);
        let entries = self.config.renderer.entry_points()?;
        let configs = self.generator.get_renderer_config(&entries).await?;
        let (_, mut configs) = renderer_batch(&entries, configs);

        if !configs.is_empty() {
            for config in &mut configs {
                config.plugins.push(PluginSpec::Logging(LoggingOptions {
                    tab: RENDERERS_TAB.to_string(),
                }));
                silence(config);
            }

            let dev_server = self.dev_server.as_ref().ok_or(BuildError::NoDevServer)?;
            let handle = dev_server
                .start(DevServerRequest {
                    options: self.dev_server_options(),
                    configs,
                    tab,
                })
                .await?;
            self.servers.lock().push(handle);
            tracing::info!("Renderer dev server listening on http://localhost:{}", self.port());
        }

        for entry in entries.iter().filter(|entry| entry.preload().is_some()) {
            let mut config = self.generator.get_preload_config_for_entry_point(entry).await?;
            silence(&mut config);
            let tab = sink.create_tab(&format!("{} - Preload", entry.name));
            self.watch_until_first_build(ProcessKind::Preload, config, Some(tab), None)
                .await?;
        }

        Ok(())
    }

    pub fn dev_server_options(&self) -> Value {
        dev_server_options(
            self.layout(),
            self.port(),
            self.config.dev_server.as_ref(),
            self.config.content_security_policy(),
        )
    }

    /// Start development mode once; later calls return `Ok(false)`.
    pub async fn start_dev(&self, sink: Arc<dyn LogSink>) -> Result<bool> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Ok(false);
        }

        self.fs.remove_dir_all(self.layout().webpack_dir()).await?;
        sink.start().await?;
        self.loggers.lock().push(Arc::clone(&sink));

        tracing::info!("Compiling main process code");
        self.compile_main(true, Some(sink.as_ref())).await?;

        tracing::info!("Launching dev servers for renderer process code");
        self.launch_renderer_dev_servers(sink.as_ref()).await?;

        tracing::info!("Output Available: http://localhost:{}", self.logger_port);
        Ok(true)
    }

    /// Clean the output directory and build everything once.
    pub async fn build(&self) -> Result<()> {
        self.fs.remove_dir_all(self.layout().webpack_dir()).await?;
        self.compile_main(false, None).await?;
        self.compile_renderers(false).await
    }

    /// Ignore rule for the packager, unless the user already set one.
    pub fn packager_ignore(&self, user_has_ignore: bool) -> Result<Option<PackagerIgnore>> {
        if user_has_ignore {
            tracing::warn!(
                "A packager ignore rule is already set. The packaged app may be larger than \
                 expected if it does not ignore everything other than the '{}' folder",
                self.config.output
            );
            return Ok(None);
        }

        PackagerIgnore::new(
            &self.config.output,
            self.config.json_stats,
            self.config.renderer.json_stats,
            self.config.package_source_maps,
        )
        .map(Some)
    }

    /// Write the checked `package.json` into the package and create `node_modules`.
    pub async fn package_after_copy(&self, build_path: &Path) -> Result<()> {
        let manifest_path = self.layout().project_dir().join("package.json");
        let manifest = self.fs.read_json(&manifest_path).await?;
        let manifest = check_package_main(manifest, &self.config.output)?;

        self.fs
            .write_json(&build_path.join("package.json"), &manifest)
            .await?;
        self.fs.create_dir_all(&build_path.join("node_modules")).await
    }

    pub async fn write_json_stats(
        &self,
        kind: ProcessKind,
        stats: &dyn CompileStats,
        options: Option<&Value>,
        suffix: &str,
    ) -> Result<()> {
        write_json_stats(self.fs.as_ref(), self.layout(), kind, stats, options, suffix).await
    }

    /// Close watchers, servers and log sinks. Safe to call more than once.
    pub async fn shutdown(&self) {
        let watchers = std::mem::take(&mut *self.watchers.lock());
        for watcher in watchers {
            tracing::debug!("cleaning webpack watcher");
            watcher.close().await;
        }

        let servers = std::mem::take(&mut *self.servers.lock());
        for server in servers {
            tracing::debug!("cleaning http server");
            server.close().await;
        }

        let loggers = std::mem::take(&mut *self.loggers.lock());
        for logger in loggers {
            tracing::debug!("stopping logger");
            logger.stop().await;
        }
    }

    /// Start a watch and wait for its first result.
    ///
    /// Only the first result settles the returned future; later failures
    /// are logged.
    async fn watch_until_first_build(
        &self,
        kind: ProcessKind,
        config: BundlerConfig,
        tab: Option<Arc<dyn LogTab>>,
        stats_suffix: Option<String>,
    ) -> Result<()> {
        let stats_options = config.stats.clone();
        let session = self.compiler.watch(vec![config]).await?;
        self.watchers.lock().push(session.handle);

        let mut events = session.events;
        let fs = Arc::clone(&self.fs);
        let layout = self.layout().clone();
        let (first_tx, first_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut first = Some(first_tx);
            while let Some(event) = events.recv().await {
                let outcome = match event {
                    WatchEvent::Built(stats) => {
                        if let Some(tab) = &tab {
                            tab.log(&stats.render(true));
                        }
                        let mut written = Ok(());
                        if let Some(suffix) = &stats_suffix {
                            for entry_stats in stats.iter() {
                                written = write_json_stats(
                                    fs.as_ref(),
                                    &layout,
                                    kind,
                                    entry_stats,
                                    stats_options.as_ref(),
                                    suffix,
                                )
                                .await;
                                if written.is_err() {
                                    break;
                                }
                            }
                        }
                        written
                    }
                    WatchEvent::Failed(message) => {
                        if let Some(tab) = &tab {
                            tab.log(&message);
                        }
                        Err(BuildError::Bundler(message))
                    }
                };

                match first.take() {
                    Some(tx) => {
                        let _ = tx.send(outcome);
                    }
                    None => {
                        if let Err(err) = outcome {
                            tracing::warn!("{} rebuild failed: {}", kind, err);
                        }
                    }
                }
            }
        });

        first_rx.await.map_err(|_| BuildError::WatchClosed(kind))?
    }
}

/// Renderer builds (windows and background entries) with their entry names.
fn renderer_batch(
    entries: &[EntryPoint],
    configs: Vec<BundlerConfig>,
) -> (Vec<String>, Vec<BundlerConfig>) {
    entries
        .iter()
        .zip(configs)
        .filter(|(entry, _)| !matches!(entry.kind, EntryKind::PreloadOnly(_)))
        .map(|(entry, config)| (entry.name.clone(), config))
        .unzip()
}

fn silence(config: &mut BundlerConfig) {
    config.infrastructure_logging = Some(json!({ "level": "none" }));
    config.stats = Some(json!("none"));
}
