//! Test doubles for the services the pipeline talks to.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kiln_config::{
    BundlerConfig, ConfigError, LoadedModule, Mode, ModuleLoader, PluginConfig,
};
use kiln_webpack::{
    BatchStats, BuildError, CompileStats, Compiler, ConfigGenerator, DevServer, DevServerRequest,
    FileSystem, LogSink, LogTab, ServerHandle, WatchEvent, WatchHandle, WatchSession,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::mpsc;

pub const PROJECT: &str = "/app";

pub fn plugin_config(value: Value) -> PluginConfig {
    PluginConfig::from_value(value).expect("valid plugin config")
}

pub fn generator(value: Value, mode: Mode) -> ConfigGenerator {
    ConfigGenerator::new(plugin_config(value), PROJECT, mode, 3000)
}

pub struct FakeStats {
    pub errors: bool,
    pub text: String,
}

impl CompileStats for FakeStats {
    fn has_errors(&self) -> bool {
        self.errors
    }

    fn render(&self, _colors: bool) -> String {
        self.text.clone()
    }

    fn to_json(&self, options: Option<&Value>) -> Value {
        json!({ "errors": self.errors, "options": options })
    }
}

fn describe(config: &BundlerConfig) -> String {
    config
        .output
        .as_ref()
        .and_then(|output| output.path.clone())
        .map(|path| path.display().to_string())
        .unwrap_or_default()
}

fn batch_stats(configs: &[BundlerConfig], fails: fn(&BundlerConfig) -> bool) -> BatchStats {
    BatchStats(
        configs
            .iter()
            .map(|config| {
                let errors = fails(config);
                Box::new(FakeStats {
                    errors,
                    text: if errors {
                        format!("ERROR in {}", describe(config))
                    } else {
                        format!("built {}", describe(config))
                    },
                }) as Box<dyn CompileStats>
            })
            .collect(),
    )
}

pub struct CountingHandle(pub Arc<AtomicUsize>);

#[async_trait]
impl WatchHandle for CountingHandle {
    async fn close(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ServerHandle for CountingHandle {
    async fn close(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Compiles instantly; `fails` decides which configs report errors.
pub struct MockCompiler {
    pub runs: Mutex<Vec<Vec<BundlerConfig>>>,
    pub watches: Mutex<Vec<Vec<BundlerConfig>>>,
    pub senders: Mutex<Vec<mpsc::UnboundedSender<WatchEvent>>>,
    pub closed: Arc<AtomicUsize>,
    fails: fn(&BundlerConfig) -> bool,
    first_watch_event_fails: bool,
}

impl MockCompiler {
    pub fn new() -> Arc<Self> {
        Self::failing_when(|_| false)
    }

    pub fn failing_when(fails: fn(&BundlerConfig) -> bool) -> Arc<Self> {
        Arc::new(Self {
            runs: Mutex::new(Vec::new()),
            watches: Mutex::new(Vec::new()),
            senders: Mutex::new(Vec::new()),
            closed: Arc::new(AtomicUsize::new(0)),
            fails,
            first_watch_event_fails: false,
        })
    }

    /// The bundler cannot even start watching.
    pub fn broken_watch() -> Arc<Self> {
        Arc::new(Self {
            runs: Mutex::new(Vec::new()),
            watches: Mutex::new(Vec::new()),
            senders: Mutex::new(Vec::new()),
            closed: Arc::new(AtomicUsize::new(0)),
            fails: |_| false,
            first_watch_event_fails: true,
        })
    }
}

#[async_trait]
impl Compiler for MockCompiler {
    async fn run(&self, configs: Vec<BundlerConfig>) -> kiln_webpack::Result<BatchStats> {
        let stats = batch_stats(&configs, self.fails);
        self.runs.lock().push(configs);
        Ok(stats)
    }

    async fn watch(&self, configs: Vec<BundlerConfig>) -> kiln_webpack::Result<WatchSession> {
        let (tx, rx) = mpsc::unbounded_channel();
        let first = if self.first_watch_event_fails {
            WatchEvent::Failed("watcher crashed".to_string())
        } else {
            WatchEvent::Built(batch_stats(&configs, self.fails))
        };
        tx.send(first)
            .map_err(|e| BuildError::Bundler(e.to_string()))?;

        self.watches.lock().push(configs);
        self.senders.lock().push(tx);
        Ok(WatchSession {
            handle: Box::new(CountingHandle(Arc::clone(&self.closed))),
            events: rx,
        })
    }
}

#[derive(Default)]
pub struct MockDevServer {
    pub requests: Mutex<Vec<(Value, Vec<BundlerConfig>)>>,
    pub closed: Arc<AtomicUsize>,
}

#[async_trait]
impl DevServer for MockDevServer {
    async fn start(&self, request: DevServerRequest) -> kiln_webpack::Result<Box<dyn ServerHandle>> {
        request.tab.log("dev server started");
        self.requests.lock().push((request.options, request.configs));
        Ok(Box::new(CountingHandle(Arc::clone(&self.closed))))
    }
}

#[derive(Default)]
pub struct RecordingTab {
    pub lines: Mutex<Vec<String>>,
}

impl LogTab for RecordingTab {
    fn log(&self, message: &str) {
        self.lines.lock().push(message.to_string());
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub tabs: Mutex<Vec<(String, Arc<RecordingTab>)>>,
    pub started: AtomicBool,
    pub stopped: AtomicUsize,
}

impl RecordingSink {
    pub fn tab(&self, name: &str) -> Option<Arc<RecordingTab>> {
        self.tabs
            .lock()
            .iter()
            .find(|(tab_name, _)| tab_name == name)
            .map(|(_, tab)| Arc::clone(tab))
    }

    pub fn tab_names(&self) -> Vec<String> {
        self.tabs.lock().iter().map(|(name, _)| name.clone()).collect()
    }
}

#[async_trait]
impl LogSink for RecordingSink {
    fn create_tab(&self, name: &str) -> Arc<dyn LogTab> {
        let tab = Arc::new(RecordingTab::default());
        self.tabs.lock().push((name.to_string(), Arc::clone(&tab)));
        tab
    }

    async fn start(&self) -> kiln_webpack::Result<()> {
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) {
        self.stopped.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct MemoryFs {
    pub files: Mutex<HashMap<PathBuf, Value>>,
    pub dirs: Mutex<Vec<PathBuf>>,
    pub removed: Mutex<Vec<PathBuf>>,
}

impl MemoryFs {
    pub fn with_file(path: impl Into<PathBuf>, value: Value) -> Arc<Self> {
        let fs = Self::default();
        fs.files.lock().insert(path.into(), value);
        Arc::new(fs)
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<Value> {
        self.files.lock().get(path.as_ref()).cloned()
    }
}

#[async_trait]
impl FileSystem for MemoryFs {
    async fn read_json(&self, path: &Path) -> kiln_webpack::Result<Value> {
        self.file(path).ok_or_else(|| BuildError::FileSystem {
            path: path.to_path_buf(),
            message: "not found".to_string(),
        })
    }

    async fn write_json(&self, path: &Path, value: &Value) -> kiln_webpack::Result<()> {
        self.files.lock().insert(path.to_path_buf(), value.clone());
        Ok(())
    }

    async fn remove_dir_all(&self, path: &Path) -> kiln_webpack::Result<()> {
        self.removed.lock().push(path.to_path_buf());
        Ok(())
    }

    async fn create_dir_all(&self, path: &Path) -> kiln_webpack::Result<()> {
        self.dirs.lock().push(path.to_path_buf());
        Ok(())
    }
}

/// Serves canned config modules by file name, after a per-module delay.
pub struct DelayedLoader {
    modules: HashMap<String, (u64, Value)>,
}

impl DelayedLoader {
    pub fn new(modules: impl IntoIterator<Item = (&'static str, u64, Value)>) -> Arc<Self> {
        Arc::new(Self {
            modules: modules
                .into_iter()
                .map(|(name, delay, value)| (name.to_string(), (delay, value)))
                .collect(),
        })
    }
}

#[async_trait]
impl ModuleLoader for DelayedLoader {
    async fn load(&self, path: &Path) -> kiln_config::Result<LoadedModule> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (delay, value) = self.modules.get(&name).cloned().ok_or_else(|| {
            ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: "no such module".to_string(),
            }
        })?;
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok(LoadedModule::Value(value))
    }
}
