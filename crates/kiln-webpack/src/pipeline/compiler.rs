//! The bundler, as seen by the pipeline.

use async_trait::async_trait;
use kiln_config::BundlerConfig;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::Result;

/// Result of compiling one configuration.
pub trait CompileStats: Send + Sync {
    fn has_errors(&self) -> bool;

    /// Human-readable summary.
    fn render(&self, colors: bool) -> String;

    /// JSON form, shaped by the config's `stats` options.
    fn to_json(&self, options: Option<&Value>) -> Value;
}

/// Stats for a batch, one per configuration in input order.
pub struct BatchStats(pub Vec<Box<dyn CompileStats>>);

impl BatchStats {
    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|stats| stats.has_errors())
    }

    pub fn render(&self, colors: bool) -> String {
        self.0
            .iter()
            .map(|stats| stats.render(colors))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn CompileStats> {
        self.0.iter().map(|stats| stats.as_ref())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One rebuild reported by a watch.
pub enum WatchEvent {
    Built(BatchStats),
    /// The bundler could not run at all
    Failed(String),
}

/// Handle used to stop a watch.
#[async_trait]
pub trait WatchHandle: Send + Sync {
    async fn close(&self);
}

/// A running watch and the stream of its rebuilds.
pub struct WatchSession {
    pub handle: Box<dyn WatchHandle>,
    pub events: mpsc::UnboundedReceiver<WatchEvent>,
}

/// Bundler invocation service.
#[async_trait]
pub trait Compiler: Send + Sync {
    /// Compile a batch once.
    ///
    /// `Err` means the bundler failed to run; compilation errors are
    /// reported through the returned stats.
    async fn run(&self, configs: Vec<BundlerConfig>) -> Result<BatchStats>;

    /// Compile a batch and keep rebuilding on change.
    async fn watch(&self, configs: Vec<BundlerConfig>) -> Result<WatchSession>;
}
