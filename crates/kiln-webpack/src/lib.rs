//! # kiln-webpack
//!
//! Bundler configurations for desktop applications with a privileged main
//! process, renderer windows and preload bridges.
//!
//! ## Quick Start
//!
//! ```no_run
//! use kiln_config::{Mode, PluginConfig};
//! use kiln_webpack::ConfigGenerator;
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PluginConfig::from_value(json!({
//!     "mainConfig": { "entry": "./src/main.ts" },
//!     "renderer": {
//!         "entryPoints": [
//!             { "name": "main_window", "isMain": true, "html": "./src/index.html", "js": "./src/renderer.ts" }
//!         ]
//!     }
//! }))?;
//!
//! let port = config.port()?;
//! let generator = ConfigGenerator::new(config, "/path/to/app", Mode::Development, port);
//! let main = generator.get_main_config().await?;
//! let entries = generator.plugin_config().renderer.entry_points()?;
//! let renderers = generator.get_renderer_config(&entries).await?;
//! # Ok(()) }
//! ```
//!
//! Building, watching and serving go through [`WebpackPipeline`], which
//! talks to the bundler, dev server and log viewer through the traits in
//! [`pipeline`].

pub mod defines;
pub mod error;
pub mod fs;
pub mod generator;
pub mod layout;
pub mod pipeline;

pub use defines::{entry_key, preload_key, DefineTableBuilder, NO_PRELOAD};
pub use error::{BuildError, Result};
pub use fs::{FileSystem, NativeFs};
pub use generator::ConfigGenerator;
pub use layout::{OutputLayout, ProcessKind};
pub use pipeline::{
    check_package_main, dev_server_options, BatchStats, CompileStats, Compiler, DevServer,
    DevServerRequest, LogSink, LogTab, PackagerIgnore, ServerHandle, TracingLogSink, WatchEvent,
    WatchHandle, WatchSession, WebpackPipeline,
};
