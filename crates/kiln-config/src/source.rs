//! User-supplied bundler configuration sources and their resolution.
//!
//! A base configuration can be given inline, as a factory invoked with the
//! build mode, or as a path to a module that yields either of those. All
//! three are resolved by [`ConfigResolver::resolve`]; loading a path goes
//! through the [`ModuleLoader`] capability so tests can replace it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use path_clean::PathClean;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};

use crate::bundler::{BundlerConfig, Mode};
use crate::discovery::parse_config_str;
use crate::error::{ConfigError, Result};

/// Second argument handed to every config factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactoryArgs {
    pub mode: Mode,
}

/// A function of the build arguments producing a bundler configuration.
///
/// Sync closures implement this trait directly; factories that need to do
/// I/O implement it by hand.
#[async_trait]
pub trait ConfigFactory: Send + Sync {
    async fn create(&self, env: &Value, args: &FactoryArgs) -> Result<Value>;
}

#[async_trait]
impl<F> ConfigFactory for F
where
    F: Fn(&Value, &FactoryArgs) -> Result<Value> + Send + Sync,
{
    async fn create(&self, env: &Value, args: &FactoryArgs) -> Result<Value> {
        self(env, args)
    }
}

/// Where a base bundler configuration comes from.
#[derive(Clone)]
pub enum ConfigSource {
    Inline(Value),
    Factory(Arc<dyn ConfigFactory>),
    /// Module path, relative to the project root
    Path(PathBuf),
}

impl ConfigSource {
    pub fn factory<F: ConfigFactory + 'static>(factory: F) -> Self {
        ConfigSource::Factory(Arc::new(factory))
    }
}

impl Default for ConfigSource {
    fn default() -> Self {
        ConfigSource::Inline(json!({}))
    }
}

impl fmt::Debug for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Inline(value) => f.debug_tuple("Inline").field(value).finish(),
            ConfigSource::Factory(_) => f.write_str("Factory(..)"),
            ConfigSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
        }
    }
}

impl From<Value> for ConfigSource {
    fn from(value: Value) -> Self {
        ConfigSource::Inline(value)
    }
}

impl From<PathBuf> for ConfigSource {
    fn from(path: PathBuf) -> Self {
        ConfigSource::Path(path)
    }
}

impl<'de> Deserialize<'de> for ConfigSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(path) => Ok(ConfigSource::Path(PathBuf::from(path))),
            Value::Null => Ok(ConfigSource::default()),
            value @ Value::Object(_) => Ok(ConfigSource::Inline(value)),
            other => Err(serde::de::Error::custom(format!(
                "expected a config object or a path to one, found {other}"
            ))),
        }
    }
}

/// What loading a config module produced.
pub enum LoadedModule {
    Value(Value),
    Factory(Arc<dyn ConfigFactory>),
}

/// Capability for loading an external config module.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    async fn load(&self, path: &Path) -> Result<LoadedModule>;
}

/// Loads `.json` and `.toml` config modules from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsModuleLoader;

#[async_trait]
impl ModuleLoader for FsModuleLoader {
    async fn load(&self, path: &Path) -> Result<LoadedModule> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let value = parse_config_str(path, &content).map_err(|err| match err {
            ConfigError::InvalidValue { .. } => ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: err.to_string(),
            },
            other => other,
        })?;

        Ok(LoadedModule::Value(value))
    }
}

/// Turns any [`ConfigSource`] into a [`BundlerConfig`] for one build mode.
#[derive(Clone)]
pub struct ConfigResolver {
    project_dir: PathBuf,
    mode: Mode,
    loader: Arc<dyn ModuleLoader>,
}

impl ConfigResolver {
    pub fn new(project_dir: impl Into<PathBuf>, mode: Mode) -> Self {
        Self::with_loader(project_dir, mode, Arc::new(FsModuleLoader))
    }

    pub fn with_loader(
        project_dir: impl Into<PathBuf>,
        mode: Mode,
        loader: Arc<dyn ModuleLoader>,
    ) -> Self {
        Self {
            project_dir: project_dir.into(),
            mode,
            loader,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Resolve a source. Load and factory failures are fatal and not retried.
    pub async fn resolve(&self, source: &ConfigSource) -> Result<BundlerConfig> {
        let module = match source {
            ConfigSource::Inline(value) => LoadedModule::Value(value.clone()),
            ConfigSource::Factory(factory) => LoadedModule::Factory(Arc::clone(factory)),
            ConfigSource::Path(path) => {
                let full_path = self.project_dir.join(path).clean();
                tracing::debug!("Loading bundler config from {}", full_path.display());
                self.loader.load(&full_path).await?
            }
        };

        let value = self.preprocess(module).await?;
        BundlerConfig::from_value(value)
    }

    async fn preprocess(&self, module: LoadedModule) -> Result<Value> {
        match module {
            LoadedModule::Value(value) => Ok(value),
            LoadedModule::Factory(factory) => {
                tracing::trace!("Invoking config factory in {} mode", self.mode);
                factory
                    .create(&json!({}), &FactoryArgs { mode: self.mode })
                    .await
            }
        }
    }
}

impl fmt::Debug for ConfigResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigResolver")
            .field("project_dir", &self.project_dir)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}
