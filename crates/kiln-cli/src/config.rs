//! Plugin configuration loading for the CLI.
//!
//! Priority: `KILN_*` environment variables > config file. Variables use
//! `__` for nesting and snake case for camelCase keys, so
//! `KILN_LOGGER_PORT=9100` sets `loggerPort` and
//! `KILN_RENDERER__JSON_STATS=true` sets `renderer.jsonStats`.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Serialized},
    Figment,
};
use kiln_config::{load_value_from, ConfigDiscovery, ConfigError, Mode, PluginConfig};
use kiln_webpack::ConfigGenerator;
use serde_json::Value;

use crate::cli::ProjectArgs;
use crate::error::{CliError, Result};

pub const ENV_PREFIX: &str = "KILN_";

/// A project root with its loaded plugin configuration.
#[derive(Debug)]
pub struct Project {
    pub root: PathBuf,
    pub config: PluginConfig,
    /// File the configuration was read from
    pub source: PathBuf,
}

impl Project {
    pub fn load(args: &ProjectArgs) -> Result<Self> {
        let root = project_root(args.cwd.as_deref())?;
        let source = match &args.config {
            Some(path) => root.join(path),
            None => ConfigDiscovery::new(&root)
                .find()
                .ok_or(ConfigError::NotFound)?,
        };

        tracing::debug!("Loading kiln config from {}", source.display());
        let value = layer_env(load_value_from(&source)?, Env::prefixed(ENV_PREFIX))?;
        let config = PluginConfig::from_value(value)?;

        Ok(Self {
            root,
            config,
            source,
        })
    }

    /// Generator for this project, with the port validated.
    pub fn generator(&self, mode: Mode) -> Result<ConfigGenerator> {
        let port = self.config.port()?;
        Ok(ConfigGenerator::new(
            self.config.clone(),
            self.root.clone(),
            mode,
            port,
        ))
    }
}

/// Absolute project root: `cwd` if given, else the current directory.
pub fn project_root(cwd: Option<&Path>) -> Result<PathBuf> {
    let root = match cwd {
        Some(cwd) => cwd.to_path_buf(),
        None => std::env::current_dir()?,
    };
    if !root.is_dir() {
        return Err(CliError::ProjectNotFound(root));
    }
    Ok(std::path::absolute(root)?)
}

/// Merge environment variables from `env` over the file value.
pub fn layer_env(file: Value, env: Env) -> Result<Value> {
    let env = env
        .lowercase(false)
        .split("__")
        .map(|key| camel_case(key.as_str()).into());

    Ok(Figment::new()
        .merge(Serialized::defaults(file))
        .merge(env)
        .extract()?)
}

/// `LOGGER_PORT` -> `loggerPort`; dots are kept as nesting separators.
fn camel_case(key: &str) -> String {
    let mut camel = String::with_capacity(key.len());
    let mut upper = false;
    for ch in key.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            camel.extend(ch.to_uppercase());
            upper = false;
        } else {
            camel.extend(ch.to_lowercase());
        }
    }
    camel
}
