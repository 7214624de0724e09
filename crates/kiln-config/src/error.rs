//! Error types for configuration loading, resolution and validation.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Plugin configuration errors (caller misconfiguration, never retried)
    #[error("Required config option \"renderer.entryPoints\" has not been defined")]
    MissingEntryPoints,

    #[error("Required option \"mainConfig.entry\" has not been defined")]
    MissingMainEntry,

    #[error("Unknown entry point type: {name}")]
    UnknownEntryPointType { name: String },

    #[error("entry point name {name:?} is used more than once")]
    DuplicateEntryName { name: String },

    #[error("entry points {first:?} and {second:?} both define {stem}_WEBPACK_ENTRY")]
    DefineKeyCollision {
        first: String,
        second: String,
        stem: String,
    },

    #[error("entry points {first:?} and {second:?} are both marked isMain")]
    MultipleMainEntries { first: String, second: String },

    #[error("entry point {name:?} has a js script and a preload but no html; a preload needs a window or must stand alone")]
    PreloadWithoutWindow { name: String },

    #[error("entry point name cannot be empty")]
    EmptyEntryName,

    #[error("Cannot specify port ({0}) below 1024, as they are privileged")]
    PrivilegedPort(u32),

    #[error("Port specified ({0}) is not a valid TCP port.")]
    InvalidPort(u32),

    // Config file discovery/parsing
    #[error("config not found")]
    NotFound,

    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid config value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    // Resolution of path-based or factory configs
    #[error("failed to load config module {}: {message}", .path.display())]
    LoadFailed { path: PathBuf, message: String },

    #[error("config factory failed: {0}")]
    FactoryFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.to_string(),
        }
    }

    /// True for errors that indicate caller misconfiguration rather than a
    /// failure while loading or evaluating a user-supplied config.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::MissingEntryPoints
                | Self::MissingMainEntry
                | Self::UnknownEntryPointType { .. }
                | Self::DuplicateEntryName { .. }
                | Self::DefineKeyCollision { .. }
                | Self::MultipleMainEntries { .. }
                | Self::PreloadWithoutWindow { .. }
                | Self::EmptyEntryName
                | Self::PrivilegedPort(_)
                | Self::InvalidPort(_)
                | Self::InvalidValue { .. }
        )
    }
}
