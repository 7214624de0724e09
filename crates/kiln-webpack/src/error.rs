use std::path::PathBuf;

use kiln_config::ConfigError;
use thiserror::Error;

use crate::layout::ProcessKind;

pub type Result<T> = std::result::Result<T, BuildError>;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Compilation errors in the main process: {details}")]
    MainCompilation { details: String },

    #[error("Compilation errors in the renderer: {details}")]
    RendererCompilation { details: String },

    #[error("Compilation errors in the preload ({name}): {details}")]
    PreloadCompilation { name: String, details: String },

    /// The bundler itself failed, as opposed to reporting errors in its stats
    #[error("bundler failed: {0}")]
    Bundler(String),

    #[error("watch for the {0} build ended before its first result")]
    WatchClosed(ProcessKind),

    #[error("dev server failed: {0}")]
    DevServer(String),

    #[error("no dev server has been configured")]
    NoDevServer,

    #[error("log sink failed: {0}")]
    LogSink(String),

    #[error(
        "The \"main\" entry point in \"package.json\" is expected to be \"{output}/main\" \
         (where the generated files are written). Instead, it is {main}"
    )]
    PackageMain { output: String, main: String },

    #[error("file system error at {}: {message}", .path.display())]
    FileSystem { path: PathBuf, message: String },
}

impl BuildError {
    pub(crate) fn fs(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::FileSystem {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// True when the failure was caused by misconfiguration.
    pub fn is_configuration_error(&self) -> bool {
        match self {
            Self::Config(err) => err.is_configuration_error(),
            Self::PackageMain { .. } | Self::NoDevServer => true,
            _ => false,
        }
    }
}
