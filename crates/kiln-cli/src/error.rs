//! Error handling for the kiln CLI.
//!
//! Library errors convert into [`CliError`] through `#[from]`; `main` turns
//! the final error into a miette report.

use std::path::PathBuf;

use miette::Report;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Plugin configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] kiln_config::ConfigError),

    /// Config generation or pipeline failure
    #[error("Build error: {0}")]
    Build(#[from] kiln_webpack::BuildError),

    /// Layering the config file with `KILN_*` variables failed
    #[error("Invalid configuration: {0}")]
    Layered(String),

    #[error("Project directory not found: {}", .0.display())]
    ProjectNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        CliError::Layered(err.to_string())
    }
}

impl CliError {
    /// Hint shown under the error, if there is a useful one.
    pub fn hint(&self) -> Option<&'static str> {
        use kiln_config::ConfigError;

        let config = match self {
            CliError::Config(err) => Some(err),
            CliError::Build(kiln_webpack::BuildError::Config(err)) => Some(err),
            _ => None,
        };

        match config {
            Some(ConfigError::NotFound) => {
                Some("Create kiln.toml or kiln.json, add a \"kiln\" field to package.json, or pass --config <path>")
            }
            Some(ConfigError::MissingEntryPoints) => {
                Some("List your windows under renderer.entryPoints")
            }
            Some(ConfigError::MissingMainEntry) => {
                Some("Point mainConfig.entry at your main process script")
            }
            Some(ConfigError::PrivilegedPort(_) | ConfigError::InvalidPort(_)) => {
                Some("Pick a port between 1024 and 65535 (KILN_PORT overrides the file)")
            }
            _ => None,
        }
    }
}

pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Convert a CLI error into a miette report, attaching a hint when one applies.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err.hint() {
        Some(hint) => miette::miette!(help = hint, "{}", err),
        None => miette::miette!("{}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_config::ConfigError;

    #[test]
    fn config_errors_convert() {
        let err: CliError = ConfigError::MissingEntryPoints.into();
        assert!(matches!(err, CliError::Config(_)));
        assert_eq!(
            err.to_string(),
            "Configuration error: Required config option \"renderer.entryPoints\" has not been defined"
        );
    }

    #[test]
    fn hints_look_through_build_errors() {
        let err: CliError = kiln_webpack::BuildError::from(ConfigError::MissingMainEntry).into();
        assert!(err.hint().unwrap().contains("mainConfig.entry"));
    }

    #[test]
    fn io_errors_have_no_hint() {
        let err: CliError = std::io::Error::other("disk").into();
        assert!(err.hint().is_none());
    }

    #[test]
    fn report_keeps_the_message() {
        let report = cli_error_to_miette(ConfigError::PrivilegedPort(80).into());
        assert!(report.to_string().contains("Cannot specify port (80) below 1024"));
    }
}
