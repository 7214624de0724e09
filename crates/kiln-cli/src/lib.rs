//! kiln CLI - look at the bundler configurations kiln generates.
//!
//! The binary loads the plugin configuration of a project (from `kiln.toml`,
//! `kiln.json` or the `kiln` field of `package.json`, with `KILN_*`
//! environment overrides) and prints what the generator would hand to the
//! bundler.
//!
//! - [`error`] - CLI error type and miette reporting
//! - [`logger`] - `tracing` subscriber setup
//! - [`ui`] - status messages
//! - `commands` - `inspect`, `defines` and `check`
//! - `config` - layered configuration loading

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result};
