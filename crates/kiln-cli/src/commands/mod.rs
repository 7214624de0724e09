//! Command implementations.
//!
//! - [`inspect`] - print generated bundler configurations
//! - [`defines`] - print the define table
//! - [`check`] - validate the plugin configuration
//!
//! Each command exposes an `execute` function taking its parsed arguments.
//! Machine-readable output goes to stdout, status messages to stderr.

pub mod check;
pub mod defines;
pub mod inspect;

pub use check::execute as check_execute;
pub use defines::execute as defines_execute;
pub use inspect::execute as inspect_execute;

use serde::Serialize;

use crate::error::Result;

pub(crate) fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
