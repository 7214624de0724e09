//! Command-line interface definition.
//!
//! - `kiln inspect` - print generated bundler configurations
//! - `kiln defines` - print the compile-time constant table
//! - `kiln check` - validate the plugin configuration

mod commands;

use clap::Parser;

pub use commands::{CheckArgs, Command, DefinesArgs, InspectArgs, ProcessSelection, ProjectArgs};

/// kiln - bundler configurations for desktop applications
#[derive(Parser, Debug)]
#[command(
    name = "kiln",
    version,
    about = "Inspect the bundler configurations kiln generates",
    long_about = "kiln turns a list of named entry points (windows, background scripts and\n\
                  preload bridges) into bundler configurations for the main process, every\n\
                  renderer and every preload, in development and production mode."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}
