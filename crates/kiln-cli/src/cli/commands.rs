use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use kiln_config::Mode;

/// Available kiln subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print generated bundler configurations as JSON
    ///
    /// Resolves the user's base configs and merges them with kiln's
    /// defaults exactly as a build would.
    Inspect(InspectArgs),

    /// Print the compile-time constants injected into bundles
    ///
    /// Shows every `<NAME>_WEBPACK_ENTRY` and `<NAME>_PRELOAD_WEBPACK_ENTRY`
    /// definition as the source text the bundler substitutes.
    Defines(DefinesArgs),

    /// Validate the plugin configuration
    ///
    /// Checks entry points, ports and the main process entry without
    /// building anything.
    Check(CheckArgs),
}

/// Where to find the project and its configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Project root directory
    ///
    /// Relative paths in the configuration are resolved against it.
    /// Defaults to the current directory.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Path to a kiln config file (.toml, .json or package.json)
    ///
    /// Without it, kiln.toml, kiln.json and the "kiln" field of
    /// package.json are searched in the project root.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Which process configurations to print
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, ValueEnum)]
pub enum ProcessSelection {
    Main,
    Renderer,
    Preload,
    #[default]
    All,
}

impl ProcessSelection {
    pub fn includes_main(self) -> bool {
        matches!(self, Self::Main | Self::All)
    }

    pub fn includes_renderer(self) -> bool {
        matches!(self, Self::Renderer | Self::All)
    }

    pub fn includes_preload(self) -> bool {
        matches!(self, Self::Preload | Self::All)
    }
}

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Generate production configurations
    #[arg(long)]
    pub prod: bool,

    /// Limit output to one process type
    #[arg(long, value_enum, default_value = "all")]
    pub process: ProcessSelection,

    #[command(flatten)]
    pub project: ProjectArgs,
}

impl InspectArgs {
    pub fn mode(&self) -> Mode {
        Mode::from_prod(self.prod)
    }
}

/// Arguments for the defines command
#[derive(Args, Debug)]
pub struct DefinesArgs {
    /// Use production values (runtime path expressions instead of URLs)
    #[arg(long)]
    pub prod: bool,

    /// Values as seen from the main bundle, which resolves into `renderer/`
    #[arg(long)]
    pub in_renderer_dir: bool,

    #[command(flatten)]
    pub project: ProjectArgs,
}

impl DefinesArgs {
    pub fn mode(&self) -> Mode {
        Mode::from_prod(self.prod)
    }
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Also resolve the main and renderer base configs
    ///
    /// Loads path-referenced config modules and runs config factories, so
    /// problems in them show up before a build.
    #[arg(long)]
    pub resolve: bool,

    #[command(flatten)]
    pub project: ProjectArgs,
}
