//! Check command implementation.
//!
//! Validates the plugin configuration without building.

use kiln_config::{EntryKind, EntryPoint, Mode};

use crate::cli::CheckArgs;
use crate::config::Project;
use crate::error::Result;
use crate::ui;

/// What a successful check found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub port: u16,
    pub logger_port: u16,
    /// Entry name and a short description of its shape, in order
    pub entries: Vec<(String, &'static str)>,
    pub warnings: Vec<String>,
}

/// Execute the check command.
///
/// # Validation Steps
///
/// 1. Load the config file and `KILN_*` overrides
/// 2. Validate both ports
/// 3. Validate and classify every entry point
/// 4. With `--resolve`, resolve the main and renderer configs in both modes
pub async fn execute(args: CheckArgs) -> Result<()> {
    ui::info("Checking configuration...");

    let project = Project::load(&args.project)?;
    ui::detail("config", &project.source.display().to_string());

    let report = check(&project, args.resolve).await?;

    for (name, shape) in &report.entries {
        ui::detail(name, shape);
    }
    ui::detail(
        "ports",
        &format!("dev server {}, logger {}", report.port, report.logger_port),
    );
    for warning in &report.warnings {
        ui::warning(warning);
    }

    ui::success("Configuration is valid!");
    Ok(())
}

pub async fn check(project: &Project, resolve: bool) -> Result<CheckReport> {
    let config = &project.config;
    let port = config.port()?;
    let logger_port = config.logger_port()?;
    let entries = config.renderer.entry_points()?;

    let mut warnings = Vec::new();
    if port == logger_port {
        warnings.push(format!(
            "port and loggerPort are both {port}; the dev server and log viewer will collide"
        ));
    }
    if !entries.iter().any(|entry| entry.is_main) {
        warnings.push(
            "No entry point is marked isMain; every window is served from a nested path".to_string(),
        );
    }

    if resolve {
        for mode in [Mode::Development, Mode::Production] {
            tracing::debug!("Resolving configs in {} mode", mode);
            let generator = project.generator(mode)?;
            generator.get_main_config().await?;
            generator.get_renderer_config(&entries).await?;
        }
    }

    Ok(CheckReport {
        port,
        logger_port,
        entries: entries
            .iter()
            .map(|entry| (entry.name.clone(), describe(entry)))
            .collect(),
        warnings,
    })
}

fn describe(entry: &EntryPoint) -> &'static str {
    match &entry.kind {
        EntryKind::Window(window) if window.preload.is_some() => "window with preload",
        EntryKind::Window(_) => "window",
        EntryKind::Background { .. } => "background script",
        EntryKind::PreloadOnly(_) => "preload only",
    }
}
