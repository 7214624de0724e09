//! Inspect command implementation.

use kiln_config::{EntryKind, EntryPoint, Mode};
use serde_json::{Map, Value};

use crate::cli::{InspectArgs, ProcessSelection};
use crate::commands::print_json;
use crate::config::Project;
use crate::error::Result;

pub async fn execute(args: InspectArgs) -> Result<()> {
    let project = Project::load(&args.project)?;
    let output = inspect(&project, args.mode(), args.process).await?;
    print_json(&output)
}

/// Generated configurations for the selected processes.
///
/// Shape: `{ "main": {...}, "renderer": { <entry>: {...} }, "preload": { <entry>: {...} } }`.
/// Renderer configs are keyed by every entry in order except preload-only
/// ones; preload configs by every entry that declares a preload.
pub async fn inspect(project: &Project, mode: Mode, process: ProcessSelection) -> Result<Value> {
    let generator = project.generator(mode)?;
    let entries = generator.plugin_config().renderer.entry_points()?;
    let mut output = Map::new();

    if process.includes_main() {
        let main = generator.get_main_config().await?;
        output.insert("main".to_string(), main.to_value()?);
    }

    if process.includes_renderer() {
        let windows: Vec<EntryPoint> = entries
            .iter()
            .filter(|entry| !matches!(entry.kind, EntryKind::PreloadOnly(_)))
            .cloned()
            .collect();
        let configs = generator.get_renderer_config(&windows).await?;
        let mut renderer = Map::new();
        for (entry, config) in windows.iter().zip(configs) {
            renderer.insert(entry.name.clone(), config.to_value()?);
        }
        output.insert("renderer".to_string(), Value::Object(renderer));
    }

    if process.includes_preload() {
        let mut preload = Map::new();
        for entry in entries.iter().filter(|entry| entry.preload().is_some()) {
            let config = generator.get_preload_config_for_entry_point(entry).await?;
            preload.insert(entry.name.clone(), config.to_value()?);
        }
        output.insert("preload".to_string(), Value::Object(preload));
    }

    Ok(Value::Object(output))
}
