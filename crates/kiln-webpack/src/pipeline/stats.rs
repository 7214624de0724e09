use serde_json::Value;

use crate::error::Result;
use crate::fs::FileSystem;
use crate::layout::{OutputLayout, ProcessKind};
use crate::pipeline::compiler::CompileStats;

/// Write `<output>/<kind>/stats-<suffix>.json`.
pub async fn write_json_stats(
    fs: &dyn FileSystem,
    layout: &OutputLayout,
    kind: ProcessKind,
    stats: &dyn CompileStats,
    options: Option<&Value>,
    suffix: &str,
) -> Result<()> {
    tracing::debug!("Writing JSON stats for {} config", kind);
    let path = layout.stats_file(kind, suffix);
    fs.write_json(&path, &stats.to_json(options)).await
}
