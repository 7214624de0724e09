//! Defines command implementation.

use crate::cli::DefinesArgs;
use crate::commands::print_json;
use crate::config::Project;
use crate::error::Result;

pub async fn execute(args: DefinesArgs) -> Result<()> {
    let project = Project::load(&args.project)?;
    let defines = project
        .generator(args.mode())?
        .get_defines(args.in_renderer_dir)?;

    tracing::debug!("{} definitions for {} mode", defines.len(), args.mode());
    print_json(&defines)
}
