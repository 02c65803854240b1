//! Create command handler

use super::reporter_for;
use crate::commands::CreateArgs;
use crate::config::{load_structure_config, CliConfig};
use crate::error::CliResult;
use testmirror::{create_structure, current_exe_name, StructureReport};

/// Execute the create command
///
/// The running executable's file name is passed along so the tool never
/// mirrors itself when installed inside the project tree.
pub fn execute_create(config: &CliConfig, args: &CreateArgs) -> CliResult<StructureReport> {
    let structure = load_structure_config(&args.file.config, &args.overrides)?;
    let report = create_structure(&structure, current_exe_name().as_deref())?;
    reporter_for(config).structure_summary(&report);
    Ok(report)
}
