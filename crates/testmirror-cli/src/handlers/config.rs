//! Config command handler: print the effective configuration

use crate::commands::{ConfigArgs, ConfigFormat};
use crate::config::load_structure_config;
use crate::error::{CliError, CliResult};
use testmirror::StructureConfig;

/// Render a configuration in the requested format
pub fn render_config(config: &StructureConfig, format: ConfigFormat) -> CliResult<String> {
    match format {
        ConfigFormat::Yaml => {
            serde_yaml_ng::to_string(config).map_err(|e| CliError::config(e.to_string()))
        }
        ConfigFormat::Json => serde_json::to_string_pretty(config)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| CliError::config(e.to_string())),
    }
}

/// Execute the config command
pub fn execute_config(args: &ConfigArgs) -> CliResult<()> {
    let config = load_structure_config(&args.file.config, &args.overrides)?;
    print!("{}", render_config(&config, args.format)?);
    Ok(())
}
