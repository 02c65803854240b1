//! Serve command handler

use super::reporter_for;
use crate::commands::ServeArgs;
use crate::config::CliConfig;
use crate::dev_server::{format_server_url, serve_blocking, ReportServerConfig};
use crate::error::CliResult;

/// Build server config from CLI args
#[must_use]
pub fn build_server_config(args: &ServeArgs) -> ReportServerConfig {
    ReportServerConfig::builder()
        .directory(&args.directory)
        .port(args.port)
        .cors(args.cors)
        .build()
}

/// Execute the serve command
pub fn execute_serve(config: &CliConfig, args: &ServeArgs) -> CliResult<()> {
    reporter_for(config).info(&format!(
        "serving {} at {} (Ctrl+C to stop)",
        args.directory.display(),
        format_server_url(args.port)
    ));
    serve_blocking(build_server_config(args), args.open)
}
