//! testmirror: mirror a Python source tree into unittest stubs
//!
//! ## Usage
//!
//! ```bash
//! testmirror create                       # Build or refresh the test tree
//! testmirror run -- -k login              # pytest, then allure, then serve
//! testmirror serve --dir _tests/_reports  # Serve existing reports
//! testmirror config --format json         # Show the effective configuration
//! testmirror install-allure               # npm install -g allure-commandline
//! ```

use clap::Parser;
use std::process::ExitCode;
use testmirror_cli::{handlers, init_logging, Cli, CliConfig, CliResult, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = CliConfig::from_cli(&cli);
    init_logging(&config);

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, config: &CliConfig) -> CliResult<()> {
    match &cli.command {
        Commands::Create(args) => handlers::execute_create(config, args).map(|_| ()),
        Commands::Run(args) => handlers::execute_run(config, args),
        Commands::Serve(args) => handlers::execute_serve(config, args),
        Commands::Config(args) => handlers::execute_config(args),
        Commands::InstallAllure => handlers::execute_install_allure(config),
    }
}
