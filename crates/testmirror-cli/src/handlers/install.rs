//! Install-allure command handler

use super::reporter_for;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::runner::{install_allure_stage, StageRunner};

/// Install the Allure command line through npm
pub fn execute_install_allure(config: &CliConfig) -> CliResult<()> {
    let mut runner = StageRunner::new(reporter_for(config));
    runner.run(&install_allure_stage())?;
    Ok(())
}
