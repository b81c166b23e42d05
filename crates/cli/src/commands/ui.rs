//! Run UI behaviour scenarios

use anyhow::Result;
use clap::Args;
use swiftcheck_e2e::{HarnessConfig, PlaywrightDriver, TestRunner, UiScenario};

use super::BrowserArgs;
use crate::output::{print_results, OutputFormat};

#[derive(Args, Debug)]
pub struct UiArgs {
    /// Scenario id, e.g. Pos_UI_0001 (repeatable; default all)
    #[arg(short, long)]
    pub scenario: Vec<UiScenario>,

    #[command(flatten)]
    pub browser: BrowserArgs,
}

pub async fn execute(args: UiArgs, mut config: HarnessConfig, format: OutputFormat) -> Result<bool> {
    args.browser.apply(&mut config);
    config.validate()?;

    let driver = PlaywrightDriver::new(config.browser.clone(), config.timing.navigation_timeout_ms)?;
    let runner = TestRunner::new(driver, config)?;

    let result = runner.run_ui(&args.scenario).await?;
    runner.write_results(&result)?;
    print_results(&result, format);

    Ok(result.success())
}
