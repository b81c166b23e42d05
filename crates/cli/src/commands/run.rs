//! Run fixture suites

use anyhow::Result;
use clap::Args;
use swiftcheck_e2e::{HarnessConfig, PlaywrightDriver, RunFilter, TestRunner};
use tracing::info;

use super::BrowserArgs;
use crate::output::{print_results, OutputFormat};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Run only this suite (repeatable)
    #[arg(short, long)]
    pub suite: Vec<String>,

    /// Run only this case id (repeatable)
    #[arg(short = 'k', long)]
    pub case: Vec<String>,

    #[command(flatten)]
    pub browser: BrowserArgs,
}

/// Returns whether every case passed or was tolerated
pub async fn execute(args: RunArgs, mut config: HarnessConfig, format: OutputFormat) -> Result<bool> {
    args.browser.apply(&mut config);
    config.validate()?;

    let filter = RunFilter {
        suites: args.suite,
        cases: args.case,
    };

    let driver = PlaywrightDriver::new(config.browser.clone(), config.timing.navigation_timeout_ms)?;
    let runner = TestRunner::new(driver, config)?;
    info!("Testing {}", runner.config().base_url);

    let result = runner.run_all(&filter).await?;
    runner.write_results(&result)?;
    print_results(&result, format);

    Ok(result.success())
}
