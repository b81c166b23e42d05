//! Validate config and fixtures without a browser

use anyhow::{Context, Result};
use clap::Args;
use swiftcheck_common::CaseLoader;
use swiftcheck_e2e::{AssertionDispatcher, HarnessConfig};

use crate::output::{print_list, print_success, print_warning, CaseListing, OutputFormat};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Check only this suite (repeatable)
    #[arg(short, long)]
    pub suite: Vec<String>,
}

pub fn execute(args: CheckArgs, config: HarnessConfig, format: OutputFormat) -> Result<bool> {
    config.validate()?;
    let dispatcher = AssertionDispatcher::new(config.assertions.clone());

    let mut listings = Vec::new();
    let mut checked = 0;
    for suite in &config.suites {
        if !args.suite.is_empty() && !args.suite.contains(&suite.name) {
            continue;
        }
        checked += 1;
        let cases = CaseLoader::load(&suite.fixture)
            .with_context(|| format!("Suite {} is not loadable", suite.name))?;
        for case in cases.iter() {
            let rule = dispatcher.rule_for(&case.id).to_string();
            listings.push(CaseListing::new(&suite.name, case, rule));
        }
    }

    print_list(&listings, format);
    if matches!(format, OutputFormat::Table) {
        for id in config.policy.tolerated.iter() {
            print_warning(&format!("Failures of {} are tolerated", id));
        }
        print_success(&format!(
            "{} case(s) in {} suite(s) are valid",
            listings.len(),
            checked
        ));
    }
    Ok(true)
}
