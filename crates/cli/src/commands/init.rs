//! Write a default config file

use std::path::Path;

use anyhow::{bail, Result};
use clap::Args;
use swiftcheck_e2e::HarnessConfig;

use crate::output::print_success;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

pub fn execute(args: InitArgs, path: &Path) -> Result<bool> {
    if path.exists() && !args.force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    HarnessConfig::default().save(path)?;
    print_success(&format!("Wrote {}", path.display()));
    Ok(true)
}
