//! CLI Commands

pub mod check;
pub mod init;
pub mod run;
pub mod ui;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use swiftcheck_e2e::{Browser, HarnessConfig};
use tracing::debug;

/// Flags shared by the commands that drive a browser
#[derive(Args, Debug, Default)]
pub struct BrowserArgs {
    /// Page under test
    #[arg(long, env = "SWIFTCHECK_BASE_URL")]
    pub base_url: Option<String>,

    /// Browser engine (chromium, firefox, webkit)
    #[arg(long)]
    pub browser: Option<Browser>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Cases run at once
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Do not wait for the page to answer before running
    #[arg(long)]
    pub skip_preflight: bool,
}

impl BrowserArgs {
    pub fn apply(&self, config: &mut HarnessConfig) {
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(browser) = self.browser {
            config.browser.kind = browser;
        }
        if self.headed {
            config.browser.headless = false;
        }
        if let Some(jobs) = self.jobs {
            config.jobs = jobs;
        }
        if self.skip_preflight {
            config.preflight.enabled = false;
        }
    }
}

/// Load the config file (defaults when absent). Relative paths in an
/// existing file resolve against the file's directory.
pub fn load_config(path: &Path) -> Result<HarnessConfig> {
    let mut config = HarnessConfig::load(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    if path.exists() {
        if let Some(root) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            config.rebase(root);
        }
    } else {
        debug!("{} not found, using defaults", path.display());
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let mut config = HarnessConfig::default();
        let args = BrowserArgs {
            base_url: Some("http://127.0.0.1:5173/".to_string()),
            browser: Some(Browser::Firefox),
            headed: true,
            jobs: Some(3),
            skip_preflight: true,
        };
        args.apply(&mut config);

        assert_eq!(config.base_url, "http://127.0.0.1:5173/");
        assert_eq!(config.browser.kind, Browser::Firefox);
        assert!(!config.browser.headless);
        assert_eq!(config.jobs, 3);
        assert!(!config.preflight.enabled);

        let mut untouched = HarnessConfig::default();
        BrowserArgs::default().apply(&mut untouched);
        assert_eq!(untouched, HarnessConfig::default());
    }

    #[test]
    fn test_fixture_paths_resolve_next_to_config() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("swiftcheck.toml");
        HarnessConfig::default().save(&path).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(
            config.suites[0].fixture,
            tmp.path().join("fixtures/positive-cases.json")
        );

        let missing = load_config(&tmp.path().join("nope.toml")).unwrap();
        assert_eq!(missing, HarnessConfig::default());
    }
}
