//! Harness configuration
//!
//! Loaded from TOML. A missing file yields the defaults, which target the
//! public translator and the two functional suites.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use swiftcheck_common::WriteMode;

use crate::artifact::ArtifactConfig;
use crate::assertion::RuleTable;
use crate::error::{E2eError, E2eResult};
use crate::locator::SelectorConfig;
use crate::output::OutputConfig;
use crate::playwright::PlaywrightConfig;
use crate::policy::PolicyConfig;
use crate::preflight::PreflightConfig;
use crate::ui::UiConfig;

/// Default config file name
pub const CONFIG_FILE: &str = "swiftcheck.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Page under test
    pub base_url: String,

    /// Where `test-results.json` is written
    pub output_dir: PathBuf,

    /// Cases run concurrently, each in its own session
    pub jobs: usize,

    pub browser: PlaywrightConfig,
    pub timing: TimingConfig,
    pub selectors: SelectorConfig,
    pub output: OutputConfig,
    pub artifacts: ArtifactConfig,
    pub policy: PolicyConfig,
    pub assertions: RuleTable,
    pub preflight: PreflightConfig,
    pub ui: UiConfig,
    pub suites: Vec<SuiteConfig>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.swifttranslator.com/".to_string(),
            output_dir: PathBuf::from("test-results"),
            jobs: 1,
            browser: PlaywrightConfig::default(),
            timing: TimingConfig::default(),
            selectors: SelectorConfig::default(),
            output: OutputConfig::default(),
            artifacts: ArtifactConfig::default(),
            policy: PolicyConfig::default(),
            assertions: RuleTable::standard(),
            preflight: PreflightConfig::default(),
            ui: UiConfig::default(),
            suites: vec![
                SuiteConfig::new("positive", "fixtures/positive-cases.json", 500),
                SuiteConfig::new("negative", "fixtures/negative-cases.json", 800),
            ],
        }
    }
}

impl HarnessConfig {
    /// Load configuration from file, falling back to defaults
    pub fn load(path: &Path) -> E2eResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> E2eResult<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> E2eResult<()> {
        if self.jobs == 0 {
            return Err(E2eError::InvalidConfig("jobs must be at least 1".to_string()));
        }
        if self.base_url.trim().is_empty() {
            return Err(E2eError::InvalidConfig("base_url is empty".to_string()));
        }
        for (role, chain) in [
            ("input", &self.selectors.input),
            ("output", &self.selectors.output),
            ("clear", &self.selectors.clear),
        ] {
            if chain.is_empty() {
                return Err(E2eError::InvalidConfig(format!("{} selector chain is empty", role)));
            }
        }
        if self.output.extraction.is_empty() {
            return Err(E2eError::InvalidConfig("no output extraction strategy".to_string()));
        }
        let mut names = std::collections::HashSet::new();
        for suite in &self.suites {
            if !names.insert(suite.name.as_str()) {
                return Err(E2eError::InvalidConfig(format!("duplicate suite name: {}", suite.name)));
            }
        }
        Ok(())
    }

    /// Suite by name
    pub fn suite(&self, name: &str) -> Option<&SuiteConfig> {
        self.suites.iter().find(|s| s.name == name)
    }

    /// Resolve relative paths against the directory the config was loaded from
    pub fn rebase(&mut self, root: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = root.join(&*p);
            }
        };
        join(&mut self.output_dir);
        join(&mut self.artifacts.dir);
        for suite in &mut self.suites {
            join(&mut suite.fixture);
        }
    }
}

/// Waits and bounds, all in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub navigation_timeout_ms: u64,
    pub idle_timeout_ms: u64,
    /// Extra wait after idle before touching the page
    pub page_ready_ms: u64,
    /// Settle delay when a suite sets none
    pub settle_ms: u64,
    /// Key delay for char-by-char writes
    pub per_char_delay_ms: u64,
    /// Pause after each typed char
    pub char_settle_ms: u64,
    /// Whole-case bound; exceeding it fails the case
    pub case_timeout_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: 30_000,
            idle_timeout_ms: 30_000,
            page_ready_ms: 1_000,
            settle_ms: 500,
            per_char_delay_ms: 100,
            char_settle_ms: 50,
            case_timeout_ms: 60_000,
        }
    }
}

impl TimingConfig {
    pub fn case_timeout(&self) -> Duration {
        Duration::from_millis(self.case_timeout_ms)
    }
}

/// One fixture-driven suite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteConfig {
    pub name: String,

    /// Fixture file or directory
    pub fixture: PathBuf,

    /// Overrides `timing.settle_ms`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settle_ms: Option<u64>,

    /// Write mode for cases that set none
    #[serde(default)]
    pub mode: WriteMode,
}

impl SuiteConfig {
    pub fn new(name: &str, fixture: impl Into<PathBuf>, settle_ms: u64) -> Self {
        Self {
            name: name.to_string(),
            fixture: fixture.into(),
            settle_ms: Some(settle_ms),
            mode: WriteMode::Bulk,
        }
    }
}
