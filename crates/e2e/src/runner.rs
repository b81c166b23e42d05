//! Suite runner: loads fixtures, checks the page is reachable, then drives
//! every case through the orchestrator

use std::path::PathBuf;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use swiftcheck_common::{CaseLoader, CaseSet};
use tracing::{debug, info};

use crate::config::HarnessConfig;
use crate::driver::BrowserDriver;
use crate::error::{E2eError, E2eResult};
use crate::orchestrator::{CaseReport, CaseStatus, Orchestrator, SuiteSettings};
use crate::preflight::wait_for_reachable;
use crate::ui::UiScenario;

/// Result of running all tests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub tolerated: usize,
    pub duration_ms: u64,
    pub results: Vec<CaseReport>,
}

impl TestSuiteResult {
    pub fn from_reports(results: Vec<CaseReport>, duration: Duration) -> Self {
        let count = |status| results.iter().filter(|r| r.status == status).count();
        Self {
            total: results.len(),
            passed: count(CaseStatus::Passed),
            failed: count(CaseStatus::Failed),
            tolerated: count(CaseStatus::Tolerated),
            duration_ms: duration.as_millis() as u64,
            results,
        }
    }

    /// No case failed (tolerated failures do not count)
    pub fn success(&self) -> bool {
        self.failed == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseReport> {
        self.results.iter().filter(|r| r.status == CaseStatus::Failed)
    }
}

/// Which suites and cases to run. Empty lists select everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunFilter {
    pub suites: Vec<String>,
    pub cases: Vec<String>,
}

impl RunFilter {
    fn wants_suite(&self, name: &str) -> bool {
        self.suites.is_empty() || self.suites.iter().any(|s| s == name)
    }

    fn wants_case(&self, id: &str) -> bool {
        self.cases.is_empty() || self.cases.iter().any(|c| c == id)
    }
}

/// A suite with its cases loaded
#[derive(Debug, Clone)]
pub struct LoadedSuite {
    pub settings: SuiteSettings,
    pub fixture: PathBuf,
    pub cases: CaseSet,
}

/// Main conformance runner
pub struct TestRunner<D> {
    driver: D,
    config: HarnessConfig,
    orchestrator: Orchestrator,
}

impl<D: BrowserDriver> TestRunner<D> {
    pub fn new(driver: D, config: HarnessConfig) -> E2eResult<Self> {
        config.validate()?;
        let orchestrator = Orchestrator::from_config(&config);
        Ok(Self {
            driver,
            config,
            orchestrator,
        })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Load every selected suite's fixtures. Any load error aborts.
    pub fn load_suites(&self, filter: &RunFilter) -> E2eResult<Vec<LoadedSuite>> {
        for name in &filter.suites {
            if self.config.suite(name).is_none() {
                return Err(E2eError::InvalidConfig(format!("no suite named {}", name)));
            }
        }

        let mut loaded = Vec::new();
        for suite in self.config.suites.iter().filter(|s| filter.wants_suite(&s.name)) {
            let cases = CaseLoader::load(&suite.fixture)?;
            info!(
                "Loaded {} case(s) for suite {} from {}",
                cases.len(),
                suite.name,
                suite.fixture.display()
            );
            loaded.push(LoadedSuite {
                settings: SuiteSettings::from_config(suite, &self.config.timing),
                fixture: suite.fixture.clone(),
                cases,
            });
        }
        Ok(loaded)
    }

    /// Fail fast when the page under test does not answer
    pub async fn preflight(&self) -> E2eResult<()> {
        if !self.config.preflight.enabled {
            debug!("Reachability preflight disabled");
            return Ok(());
        }
        wait_for_reachable(&self.config.base_url, &self.config.preflight).await?;
        Ok(())
    }

    /// Load, preflight, then run every selected suite
    pub async fn run_all(&self, filter: &RunFilter) -> E2eResult<TestSuiteResult> {
        let suites = self.load_suites(filter)?;
        self.preflight().await?;
        Ok(self.run_suites(&suites, filter).await)
    }

    pub async fn run_suites(&self, suites: &[LoadedSuite], filter: &RunFilter) -> TestSuiteResult {
        let start = Instant::now();
        let mut results = Vec::new();
        for suite in suites {
            results.extend(self.run_suite(suite, filter).await);
        }
        let summary = TestSuiteResult::from_reports(results, start.elapsed());
        log_summary(&summary);
        summary
    }

    /// Run one suite's cases, `jobs` at a time, reporting in fixture order
    pub async fn run_suite(&self, suite: &LoadedSuite, filter: &RunFilter) -> Vec<CaseReport> {
        let selected: Vec<_> = suite.cases.iter().filter(|c| filter.wants_case(&c.id)).collect();
        info!(
            "Running suite {}: {} case(s), {} at a time",
            suite.settings.name,
            selected.len(),
            self.config.jobs
        );

        stream::iter(selected)
            .map(|case| self.orchestrator.execute(&self.driver, case, &suite.settings))
            .buffered(self.config.jobs)
            .collect()
            .await
    }

    /// Run UI behaviour scenarios (all of them when `scenarios` is empty)
    pub async fn run_ui(&self, scenarios: &[UiScenario]) -> E2eResult<TestSuiteResult> {
        self.preflight().await?;

        let selected: Vec<UiScenario> = if scenarios.is_empty() {
            UiScenario::ALL.to_vec()
        } else {
            scenarios.to_vec()
        };
        info!("Running {} UI scenario(s)", selected.len());

        let start = Instant::now();
        let results: Vec<CaseReport> = stream::iter(selected)
            .map(|scenario| self.orchestrator.run_scenario(&self.driver, scenario))
            .buffered(self.config.jobs)
            .collect()
            .await;

        let summary = TestSuiteResult::from_reports(results, start.elapsed());
        log_summary(&summary);
        Ok(summary)
    }

    /// Write test results to JSON file
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

fn log_summary(summary: &TestSuiteResult) {
    info!(
        "Test Results: {} passed, {} failed, {} tolerated ({} ms)",
        summary.passed, summary.failed, summary.tolerated, summary.duration_ms
    );
}
