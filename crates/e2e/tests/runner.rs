mod support;

use swiftcheck_common::WriteMode;
use swiftcheck_e2e::memory::{InMemoryDriver, OutputExposure};
use swiftcheck_e2e::{
    CaseStatus, E2eError, RunFilter, SuiteConfig, TestRunner, TestSuiteResult, UiScenario,
};

const POSITIVE: &str = r#"[
  {"id": "Pos_Fun_0001", "name": "Simple sentence", "input": "mama gedhara yanavaa", "expected": "මම ගෙදර යනවා"},
  {"id": "Pos_Fun_0002", "name": "Pronoun", "input": "mata eka", "expected": "මට එක"},
  {"id": "Pos_Fun_0003", "name": "Uppercase", "input": "MAMA", "expected": "මම"},
  {"id": "Pos_Fun_0004", "name": "Typed", "input": "eka", "expected": "එක", "mode": "char_by_char"}
]"#;

const NEGATIVE: &str = r#"[
  {"id": "Neg_Fun_0001", "name": "Acronym", "input": "mata IDK", "expected": "", "expectedBehavior": "IDK stays"},
  {"id": "Neg_Fun_0008", "name": "Empty", "input": "", "expected": ""},
  {"id": "Neg_Fun_0010", "name": "Long word", "input": "mamamamamamamamamamamamamamamama", "expected": ""}
]"#;

fn runner(dir: &std::path::Path, driver: InMemoryDriver) -> TestRunner<InMemoryDriver> {
    let mut config = support::config(dir);
    config.suites = vec![
        SuiteConfig::new("positive", support::write_fixture(dir, "positive.json", POSITIVE), 0),
        SuiteConfig::new("negative", support::write_fixture(dir, "negative.json", NEGATIVE), 0),
    ];
    TestRunner::new(driver, config).unwrap()
}

/// Every suite runs, in fixture order, with rule dispatch per case.
#[tokio::test]
async fn run_all_reports_every_case_in_order() {
    let tmp = tempfile::tempdir().unwrap();
    let runner = runner(tmp.path(), support::translator());

    let result = runner.run_all(&RunFilter::default()).await.unwrap();

    let ids: Vec<&str> = result.results.iter().map(|r| r.case_id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "Pos_Fun_0001",
            "Pos_Fun_0002",
            "Pos_Fun_0003",
            "Pos_Fun_0004",
            "Neg_Fun_0001",
            "Neg_Fun_0008",
            "Neg_Fun_0010"
        ]
    );
    assert_eq!(result.total, 7);
    assert_eq!(result.passed, 7, "{:#?}", result.failures().collect::<Vec<_>>());
    assert!(result.success());
    assert_eq!(result.results[4].suite, "negative");
}

/// Bounded concurrency does not reorder reports.
#[tokio::test]
async fn parallel_jobs_preserve_fixture_order() {
    let tmp = tempfile::tempdir().unwrap();
    let driver = support::translator();
    let mut config = support::config(tmp.path());
    config.jobs = 4;
    config.suites = vec![SuiteConfig::new(
        "positive",
        support::write_fixture(tmp.path(), "positive.json", POSITIVE),
        0,
    )];
    let runner = TestRunner::new(driver.clone(), config).unwrap();

    let result = runner.run_all(&RunFilter::default()).await.unwrap();

    let ids: Vec<&str> = result.results.iter().map(|r| r.case_id.as_str()).collect();
    assert_eq!(ids, vec!["Pos_Fun_0001", "Pos_Fun_0002", "Pos_Fun_0003", "Pos_Fun_0004"]);
    assert_eq!(driver.calls().count("open"), 4);
    assert_eq!(driver.calls().count("close"), 4);
}

/// A duplicate id aborts the run before any session opens.
#[tokio::test]
async fn load_error_aborts_before_any_case() {
    let tmp = tempfile::tempdir().unwrap();
    let driver = support::translator();
    let mut config = support::config(tmp.path());
    config.suites = vec![
        SuiteConfig::new("positive", support::write_fixture(tmp.path(), "p.json", POSITIVE), 0),
        SuiteConfig::new(
            "dupes",
            support::write_fixture(
                tmp.path(),
                "d.json",
                r#"[{"id": "X_1", "name": "a", "input": "a", "expected": "a"},
                    {"id": "X_1", "name": "b", "input": "b", "expected": "b"}]"#,
            ),
            0,
        ),
    ];
    let runner = TestRunner::new(driver.clone(), config).unwrap();

    let err = runner.run_all(&RunFilter::default()).await.unwrap_err();

    assert!(matches!(err, E2eError::Load(_)), "{err}");
    assert!(driver.calls().snapshot().is_empty());
}

#[tokio::test]
async fn filters_select_suites_and_cases() {
    let tmp = tempfile::tempdir().unwrap();
    let runner = runner(tmp.path(), support::translator());

    let filter = RunFilter {
        suites: vec!["positive".to_string()],
        cases: vec!["Pos_Fun_0002".to_string(), "Neg_Fun_0001".to_string()],
    };
    let result = runner.run_all(&filter).await.unwrap();
    assert_eq!(result.total, 1);
    assert_eq!(result.results[0].case_id, "Pos_Fun_0002");

    let unknown = RunFilter {
        suites: vec!["smoke".to_string()],
        cases: Vec::new(),
    };
    assert!(matches!(
        runner.run_all(&unknown).await,
        Err(E2eError::InvalidConfig(_))
    ));
}

/// Failures count against the run; the boundary case does not.
#[tokio::test]
async fn failed_and_tolerated_cases_are_counted_apart() {
    let tmp = tempfile::tempdir().unwrap();
    let runner = runner(tmp.path(), support::broken_translator());

    let result = runner.run_all(&RunFilter::default()).await.unwrap();

    assert_eq!(result.total, 7);
    assert_eq!(result.failed, 6);
    assert_eq!(result.tolerated, 1);
    assert_eq!(result.passed, 0);
    assert!(!result.success());
    assert!(result.failures().all(|r| r.failure_artifact().is_some()));
}

#[tokio::test]
async fn results_are_written_as_json() {
    let tmp = tempfile::tempdir().unwrap();
    let runner = runner(tmp.path(), support::translator());

    let result = runner.run_all(&RunFilter::default()).await.unwrap();
    let path = runner.write_results(&result).unwrap();

    assert_eq!(path, tmp.path().join("results").join("test-results.json"));
    let json = std::fs::read_to_string(&path).unwrap();
    let parsed: TestSuiteResult = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, result);
    assert!(json.contains("\"caseId\": \"Pos_Fun_0001\""));
}

/// An unreachable page aborts before any session opens.
#[tokio::test]
async fn unreachable_page_aborts_run() {
    let tmp = tempfile::tempdir().unwrap();
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let driver = support::translator();
    let mut config = support::config(tmp.path());
    config.base_url = format!("http://{}/", addr);
    config.preflight.enabled = true;
    config.preflight.timeout_ms = 100;
    config.preflight.interval_ms = 20;
    let runner = TestRunner::new(driver.clone(), config).unwrap();

    let err = runner.run_all(&RunFilter::default()).await.unwrap_err();
    assert!(matches!(err, E2eError::Unreachable(_)), "{err}");
    assert!(!driver.calls().contains("open"));
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = support::config(tmp.path());
    config.jobs = 0;
    assert!(matches!(
        TestRunner::new(support::translator(), config),
        Err(E2eError::InvalidConfig(_))
    ));
}

/// The shipped fixtures load and keep the negative suite's edge cases.
#[test]
fn shipped_fixtures_load() {
    let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures");
    let positive = swiftcheck_common::CaseLoader::load(&root.join("positive-cases.json")).unwrap();
    let negative = swiftcheck_common::CaseLoader::load(&root.join("negative-cases.json")).unwrap();

    assert!(positive.get("Pos_Fun_0001").is_some());
    let ids: Vec<&str> = negative.ids().collect();
    assert_eq!(ids.len(), 10);
    assert_eq!(ids[0], "Neg_Fun_0001");
    assert_eq!(ids[9], "Neg_Fun_0010");
}

#[tokio::test]
async fn ui_scenarios_pass_on_a_working_page() {
    let tmp = tempfile::tempdir().unwrap();
    let runner = runner(tmp.path(), support::translator());

    let result = runner.run_ui(&[]).await.unwrap();

    let ids: Vec<&str> = result.results.iter().map(|r| r.case_id.as_str()).collect();
    assert_eq!(ids, vec!["Pos_UI_0001", "Neg_UI_0001", "Pos_UI_0002"]);
    assert!(result.success(), "{:#?}", result.failures().collect::<Vec<_>>());
    assert_eq!(result.results[0].actual.as_deref(), Some("මම ගෙදර යනවා"));
    assert!(result.results.iter().all(|r| r.suite == "ui"));
}

/// Without a clear control the scenario falls back to select-all + delete.
#[tokio::test]
async fn clear_scenario_falls_back_to_manual_clear() {
    let tmp = tempfile::tempdir().unwrap();
    let driver = InMemoryDriver::new(support::transliterate)
        .with_input("textarea")
        .with_output(".output", OutputExposure::TextContent);
    let runner = runner(tmp.path(), driver.clone());

    let result = runner.run_ui(&[UiScenario::ClearControl]).await.unwrap();

    assert_eq!(result.results[0].status, CaseStatus::Passed);
    let calls = driver.calls();
    assert!(calls.contains("press:Control+A"));
    assert!(calls.contains("press:Delete"));
}

/// A page that converts nothing fails the live-update scenario.
#[tokio::test]
async fn realtime_scenario_fails_on_wrong_output() {
    let tmp = tempfile::tempdir().unwrap();
    let driver = InMemoryDriver::new(|s: &str| s.to_string())
        .with_input("textarea")
        .with_output(".output", OutputExposure::TextContent);
    let runner = runner(tmp.path(), driver.clone());

    let result = runner.run_ui(&[UiScenario::RealtimeUpdate]).await.unwrap();
    let report = &result.results[0];

    assert_eq!(report.status, CaseStatus::Failed);
    assert_eq!(report.actual.as_deref(), Some("mama gedhara yanavaa"));
    assert!(report.failure_artifact().is_some());
    assert_eq!(
        driver.calls().count("type:textarea"),
        "mama gedhara yanavaa".chars().count()
    );
}

/// Focus is checked only after the post-click pause.
#[tokio::test]
async fn focus_scenario_waits_before_checking_focus() {
    let tmp = tempfile::tempdir().unwrap();
    let driver = support::translator();
    let mut config = support::config(tmp.path());
    config.ui.pause_ms = 80;
    let runner = TestRunner::new(driver.clone(), config).unwrap();

    let result = runner.run_ui(&[UiScenario::InputFocus]).await.unwrap();
    let report = &result.results[0];

    assert_eq!(report.status, CaseStatus::Passed, "{:?}", report.error);
    assert!(report.duration_ms >= 80, "{} ms", report.duration_ms);
    let calls = driver.calls().snapshot();
    let click = calls.iter().position(|c| c == "click:textarea").unwrap();
    let focus = calls.iter().position(|c| c == "is_focused:textarea").unwrap();
    assert!(click < focus);
}

#[test]
fn suite_defaults_to_bulk_writes() {
    let suite = SuiteConfig::new("positive", "p.json", 500);
    assert_eq!(suite.mode, WriteMode::Bulk);
}

/// The checked-in config spells out the defaults.
#[test]
fn shipped_config_matches_defaults() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../swiftcheck.toml");
    let config = swiftcheck_e2e::HarnessConfig::load(&path).unwrap();
    assert_eq!(config, swiftcheck_e2e::HarnessConfig::default());
}
