//! Shared fixtures for the integration tests: a tiny word-level Singlish
//! table and a harness config tuned for fast in-memory runs.

#![allow(dead_code)]

use std::path::Path;

use swiftcheck_e2e::config::TimingConfig;
use swiftcheck_e2e::memory::{InMemoryDriver, OutputExposure};
use swiftcheck_e2e::HarnessConfig;

const WORDS: &[(&str, &str)] = &[
    ("mama", "මම"),
    ("gedhara", "ගෙදර"),
    ("yanavaa", "යනවා"),
    ("mata", "මට"),
    ("eka", "එක"),
];

/// Word-by-word conversion. Unknown tokens pass through untouched and runs
/// of whitespace collapse to one space.
pub fn transliterate(input: &str) -> String {
    input
        .split_whitespace()
        .map(|token| {
            let lower = token.to_lowercase();
            WORDS
                .iter()
                .find(|(latin, _)| *latin == lower)
                .map(|(_, sinhala)| sinhala.to_string())
                .unwrap_or_else(|| token.to_string())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Page with a textarea input, a `.output` div and a clear button
pub fn translator() -> InMemoryDriver {
    InMemoryDriver::new(transliterate)
        .with_input("textarea")
        .with_output(".output", OutputExposure::TextContent)
        .with_clear_button(r#"button:has-text("Clear")"#)
}

/// Page whose output surface never renders
pub fn broken_translator() -> InMemoryDriver {
    InMemoryDriver::new(transliterate).with_input("textarea")
}

pub fn config(dir: &Path) -> HarnessConfig {
    let mut config = HarnessConfig::default();
    config.output_dir = dir.join("results");
    config.artifacts.dir = dir.join("screenshots");
    config.preflight.enabled = false;
    config.timing = TimingConfig {
        navigation_timeout_ms: 500,
        idle_timeout_ms: 500,
        page_ready_ms: 0,
        settle_ms: 0,
        per_char_delay_ms: 0,
        char_settle_ms: 0,
        case_timeout_ms: 5_000,
    };
    config.ui.key_delay_ms = 0;
    config.ui.observe_ms = 0;
    config.ui.extra_delay_ms = 1;
    config.ui.pause_ms = 0;
    config.ui.settle_ms = 0;
    config.suites.clear();
    config
}

pub fn write_fixture(dir: &Path, name: &str, json: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, json).unwrap();
    path
}
