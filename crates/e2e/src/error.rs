//! Error types for conformance runs

use swiftcheck_common::{LoadError, SurfaceRole};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Failed to load cases: {0}")]
    Load(#[from] LoadError),

    #[error("No {role} surface matched any selector in {tried:?}")]
    NotFound {
        role: SurfaceRole,
        tried: Vec<String>,
    },

    #[error("Timeout waiting for: {stage} ({ms} ms)")]
    Timeout { stage: String, ms: u64 },

    #[error("Assertion failed for {case_id}: {reason} (expected: {expected:?}, actual: {actual:?})")]
    AssertionFailed {
        case_id: String,
        reason: String,
        expected: Option<String>,
        actual: String,
    },

    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Application under test unreachable after {0} attempts")]
    Unreachable(usize),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML encode error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl E2eError {
    pub fn timeout(stage: impl Into<String>, ms: u64) -> Self {
        E2eError::Timeout {
            stage: stage.into(),
            ms,
        }
    }

    /// The actual output carried by an assertion failure, if any
    pub fn actual_output(&self) -> Option<&str> {
        match self {
            E2eError::AssertionFailed { actual, .. } => Some(actual),
            _ => None,
        }
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
