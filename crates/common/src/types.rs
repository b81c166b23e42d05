//! Core data model shared by the loader and the orchestration engine

use std::fmt;
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single transliteration case as it appears in a fixture file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    /// Unique id within its case set (e.g. `Pos_Fun_0001`)
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Singlish text written into the input surface
    pub input: String,

    /// Expected Sinhala output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,

    /// Free-form description of what the case is probing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_behavior: Option<String>,

    /// Overrides the suite's write mode for this case
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<WriteMode>,
}

/// How the input text reaches the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Clear, then set the whole text at once
    #[default]
    Bulk,
    /// Clear, then type one character at a time
    CharByChar,
}

/// Ordered, immutable set of cases loaded once per run.
///
/// Cloning is cheap; every clone shares the same backing slice.
#[derive(Debug, Clone)]
pub struct CaseSet {
    cases: Arc<[TestCase]>,
}

impl CaseSet {
    pub(crate) fn from_vec(cases: Vec<TestCase>) -> Self {
        Self {
            cases: cases.into(),
        }
    }

    /// Look a case up by id
    pub fn get(&self, id: &str) -> Option<&TestCase> {
        self.cases.iter().find(|c| c.id == id)
    }

    /// Ids in load order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.cases.iter().map(|c| c.id.as_str())
    }
}

impl Deref for CaseSet {
    type Target = [TestCase];

    fn deref(&self) -> &[TestCase] {
        &self.cases
    }
}

/// Which UI surface a selector chain targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceRole {
    Input,
    Output,
    Clear,
}

impl SurfaceRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceRole::Input => "input",
            SurfaceRole::Output => "output",
            SurfaceRole::Clear => "clear",
        }
    }
}

impl fmt::Display for SurfaceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When a screenshot was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Viewport capture after a passing case
    Checkpoint,
    /// Full-page capture after a failure
    Failure,
}

impl Phase {
    /// Full-page captures are reserved for failures
    pub fn full_page(&self) -> bool {
        matches!(self, Phase::Failure)
    }
}

/// A persisted screenshot. Written once and never read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactRecord {
    pub case_id: String,
    pub phase: Phase,
    pub timestamp: DateTime<Utc>,
    pub path: PathBuf,
    pub full_page: bool,
}
