//! Fixture loading
//!
//! A fixture is an ordered array of case objects in JSON or YAML. The
//! loader keeps source order and refuses any set with a repeated id.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::error::{LoadError, Result};
use crate::types::{CaseSet, TestCase};

/// Supported fixture encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureFormat {
    Json,
    Yaml,
}

impl FixtureFormat {
    /// Pick a format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(FixtureFormat::Json),
            "yaml" | "yml" => Some(FixtureFormat::Yaml),
            _ => None,
        }
    }
}

/// Builds [`CaseSet`]s from fixture sources.
pub struct CaseLoader;

impl CaseLoader {
    /// Parse a fixture held in memory. `origin` only labels errors.
    pub fn parse_str(origin: &str, text: &str, format: FixtureFormat) -> Result<CaseSet> {
        let cases = Self::parse(origin, text, format)?;
        Self::finish(cases)
    }

    /// Load a fixture file, or every fixture file under a directory.
    ///
    /// Directory entries are visited in sorted path order and merged into a
    /// single set, so ids must be unique across files.
    pub fn load(path: &Path) -> Result<CaseSet> {
        if path.is_dir() {
            return Self::load_dir(path);
        }

        let format = FixtureFormat::from_path(path)
            .ok_or_else(|| LoadError::UnsupportedFormat(path.display().to_string()))?;
        let text = read(path)?;
        let cases = Self::parse(&path.display().to_string(), &text, format)?;
        debug!("Loaded {} case(s) from {}", cases.len(), path.display());
        Self::finish(cases)
    }

    fn load_dir(dir: &Path) -> Result<CaseSet> {
        let mut cases = Vec::new();
        let mut files = 0usize;

        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let Some(format) = FixtureFormat::from_path(entry.path()) else {
                continue;
            };
            let text = read(entry.path())?;
            let origin = entry.path().display().to_string();
            cases.extend(Self::parse(&origin, &text, format)?);
            files += 1;
        }

        if files == 0 {
            return Err(LoadError::NoFixtures(dir.to_path_buf()));
        }

        debug!("Loaded {} case(s) from {} file(s) under {}", cases.len(), files, dir.display());
        Self::finish(cases)
    }

    fn parse(origin: &str, text: &str, format: FixtureFormat) -> Result<Vec<TestCase>> {
        match format {
            FixtureFormat::Json => {
                serde_json::from_str(text).map_err(|e| LoadError::malformed(origin, e))
            }
            FixtureFormat::Yaml => {
                serde_yaml::from_str(text).map_err(|e| LoadError::malformed(origin, e))
            }
        }
    }

    fn finish(cases: Vec<TestCase>) -> Result<CaseSet> {
        let mut seen: HashMap<&str, usize> = HashMap::with_capacity(cases.len());

        for (index, case) in cases.iter().enumerate() {
            if case.id.trim().is_empty() {
                return Err(LoadError::EmptyId { index });
            }
            if let Some(first) = seen.insert(case.id.as_str(), index) {
                return Err(LoadError::DuplicateId {
                    id: case.id.clone(),
                    first,
                    second: index,
                });
            }
        }

        Ok(CaseSet::from_vec(cases))
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}
