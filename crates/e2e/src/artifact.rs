//! Screenshot evidence
//!
//! Captures are side effects only: a failed capture is logged and never
//! changes a case's outcome.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use swiftcheck_common::{ArtifactRecord, Phase};
use tracing::{debug, warn};

use crate::driver::PageSession;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Directory screenshots are written to
    pub dir: PathBuf,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("screenshots"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactRecorder {
    dir: PathBuf,
}

impl ArtifactRecorder {
    pub fn new(config: &ArtifactConfig) -> Self {
        Self {
            dir: config.dir.clone(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for a capture: `<case>_<millis>.png` for checkpoints and
    /// `<case>_FAILED_<millis>.png` for failures.
    pub fn path_for(&self, case_id: &str, phase: Phase, at: DateTime<Utc>) -> PathBuf {
        let case = sanitize(case_id);
        let millis = at.timestamp_millis();
        let name = match phase {
            Phase::Checkpoint => format!("{}_{}.png", case, millis),
            Phase::Failure => format!("{}_FAILED_{}.png", case, millis),
        };
        self.dir.join(name)
    }

    /// Take a screenshot. Checkpoints capture the viewport, failures the full page.
    pub async fn capture<S>(&self, session: &mut S, case_id: &str, phase: Phase) -> Option<ArtifactRecord>
    where
        S: PageSession + ?Sized,
    {
        let timestamp = Utc::now();
        let path = self.path_for(case_id, phase, timestamp);
        let full_page = phase.full_page();

        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            warn!("Cannot create screenshot directory {}: {}", self.dir.display(), e);
            return None;
        }

        match session.screenshot(&path, full_page).await {
            Ok(()) => {
                debug!("Captured {:?} screenshot for {}: {}", phase, case_id, path.display());
                Some(ArtifactRecord {
                    case_id: case_id.to_string(),
                    phase,
                    timestamp,
                    path,
                    full_page,
                })
            }
            Err(e) => {
                warn!("Screenshot for {} failed: {}", case_id, e);
                None
            }
        }
    }
}

/// Keep ids filesystem-safe
fn sanitize(case_id: &str) -> String {
    case_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect()
}
