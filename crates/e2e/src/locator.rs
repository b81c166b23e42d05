//! Selector fallback chains
//!
//! The translator's markup is not known in advance and changes between
//! builds, so each surface is located through an ordered list of candidate
//! selectors. The first candidate with at least one live match wins.

use serde::{Deserialize, Serialize};
use swiftcheck_common::SurfaceRole;
use tracing::{debug, warn};

use crate::driver::{ElementHandle, PageSession};
use crate::error::{E2eError, E2eResult};

/// Ordered candidate selectors for one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorChain {
    pub role: SurfaceRole,
    pub selectors: Vec<String>,
}

impl SelectorChain {
    pub fn new<I, S>(role: SurfaceRole, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            role,
            selectors: selectors.into_iter().map(Into::into).collect(),
        }
    }

    /// First selector with a live match, or `None` when nothing matches.
    ///
    /// A candidate whose query errors (e.g. a selector syntax the page's
    /// engine rejects) is skipped like a candidate with zero matches.
    pub async fn first_match<S>(&self, session: &mut S) -> Option<ElementHandle>
    where
        S: PageSession + ?Sized,
    {
        for selector in &self.selectors {
            match session.query_count(selector).await {
                Ok(count) if count > 0 => {
                    debug!("Found {} surface with selector: {} ({} match(es))", self.role, selector, count);
                    return Some(ElementHandle::new(selector.clone(), self.role));
                }
                Ok(_) => {}
                Err(e) => warn!("Skipping {} selector {}: {}", self.role, selector, e),
            }
        }
        None
    }
}

/// Selector chains as they appear in the harness config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub input: Vec<String>,
    pub output: Vec<String>,
    pub clear: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            input: vec![
                r#"input[type="text"]"#.to_string(),
                "textarea".to_string(),
                "#input".to_string(),
                ".input-field".to_string(),
                r#"[placeholder*="Singlish"]"#.to_string(),
                "input".to_string(),
            ],
            output: vec![
                "textarea:disabled".to_string(),
                ".output".to_string(),
                "#output".to_string(),
                ".result".to_string(),
                ".transliterated-text".to_string(),
                "pre".to_string(),
            ],
            clear: vec![
                r#"button:has-text("Clear")"#.to_string(),
                r#"button:has-text("Clear All")"#.to_string(),
                r#"[aria-label="Clear"]"#.to_string(),
                ".clear-button".to_string(),
                "#clear-btn".to_string(),
            ],
        }
    }
}

/// Resolves the input, output and clear surfaces of a page.
#[derive(Debug, Clone)]
pub struct LocatorResolver {
    input: SelectorChain,
    output: SelectorChain,
    clear: SelectorChain,
}

impl LocatorResolver {
    pub fn new(config: &SelectorConfig) -> Self {
        Self {
            input: SelectorChain::new(SurfaceRole::Input, config.input.iter().cloned()),
            output: SelectorChain::new(SurfaceRole::Output, config.output.iter().cloned()),
            clear: SelectorChain::new(SurfaceRole::Clear, config.clear.iter().cloned()),
        }
    }

    pub fn chain(&self, role: SurfaceRole) -> &SelectorChain {
        match role {
            SurfaceRole::Input => &self.input,
            SurfaceRole::Output => &self.output,
            SurfaceRole::Clear => &self.clear,
        }
    }

    /// Resolve a surface that must exist.
    pub async fn resolve<S>(&self, session: &mut S, role: SurfaceRole) -> E2eResult<ElementHandle>
    where
        S: PageSession + ?Sized,
    {
        let chain = self.chain(role);
        chain.first_match(session).await.ok_or_else(|| E2eError::NotFound {
            role,
            tried: chain.selectors.clone(),
        })
    }

    /// Resolve an optional surface such as the clear control.
    pub async fn try_resolve<S>(&self, session: &mut S, role: SurfaceRole) -> Option<ElementHandle>
    where
        S: PageSession + ?Sized,
    {
        self.chain(role).first_match(session).await
    }
}
