//! Browser-driver boundary
//!
//! The engine never talks to a browser directly. Everything it needs from a
//! page goes through [`PageSession`], and sessions come from a
//! [`BrowserDriver`]. Each test case gets its own session.

use std::path::Path;

use async_trait::async_trait;
use swiftcheck_common::SurfaceRole;

use crate::error::E2eResult;

/// A resolved UI surface: the first live match of `selector`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    pub selector: String,
    pub role: SurfaceRole,
}

impl ElementHandle {
    pub fn new(selector: impl Into<String>, role: SurfaceRole) -> Self {
        Self {
            selector: selector.into(),
            role,
        }
    }
}

/// One isolated page. Every method is a suspension point.
#[async_trait]
pub trait PageSession: Send {
    /// Load `url` in the page
    async fn navigate(&mut self, url: &str) -> E2eResult<()>;

    /// Wait until network and DOM are quiet
    async fn await_idle(&mut self) -> E2eResult<()>;

    /// Number of live elements matching `selector`
    async fn query_count(&mut self, selector: &str) -> E2eResult<usize>;

    /// Remove any content from an editable element
    async fn clear(&mut self, element: &ElementHandle) -> E2eResult<()>;

    /// Replace the content of an editable element in one step
    async fn fill(&mut self, element: &ElementHandle, text: &str) -> E2eResult<()>;

    /// Type text as key presses with `delay_ms` between keys
    async fn type_text(&mut self, element: &ElementHandle, text: &str, delay_ms: u64) -> E2eResult<()>;

    /// DOM text content. `None` when the node has none.
    async fn read_text(&mut self, element: &ElementHandle) -> E2eResult<Option<String>>;

    /// Form control value
    async fn read_value(&mut self, element: &ElementHandle) -> E2eResult<String>;

    /// Rendered, visible inner text
    async fn read_inner_text(&mut self, element: &ElementHandle) -> E2eResult<String>;

    async fn click(&mut self, element: &ElementHandle) -> E2eResult<()>;

    /// Press a key or chord (e.g. `Control+A`) on the focused element
    async fn press(&mut self, key: &str) -> E2eResult<()>;

    async fn is_focused(&mut self, element: &ElementHandle) -> E2eResult<bool>;

    async fn screenshot(&mut self, path: &Path, full_page: bool) -> E2eResult<()>;

    /// Release the session. Called exactly once by the orchestrator.
    async fn close(&mut self) -> E2eResult<()>;
}

/// Factory for isolated page sessions.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    type Session: PageSession + 'static;

    async fn open_session(&self) -> E2eResult<Self::Session>;
}
