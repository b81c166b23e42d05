//! In-memory page driver
//!
//! A scripted stand-in for a browser: a fixed set of selectors, each mapped
//! to an element kind, plus a pluggable transliteration function that
//! computes the output surface from the current input. Faults can be
//! injected per driver. Every call is recorded so tests can assert on the
//! exact interaction sequence.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::driver::{BrowserDriver, ElementHandle, PageSession};
use crate::error::{E2eError, E2eResult};

/// Transliteration applied by the simulated page
pub type Transliterate = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// How the simulated output surface exposes its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputExposure {
    /// A `div`-like node: text content and inner text, no value
    TextContent,
    /// A form control whose text content is null
    ValueOnly,
    /// A `textarea`: text content is empty, the output lives in its value
    FormControl,
    /// Every read errors
    Broken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Input,
    Output(OutputExposure),
    ClearButton,
    /// Matches but does nothing (decoys for fallback tests)
    Inert,
}

/// Injectable failures.
#[derive(Debug, Clone, Default)]
pub struct Faults {
    pub screenshot_fails: bool,
    pub open_fails: bool,
    pub navigation_delay: Option<Duration>,
    pub failing_queries: Vec<String>,
}

/// Shared record of driver calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn push(&self, call: impl Into<String>) {
        self.0.lock().push(call.into());
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// Exact match against a recorded call
    pub fn contains(&self, call: &str) -> bool {
        self.0.lock().iter().any(|c| c == call)
    }

    pub fn contains_prefix(&self, prefix: &str) -> bool {
        self.0.lock().iter().any(|c| c.starts_with(prefix))
    }

    pub fn count(&self, call: &str) -> usize {
        self.0.lock().iter().filter(|c| *c == call).count()
    }
}

#[derive(Clone)]
struct PageModel {
    elements: Vec<(String, usize, ElementKind)>,
    transliterate: Transliterate,
    faults: Faults,
}

impl PageModel {
    fn lookup(&self, selector: &str) -> Option<(usize, ElementKind)> {
        self.elements
            .iter()
            .find(|(s, _, _)| s == selector)
            .map(|(_, count, kind)| (*count, *kind))
    }
}

/// Driver whose sessions are independent copies of one page model.
#[derive(Clone)]
pub struct InMemoryDriver {
    page: Arc<PageModel>,
    log: CallLog,
}

impl InMemoryDriver {
    /// An empty page; add surfaces with the `with_*` builders.
    pub fn new<F>(transliterate: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            page: Arc::new(PageModel {
                elements: Vec::new(),
                transliterate: Arc::new(transliterate),
                faults: Faults::default(),
            }),
            log: CallLog::default(),
        }
    }

    fn edit(mut self, f: impl FnOnce(&mut PageModel)) -> Self {
        f(Arc::make_mut(&mut self.page));
        self
    }

    pub fn with_element(self, selector: &str, count: usize, kind: ElementKind) -> Self {
        let selector = selector.to_string();
        self.edit(move |p| p.elements.push((selector, count, kind)))
    }

    pub fn with_input(self, selector: &str) -> Self {
        self.with_element(selector, 1, ElementKind::Input)
    }

    pub fn with_output(self, selector: &str, exposure: OutputExposure) -> Self {
        self.with_element(selector, 1, ElementKind::Output(exposure))
    }

    pub fn with_clear_button(self, selector: &str) -> Self {
        self.with_element(selector, 1, ElementKind::ClearButton)
    }

    pub fn with_failing_query(self, selector: &str) -> Self {
        let selector = selector.to_string();
        self.edit(move |p| p.faults.failing_queries.push(selector))
    }

    pub fn with_faults(self, faults: Faults) -> Self {
        self.edit(move |p| p.faults = faults)
    }

    /// Calls made by every session opened from this driver
    pub fn calls(&self) -> CallLog {
        self.log.clone()
    }
}

#[async_trait]
impl BrowserDriver for InMemoryDriver {
    type Session = InMemorySession;

    async fn open_session(&self) -> E2eResult<InMemorySession> {
        self.log.push("open");
        if self.page.faults.open_fails {
            return Err(E2eError::Driver("browser failed to launch".to_string()));
        }
        Ok(InMemorySession {
            page: self.page.clone(),
            log: self.log.clone(),
            input: String::new(),
            focused: false,
            select_all: false,
        })
    }
}

/// One simulated page.
pub struct InMemorySession {
    page: Arc<PageModel>,
    log: CallLog,
    input: String,
    focused: bool,
    select_all: bool,
}

impl InMemorySession {
    fn kind(&self, element: &ElementHandle) -> E2eResult<ElementKind> {
        match self.page.lookup(&element.selector) {
            Some((count, kind)) if count > 0 => Ok(kind),
            _ => Err(E2eError::Driver(format!(
                "no element matches {}",
                element.selector
            ))),
        }
    }

    fn editable(&self, element: &ElementHandle) -> E2eResult<()> {
        match self.kind(element)? {
            ElementKind::Input => Ok(()),
            _ => Err(E2eError::Driver(format!(
                "{} is not editable",
                element.selector
            ))),
        }
    }

    fn rendered(&self) -> String {
        (self.page.transliterate)(&self.input)
    }
}

#[async_trait]
impl PageSession for InMemorySession {
    async fn navigate(&mut self, url: &str) -> E2eResult<()> {
        self.log.push(format!("navigate:{}", url));
        if let Some(delay) = self.page.faults.navigation_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    async fn await_idle(&mut self) -> E2eResult<()> {
        self.log.push("await_idle");
        Ok(())
    }

    async fn query_count(&mut self, selector: &str) -> E2eResult<usize> {
        self.log.push(format!("query:{}", selector));
        if self.page.faults.failing_queries.iter().any(|s| s == selector) {
            return Err(E2eError::Driver(format!("invalid selector: {}", selector)));
        }
        Ok(self.page.lookup(selector).map(|(count, _)| count).unwrap_or(0))
    }

    async fn clear(&mut self, element: &ElementHandle) -> E2eResult<()> {
        self.log.push(format!("clear:{}", element.selector));
        self.editable(element)?;
        self.input.clear();
        Ok(())
    }

    async fn fill(&mut self, element: &ElementHandle, text: &str) -> E2eResult<()> {
        self.log.push(format!("fill:{}", element.selector));
        self.editable(element)?;
        self.input = text.to_string();
        Ok(())
    }

    async fn type_text(&mut self, element: &ElementHandle, text: &str, delay_ms: u64) -> E2eResult<()> {
        self.log.push(format!("type:{}", element.selector));
        self.editable(element)?;
        for ch in text.chars() {
            if delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            self.input.push(ch);
        }
        Ok(())
    }

    async fn read_text(&mut self, element: &ElementHandle) -> E2eResult<Option<String>> {
        self.log.push(format!("text_content:{}", element.selector));
        match self.kind(element)? {
            ElementKind::Input => Ok(Some(self.input.clone())),
            ElementKind::Output(OutputExposure::TextContent) => Ok(Some(self.rendered())),
            ElementKind::Output(OutputExposure::ValueOnly) => Ok(None),
            ElementKind::Output(OutputExposure::FormControl) => Ok(Some(String::new())),
            ElementKind::Output(OutputExposure::Broken) => {
                Err(E2eError::Driver("element detached".to_string()))
            }
            ElementKind::ClearButton => Ok(Some("Clear".to_string())),
            ElementKind::Inert => Ok(None),
        }
    }

    async fn read_value(&mut self, element: &ElementHandle) -> E2eResult<String> {
        self.log.push(format!("input_value:{}", element.selector));
        match self.kind(element)? {
            ElementKind::Input => Ok(self.input.clone()),
            ElementKind::Output(OutputExposure::ValueOnly | OutputExposure::FormControl) => {
                Ok(self.rendered())
            }
            _ => Err(E2eError::Driver(format!(
                "{} is not a form control",
                element.selector
            ))),
        }
    }

    async fn read_inner_text(&mut self, element: &ElementHandle) -> E2eResult<String> {
        self.log.push(format!("inner_text:{}", element.selector));
        match self.kind(element)? {
            ElementKind::Output(OutputExposure::TextContent) => Ok(self.rendered()),
            ElementKind::Output(OutputExposure::Broken) => {
                Err(E2eError::Driver("element detached".to_string()))
            }
            ElementKind::ClearButton => Ok("Clear".to_string()),
            _ => Ok(String::new()),
        }
    }

    async fn click(&mut self, element: &ElementHandle) -> E2eResult<()> {
        self.log.push(format!("click:{}", element.selector));
        match self.kind(element)? {
            ElementKind::Input => self.focused = true,
            ElementKind::ClearButton => {
                self.input.clear();
                self.focused = false;
            }
            _ => self.focused = false,
        }
        self.select_all = false;
        Ok(())
    }

    async fn press(&mut self, key: &str) -> E2eResult<()> {
        self.log.push(format!("press:{}", key));
        if !self.focused {
            return Ok(());
        }
        match key {
            "Control+A" | "Meta+A" => self.select_all = true,
            "Delete" | "Backspace" if self.select_all => {
                self.input.clear();
                self.select_all = false;
            }
            "Backspace" => {
                self.input.pop();
            }
            _ => {}
        }
        Ok(())
    }

    async fn is_focused(&mut self, element: &ElementHandle) -> E2eResult<bool> {
        self.log.push(format!("is_focused:{}", element.selector));
        Ok(matches!(self.kind(element)?, ElementKind::Input) && self.focused)
    }

    async fn screenshot(&mut self, path: &Path, full_page: bool) -> E2eResult<()> {
        self.log
            .push(format!("screenshot:{}:full={}", path.display(), full_page));
        if self.page.faults.screenshot_fails {
            return Err(E2eError::Driver("screenshot failed".to_string()));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, format!("in-memory capture full_page={}\n", full_page))?;
        Ok(())
    }

    async fn close(&mut self) -> E2eResult<()> {
        self.log.push("close");
        Ok(())
    }
}
