//! Swiftcheck conformance engine
//!
//! Drives a Singlish-to-Sinhala transliteration web page through a browser
//! and checks what it renders:
//! - Loads fixture cases and runs each in its own browser session
//! - Locates page surfaces through selector fallback chains
//! - Dispatches per-case assertion rules
//! - Records checkpoint and failure screenshots
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Conformance Runner (Rust)                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner<D: BrowserDriver>                               │
//! │    ├── load_suites() -> [LoadedSuite]                       │
//! │    ├── preflight()                                          │
//! │    ├── run_suite() -> [CaseReport]   (buffered by `jobs`)   │
//! │    └── run_ui([UiScenario]) -> TestSuiteResult              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Orchestrator (one state machine per case)                  │
//! │    ├── LocatorResolver   selector chain -> ElementHandle    │
//! │    ├── InputDriver       bulk fill | char by char           │
//! │    ├── OutputReader      extraction strategies -> text      │
//! │    ├── AssertionDispatcher  case id -> rule -> verdict      │
//! │    ├── ArtifactRecorder  checkpoint | failure screenshots   │
//! │    └── FailurePolicy     propagate | suppress               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  BrowserDriver / PageSession                                │
//! │    ├── PlaywrightDriver  (Node bridge, JSON lines)          │
//! │    └── InMemoryDriver    (scripted page for tests)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod artifact;
pub mod assertion;
pub mod config;
pub mod driver;
pub mod error;
pub mod input;
pub mod locator;
pub mod memory;
pub mod orchestrator;
pub mod output;
pub mod playwright;
pub mod policy;
pub mod preflight;
pub mod runner;
pub mod ui;

pub use assertion::{AssertionDispatcher, AssertionRule, RuleTable, Verdict};
pub use config::{HarnessConfig, SuiteConfig, TimingConfig};
pub use driver::{BrowserDriver, ElementHandle, PageSession};
pub use error::{E2eError, E2eResult};
pub use orchestrator::{CaseReport, CaseState, CaseStatus, Orchestrator, SuiteSettings};
pub use playwright::{Browser, PlaywrightConfig, PlaywrightDriver};
pub use runner::{LoadedSuite, RunFilter, TestRunner, TestSuiteResult};
pub use ui::UiScenario;
