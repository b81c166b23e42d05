//! UI behaviour scenarios
//!
//! Checks of how the page behaves while it is used, as opposed to what it
//! converts: live updates during typing, the clear control and input focus.
//! They share the navigation prelude, failure artifacts and failure policy
//! with fixture cases.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use swiftcheck_common::SurfaceRole;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::driver::PageSession;
use crate::error::{E2eError, E2eResult};
use crate::orchestrator::{CaseState, Orchestrator};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Singlish phrase typed in the live-update scenario
    pub phrase: String,
    /// Its Sinhala rendering
    pub expected: String,
    pub key_delay_ms: u64,
    /// Pause after each key before sampling the output
    pub observe_ms: u64,
    /// Appended after the phrase to measure typing latency
    pub extra_text: String,
    pub extra_delay_ms: u64,
    /// Upper bound for typing `extra_text`
    pub response_bound_ms: u64,
    pub focus_text: String,
    pub pause_ms: u64,
    pub settle_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            phrase: "mama gedhara yanavaa".to_string(),
            expected: "මම ගෙදර යනවා".to_string(),
            key_delay_ms: 100,
            observe_ms: 50,
            extra_text: " extra".to_string(),
            extra_delay_ms: 50,
            response_bound_ms: 2_000,
            focus_text: "test".to_string(),
            pause_ms: 300,
            settle_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UiScenario {
    /// Output follows input as it is typed
    RealtimeUpdate,
    /// The clear control empties both surfaces
    ClearControl,
    /// The input takes focus and keystrokes
    InputFocus,
}

impl UiScenario {
    pub const ALL: [UiScenario; 3] = [
        UiScenario::RealtimeUpdate,
        UiScenario::ClearControl,
        UiScenario::InputFocus,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            UiScenario::RealtimeUpdate => "Pos_UI_0001",
            UiScenario::ClearControl => "Neg_UI_0001",
            UiScenario::InputFocus => "Pos_UI_0002",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            UiScenario::RealtimeUpdate => "Real-time output update while typing",
            UiScenario::ClearControl => "Clear control empties input and output",
            UiScenario::InputFocus => "Input field accepts focus and typing",
        }
    }

    pub fn expected(&self, config: &UiConfig) -> Option<String> {
        match self {
            UiScenario::RealtimeUpdate => Some(config.expected.clone()),
            UiScenario::ClearControl => Some(String::new()),
            UiScenario::InputFocus => Some(config.focus_text.clone()),
        }
    }

    /// Scenario body; runs after navigation
    pub(crate) async fn perform<S>(
        &self,
        orch: &Orchestrator,
        session: &mut S,
        trace: &mut Vec<CaseState>,
    ) -> E2eResult<String>
    where
        S: PageSession + ?Sized,
    {
        match self {
            UiScenario::RealtimeUpdate => realtime_update(orch, session, trace).await,
            UiScenario::ClearControl => clear_control(orch, session, trace).await,
            UiScenario::InputFocus => input_focus(orch, session, trace).await,
        }
    }

    fn fail(&self, reason: impl Into<String>, expected: Option<String>, actual: String) -> E2eError {
        E2eError::AssertionFailed {
            case_id: self.id().to_string(),
            reason: reason.into(),
            expected,
            actual,
        }
    }
}

impl fmt::Display for UiScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for UiScenario {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UiScenario::ALL
            .into_iter()
            .find(|sc| sc.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| E2eError::InvalidConfig(format!("unknown UI scenario: {}", s)))
    }
}

async fn realtime_update<S>(orch: &Orchestrator, session: &mut S, trace: &mut Vec<CaseState>) -> E2eResult<String>
where
    S: PageSession + ?Sized,
{
    let ui = &orch.ui;
    let scenario = UiScenario::RealtimeUpdate;

    trace.push(CaseState::LocateInput);
    let input = orch.locator.resolve(session, SurfaceRole::Input).await?;
    trace.push(CaseState::LocateOutput);
    let output = orch.locator.resolve(session, SurfaceRole::Output).await?;

    trace.push(CaseState::Write);
    session.clear(&input).await?;
    let mut buf = [0u8; 4];
    for ch in ui.phrase.chars() {
        session
            .type_text(&input, ch.encode_utf8(&mut buf), ui.key_delay_ms)
            .await?;
        sleep(Duration::from_millis(ui.observe_ms)).await;
        let partial = orch.output.read(session, &output).await;
        debug!("After {:?}: {:?}", ch, partial);
    }

    trace.push(CaseState::AwaitSettle);
    sleep(Duration::from_millis(ui.settle_ms)).await;

    trace.push(CaseState::Read);
    let actual = orch.output.read(session, &output).await;

    trace.push(CaseState::Assert);
    if actual != ui.expected {
        return Err(scenario.fail(
            "final output differs from expected",
            Some(ui.expected.clone()),
            actual,
        ));
    }

    let start = Instant::now();
    session
        .type_text(&input, &ui.extra_text, ui.extra_delay_ms)
        .await?;
    let elapsed = start.elapsed().as_millis() as u64;
    info!("Typed {:?} in {} ms", ui.extra_text, elapsed);
    if elapsed >= ui.response_bound_ms {
        return Err(scenario.fail(
            format!(
                "typing took {} ms, bound is {} ms",
                elapsed, ui.response_bound_ms
            ),
            Some(ui.expected.clone()),
            actual,
        ));
    }

    Ok(actual)
}

async fn clear_control<S>(orch: &Orchestrator, session: &mut S, trace: &mut Vec<CaseState>) -> E2eResult<String>
where
    S: PageSession + ?Sized,
{
    let ui = &orch.ui;
    let scenario = UiScenario::ClearControl;

    trace.push(CaseState::LocateInput);
    let input = orch.locator.resolve(session, SurfaceRole::Input).await?;

    trace.push(CaseState::Write);
    orch.input.bulk_fill(session, &input, &ui.phrase).await?;

    trace.push(CaseState::AwaitSettle);
    sleep(Duration::from_millis(ui.settle_ms)).await;

    trace.push(CaseState::LocateOutput);
    let output = orch.locator.try_resolve(session, SurfaceRole::Output).await;

    match orch.locator.try_resolve(session, SurfaceRole::Clear).await {
        Some(button) => {
            session.click(&button).await?;
            sleep(Duration::from_millis(ui.pause_ms)).await;

            trace.push(CaseState::Read);
            let value = session.read_value(&input).await?;
            let rendered = match &output {
                Some(output) => orch.output.read(session, output).await,
                None => String::new(),
            };

            trace.push(CaseState::Assert);
            if !value.is_empty() || !rendered.is_empty() {
                return Err(scenario.fail(
                    format!("clear left input {:?}", value),
                    Some(String::new()),
                    rendered,
                ));
            }
            Ok(rendered)
        }
        None => {
            info!("No clear control found, clearing manually");
            session.click(&input).await?;
            session.press("Control+A").await?;
            session.press("Delete").await?;
            sleep(Duration::from_millis(ui.pause_ms)).await;

            trace.push(CaseState::Read);
            let value = session.read_value(&input).await?;

            trace.push(CaseState::Assert);
            if !value.is_empty() {
                return Err(scenario.fail("manual clear left input text", Some(String::new()), value));
            }
            Ok(value)
        }
    }
}

async fn input_focus<S>(orch: &Orchestrator, session: &mut S, trace: &mut Vec<CaseState>) -> E2eResult<String>
where
    S: PageSession + ?Sized,
{
    let ui = &orch.ui;
    let scenario = UiScenario::InputFocus;

    trace.push(CaseState::LocateInput);
    let input = orch.locator.resolve(session, SurfaceRole::Input).await?;

    trace.push(CaseState::Write);
    session.click(&input).await?;
    sleep(Duration::from_millis(ui.pause_ms)).await;
    if !session.is_focused(&input).await? {
        return Err(scenario.fail("input did not take focus", None, String::new()));
    }
    session
        .type_text(&input, &ui.focus_text, ui.key_delay_ms)
        .await?;

    trace.push(CaseState::Read);
    let value = session.read_value(&input).await?;

    trace.push(CaseState::Assert);
    if !value.contains(&ui.focus_text) {
        return Err(scenario.fail(
            "typed text missing from input",
            Some(ui.focus_text.clone()),
            value,
        ));
    }
    Ok(value)
}
