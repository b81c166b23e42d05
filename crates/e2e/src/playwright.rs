//! Playwright browser automation
//!
//! Each session is a Node child process running a small bridge script. The
//! script owns one Playwright page and answers newline-delimited JSON
//! commands on stdin with one JSON line per command on stdout.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::driver::{BrowserDriver, ElementHandle, PageSession};
use crate::error::{E2eError, E2eResult};

/// How long `close` waits at each shutdown step
const CLOSE_GRACE: Duration = Duration::from_millis(2_000);

const BRIDGE_SCRIPT: &str = r##"
const readline = require('readline');
const pw = require(require.resolve('playwright', { paths: [process.cwd(), __dirname] }));

const options = JSON.parse(process.argv[2]);
const send = (msg) => process.stdout.write(JSON.stringify(msg) + '\n');

(async () => {
  const browser = await pw[options.browser].launch({ headless: options.headless });
  const context = await browser.newContext({ viewport: options.viewport });
  const page = await context.newPage();
  page.setDefaultTimeout(options.actionTimeout);
  page.setDefaultNavigationTimeout(options.navigationTimeout);

  const first = (selector) => page.locator(selector).first();
  const done = () => null;
  const handlers = {
    goto: (c) => page.goto(c.url).then(done),
    wait_idle: () => page.waitForLoadState('networkidle').then(done),
    count: (c) => page.locator(c.selector).count(),
    clear: (c) => first(c.selector).clear().then(done),
    fill: (c) => first(c.selector).fill(c.text).then(done),
    type: (c) => first(c.selector).pressSequentially(c.text, { delay: c.delay }).then(done),
    text_content: (c) => first(c.selector).textContent(),
    input_value: (c) => first(c.selector).inputValue(),
    inner_text: (c) => first(c.selector).innerText(),
    click: (c) => first(c.selector).click().then(done),
    press: (c) => page.keyboard.press(c.key).then(done),
    is_focused: (c) => first(c.selector).evaluate((el) => el === document.activeElement),
    screenshot: (c) => page.screenshot({ path: c.path, fullPage: c.full_page }).then(done),
  };

  send({ ready: true });

  const rl = readline.createInterface({ input: process.stdin });
  for await (const line of rl) {
    if (!line.trim()) continue;
    let cmd = {};
    try {
      cmd = JSON.parse(line);
      if (cmd.op === 'close') {
        await browser.close();
        send({ id: cmd.id, ok: true, value: null });
        process.exit(0);
      }
      const handler = handlers[cmd.op];
      if (!handler) throw new Error('unknown op: ' + cmd.op);
      const value = await handler(cmd);
      send({ id: cmd.id, ok: true, value: value === undefined ? null : value });
    } catch (err) {
      send({
        id: cmd.id === undefined ? null : cmd.id,
        ok: false,
        error: String((err && err.message) || err),
        timeout: !!(err && err.name === 'TimeoutError'),
      });
    }
  }
  await browser.close();
})().catch((err) => {
  process.stderr.write(String((err && err.stack) || err) + '\n');
  process.exit(1);
});
"##;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl std::str::FromStr for Browser {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" | "safari" => Ok(Browser::Webkit),
            other => Err(E2eError::InvalidConfig(format!("unknown browser: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Configuration for Playwright
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaywrightConfig {
    pub kind: Browser,
    pub headless: bool,

    /// Node executable used to run the bridge
    pub node_binary: PathBuf,

    /// Directory `playwright` is resolved from (defaults to the current dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,

    /// Playwright's own bound on element actions
    pub action_timeout_ms: u64,

    /// Bound on browser launch
    pub launch_timeout_ms: u64,

    pub viewport: Viewport,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            kind: Browser::Chromium,
            headless: true,
            node_binary: PathBuf::from("node"),
            working_dir: None,
            action_timeout_ms: 10_000,
            launch_timeout_ms: 30_000,
            viewport: Viewport {
                width: 1280,
                height: 720,
            },
        }
    }
}

/// Options handed to the bridge script on its command line
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BridgeOptions {
    browser: Browser,
    headless: bool,
    viewport: Viewport,
    action_timeout: u64,
    navigation_timeout: u64,
}

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum BridgeCommand<'a> {
    Goto { url: &'a str },
    WaitIdle,
    Count { selector: &'a str },
    Clear { selector: &'a str },
    Fill { selector: &'a str, text: &'a str },
    Type { selector: &'a str, text: &'a str, delay: u64 },
    TextContent { selector: &'a str },
    InputValue { selector: &'a str },
    InnerText { selector: &'a str },
    Click { selector: &'a str },
    Press { key: &'a str },
    IsFocused { selector: &'a str },
    Screenshot { path: &'a Path, full_page: bool },
    Close,
}

impl BridgeCommand<'_> {
    fn stage(&self) -> &'static str {
        match self {
            BridgeCommand::Goto { .. } => "navigation",
            BridgeCommand::WaitIdle => "network idle",
            BridgeCommand::Count { .. } => "selector query",
            BridgeCommand::Clear { .. } => "clear",
            BridgeCommand::Fill { .. } => "fill",
            BridgeCommand::Type { .. } => "typing",
            BridgeCommand::TextContent { .. } => "text content",
            BridgeCommand::InputValue { .. } => "input value",
            BridgeCommand::InnerText { .. } => "inner text",
            BridgeCommand::Click { .. } => "click",
            BridgeCommand::Press { .. } => "key press",
            BridgeCommand::IsFocused { .. } => "focus check",
            BridgeCommand::Screenshot { .. } => "screenshot",
            BridgeCommand::Close => "close",
        }
    }

    fn is_navigation(&self) -> bool {
        matches!(self, BridgeCommand::Goto { .. } | BridgeCommand::WaitIdle)
    }

    fn encode(&self, id: u64) -> E2eResult<String> {
        let mut msg = serde_json::to_value(self)?;
        if let serde_json::Value::Object(map) = &mut msg {
            map.insert("id".to_string(), id.into());
        }
        let mut line = serde_json::to_string(&msg)?;
        line.push('\n');
        Ok(line)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BridgeResponse {
    id: Option<u64>,
    ready: bool,
    ok: bool,
    value: serde_json::Value,
    error: Option<String>,
    timeout: bool,
}

impl BridgeResponse {
    /// Error for a line the bridge could not parse, so no id to echo
    fn is_rejection(&self) -> bool {
        self.id.is_none() && !self.ok && !self.ready
    }
}

/// Launches one bridge process per session
pub struct PlaywrightDriver {
    config: PlaywrightConfig,
    navigation_timeout_ms: u64,
    script_dir: Arc<TempDir>,
}

impl PlaywrightDriver {
    /// Verify Playwright is installed and write the bridge script
    pub fn new(config: PlaywrightConfig, navigation_timeout_ms: u64) -> E2eResult<Self> {
        Self::check_playwright_installed(&config)?;

        let script_dir = tempfile::Builder::new().prefix("swiftcheck-bridge").tempdir()?;
        std::fs::write(script_dir.path().join("bridge.js"), BRIDGE_SCRIPT)?;

        info!(
            "Playwright driver ready ({}, headless: {})",
            config.kind.as_str(),
            config.headless
        );

        Ok(Self {
            config,
            navigation_timeout_ms,
            script_dir: Arc::new(script_dir),
        })
    }

    /// Check if Playwright is installed
    fn check_playwright_installed(config: &PlaywrightConfig) -> E2eResult<()> {
        let mut cmd = Command::new("npx");
        cmd.args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(dir) = &config.working_dir {
            cmd.current_dir(dir);
        }

        match cmd.status() {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    fn options(&self) -> BridgeOptions {
        BridgeOptions {
            browser: self.config.kind,
            headless: self.config.headless,
            viewport: self.config.viewport,
            action_timeout: self.config.action_timeout_ms,
            navigation_timeout: self.navigation_timeout_ms,
        }
    }
}

#[async_trait]
impl BrowserDriver for PlaywrightDriver {
    type Session = PlaywrightSession;

    async fn open_session(&self) -> E2eResult<PlaywrightSession> {
        let script = self.script_dir.path().join("bridge.js");
        let options = serde_json::to_string(&self.options())?;

        let mut cmd = TokioCommand::new(&self.config.node_binary);
        cmd.arg(&script)
            .arg(options)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.config.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|e| {
            E2eError::Driver(format!(
                "Failed to spawn {}: {}",
                self.config.node_binary.display(),
                e
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::Driver("bridge stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::Driver("bridge stdout unavailable".to_string()))?;
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(target: "playwright", "{}", line);
                }
            });
        }

        let mut session = PlaywrightSession {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            next_id: 1,
            action_timeout_ms: self.config.action_timeout_ms,
            navigation_timeout_ms: self.navigation_timeout_ms,
            closed: false,
            _script_dir: self.script_dir.clone(),
        };

        let launch_ms = self.config.launch_timeout_ms;
        match timeout(Duration::from_millis(launch_ms), session.await_ready()).await {
            Ok(Ok(())) => Ok(session),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(E2eError::timeout("browser launch", launch_ms)),
        }
    }
}

/// One browser page behind a bridge process
pub struct PlaywrightSession {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
    action_timeout_ms: u64,
    navigation_timeout_ms: u64,
    closed: bool,
    _script_dir: Arc<TempDir>,
}

impl PlaywrightSession {
    async fn next_response(&mut self) -> E2eResult<BridgeResponse> {
        loop {
            let line = self
                .stdout
                .next_line()
                .await?
                .ok_or_else(|| E2eError::Driver("bridge process exited".to_string()))?;
            match serde_json::from_str::<BridgeResponse>(&line) {
                Ok(resp) => return Ok(resp),
                Err(_) => debug!(target: "playwright", "{}", line),
            }
        }
    }

    async fn await_ready(&mut self) -> E2eResult<()> {
        loop {
            if self.next_response().await?.ready {
                return Ok(());
            }
        }
    }

    async fn request(&mut self, cmd: BridgeCommand<'_>) -> E2eResult<serde_json::Value> {
        let id = self.next_id;
        self.next_id += 1;

        self.stdin.write_all(cmd.encode(id)?.as_bytes()).await?;
        self.stdin.flush().await?;

        loop {
            let resp = self.next_response().await?;
            if resp.is_rejection() {
                return Err(E2eError::Driver(format!(
                    "bridge rejected {} command: {}",
                    cmd.stage(),
                    resp.error.unwrap_or_else(|| "unparseable line".to_string())
                )));
            }
            // Answers to commands abandoned by a timed-out caller
            if resp.id != Some(id) {
                debug!("Discarding stale bridge response {:?}", resp.id);
                continue;
            }
            if resp.ok {
                return Ok(resp.value);
            }
            if resp.timeout {
                let ms = if cmd.is_navigation() {
                    self.navigation_timeout_ms
                } else {
                    self.action_timeout_ms
                };
                return Err(E2eError::timeout(cmd.stage(), ms));
            }
            return Err(E2eError::Driver(format!(
                "{} failed: {}",
                cmd.stage(),
                resp.error.unwrap_or_else(|| "unknown error".to_string())
            )));
        }
    }

    async fn request_unit(&mut self, cmd: BridgeCommand<'_>) -> E2eResult<()> {
        self.request(cmd).await.map(|_| ())
    }

    async fn request_string(&mut self, cmd: BridgeCommand<'_>) -> E2eResult<String> {
        match self.request(cmd).await? {
            serde_json::Value::String(s) => Ok(s),
            serde_json::Value::Null => Ok(String::new()),
            other => Ok(other.to_string()),
        }
    }

    async fn shutdown(&mut self) -> E2eResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        match timeout(CLOSE_GRACE, self.request(BridgeCommand::Close)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => debug!("Bridge close failed: {}", e),
            Err(_) => warn!("Bridge did not acknowledge close"),
        }

        if let Ok(Ok(status)) = timeout(CLOSE_GRACE, self.child.wait()).await {
            debug!("Bridge exited: {}", status);
            return Ok(());
        }

        // Try graceful shutdown first
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if let Some(pid) = self.child.id() {
                if kill(Pid::from_raw(pid as i32), Signal::SIGTERM).is_ok()
                    && timeout(CLOSE_GRACE, self.child.wait()).await.is_ok()
                {
                    return Ok(());
                }
            }
        }

        warn!("Killing unresponsive bridge process");
        self.child.kill().await?;
        Ok(())
    }
}

#[async_trait]
impl PageSession for PlaywrightSession {
    async fn navigate(&mut self, url: &str) -> E2eResult<()> {
        self.request_unit(BridgeCommand::Goto { url }).await
    }

    async fn await_idle(&mut self) -> E2eResult<()> {
        self.request_unit(BridgeCommand::WaitIdle).await
    }

    async fn query_count(&mut self, selector: &str) -> E2eResult<usize> {
        let value = self.request(BridgeCommand::Count { selector }).await?;
        value
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| E2eError::Driver(format!("count returned {}", value)))
    }

    async fn clear(&mut self, element: &ElementHandle) -> E2eResult<()> {
        self.request_unit(BridgeCommand::Clear {
            selector: &element.selector,
        })
        .await
    }

    async fn fill(&mut self, element: &ElementHandle, text: &str) -> E2eResult<()> {
        self.request_unit(BridgeCommand::Fill {
            selector: &element.selector,
            text,
        })
        .await
    }

    async fn type_text(&mut self, element: &ElementHandle, text: &str, delay_ms: u64) -> E2eResult<()> {
        self.request_unit(BridgeCommand::Type {
            selector: &element.selector,
            text,
            delay: delay_ms,
        })
        .await
    }

    async fn read_text(&mut self, element: &ElementHandle) -> E2eResult<Option<String>> {
        let value = self
            .request(BridgeCommand::TextContent {
                selector: &element.selector,
            })
            .await?;
        Ok(value.as_str().map(String::from))
    }

    async fn read_value(&mut self, element: &ElementHandle) -> E2eResult<String> {
        self.request_string(BridgeCommand::InputValue {
            selector: &element.selector,
        })
        .await
    }

    async fn read_inner_text(&mut self, element: &ElementHandle) -> E2eResult<String> {
        self.request_string(BridgeCommand::InnerText {
            selector: &element.selector,
        })
        .await
    }

    async fn click(&mut self, element: &ElementHandle) -> E2eResult<()> {
        self.request_unit(BridgeCommand::Click {
            selector: &element.selector,
        })
        .await
    }

    async fn press(&mut self, key: &str) -> E2eResult<()> {
        self.request_unit(BridgeCommand::Press { key }).await
    }

    async fn is_focused(&mut self, element: &ElementHandle) -> E2eResult<bool> {
        let value = self
            .request(BridgeCommand::IsFocused {
                selector: &element.selector,
            })
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn screenshot(&mut self, path: &Path, full_page: bool) -> E2eResult<()> {
        self.request_unit(BridgeCommand::Screenshot { path, full_page })
            .await
    }

    async fn close(&mut self) -> E2eResult<()> {
        self.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_commands_are_tagged_by_op() {
        let line = BridgeCommand::Type {
            selector: "textarea",
            text: "m",
            delay: 100,
        }
        .encode(7)
        .unwrap();
        assert!(line.ends_with('\n'));

        let value: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(
            value,
            json!({"op": "type", "selector": "textarea", "text": "m", "delay": 100, "id": 7})
        );

        let line = BridgeCommand::Screenshot {
            path: Path::new("screenshots/a.png"),
            full_page: true,
        }
        .encode(1)
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["op"], "screenshot");
        assert_eq!(value["path"], "screenshots/a.png");
        assert_eq!(value["full_page"], true);

        let value: serde_json::Value =
            serde_json::from_str(&BridgeCommand::WaitIdle.encode(2).unwrap()).unwrap();
        assert_eq!(value, json!({"op": "wait_idle", "id": 2}));
    }

    #[test]
    fn test_every_op_has_a_handler_in_the_bridge() {
        for op in [
            "goto", "wait_idle", "count", "clear", "fill", "type", "text_content",
            "input_value", "inner_text", "click", "press", "is_focused", "screenshot",
        ] {
            assert!(BRIDGE_SCRIPT.contains(&format!("    {}: ", op)), "missing handler for {op}");
        }
        assert!(BRIDGE_SCRIPT.contains("cmd.op === 'close'"));
    }

    #[test]
    fn test_responses_parse_with_missing_fields() {
        let ready: BridgeResponse = serde_json::from_str(r#"{"ready":true}"#).unwrap();
        assert!(ready.ready);
        assert_eq!(ready.id, None);

        let failed: BridgeResponse =
            serde_json::from_str(r#"{"id":3,"ok":false,"error":"Timeout 10000ms exceeded","timeout":true}"#)
                .unwrap();
        assert_eq!(failed.id, Some(3));
        assert!(!failed.ok);
        assert!(failed.timeout);
        assert!(failed.value.is_null());
    }

    #[test]
    fn test_malformed_line_gets_an_error_reply() {
        let body = &BRIDGE_SCRIPT[BRIDGE_SCRIPT.find("for await").unwrap()..];
        let guard = body.find("try {").unwrap();
        let parse = body.find("JSON.parse(line)").unwrap();
        assert!(guard < parse, "parse must sit inside the try block");

        let rejected: BridgeResponse = serde_json::from_str(
            r#"{"id":null,"ok":false,"error":"Unexpected end of JSON input","timeout":false}"#,
        )
        .unwrap();
        assert!(rejected.is_rejection());

        let ready: BridgeResponse = serde_json::from_str(r#"{"ready":true}"#).unwrap();
        assert!(!ready.is_rejection());
        let answered: BridgeResponse =
            serde_json::from_str(r#"{"id":4,"ok":false,"error":"boom"}"#).unwrap();
        assert!(!answered.is_rejection());
    }

    #[test]
    fn test_options_use_bridge_names() {
        let options = BridgeOptions {
            browser: Browser::Webkit,
            headless: false,
            viewport: Viewport {
                width: 800,
                height: 600,
            },
            action_timeout: 5,
            navigation_timeout: 6,
        };
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({
                "browser": "webkit",
                "headless": false,
                "viewport": {"width": 800, "height": 600},
                "actionTimeout": 5,
                "navigationTimeout": 6
            })
        );
    }

    #[test]
    fn test_browser_from_str() {
        assert_eq!("Firefox".parse::<Browser>().unwrap(), Browser::Firefox);
        assert_eq!("chrome".parse::<Browser>().unwrap(), Browser::Chromium);
        assert!("lynx".parse::<Browser>().is_err());
    }
}
