//! Reachability check for the page under test

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreflightConfig {
    pub enabled: bool,
    /// Total time to keep polling
    pub timeout_ms: u64,
    /// Pause between attempts
    pub interval_ms: u64,
}

impl Default for PreflightConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: 15_000,
            interval_ms: 500,
        }
    }
}

/// Poll `base_url` until it answers with a success or redirect status.
///
/// Returns the number of attempts it took.
pub async fn wait_for_reachable(base_url: &str, config: &PreflightConfig) -> E2eResult<usize> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .redirect(reqwest::redirect::Policy::none())
        .build()?;

    let bound = Duration::from_millis(config.timeout_ms);
    let start = Instant::now();
    let mut attempts = 0;

    loop {
        attempts += 1;

        match client.get(base_url).send().await {
            Ok(resp) if resp.status().is_success() || resp.status().is_redirection() => {
                info!("{} is reachable ({})", base_url, resp.status());
                return Ok(attempts);
            }
            Ok(resp) => {
                warn!("{} answered {}", base_url, resp.status());
            }
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for {} to answer...", base_url);
                }
                if !e.is_connect() {
                    warn!("Reachability check error: {}", e);
                }
            }
        }

        if start.elapsed() >= bound {
            return Err(E2eError::Unreachable(attempts));
        }
        sleep(Duration::from_millis(config.interval_ms)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn serve_once(status_line: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf).await;
                let response = format!("{}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n", status_line);
                let _ = stream.write_all(response.as_bytes()).await;
            }
        });
        format!("http://{}/", addr)
    }

    fn quick() -> PreflightConfig {
        PreflightConfig {
            enabled: true,
            timeout_ms: 300,
            interval_ms: 50,
        }
    }

    #[tokio::test]
    async fn test_success_is_reachable() {
        let url = serve_once("HTTP/1.1 200 OK").await;
        assert_eq!(wait_for_reachable(&url, &quick()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_redirect_is_reachable() {
        let url = serve_once("HTTP/1.1 302 Found\r\nlocation: /home").await;
        assert!(wait_for_reachable(&url, &quick()).await.is_ok());
    }

    #[tokio::test]
    async fn test_server_error_is_unreachable() {
        let url = serve_once("HTTP/1.1 503 Service Unavailable").await;
        match wait_for_reachable(&url, &quick()).await {
            Err(E2eError::Unreachable(attempts)) => assert!(attempts >= 2),
            other => panic!("expected Unreachable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_closed_port_is_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = wait_for_reachable(&format!("http://{}/", addr), &quick()).await;
        assert!(matches!(result, Err(E2eError::Unreachable(_))));
    }
}
