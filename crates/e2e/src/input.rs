//! Writing text into the input surface

use std::time::Duration;

use swiftcheck_common::WriteMode;
use tracing::debug;

use crate::driver::{ElementHandle, PageSession};
use crate::error::E2eResult;

/// Writes text into a resolved input surface.
///
/// Always clears prior content first. Never checks the output; that is a
/// separate, later step.
#[derive(Debug, Clone)]
pub struct InputDriver {
    per_char_delay_ms: u64,
    char_settle_ms: u64,
}

impl InputDriver {
    pub fn new(per_char_delay_ms: u64, char_settle_ms: u64) -> Self {
        Self {
            per_char_delay_ms,
            char_settle_ms,
        }
    }

    pub async fn write<S>(&self, session: &mut S, element: &ElementHandle, text: &str, mode: WriteMode) -> E2eResult<()>
    where
        S: PageSession + ?Sized,
    {
        match mode {
            WriteMode::Bulk => self.bulk_fill(session, element, text).await,
            WriteMode::CharByChar => self.type_char_by_char(session, element, text).await,
        }
    }

    /// Clear, then set the whole text atomically
    pub async fn bulk_fill<S>(&self, session: &mut S, element: &ElementHandle, text: &str) -> E2eResult<()>
    where
        S: PageSession + ?Sized,
    {
        session.clear(element).await?;
        session.fill(element, text).await?;
        debug!("Filled {} with {:?}", element.selector, text);
        Ok(())
    }

    /// Clear, then type one character at a time with a settle pause after
    /// each so incremental conversion can run.
    pub async fn type_char_by_char<S>(&self, session: &mut S, element: &ElementHandle, text: &str) -> E2eResult<()>
    where
        S: PageSession + ?Sized,
    {
        session.clear(element).await?;
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            session
                .type_text(element, ch.encode_utf8(&mut buf), self.per_char_delay_ms)
                .await?;
            if self.char_settle_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.char_settle_ms)).await;
            }
        }
        debug!("Typed {} char(s) into {}", text.chars().count(), element.selector);
        Ok(())
    }
}
