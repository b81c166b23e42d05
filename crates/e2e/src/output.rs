//! Reading rendered text from the output surface

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::driver::{ElementHandle, PageSession};

/// Returned when no extraction strategy yields a value.
pub const EMPTY_OUTPUT: &str = "";

/// One way of pulling text out of an element. A strategy misses when the
/// driver errors or yields nothing but whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// DOM text content
    TextContent,
    /// Form control value
    InputValue,
    /// Visible inner text
    InnerText,
}

impl ExtractionStrategy {
    async fn extract<S>(&self, session: &mut S, element: &ElementHandle) -> Option<String>
    where
        S: PageSession + ?Sized,
    {
        let result = match self {
            ExtractionStrategy::TextContent => session.read_text(element).await,
            ExtractionStrategy::InputValue => session.read_value(element).await.map(Some),
            ExtractionStrategy::InnerText => session.read_inner_text(element).await.map(Some),
        };
        match result {
            Ok(value) => value.filter(|text| !text.trim().is_empty()),
            Err(e) => {
                debug!("{:?} failed on {}: {}", self, element.selector, e);
                None
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Strategies in priority order
    pub extraction: Vec<ExtractionStrategy>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            extraction: vec![
                ExtractionStrategy::TextContent,
                ExtractionStrategy::InputValue,
                ExtractionStrategy::InnerText,
            ],
        }
    }
}

/// Extracts trimmed text; never fails outward.
#[derive(Debug, Clone)]
pub struct OutputReader {
    strategies: Vec<ExtractionStrategy>,
}

impl OutputReader {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            strategies: config.extraction.clone(),
        }
    }

    pub async fn read<S>(&self, session: &mut S, element: &ElementHandle) -> String
    where
        S: PageSession + ?Sized,
    {
        for strategy in &self.strategies {
            if let Some(text) = strategy.extract(session, element).await {
                return text.trim().to_string();
            }
        }
        debug!("No extraction strategy produced text for {}", element.selector);
        EMPTY_OUTPUT.to_string()
    }
}
