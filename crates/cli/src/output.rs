//! Output formatting for CLI

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use swiftcheck_common::TestCase;
use swiftcheck_e2e::{CaseReport, CaseStatus, TestSuiteResult};

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

impl TableDisplay for CaseReport {
    fn headers() -> Vec<&'static str> {
        vec!["Suite", "Case", "Status", "Expected", "Actual", "Detail", "Duration"]
    }

    fn row(&self) -> Vec<String> {
        let status = match self.status {
            CaseStatus::Passed => "✓ passed",
            CaseStatus::Failed => "✗ failed",
            CaseStatus::Tolerated => "~ tolerated",
        };
        let detail = self
            .error
            .as_deref()
            .or(self.note.as_deref())
            .unwrap_or_default();
        vec![
            self.suite.clone(),
            self.case_id.clone(),
            status.to_string(),
            self.expected.clone().unwrap_or_default(),
            self.actual.clone().unwrap_or_default(),
            truncate(detail, 60),
            format!("{}ms", self.duration_ms),
        ]
    }
}

/// Case as listed by `check`
#[derive(Serialize)]
pub struct CaseListing {
    pub suite: String,
    pub id: String,
    pub name: String,
    pub input: String,
    pub rule: String,
}

impl CaseListing {
    pub fn new(suite: &str, case: &TestCase, rule: String) -> Self {
        Self {
            suite: suite.to_string(),
            id: case.id.clone(),
            name: case.name.clone(),
            input: case.input.clone(),
            rule,
        }
    }
}

impl TableDisplay for CaseListing {
    fn headers() -> Vec<&'static str> {
        vec!["Suite", "Case", "Name", "Input", "Rule"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.suite.clone(),
            self.id.clone(),
            self.name.clone(),
            truncate(&self.input, 40),
            self.rule.clone(),
        ]
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}

/// Print a list of items
pub fn print_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No items found.");
                return;
            }
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);

            table.set_header(T::headers());
            for item in items {
                table.add_row(item.row());
            }

            println!("{table}");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items).unwrap_or_default());
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(items).unwrap_or_default());
        }
    }
}

/// Print a run's results with a summary line
pub fn print_results(result: &TestSuiteResult, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            print_list(&result.results, format);
            let summary = format!(
                "{} passed, {} failed, {} tolerated of {} ({} ms)",
                result.passed, result.failed, result.tolerated, result.total, result.duration_ms
            );
            if result.success() {
                print_success(&summary);
            } else {
                print_error(&summary);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result).unwrap_or_default());
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(result).unwrap_or_default());
        }
    }
}

/// Print success message
pub fn print_success(message: &str) {
    println!("✅ {}", message.green());
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("❌ {}", message.red());
}

/// Print warning message
pub fn print_warning(message: &str) {
    println!("⚠️  {}", message.yellow());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("මම ගෙදර", 10), "මම ගෙදර");
        assert_eq!(truncate("abcdef", 4), "abc…");
    }

    #[test]
    fn test_case_listing_row() {
        let case = TestCase {
            id: "Neg_Fun_0008".to_string(),
            name: "Empty input".to_string(),
            input: String::new(),
            expected: Some(String::new()),
            expected_behavior: None,
            mode: None,
        };
        let listing = CaseListing::new("negative", &case, "empty".to_string());
        assert_eq!(listing.row(), vec!["negative", "Neg_Fun_0008", "Empty input", "", "empty"]);
        assert_eq!(CaseListing::headers().len(), listing.row().len());
    }
}
