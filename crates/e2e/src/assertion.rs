//! Per-case assertion dispatch
//!
//! Edge-case categories assert different things (unmapped tokens pass
//! through, whitespace collapses, boundary-length input still produces
//! something), so each case id is mapped to a rule instead of sharing one
//! exact-match check. Lookup goes exact id, then id category, then the
//! default [`AssertionRule::ExactMatch`].

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use swiftcheck_common::TestCase;

/// Trailing `_<digits>` sequence number of a case id
static CASE_SEQUENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<category>.+?)_\d+$").expect("valid category regex"));

static DEFAULT_RULE: AssertionRule = AssertionRule::ExactMatch;

/// Validation applied to the actual output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum AssertionRule {
    /// Output equals the case's `expected`
    ExactMatch,
    /// Output contains every listed substring
    ContainsAll { values: Vec<String> },
    /// Output is longer than `length` characters
    LengthGreaterThan {
        #[serde(default)]
        length: usize,
    },
    /// Output is exactly empty
    EmptyExact,
}

impl fmt::Display for AssertionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssertionRule::ExactMatch => write!(f, "exact match"),
            AssertionRule::ContainsAll { values } => write!(f, "contains all of {:?}", values),
            AssertionRule::LengthGreaterThan { length } => write!(f, "length > {}", length),
            AssertionRule::EmptyExact => write!(f, "empty"),
        }
    }
}

/// Outcome of a dispatched assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail(String),
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

/// Rules keyed by exact case id and by id category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleTable {
    pub ids: BTreeMap<String, AssertionRule>,
    pub categories: BTreeMap<String, AssertionRule>,
}

impl RuleTable {
    /// The edge-case table for the negative functional suite.
    pub fn standard() -> Self {
        let contains = |values: &[&str]| AssertionRule::ContainsAll {
            values: values.iter().map(|v| v.to_string()).collect(),
        };

        let mut ids = BTreeMap::new();
        ids.insert("Neg_Fun_0001".to_string(), contains(&["IDK"]));
        ids.insert("Neg_Fun_0002".to_string(), contains(&["LOL"]));
        ids.insert("Neg_Fun_0003".to_string(), contains(&["!!!", "???"]));
        ids.insert("Neg_Fun_0004".to_string(), AssertionRule::ExactMatch);
        ids.insert("Neg_Fun_0005".to_string(), AssertionRule::ExactMatch);
        ids.insert("Neg_Fun_0006".to_string(), contains(&["2"]));
        ids.insert("Neg_Fun_0007".to_string(), contains(&["@", "#"]));
        ids.insert("Neg_Fun_0008".to_string(), AssertionRule::EmptyExact);
        ids.insert("Neg_Fun_0009".to_string(), AssertionRule::EmptyExact);
        ids.insert(
            "Neg_Fun_0010".to_string(),
            AssertionRule::LengthGreaterThan { length: 0 },
        );

        Self {
            ids,
            categories: BTreeMap::new(),
        }
    }
}

/// Category of a case id: the id without its trailing sequence number.
///
/// `Neg_Fun_0001` belongs to `Neg_Fun`. Ids without a numeric suffix have
/// no category.
pub fn category_of(case_id: &str) -> Option<&str> {
    CASE_SEQUENCE
        .captures(case_id)
        .and_then(|c| c.name("category"))
        .map(|m| m.as_str())
}

#[derive(Debug, Clone)]
pub struct AssertionDispatcher {
    table: RuleTable,
}

impl AssertionDispatcher {
    pub fn new(table: RuleTable) -> Self {
        Self { table }
    }

    pub fn rule_for(&self, case_id: &str) -> &AssertionRule {
        self.table
            .ids
            .get(case_id)
            .or_else(|| category_of(case_id).and_then(|c| self.table.categories.get(c)))
            .unwrap_or(&DEFAULT_RULE)
    }

    pub fn dispatch(&self, case_id: &str, actual: &str, case: &TestCase) -> Verdict {
        evaluate(self.rule_for(case_id), actual, case.expected.as_deref())
    }
}

fn evaluate(rule: &AssertionRule, actual: &str, expected: Option<&str>) -> Verdict {
    match rule {
        AssertionRule::ExactMatch => match expected {
            Some(expected) if expected == actual => Verdict::Pass,
            Some(_) => Verdict::Fail("output differs from expected".to_string()),
            None => Verdict::Fail("no expected output".to_string()),
        },
        AssertionRule::ContainsAll { values } => {
            let missing: Vec<&str> = values
                .iter()
                .map(String::as_str)
                .filter(|v| !actual.contains(v))
                .collect();
            if missing.is_empty() {
                Verdict::Pass
            } else {
                Verdict::Fail(format!("output is missing {:?}", missing))
            }
        }
        AssertionRule::LengthGreaterThan { length } => {
            let count = actual.chars().count();
            if count > *length {
                Verdict::Pass
            } else {
                Verdict::Fail(format!("output length {} is not greater than {}", count, length))
            }
        }
        AssertionRule::EmptyExact => {
            if actual.is_empty() {
                Verdict::Pass
            } else {
                Verdict::Fail("output should be empty".to_string())
            }
        }
    }
}
