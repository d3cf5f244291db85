//! Core data model types for jsxgrade.
//!
//! Test cases describe how a submission is judged, test results carry the
//! verdicts, and a test suite groups cases loaded from a file.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

type ValidatorFn = dyn Fn(&str) -> Result<bool, String> + Send + Sync;

/// An opaque runtime judge supplied by lesson content.
///
/// Validators are attached programmatically and never serialized.
#[derive(Clone)]
pub struct Validator(Arc<ValidatorFn>);

impl Validator {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<bool, String> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, source: &str) -> Result<bool, String> {
        (self.0)(source)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validator(..)")
    }
}

/// How a test case judges a submission.
#[derive(Debug, Clone)]
pub enum TestKind {
    /// Evaluate a checker expression against the feature context.
    Ast { checker: Option<String> },
    /// Match a regex (or literal substring) against the raw source.
    Pattern {
        pattern: Option<String>,
        min_count: Option<u32>,
    },
    /// Call a lesson-supplied validator on the raw source.
    Runtime { validator: Option<Validator> },
    /// Any other `type` tag, kept so it can be reported.
    Unknown(String),
}

impl TestKind {
    /// The wire tag for this kind.
    pub fn tag(&self) -> &str {
        match self {
            TestKind::Ast { .. } => "ast",
            TestKind::Pattern { .. } => "pattern",
            TestKind::Runtime { .. } => "runtime",
            TestKind::Unknown(tag) => tag,
        }
    }
}

/// A single declarative test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RawTestCase", into = "RawTestCase")]
pub struct TestCase {
    /// Human-readable description, echoed into the result.
    pub description: String,
    pub kind: TestKind,
}

impl TestCase {
    pub fn ast(description: impl Into<String>, checker: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            kind: TestKind::Ast {
                checker: Some(checker.into()),
            },
        }
    }

    pub fn pattern(
        description: impl Into<String>,
        pattern: impl Into<String>,
        min_count: Option<u32>,
    ) -> Self {
        Self {
            description: description.into(),
            kind: TestKind::Pattern {
                pattern: Some(pattern.into()),
                min_count,
            },
        }
    }

    pub fn runtime<F>(description: impl Into<String>, validator: F) -> Self
    where
        F: Fn(&str) -> Result<bool, String> + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            kind: TestKind::Runtime {
                validator: Some(Validator::new(validator)),
            },
        }
    }

    pub fn is_ast(&self) -> bool {
        matches!(self.kind, TestKind::Ast { .. })
    }
}

/// Wire shape of a test case: `{ type, description, checker?, pattern?, minCount? }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTestCase {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    checker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pattern: Option<String>,
    #[serde(default, alias = "min_count", skip_serializing_if = "Option::is_none")]
    min_count: Option<u32>,
}

impl From<RawTestCase> for TestCase {
    fn from(raw: RawTestCase) -> Self {
        let kind = match raw.kind.as_str() {
            "ast" => TestKind::Ast {
                checker: raw.checker,
            },
            "pattern" => TestKind::Pattern {
                pattern: raw.pattern,
                min_count: raw.min_count,
            },
            "runtime" => TestKind::Runtime { validator: None },
            _ => TestKind::Unknown(raw.kind),
        };
        Self {
            description: raw.description,
            kind,
        }
    }
}

impl From<TestCase> for RawTestCase {
    fn from(case: TestCase) -> Self {
        let mut raw = RawTestCase {
            kind: case.kind.tag().to_string(),
            description: case.description,
            checker: None,
            pattern: None,
            min_count: None,
        };
        match case.kind {
            TestKind::Ast { checker } => raw.checker = checker,
            TestKind::Pattern { pattern, min_count } => {
                raw.pattern = pattern;
                raw.min_count = min_count;
            }
            TestKind::Runtime { .. } | TestKind::Unknown(_) => {}
        }
        raw
    }
}

/// The verdict for one test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub description: String,
    pub passed: bool,
    /// Diagnostic detail, present on most failures and on pattern passes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TestResult {
    pub fn pass(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            passed: true,
            message: None,
        }
    }

    pub fn fail(description: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            passed: false,
            message: Some(message.into()),
        }
    }
}

/// Ordered results of one suite run, 1:1 with the input cases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub results: Vec<TestResult>,
}

/// Aggregate counts over a suite run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteMetrics {
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
    /// Percentage of passed cases, 0 to 100.
    pub pass_rate: f64,
}

impl TestSuiteResult {
    pub fn new(results: Vec<TestResult>) -> Self {
        Self { results }
    }

    /// True only for a non-empty run where every case passed. An empty run
    /// has not been evaluated yet.
    pub fn all_passed(&self) -> bool {
        !self.results.is_empty() && self.results.iter().all(|r| r.passed)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn metrics(&self) -> SuiteMetrics {
        let total = self.results.len();
        let passed = self.results.iter().filter(|r| r.passed).count();
        let pass_rate = if total == 0 {
            0.0
        } else {
            passed as f64 / total as f64 * 100.0
        };
        SuiteMetrics {
            passed,
            failed: total - passed,
            total,
            pass_rate,
        }
    }
}

impl fmt::Display for SuiteMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} passed ({:.1}%)",
            self.passed, self.total, self.pass_rate
        )
    }
}

/// A named collection of test cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuite {
    /// Unique identifier for this suite.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Description of what the suite checks.
    #[serde(default)]
    pub description: String,
    /// The cases in this suite, in evaluation order.
    #[serde(default)]
    pub cases: Vec<TestCase>,
}
