//! Test orchestrator.
//!
//! Runs an ordered list of test cases against one submission, parsing and
//! extracting at most once, and never lets a judge failure escape.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::ContextCache;
use crate::checker::Checker;
use crate::config::GraderConfig;
use crate::context::FeatureContext;
use crate::extract;
use crate::model::{TestCase, TestKind, TestResult, TestSuiteResult, Validator};
use crate::pattern::match_pattern;

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_case_complete(&self, index: usize, result: &TestResult);
    fn on_suite_complete(&self, result: &TestSuiteResult);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_case_complete(&self, _: usize, _: &TestResult) {}
    fn on_suite_complete(&self, _: &TestSuiteResult) {}
}

/// The grading engine.
#[derive(Debug, Default)]
pub struct Grader {
    config: GraderConfig,
    cache: Option<Arc<ContextCache>>,
}

impl Grader {
    pub fn new(config: GraderConfig) -> Self {
        Self {
            config,
            cache: None,
        }
    }

    /// Build a grader with a cache sized from `config.cache_capacity`, or
    /// none when the capacity is zero.
    pub fn from_config(config: GraderConfig) -> Self {
        let cache = (config.cache_capacity > 0)
            .then(|| Arc::new(ContextCache::new(config.cache_capacity)));
        Self { config, cache }
    }

    pub fn with_cache(mut self, cache: Arc<ContextCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &GraderConfig {
        &self.config
    }

    pub fn cache(&self) -> Option<&Arc<ContextCache>> {
        self.cache.as_ref()
    }

    /// Feature context for `source`, served from the cache when one is set.
    pub fn context_for(&self, source: &str) -> Arc<FeatureContext> {
        let compute =
            || extract::analyze_source_with_depth(source, self.config.max_nesting_depth);
        match &self.cache {
            Some(cache) => cache.get_or_insert_with(source, compute),
            None => Arc::new(compute()),
        }
    }

    /// Run every case against `source`. The output has one result per case,
    /// in input order.
    pub fn run_all(&self, source: &str, cases: &[TestCase]) -> TestSuiteResult {
        self.run_all_with(source, cases, &NoopReporter)
    }

    pub fn run_all_with(
        &self,
        source: &str,
        cases: &[TestCase],
        reporter: &dyn ProgressReporter,
    ) -> TestSuiteResult {
        let mut context: Option<Arc<FeatureContext>> = None;
        let mut results = Vec::with_capacity(cases.len());

        for (index, case) in cases.iter().enumerate() {
            let result = self.run_case(source, case, &mut context);
            if self.config.log_cases {
                debug!(
                    index,
                    kind = case.kind.tag(),
                    description = %case.description,
                    passed = result.passed,
                    message = result.message.as_deref().unwrap_or(""),
                    "graded case"
                );
            }
            reporter.on_case_complete(index, &result);
            results.push(result);
        }

        let suite = TestSuiteResult::new(results);
        let metrics = suite.metrics();
        info!(
            passed = metrics.passed,
            failed = metrics.failed,
            total = metrics.total,
            parsed = context.is_some(),
            "graded submission"
        );
        reporter.on_suite_complete(&suite);
        suite
    }

    /// Grade a single case, containing any panic raised by its judge.
    fn run_case(
        &self,
        source: &str,
        case: &TestCase,
        context: &mut Option<Arc<FeatureContext>>,
    ) -> TestResult {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match &case.kind {
            TestKind::Ast { checker } => {
                let ctx = context.get_or_insert_with(|| self.context_for(source));
                judge_ast(&case.description, checker.as_deref(), ctx)
            }
            TestKind::Pattern { pattern, min_count } => {
                self.judge_pattern(&case.description, source, pattern.as_deref(), *min_count)
            }
            TestKind::Runtime { validator } => {
                judge_runtime(&case.description, source, validator.as_ref())
            }
            TestKind::Unknown(tag) => {
                TestResult::fail(&case.description, format!("Unknown test type: {tag}"))
            }
        }));

        outcome.unwrap_or_else(|payload| {
            TestResult::fail(
                &case.description,
                format!("Test error: {}", panic_message(payload.as_ref())),
            )
        })
    }

    fn judge_pattern(
        &self,
        description: &str,
        source: &str,
        pattern: Option<&str>,
        min_count: Option<u32>,
    ) -> TestResult {
        let Some(pattern) = pattern.filter(|p| !p.is_empty()) else {
            return TestResult::fail(description, "No pattern provided");
        };
        let min_count = match min_count {
            None | Some(0) => self.config.default_min_count,
            Some(n) => n,
        };
        let outcome = match_pattern(source, pattern, Some(min_count));
        TestResult {
            description: description.to_string(),
            passed: outcome.passed,
            message: Some(outcome.message),
        }
    }
}

fn judge_ast(description: &str, checker: Option<&str>, ctx: &FeatureContext) -> TestResult {
    let Some(checker) = checker.filter(|c| !c.trim().is_empty()) else {
        return TestResult::fail(description, "No checker expression provided");
    };
    if let Some(error) = &ctx.parse_error {
        return TestResult::fail(description, format!("Code parsing failed: {error}"));
    }
    match Checker::compile(checker).and_then(|compiled| compiled.test(ctx)) {
        Ok(true) => TestResult::pass(description),
        Ok(false) => TestResult {
            description: description.to_string(),
            passed: false,
            message: None,
        },
        Err(err) => TestResult::fail(description, format!("Checker evaluation failed: {err}")),
    }
}

fn judge_runtime(description: &str, source: &str, validator: Option<&Validator>) -> TestResult {
    let Some(validator) = validator else {
        return TestResult::fail(description, "No validator function provided");
    };
    match validator.call(source) {
        Ok(true) => TestResult::pass(description),
        Ok(false) => TestResult {
            description: description.to_string(),
            passed: false,
            message: None,
        },
        Err(message) => TestResult::fail(description, format!("Validator error: {message}")),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown error".to_string()
    }
}
