//! The `jsxgrade check` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use jsxgrade_core::config::load_config_from;
use jsxgrade_core::engine::ProgressReporter;
use jsxgrade_core::suite::load_suite;
use jsxgrade_core::{Grader, TestResult, TestSuiteResult};

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_case_complete(&self, index: usize, result: &TestResult) {
        let status = if result.passed { "PASS" } else { "FAIL" };
        eprintln!("  [{}] {status} {}", index + 1, result.description);
    }

    fn on_suite_complete(&self, result: &TestSuiteResult) {
        eprintln!("\nComplete: {}", result.metrics());
    }
}

pub fn execute(
    code_path: PathBuf,
    suite_path: PathBuf,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(
        matches!(format.as_str(), "text" | "json"),
        "unknown format: {format} (expected text or json)"
    );

    let config = load_config_from(config_path.as_deref())?;
    let suite = load_suite(&suite_path)?;
    let source = std::fs::read_to_string(&code_path)
        .with_context(|| format!("failed to read source file: {}", code_path.display()))?;

    let grader = Grader::from_config(config);
    let result = if format == "json" {
        grader.run_all(&source, &suite.cases)
    } else {
        eprintln!("Suite: {} ({} cases)", suite.name, suite.cases.len());
        grader.run_all_with(&source, &suite.cases, &ConsoleReporter)
    };
    let metrics = result.metrics();

    if format == "json" {
        let report = serde_json::json!({
            "suite": suite.id,
            "gradedAt": chrono::Utc::now().to_rfc3339(),
            "results": result.results,
            "metrics": metrics,
            "allPassed": result.all_passed(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let mut table = Table::new();
        table.set_header(vec!["#", "Case", "Result", "Message"]);
        for (i, r) in result.results.iter().enumerate() {
            table.add_row(vec![
                Cell::new(i + 1),
                Cell::new(&r.description),
                Cell::new(if r.passed { "PASS" } else { "FAIL" }),
                Cell::new(r.message.as_deref().unwrap_or("")),
            ]);
        }
        println!("{table}");
        println!("\n{metrics}");
    }

    if !result.all_passed() {
        std::process::exit(1);
    }

    Ok(())
}
