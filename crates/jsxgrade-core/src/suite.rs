//! Test suite loader.
//!
//! Loads suites from TOML or JSON files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;

use crate::checker::Checker;
use crate::model::{TestCase, TestKind, TestSuite};

/// Intermediate structure for parsing suite files.
#[derive(Debug, Deserialize)]
struct SuiteFile {
    suite: SuiteHeader,
    #[serde(default)]
    cases: Vec<TestCase>,
}

#[derive(Debug, Deserialize)]
struct SuiteHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

fn is_suite_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "toml" || ext == "json")
}

/// Parse a single suite file. `.json` files are read as JSON, anything else
/// as TOML.
pub fn load_suite(path: &Path) -> Result<TestSuite> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read suite file: {}", path.display()))?;

    parse_suite_str(&content, path)
}

/// Parse suite text; `source_path` picks the format and labels errors.
pub fn parse_suite_str(content: &str, source_path: &Path) -> Result<TestSuite> {
    let parsed: SuiteFile = if is_json(source_path) {
        serde_json::from_str(content)
            .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?
    } else {
        toml::from_str(content)
            .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?
    };

    Ok(TestSuite {
        id: parsed.suite.id,
        name: parsed.suite.name,
        description: parsed.suite.description,
        cases: parsed.cases,
    })
}

/// Recursively load all `.toml` and `.json` suite files from a directory.
/// Files that fail to load are skipped with a warning.
pub fn load_suite_directory(dir: &Path) -> Result<Vec<TestSuite>> {
    let mut suites = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("failed to read directory: {}", dir.display()))?;
    entries.sort_by_key(|entry| entry.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            suites.extend(load_suite_directory(&path)?);
        } else if is_suite_file(&path) {
            match load_suite(&path) {
                Ok(suite) => suites.push(suite),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(suites)
}

/// A warning from suite validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// Zero-based case index (if applicable).
    pub case_index: Option<usize>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn case(index: usize, message: impl Into<String>) -> Self {
        Self {
            case_index: Some(index),
            message: message.into(),
        }
    }
}

/// Validate a suite for common authoring mistakes.
pub fn validate_suite(suite: &TestSuite) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if suite.cases.is_empty() {
        warnings.push(ValidationWarning {
            case_index: None,
            message: "suite has no cases".into(),
        });
    }

    let mut seen = HashSet::new();
    for (index, case) in suite.cases.iter().enumerate() {
        if case.description.trim().is_empty() {
            warnings.push(ValidationWarning::case(index, "description is empty"));
        } else if !seen.insert(case.description.as_str()) {
            warnings.push(ValidationWarning::case(
                index,
                format!("duplicate description: {}", case.description),
            ));
        }

        match &case.kind {
            TestKind::Ast { checker } => match checker.as_deref().map(str::trim) {
                None | Some("") => {
                    warnings.push(ValidationWarning::case(index, "ast case has no checker"));
                }
                Some(source) => match Checker::compile(source) {
                    Ok(checker) => {
                        for name in checker.unknown_identifiers() {
                            warnings.push(ValidationWarning::case(
                                index,
                                format!("checker references unknown attribute: {name}"),
                            ));
                        }
                    }
                    Err(e) => {
                        warnings.push(ValidationWarning::case(
                            index,
                            format!("checker does not compile: {e}"),
                        ));
                    }
                },
            },
            TestKind::Pattern { pattern, .. } => match pattern.as_deref() {
                None | Some("") => {
                    warnings.push(ValidationWarning::case(index, "pattern case has no pattern"));
                }
                Some(pattern) => {
                    if Regex::new(pattern).is_err() {
                        warnings.push(ValidationWarning::case(
                            index,
                            "pattern is not a valid regex and will be matched as plain text",
                        ));
                    }
                }
            },
            TestKind::Runtime { validator: None } => {
                warnings.push(ValidationWarning::case(
                    index,
                    "runtime case has no validator and will always fail",
                ));
            }
            TestKind::Runtime { .. } => {}
            TestKind::Unknown(tag) => {
                warnings.push(ValidationWarning::case(
                    index,
                    format!("unknown test type: {tag}"),
                ));
            }
        }
    }

    warnings
}
