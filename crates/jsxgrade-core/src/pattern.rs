//! Textual pattern judging against raw source.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Outcome of one pattern check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternOutcome {
    pub passed: bool,
    /// Number of non-overlapping matches. `None` when the pattern was not a
    /// valid regex and a substring check ran instead.
    pub count: Option<usize>,
    pub message: String,
}

/// A missing or zero minimum means one match is enough.
pub fn effective_min_count(min_count: Option<u32>) -> u32 {
    match min_count {
        None | Some(0) => 1,
        Some(n) => n,
    }
}

/// Count matches of `pattern` in `source` and compare against `min_count`.
///
/// A pattern that does not compile is treated as a literal substring.
pub fn match_pattern(source: &str, pattern: &str, min_count: Option<u32>) -> PatternOutcome {
    match Regex::new(pattern) {
        Ok(regex) => {
            let count = regex.find_iter(source).count();
            let min_count = effective_min_count(min_count);
            let passed = count >= min_count as usize;
            let message = if passed {
                format!("Pattern found {count} time(s)")
            } else {
                format!("Pattern found {count} time(s), expected at least {min_count}")
            };
            PatternOutcome {
                passed,
                count: Some(count),
                message,
            }
        }
        Err(err) => {
            tracing::debug!(pattern, error = %err, "pattern is not a valid regex, using substring match");
            let passed = source.contains(pattern);
            PatternOutcome {
                passed,
                count: None,
                message: if passed {
                    "Pattern found as plain text (not a valid regex)".to_string()
                } else {
                    format!("Pattern not found: {pattern} (not a valid regex, matched as plain text)")
                },
            }
        }
    }
}
