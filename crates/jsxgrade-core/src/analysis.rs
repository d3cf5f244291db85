//! Lightweight code validation and quality metrics for editor feedback.
//!
//! These checks are advisory and independent of test grading.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::syntax::{self, Node, NodeKind};

/// Regex for `var`/`let`/`const` bindings with a plain identifier target.
static DECLARATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:var|let|const)\s+([a-zA-Z_$][a-zA-Z0-9_$]*)")
        .expect("DECLARATION_RE regex should compile")
});

static CAMEL_CASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-z][a-zA-Z0-9]*|_[a-zA-Z0-9]*)$").expect("CAMEL_CASE_RE regex should compile")
});

static IF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bif\s*\(").expect("IF_RE regex should compile"));
static ELSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\belse\s*\{").expect("ELSE_RE regex should compile"));
static CASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bcase\s+").expect("CASE_RE regex should compile"));
static LOOP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:for|while)\s*\(").expect("LOOP_RE regex should compile"));
static TERNARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s\?\s").expect("TERNARY_RE regex should compile"));

pub const VAR_WARNING: &str = r#"Using "var" is discouraged, consider using "let" or "const""#;

/// Result of [`validate_code`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeAnalysis {
    pub has_errors: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Result of [`analyze_quality`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    pub lines: usize,
    /// Length in UTF-16 code units, as an editor counts it.
    pub characters: usize,
    pub has_consistent_indent: bool,
    pub indent_style: IndentStyle,
    /// Percentage (0 to 100) of distinct declared names in camelCase.
    pub naming_compliance: u32,
    pub naming_issues: Vec<String>,
    pub complexity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndentStyle {
    Tabs,
    Spaces,
}

/// Check that `source` is non-empty, balanced and parseable, and collect
/// style warnings.
pub fn validate_code(source: &str) -> CodeAnalysis {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if source.trim().is_empty() {
        errors.push("Code is empty".to_string());
    }
    if let Some(error) = check_brackets(source) {
        errors.push(error);
    }

    let uses_var = match syntax::parse(source) {
        Ok(tree) => {
            let mut found = false;
            tree.walk(&mut |node: &Node| {
                if matches!(node.kind, NodeKind::VariableDeclaration { kind: "var" }) {
                    found = true;
                }
            });
            found
        }
        Err(err) => {
            errors.push(format!("Syntax error: {err}"));
            source.contains("var ")
        }
    };
    if uses_var {
        warnings.push(VAR_WARNING.to_string());
    }

    CodeAnalysis {
        has_errors: !errors.is_empty(),
        errors,
        warnings,
    }
}

/// Find the first bracket mismatch, ignoring string, template, and comment
/// contents.
fn check_brackets(source: &str) -> Option<String> {
    let mut stack: Vec<char> = Vec::new();
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                // Single-line strings; an unescaped newline ends them too.
                while let Some(next) = chars.next() {
                    match next {
                        '\\' => {
                            chars.next();
                        }
                        '\n' => break,
                        _ if next == c => break,
                        _ => {}
                    }
                }
            }
            '`' => {
                while let Some(next) = chars.next() {
                    match next {
                        '\\' => {
                            chars.next();
                        }
                        '`' => break,
                        _ => {}
                    }
                }
            }
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            '{' | '[' | '(' => stack.push(c),
            '}' | ']' | ')' => {
                let open = match c {
                    '}' => '{',
                    ']' => '[',
                    _ => '(',
                };
                if stack.pop() != Some(open) {
                    return Some(format!("Mismatched brackets around \"{c}\""));
                }
            }
            _ => {}
        }
    }

    stack
        .last()
        .map(|open| format!("Unclosed bracket: \"{open}\""))
}

/// Compute size, indentation, naming, and complexity metrics.
pub fn analyze_quality(source: &str) -> QualityMetrics {
    let (has_consistent_indent, indent_style) = indentation(source);
    let (naming_compliance, naming_issues) = naming(source);
    QualityMetrics {
        lines: source.split('\n').count(),
        characters: source.encode_utf16().count(),
        has_consistent_indent,
        indent_style,
        naming_compliance,
        naming_issues,
        complexity: complexity(source),
    }
}

fn indentation(source: &str) -> (bool, IndentStyle) {
    let mut has_tab = false;
    let mut has_space = false;
    for line in source.split('\n') {
        for c in line.chars().take_while(|c| c.is_whitespace()) {
            match c {
                '\t' => has_tab = true,
                ' ' => has_space = true,
                _ => {}
            }
        }
    }
    let style = if has_tab {
        IndentStyle::Tabs
    } else {
        IndentStyle::Spaces
    };
    (!(has_tab && has_space), style)
}

fn naming(source: &str) -> (u32, Vec<String>) {
    let mut seen = HashSet::new();
    let mut issues = Vec::new();
    let mut compliant = 0usize;

    for captures in DECLARATION_RE.captures_iter(source) {
        let Some(name) = captures.get(1).map(|m| m.as_str()) else {
            continue;
        };
        if !seen.insert(name) {
            continue;
        }
        if CAMEL_CASE_RE.is_match(name) {
            compliant += 1;
        } else {
            issues.push(format!("Variable \"{name}\" should use camelCase"));
        }
    }

    let compliance = if seen.is_empty() {
        100
    } else {
        (compliant as f64 / seen.len() as f64 * 100.0).round() as u32
    };
    (compliance, issues)
}

fn complexity(source: &str) -> u32 {
    let count = |re: &Regex| re.find_iter(source).count() as f64;
    let branches = count(&IF_RE) + count(&ELSE_RE) + count(&CASE_RE) + count(&LOOP_RE);
    (1.0 + branches + count(&TERNARY_RE) * 0.5).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_code_is_an_error() {
        let analysis = validate_code("   \n");
        assert!(analysis.has_errors);
        assert_eq!(analysis.errors, vec!["Code is empty"]);
    }

    #[test]
    fn bracket_errors() {
        assert_eq!(
            check_brackets("function f() { return [1, 2); }"),
            Some("Mismatched brackets around \")\"".to_string())
        );
        assert_eq!(
            check_brackets("if (x) {"),
            Some("Unclosed bracket: \"{\"".to_string())
        );
        assert_eq!(check_brackets("const s = '(' + \"[\" + `{`; // )"), None);
        assert_eq!(check_brackets("/* { */ const a = (1);"), None);
    }

    #[test]
    fn syntax_errors_are_reported() {
        let analysis = validate_code("const x = {");
        assert!(analysis.has_errors);
        assert_eq!(analysis.errors[0], "Unclosed bracket: \"{\"");
        assert!(analysis.errors[1].starts_with("Syntax error: "));
    }

    #[test]
    fn var_warning_uses_the_tree() {
        let analysis = validate_code("var count = 0;");
        assert!(!analysis.has_errors);
        assert_eq!(analysis.warnings, vec![VAR_WARNING]);

        // Mentions in strings do not count once the code parses.
        let analysis = validate_code("const s = 'var x';");
        assert!(analysis.warnings.is_empty());

        let analysis = validate_code("var x = (");
        assert!(analysis.has_errors);
        assert_eq!(analysis.warnings, vec![VAR_WARNING]);
    }

    #[test]
    fn quality_metrics() {
        let src = "function App() {\n  const userName = 'a';\n  let UserAge = 3;\n  if (userName) {\n    return x ? 1 : 2;\n  } else {\n    return 0;\n  }\n}";
        let metrics = analyze_quality(src);
        assert_eq!(metrics.lines, 9);
        assert_eq!(metrics.characters, src.len());
        assert!(metrics.has_consistent_indent);
        assert_eq!(metrics.indent_style, IndentStyle::Spaces);
        assert_eq!(metrics.naming_compliance, 50);
        assert_eq!(
            metrics.naming_issues,
            vec!["Variable \"UserAge\" should use camelCase"]
        );
        // 1 + if + else + round(0.5 * 1 ternary) = 3.5, rounded to 4.
        assert_eq!(metrics.complexity, 4);
    }

    #[test]
    fn mixed_indentation() {
        let metrics = analyze_quality("a\n\tb\n  c");
        assert!(!metrics.has_consistent_indent);
        assert_eq!(metrics.indent_style, IndentStyle::Tabs);
        assert_eq!(metrics.naming_compliance, 100);
        assert_eq!(metrics.complexity, 1);
    }

    #[test]
    fn duplicate_names_count_once() {
        let (compliance, issues) = naming("let Bad = 1; let Bad = 2; const _ok = 3;");
        assert_eq!(compliance, 50);
        assert_eq!(issues.len(), 1);
    }
}
