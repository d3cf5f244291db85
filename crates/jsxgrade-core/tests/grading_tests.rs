//! End-to-end grading properties over the public API.

use jsxgrade_core::checker::{evaluate, try_evaluate};
use jsxgrade_core::extract::{analyze_source, extract};
use jsxgrade_core::syntax::parse;
use jsxgrade_core::{FeatureContext, Grader, TestCase, TestKind, TestResult};

const COMPONENT: &str = r#"import React, { useState } from "react";

type Props = { initial?: number };

export function Counter({ initial = 0 }: Props) {
  const [count, setCount] = useState<number>(initial);
  const label = count > 0 ? `Clicked ${count} times` : "Not clicked";
  return (
    <div className="counter">
      {count > 10 && <strong>Wow!</strong>}
      <button onClick={() => setCount((c) => c + 1)}>{label}</button>
    </div>
  );
}
"#;

fn assert_defaulted_if_broken(source: &str) {
    let ctx = extract(&parse(source));
    if let Some(message) = &ctx.parse_error {
        assert!(!message.is_empty());
        assert_eq!(ctx, FeatureContext::broken(message.clone()), "{source:?}");
    }
}

#[test]
fn garbage_inputs_degrade_to_defaults() {
    let inputs = [
        "",
        "   ",
        "\u{0}\u{1}\u{2}",
        "}}}}",
        "((((((",
        "<<<>>>",
        "const x = {",
        "function",
        "`unterminated ${",
        "/* open comment",
        "\"open string",
        "<div attr=",
        "let 🦀 = 1;",
        "import { from",
        "class {",
        "a ? b",
        "x => {",
        "<></",
        "export default <",
    ];
    for input in inputs {
        assert_defaulted_if_broken(input);
    }
    assert!(analyze_source("const x = {").parse_error.is_some());
    assert!(analyze_source("").parse_error.is_none());
}

#[test]
fn every_truncation_of_a_component_is_handled() {
    for (end, _) in COMPONENT.char_indices() {
        assert_defaulted_if_broken(&COMPONENT[..end]);
    }
    let full = analyze_source(COMPONENT);
    assert!(full.parse_error.is_none(), "{:?}", full.parse_error);
}

#[test]
fn pseudo_random_bytes_never_panic() {
    let alphabet: Vec<char> = "abc{}[]()<>/\\'\"`$=+-*!?:;.,@# \n\t0123456789&|^~%"
        .chars()
        .collect();
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    for _ in 0..300 {
        let mut source = String::new();
        for _ in 0..64 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            source.push(alphabet[(state % alphabet.len() as u64) as usize]);
        }
        assert_defaulted_if_broken(&source);
    }
}

#[test]
fn component_features() {
    let ctx = analyze_source(COMPONENT);
    assert!(ctx.has_function_declaration);
    assert!(ctx.has_arrow_function);
    assert_eq!(ctx.function_names, vec!["Counter"]);
    assert!(ctx.is_jsx_element);
    assert_eq!(ctx.jsx_element_name.as_deref(), Some("div"));
    assert_eq!(ctx.jsx_elements, vec!["div", "strong", "button"]);
    assert!(ctx.uses_use_state);
    assert!(ctx.has_props_destructuring);
    assert_eq!(ctx.props_names, vec!["initial"]);
    assert!(ctx.has_conditional_rendering);
    assert!(ctx.has_event_handler);
    assert!(!ctx.has_map_call);
    assert_eq!(ctx.imported_modules, vec!["react"]);
    assert_eq!(ctx.variable_names, vec!["label"]);
}

#[test]
fn evaluation_is_pure() {
    let ctx = analyze_source(COMPONENT);
    let expressions = [
        "usesUseState && hasEventHandler",
        "jsxElements.length > 2",
        "!hasMapCall",
        r#"jsxElementName === "section""#,
        "unknownThing",
        "((",
    ];
    for expression in expressions {
        let first = evaluate(&ctx, expression);
        for _ in 0..5 {
            assert_eq!(evaluate(&ctx, expression), first, "{expression}");
        }
    }
}

#[test]
fn welcome_component_passes() {
    let ctx = analyze_source("function Welcome() { return <div>Hi</div>; }");
    assert!(evaluate(&ctx, "hasFunctionDeclaration && isJSXElement"));
}

#[test]
fn unterminated_source_fails_checkers() {
    let ctx = analyze_source("const x = {");
    assert!(ctx.parse_error.as_deref().is_some_and(|m| !m.is_empty()));
    for checker in [
        "hasFunctionDeclaration",
        "!hasFunctionDeclaration",
        "hasFunctionDeclaration || true",
    ] {
        assert!(!evaluate(&ctx, checker), "{checker}");
        assert!(try_evaluate(&ctx, checker).is_err());
    }
}

#[test]
fn use_state_pattern_counts() {
    let grader = Grader::default();
    let case = [TestCase::pattern("uses state", "useState", Some(1))];

    let one = grader.run_all("const [a, b] = useState(0);", &case);
    assert!(one.results[0].passed);

    let zero = grader.run_all("const a = 0;", &case);
    let result = &zero.results[0];
    assert!(!result.passed);
    let message = result.message.as_deref().unwrap();
    assert!(message.contains('0') && message.contains('1'), "{message}");
    assert_eq!(message, "Pattern found 0 time(s), expected at least 1");
}

#[test]
fn three_case_suite_keeps_order() {
    let grader = Grader::default();
    let cases = [
        TestCase::ast("declares a function", "hasFunctionDeclaration"),
        TestCase::ast("uses state", "usesUseState"),
        TestCase::pattern("greets", "Hi", None),
    ];
    let suite = grader.run_all("function Welcome() { return <div>Hi</div>; }", &cases);
    assert!(!suite.all_passed());
    let summary: Vec<(&str, bool)> = suite
        .results
        .iter()
        .map(|r| (r.description.as_str(), r.passed))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("declares a function", true),
            ("uses state", false),
            ("greets", true)
        ]
    );
}

#[test]
fn length_and_order_survive_unknown_types() {
    let json = r#"[
        {"type": "pattern", "description": "one", "pattern": "div"},
        {"type": "snapshot", "description": "two"},
        {"type": "ast", "description": "three", "checker": "hasJSX"},
        {"type": "runtime", "description": "four"},
        {"type": "ast", "description": "five"}
    ]"#;
    let cases: Vec<TestCase> = serde_json::from_str(json).unwrap();
    assert!(matches!(cases[1].kind, TestKind::Unknown(_)));

    for source in ["function A() { return <div /> }", "const x = {", ""] {
        let suite = Grader::default().run_all(source, &cases);
        let descriptions: Vec<_> = suite.results.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(descriptions, vec!["one", "two", "three", "four", "five"]);
        assert_eq!(
            suite.results[1],
            TestResult::fail("two", "Unknown test type: snapshot")
        );
    }
}

#[test]
fn results_serialize_to_wire_shape() {
    let suite = Grader::default().run_all(
        "const a = 1",
        &[
            TestCase::ast("jsx", "hasJSX"),
            TestCase::pattern("const", "const", None),
        ],
    );
    let json = serde_json::to_value(&suite.results).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {"description": "jsx", "passed": false},
            {"description": "const", "passed": true, "message": "Pattern found 1 time(s)"}
        ])
    );
}
