use criterion::{black_box, criterion_group, criterion_main, Criterion};

use jsxgrade_core::checker::Checker;
use jsxgrade_core::extract::analyze_source;
use jsxgrade_core::syntax::parse;
use jsxgrade_core::{Grader, TestCase};

const COMPONENT: &str = r#"
import React, { useState, useEffect } from 'react';

interface Props { items: string[]; title?: string }

export default function TodoList({ items, title = 'Todos' }: Props) {
  const [done, setDone] = useState<Set<string>>(new Set());
  useEffect(() => { document.title = `${title} (${items.length})`; }, [items, title]);
  const toggle = (item: string) => {
    const next = new Set(done);
    next.has(item) ? next.delete(item) : next.add(item);
    setDone(next);
  };
  return (
    <section className="todos">
      <h1>{title}</h1>
      {items.length === 0 && <p>Nothing to do</p>}
      <ul>
        {items.map((item) => (
          <li key={item} onClick={() => toggle(item)}>
            {done.has(item) ? <s>{item}</s> : item}
          </li>
        ))}
      </ul>
    </section>
  );
}
"#;

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    let large = {
        let mut s = String::new();
        for i in 0..200 {
            s.push_str(&format!(
                "export const Item{i} = ({{ label }}) => <li data-i={{{i}}}>{{label}}</li>;\n"
            ));
        }
        s
    };

    group.bench_function("component", |b| b.iter(|| parse(black_box(COMPONENT))));
    group.bench_function("many_components", |b| b.iter(|| parse(black_box(&large))));
    group.bench_function("truncated", |b| {
        b.iter(|| parse(black_box(&COMPONENT[..COMPONENT.len() / 2])))
    });

    group.finish();
}

fn bench_extract(c: &mut Criterion) {
    c.bench_function("analyze_source", |b| {
        b.iter(|| analyze_source(black_box(COMPONENT)))
    });
}

fn bench_checker(c: &mut Criterion) {
    let ctx = analyze_source(COMPONENT);
    let checker = Checker::compile(
        r#"usesUseState && jsxElements.includes("ul") && (hasMapCall || jsxElements.length > 3)"#,
    )
    .unwrap();
    c.bench_function("checker_eval", |b| b.iter(|| checker.test(black_box(&ctx))));
}

fn bench_grade(c: &mut Criterion) {
    let grader = Grader::default();
    let cases = vec![
        TestCase::ast("state", "usesUseState"),
        TestCase::ast("list", "hasMapCall && hasEventHandler"),
        TestCase::pattern("effect", r"useEffect\(", None),
    ];
    c.bench_function("run_all", |b| {
        b.iter(|| grader.run_all(black_box(COMPONENT), black_box(&cases)))
    });
}

criterion_group!(benches, bench_parse, bench_extract, bench_checker, bench_grade);
criterion_main!(benches);
