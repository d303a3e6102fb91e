//! Expression analysis performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use exprscan::{analyze_template, extract_variables, AnalyzerOptions, Template};
use std::fs;
use tempfile::TempDir;

fn bench_simple_expression(c: &mut Criterion) {
    c.bench_function("simple_expression", |b| {
        b.iter(|| extract_variables(black_box("{Number(price) * quantity}")))
    });
}

fn bench_complex_expression(c: &mut Criterion) {
    let expression = r#"{
        items
            .filter(item => item.qty > 0 && !excluded.includes(item.sku))
            .map(({ qty, price = defaultPrice }) => qty * price * (1 + taxRate))
            .reduce((sum, value) => sum + value, 0)
            .toLocaleString(locale, { style: 'currency', currency: currencyCode })
    }"#;

    c.bench_function("complex_expression", |b| {
        b.iter(|| extract_variables(black_box(expression)))
    });
}

fn bench_large_template(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    let template_path = temp_dir.path().join("large.json");

    // One page of inputs, one page of expressions over them
    let mut inputs = Vec::new();
    let mut expressions = Vec::new();
    for i in 0..500 {
        inputs.push(format!(r#"{{"type":"text","name":"field{}"}}"#, i));
        expressions.push(format!(
            r#"{{"type":"expressionField","content":"{{field{} * rate{} + `${{label{}}}`.length}}"}}"#,
            i,
            i % 7,
            i
        ));
    }
    let content = format!(
        r#"{{"schemas":[[{}],[{}]]}}"#,
        inputs.join(","),
        expressions.join(",")
    );
    fs::write(&template_path, content).unwrap();

    let options = AnalyzerOptions::default();
    c.bench_function("large_template", |b| {
        b.iter(|| {
            let template = Template::load(black_box(&template_path)).unwrap();
            analyze_template(&template, &options)
        })
    });
}

criterion_group!(
    benches,
    bench_simple_expression,
    bench_complex_expression,
    bench_large_template
);
criterion_main!(benches);
