//! vdom engine benchmarks
//!
//! Run with: cargo bench -p vdom-bench

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use vdom_bench::{generate_html, SELECTORS};
use vdom_dom::{parse_html, Dialect, Tree};

fn parsing_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");

    for (label, n) in [("small", 1), ("medium", 100), ("large", 1000)] {
        let html = generate_html(n);
        group.throughput(Throughput::Bytes(html.len() as u64));
        group.bench_with_input(BenchmarkId::new("tokenize", label), &html, |b, html| {
            b.iter(|| vdom_html::tokenize(html))
        });
        group.bench_with_input(BenchmarkId::new("parse", label), &html, |b, html| {
            b.iter(|| parse_html(html))
        });
    }

    group.finish();
}

fn selector_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("selectors");

    group.bench_function("compile", |b| {
        b.iter(|| {
            for selector in SELECTORS {
                let _ = vdom_cssparser::parse_selector_list(selector);
            }
        })
    });

    let (tree, root) = parse_html(&generate_html(200));
    for selector in SELECTORS {
        group.bench_with_input(BenchmarkId::new("query_all", selector), selector, |b, selector| {
            b.iter(|| tree.query_selector_all(root, selector))
        });
    }

    group.finish();
}

fn render_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    let (tree, root) = parse_html(&generate_html(200));
    group.bench_function("html", |b| b.iter(|| tree.render(root, Dialect::Html)));
    group.bench_function("xml", |b| b.iter(|| tree.render(root, Dialect::Xml)));

    group.bench_function("mutate_and_render", |b| {
        b.iter(|| {
            let mut tree = Tree::new();
            let root = tree.parse_html(&generate_html(20));
            let _ = tree.handle(root, "li.item", |tree, el, index| {
                let _ = tree.set_attribute(el, "data-index", index as i32);
            });
            tree.render(root, Dialect::Html)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    parsing_benchmarks,
    selector_benchmarks,
    render_benchmarks,
);

criterion_main!(benches);
