//! # vdom Bench
//!
//! Quick timing harness for the vdom engine, complementing the criterion
//! benches under `benches/vdom.rs`.
//!
//! ## Features
//!
//! - Markup tokenizing and tree building
//! - Selector compilation and queries
//! - Rendering back to markup
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vdom_bench::Benchmark;
//!
//! let suite = Benchmark::new().with_iterations(20).run_all();
//! suite.print_summary();
//! ```

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Cannot encode results: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Timing summary of one measured workload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub name: String,
    pub iterations: u64,
    /// Size of the markup handled per iteration, if the workload has one.
    pub input_bytes: Option<u64>,
    pub median_ns: u64,
    pub p95_ns: u64,
    pub min_ns: u64,
    pub max_ns: u64,
}

impl BenchmarkResult {
    pub fn from_samples(name: impl Into<String>, samples: &[Duration]) -> Self {
        let mut times: Vec<u64> = samples.iter().map(|d| d.as_nanos() as u64).collect();
        times.sort_unstable();
        let pick = |q: f64| -> u64 {
            if times.is_empty() {
                return 0;
            }
            let idx = ((times.len() - 1) as f64 * q).round() as usize;
            times[idx]
        };

        Self {
            name: name.into(),
            iterations: times.len() as u64,
            input_bytes: None,
            median_ns: pick(0.5),
            p95_ns: pick(0.95),
            min_ns: times.first().copied().unwrap_or(0),
            max_ns: times.last().copied().unwrap_or(0),
        }
    }

    pub fn with_input_bytes(mut self, bytes: usize) -> Self {
        self.input_bytes = Some(bytes as u64);
        self
    }

    /// Megabytes of markup handled per second at the median time.
    pub fn throughput_mb_s(&self) -> Option<f64> {
        let bytes = self.input_bytes?;
        if self.median_ns == 0 {
            return None;
        }
        Some(bytes as f64 / self.median_ns as f64 * 1_000.0)
    }

    fn print_line(&self) {
        let throughput = self
            .throughput_mb_s()
            .map(|mb| format!("{mb:.1} MB/s"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:36} {:>11} {:>11} {:>12}",
            self.name,
            format_duration(self.median_ns),
            format_duration(self.p95_ns),
            throughput,
        );
    }
}

fn format_duration(ns: u64) -> String {
    match ns {
        0..=999 => format!("{ns} ns"),
        1_000..=999_999 => format!("{:.2} µs", ns as f64 / 1e3),
        1_000_000..=999_999_999 => format!("{:.2} ms", ns as f64 / 1e6),
        _ => format!("{:.2} s", ns as f64 / 1e9),
    }
}

/// Results of a [`Benchmark::run_all`] pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkSuite {
    pub name: String,
    pub results: Vec<BenchmarkResult>,
    pub total_time: Duration,
}

impl BenchmarkSuite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            results: Vec::new(),
            total_time: Duration::ZERO,
        }
    }

    pub fn add(&mut self, result: BenchmarkResult) {
        self.results.push(result);
    }

    pub fn print_summary(&self) {
        println!("{} ({} workloads)", self.name, self.results.len());
        println!("{:36} {:>11} {:>11} {:>12}", "workload", "median", "p95", "throughput");
        for result in &self.results {
            result.print_line();
        }
        println!("total: {}", format_duration(self.total_time.as_nanos() as u64));
    }

    pub fn save_json(&self, path: impl AsRef<std::path::Path>) -> Result<(), BenchError> {
        std::fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }
}

/// Benchmark runner.
pub struct Benchmark {
    /// Number of warmup iterations.
    pub warmup: u64,
    /// Number of measured iterations.
    pub iterations: u64,
}

impl Benchmark {
    pub fn new() -> Self {
        Self {
            warmup: 10,
            iterations: 100,
        }
    }

    pub fn with_iterations(mut self, iterations: u64) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_warmup(mut self, warmup: u64) -> Self {
        self.warmup = warmup;
        self
    }

    /// Run a benchmark function.
    pub fn run<F>(&self, name: &str, mut f: F) -> BenchmarkResult
    where
        F: FnMut(),
    {
        (0..self.warmup).for_each(|_| f());
        let samples: Vec<Duration> = (0..self.iterations)
            .map(|_| {
                let start = Instant::now();
                f();
                start.elapsed()
            })
            .collect();
        let result = BenchmarkResult::from_samples(name, &samples);
        debug!(name, median_ns = result.median_ns, "workload measured");
        result
    }

    /// Run all standard benchmarks.
    pub fn run_all(&self) -> BenchmarkSuite {
        let start = Instant::now();
        let mut suite = BenchmarkSuite::new("vdom");

        suite.add(self.bench_tokenize(1000));
        suite.add(self.bench_parse(10));
        suite.add(self.bench_parse(100));
        suite.add(self.bench_parse(1000));
        suite.add(self.bench_selector_compile());
        suite.add(self.bench_query(1000));
        suite.add(self.bench_render(1000));

        suite.total_time = start.elapsed();
        suite
    }

    fn bench_tokenize(&self, n: usize) -> BenchmarkResult {
        let html = generate_html(n);
        self.run(&format!("tokenize/{n}"), || {
            let _ = vdom_html::tokenize(&html);
        })
        .with_input_bytes(html.len())
    }

    fn bench_parse(&self, n: usize) -> BenchmarkResult {
        let html = generate_html(n);
        self.run(&format!("parse/{n}"), || {
            let _ = vdom_dom::parse_html(&html);
        })
        .with_input_bytes(html.len())
    }

    fn bench_selector_compile(&self) -> BenchmarkResult {
        self.run("selector/compile", || {
            for selector in SELECTORS {
                let _ = vdom_cssparser::parse_selector_list(selector);
            }
        })
    }

    fn bench_query(&self, n: usize) -> BenchmarkResult {
        let (tree, root) = vdom_dom::parse_html(&generate_html(n));
        self.run(&format!("query/{n}"), || {
            for selector in SELECTORS {
                let _ = tree.query_selector_all(root, selector);
            }
        })
    }

    fn bench_render(&self, n: usize) -> BenchmarkResult {
        let (tree, root) = vdom_dom::parse_html(&generate_html(n));
        self.run(&format!("render/{n}"), || {
            let _ = tree.render(root, vdom_dom::Dialect::Html);
        })
    }
}

impl Default for Benchmark {
    fn default() -> Self {
        Self::new()
    }
}

/// Selectors exercised by the query benchmarks.
pub const SELECTORS: &[&str] = &[
    "p",
    ".item",
    "#section-7 > p",
    "section p + ul li",
    "li:nth-child(odd)",
    "a[href^='/docs']",
    "ul ~ p:not(.lead)",
];

/// Generate an HTML document with `n` sections of mixed content.
pub fn generate_html(n: usize) -> String {
    let mut html = String::from("<!DOCTYPE html><html><head><title>Test</title></head><body>");
    for i in 0..n {
        html.push_str(&format!(
            "<section id=\"section-{i}\"><p class=\"lead\">Paragraph {i} &amp; more</p>\
             <ul><li class=\"item\">one</li><li class=\"item\"><a href=\"/docs/{i}\">two</a></li></ul>\
             <p>tail<br>text</p></section>"
        ));
    }
    html.push_str("</body></html>");
    html
}
