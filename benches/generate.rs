//! Benchmarks for mock generation
//!
//! Measures the full pipeline and the tree merge on sources with many
//! imports and call sites.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mockscope::mock::MockTree;
use mockscope::parser::SourceLanguage;
use mockscope::{collect_mocks, generate, MockOptions};

/// Create a source file with `modules` imports, each called `calls` times
/// through a few levels of member access.
fn create_source(modules: usize, calls: usize) -> String {
    let mut source = String::new();
    for m in 0..modules {
        source.push_str(&format!("const mod{m} = require('module-{m}');\n"));
    }
    source.push_str("function main() {\n");
    for m in 0..modules {
        for c in 0..calls {
            source.push_str(&format!(
                "  mod{m}.group{}.action{}(arg{c});\n",
                c % 5,
                c % 7
            ));
        }
    }
    source.push_str("}\n");
    source
}

/// Benchmark the full source-to-text pipeline
fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    let options = MockOptions::default();

    for modules in [10, 50, 100].iter() {
        let source = create_source(*modules, 20);

        group.bench_with_input(BenchmarkId::new("modules", modules), &source, |b, src| {
            b.iter(|| black_box(generate(src, &options).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark analysis without rendering
fn bench_collect(c: &mut Criterion) {
    let mut group = c.benchmark_group("collect_mocks");
    let options = MockOptions::default();

    for calls in [10, 100, 500].iter() {
        let source = create_source(20, *calls);

        group.bench_with_input(BenchmarkId::new("calls_per_module", calls), &source, |b, src| {
            b.iter(|| {
                black_box(collect_mocks(src, SourceLanguage::JavaScript, &options).unwrap())
            });
        });
    }

    group.finish();
}

/// Benchmark merging many call paths into one tree
fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_merge");

    for size in [100, 1000, 5000].iter() {
        let paths: Vec<Vec<String>> = (0..*size)
            .map(|i| vec![format!("g{}", i % 10), format!("a{}", i % 37), format!("m{}", i)])
            .collect();

        group.bench_with_input(BenchmarkId::new("paths", size), &paths, |b, paths| {
            b.iter(|| {
                let mut tree = MockTree::Leaf;
                for path in paths {
                    tree.insert_path(path.as_slice());
                }
                black_box(tree)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_generate, bench_collect, bench_merge);
criterion_main!(benches);
