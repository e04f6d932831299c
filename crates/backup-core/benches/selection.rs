//! Benchmarks for stage compilation and archive writing.
//!
//! Measures how selection scales with tree size and exclusion count, and
//! the end-to-end cost of each codec.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use backup_core::BackupBuilder;
use backup_core::BuildConfig;
use backup_core::CompressionCodec;
use backup_core::api::open_outputs;
use backup_core::metadata::MapIdentity;
use backup_core::rules::Stage;
use backup_core::selection::compile;
use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use std::fs;
use std::hint::black_box;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;

/// Creates `dirs` directories of `files_per_dir` 1 KB files, with one
/// `.tmp` file and a `cache/` subdirectory in each.
fn create_tree(temp: &TempDir, dirs: usize, files_per_dir: usize) -> PathBuf {
    let root = temp.path().join("home");
    let content = "x".repeat(1024);
    for d in 0..dirs {
        let dir = root.join(format!("project_{d:03}"));
        fs::create_dir_all(dir.join("cache")).unwrap();
        for f in 0..files_per_dir {
            fs::write(dir.join(format!("file_{f:04}.txt")), &content).unwrap();
        }
        fs::write(dir.join("build.tmp"), &content).unwrap();
        fs::write(dir.join("cache/blob"), &content).unwrap();
    }
    root
}

fn benchmark_compile_tree_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile_tree_size");

    for (dirs, files) in [(10, 10), (20, 50), (50, 100)] {
        let temp = TempDir::new().unwrap();
        let root = create_tree(&temp, dirs, files);
        let stages = [
            Stage::include(["project_*"]),
            Stage::exclude(["*.tmp", "cache"]),
        ];

        group.throughput(Throughput::Elements((dirs * files) as u64));
        group.bench_with_input(
            BenchmarkId::new("files", dirs * files),
            &root,
            |b, root| {
                b.iter(|| compile(black_box(&stages), black_box(root)));
            },
        );
    }

    group.finish();
}

fn benchmark_compile_exclusion_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile_exclusions");
    let temp = TempDir::new().unwrap();
    let root = create_tree(&temp, 20, 50);

    for count in [1, 10, 50] {
        let patterns: Vec<String> = (0..count).map(|i| format!("file_{i:04}.txt")).collect();
        let stages = [Stage::include(["project_*"]), Stage::exclude(patterns)];

        group.bench_with_input(BenchmarkId::new("patterns", count), &root, |b, root| {
            b.iter(|| compile(black_box(&stages), black_box(root)));
        });
    }

    group.finish();
}

fn run_backup(root: &Path, output: &Path, codec: CompressionCodec) {
    BackupBuilder::new()
        .stages([Stage::include(["project_*"]), Stage::exclude(["*.tmp"])])
        .sink(open_outputs(&[output]).unwrap())
        .config(BuildConfig::default().with_root(root).with_codec(codec))
        .identity(MapIdentity::new())
        .run()
        .unwrap();
}

fn benchmark_backup_codecs(c: &mut Criterion) {
    let mut group = c.benchmark_group("backup_codecs");
    group.sample_size(10);
    let temp = TempDir::new().unwrap();
    let root = create_tree(&temp, 10, 20);

    for codec in CompressionCodec::ALL {
        let output = temp.path().join(format!("out.tar.{}", codec.extension()));
        group.bench_with_input(BenchmarkId::new("codec", codec), &codec, |b, codec| {
            b.iter(|| run_backup(black_box(&root), &output, *codec));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_compile_tree_size,
    benchmark_compile_exclusion_count,
    benchmark_backup_codecs
);
criterion_main!(benches);
