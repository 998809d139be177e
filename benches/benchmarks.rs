//! Performance benchmarks for Plugman.
//!
//! This module contains benchmarks for:
//! - Plugin discovery over plugin trees of growing size
//! - Manifest parsing
//! - Path normalization used to match plugins to submodules
//!
//! Run with: `cargo bench`

use std::path::Path;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use plugman::plugin::{normalize_path, same_location, PluginInspector, PluginManifest};

// ============================================================================
// Mock Data Fixtures
// ============================================================================

mod fixtures {
    use std::path::Path;

    /// Generate a manifest for a plugin.
    pub fn generate_manifest(name: &str) -> String {
        format!(
            r#"[plugin]
name = "{name}"
version = "1.0.0"
description = "Benchmark plugin {name}"
entry = "./run.sh"
"#
        )
    }

    /// Create `count` plugins below `plugins_dir`, each with a few nested
    /// directories the walk has to visit.
    pub fn create_plugin_tree(plugins_dir: &Path, count: usize) {
        for i in 0..count {
            let name = format!("plugin_{i}");
            let root = plugins_dir.join(&name);
            std::fs::create_dir_all(root.join("src/lib")).expect("Failed to create plugin dir");
            std::fs::create_dir_all(root.join("docs")).expect("Failed to create docs dir");
            std::fs::write(root.join("plugin.toml"), generate_manifest(&name))
                .expect("Failed to write plugin.toml");
            std::fs::write(root.join("plugin_requirements.txt"), "requests\n")
                .expect("Failed to write requirements");
        }
    }
}

// ============================================================================
// Discovery Benchmarks
// ============================================================================

fn bench_plugin_discovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("inspector/discovery");

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

    for count in [1, 10, 50, 200].iter() {
        let plugins_dir = temp_dir.path().join(format!("host_{}", count)).join("plugins");
        fixtures::create_plugin_tree(&plugins_dir, *count);

        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("iter_plugins", count), count, |b, _| {
            let inspector = PluginInspector::new(&plugins_dir);
            b.iter(|| black_box(inspector.iter_plugins().count()));
        });

        group.bench_with_input(BenchmarkId::new("get_plugin_last", count), count, |b, _| {
            let inspector = PluginInspector::new(&plugins_dir);
            let name = format!("plugin_{}", count - 1);
            b.iter(|| black_box(inspector.get_plugin(black_box(&name))));
        });
    }

    group.finish();
}

// ============================================================================
// Parsing Benchmarks
// ============================================================================

fn bench_manifest_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing/manifest");

    let manifest = fixtures::generate_manifest("virsh");

    group.bench_function("from_toml", |b| {
        b.iter(|| {
            let parsed = PluginManifest::from_toml(black_box(&manifest));
            black_box(parsed)
        });
    });

    group.bench_function("from_toml_and_validate", |b| {
        b.iter(|| {
            let parsed = PluginManifest::from_toml(black_box(&manifest)).and_then(|m| {
                m.validate()?;
                Ok(m)
            });
            black_box(parsed)
        });
    });

    group.finish();
}

// ============================================================================
// Path Benchmarks
// ============================================================================

fn bench_path_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("paths");

    let base = Path::new("/srv/host");

    group.bench_function("normalize_relative", |b| {
        let path = Path::new("plugins/./virsh/../virsh");
        b.iter(|| black_box(normalize_path(base, black_box(path))));
    });

    group.bench_function("same_location_mismatch", |b| {
        b.iter(|| {
            black_box(same_location(
                base,
                black_box(Path::new("/srv/host/plugins/virsh")),
                black_box(Path::new("plugins/ovirt")),
            ))
        });
    });

    group.finish();
}

// ============================================================================
// Criterion Groups and Main
// ============================================================================

criterion_group!(discovery_benches, bench_plugin_discovery,);

criterion_group!(parsing_benches, bench_manifest_parsing,);

criterion_group!(path_benches, bench_path_matching,);

criterion_main!(discovery_benches, parsing_benches, path_benches,);
