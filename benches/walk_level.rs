use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use radix_manifest::{Entry, Manifest, ManifestBuilder, MemoryStore, Reference, MAX_LEVEL};

/// A manifest of `dirs` directories with `files` files each, two levels deep
fn build(dirs: usize, files: usize) -> (MemoryStore, Reference) {
    let store = MemoryStore::new();
    let mut builder = ManifestBuilder::new();
    for d in 0..dirs {
        for f in 0..files {
            let path = format!("section-{:03}/chapter-{:02}/page-{:04}.html", d, f % 8, f);
            builder
                .insert(&path, Entry::new(Reference::digest(path.as_bytes())))
                .expect("insert");
        }
    }
    let root = builder.persist(&store).expect("persist");
    (store, root)
}

fn bench_walk_level(c: &mut Criterion) {
    let (store, root) = build(64, 64);
    let mut group = c.benchmark_group("walk_level");

    for level in [1u32, 2, 3] {
        group.bench_with_input(BenchmarkId::new("cold", level), &level, |b, &level| {
            b.iter_batched(
                || Manifest::open(&store, root),
                |mut manifest| black_box(manifest.list(b"", level).expect("walk")),
                BatchSize::SmallInput,
            )
        });
    }

    group.bench_function("cold/unbounded", |b| {
        b.iter_batched(
            || Manifest::open(&store, root),
            |mut manifest| black_box(manifest.list(b"", MAX_LEVEL).expect("walk")),
            BatchSize::SmallInput,
        )
    });

    let mut warm = Manifest::open(&store, root);
    warm.list(b"", MAX_LEVEL).expect("warm up");
    group.bench_function("warm/level-2", |b| {
        b.iter(|| black_box(warm.list(b"section-010/", 2).expect("walk")))
    });

    group.finish();
}

criterion_group!(benches, bench_walk_level);
criterion_main!(benches);
