use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use hybrid::{Config, Generational};

pub fn bench_gcs(c: &mut Criterion) {
    let mut group = c.benchmark_group("chains");
    group.sample_size(50);

    for threshold in 1..5 {
        group.bench_function(BenchmarkId::new("churn", threshold), |b| {
            b.iter_batched_ref(
                || Generational::new(Config::new(1000, 1000, threshold)).unwrap(),
                |heap| {
                    for round in 0..64 {
                        churn::build_chains(heap, 25, 3);
                        churn::drop_roots(heap, round % 3 + 1);
                        heap.trigger_collection();
                    }
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }

    for len in [0usize, 4, 16, 64] {
        group.bench_function(BenchmarkId::new("promotion", len), |b| {
            b.iter_batched_ref(
                || {
                    let mut heap = Generational::new(Config::new(4096, 4096, 1)).unwrap();
                    churn::build_chains(&mut heap, 4096 / (len + 1), len);
                    heap.minor_collection();
                    heap
                },
                |heap| heap.minor_collection(),
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.bench_function("tenured sweep", |b| {
        b.iter_batched_ref(
            || {
                let mut heap = Generational::new(Config::new(4096, 4096, 1)).unwrap();
                churn::build_chains(&mut heap, 1024, 3);
                heap.minor_collection();
                heap.minor_collection();
                churn::drop_roots(&mut heap, 512);
                heap
            },
            |heap| heap.major_collection(),
            criterion::BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_gcs);
criterion_main!(benches);

mod churn {
    use hybrid::Generational;

    /// Allocates `roots` roots, each with `len` descendants, stopping early
    /// when the heap runs out of memory.
    pub fn build_chains(heap: &mut Generational, roots: usize, len: usize) {
        for _ in 0..roots {
            let mut parent = match heap.allocate("root") {
                Ok(root) => root,
                Err(_) => return,
            };
            for _ in 0..len {
                parent = match heap.allocate_child("", parent) {
                    Ok(child) => child,
                    Err(_) => return,
                };
            }
        }
    }

    /// Ends the lifetime of the `count` most recent roots, young ones first.
    pub fn drop_roots(heap: &mut Generational, count: usize) {
        for _ in 0..count {
            let last = heap
                .young_roots()
                .last()
                .or_else(|| heap.tenured_roots().last())
                .copied();
            match last {
                Some(root) => {
                    heap.end_lifetime(root);
                }
                None => return,
            }
        }
    }
}
