//! Benchmarks for cmdlog sync operations

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use cmdlog::protocol::{Batch, SyncRequest};
use cmdlog::{Config, Engine};

fn batch_of(size: usize) -> String {
    Batch::new((0..size).map(|i| format!("cmd{}", i))).encode()
}

fn sync_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync");

    for size in [1usize, 16, 256] {
        let batch = batch_of(size);
        group.bench_function(format!("append_batch_{}", size), |b| {
            b.iter_batched(
                || Engine::in_memory(Config::default()),
                |engine| {
                    let request = SyncRequest::new("count", "cmd_", "0", batch.as_str());
                    black_box(engine.sync(&request).unwrap());
                },
                BatchSize::SmallInput,
            )
        });
    }

    // Catch-up read of the tail of a 10k entry log
    let engine = Engine::in_memory(Config::default());
    for _ in 0..40 {
        let request = SyncRequest::new("count", "cmd_", "0", batch_of(256));
        engine.sync(&request).unwrap();
    }
    group.bench_function("catch_up_1000_of_10240", |b| {
        let request = SyncRequest::new("count", "cmd_", "9240", "{commands:[],end:42}");
        b.iter(|| black_box(engine.sync(&request).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, sync_benchmarks);
criterion_main!(benches);
