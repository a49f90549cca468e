// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Benchmarks for the single-slot cache.

use std::hint::black_box;
use std::sync::Barrier;
use std::thread;
use std::time::Duration;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use memoslot::{AlwaysExpired, Failure, MaxAge, Mem, NowClock, ProduceFn};

criterion_group!(benches, bench_single_thread, bench_contended);
criterion_main!(benches);

const READERS: usize = 4;
const READS_PER_READER: usize = 1_000;

fn bench_single_thread(c: &mut Criterion) {
    let mut group = c.benchmark_group("Mem");
    group.throughput(Throughput::Elements(1));

    let producer = ProduceFn(|| Ok::<_, Failure>("value".to_string()));
    let fresh = MaxAge::new(Duration::from_secs(3600));

    // Fresh state: a read lock and a clone, no producer call
    group.bench_function("dedup_fresh", |b| {
        let mem = Mem::<String>::default();
        mem.dedup(&producer, &NowClock, &fresh);
        b.iter(|| black_box(mem.dedup(&producer, &NowClock, &fresh)));
    });

    // Expired state: lock upgrade, producer call and clock read on every iteration
    group.bench_function("dedup_refresh", |b| {
        let mem = Mem::<String>::default();
        b.iter(|| black_box(mem.dedup(&producer, &NowClock, &AlwaysExpired)));
    });

    group.bench_function("read", |b| {
        let mem = Mem::<String>::default();
        b.iter(|| black_box(mem.read()));
    });

    group.finish();
}

fn bench_contended(c: &mut Criterion) {
    let mut group = c.benchmark_group("Mem_contended");
    group.throughput(Throughput::Elements((READERS * READS_PER_READER) as u64));

    let producer = ProduceFn(|| Ok::<_, Failure>(42_u64));
    let fresh = MaxAge::new(Duration::from_secs(3600));

    group.bench_function("parallel_fresh_reads", |b| {
        let mem = Mem::<u64>::default();
        mem.dedup(&producer, &NowClock, &fresh);

        b.iter(|| {
            let barrier = Barrier::new(READERS);
            thread::scope(|s| {
                for _ in 0..READERS {
                    s.spawn(|| {
                        barrier.wait();
                        for _ in 0..READS_PER_READER {
                            black_box(mem.dedup(&producer, &NowClock, &fresh));
                        }
                    });
                }
            });
        });
    });

    group.finish();
}
