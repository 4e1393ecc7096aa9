//! Benchmarks for lock acquisition latency

use criterion::{Criterion, criterion_group, criterion_main};
use queued_lock_core::prelude::*;
use std::time::Duration;

fn bench_memory_lock_acquisition(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryQueueStore::new();
    let options = LockOptions::default();

    let mut group = c.benchmark_group("memory_lock");
    group.bench_function("try_acquire_release", |b| {
        b.to_async(&rt).iter(|| {
            let store = store.clone();
            async move {
                let mut lock = QueuedLock::new("bench-lock", store, options).unwrap();
                if lock.try_acquire().await.unwrap() {
                    lock.release().await.unwrap();
                }
            }
        });
    });

    group.bench_function("acquire_refresh", |b| {
        b.to_async(&rt).iter(|| {
            let store = store.clone();
            async move {
                let mut lock = QueuedLock::new("bench-refresh", store, options).unwrap();
                lock.acquire(true, Some(Duration::from_millis(1))).await.unwrap();
                lock.acquire(true, Some(Duration::from_millis(1))).await.unwrap();
                lock.release().await.unwrap();
            }
        });
    });

    group.finish();
}

fn bench_ticket_codec(c: &mut Criterion) {
    let ticket = Ticket::new(HostIdentity::new("bench-host").generate_owner_id(), 1_700_000_000.25);
    let encoded = ticket.encode();

    c.bench_function("ticket_decode", |b| {
        b.iter(|| Ticket::decode(std::hint::black_box(&encoded)).unwrap())
    });
}

criterion_group!(benches, bench_memory_lock_acquisition, bench_ticket_codec);
criterion_main!(benches);
