use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use double_hash_table::{DoubleHashTable, RequestTracker};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn filled(seed: u64, n: usize) -> (DoubleHashTable<u64>, Vec<String>) {
    let mut t = DoubleHashTable::new();
    let keys: Vec<String> = lcg(seed).take(n).map(key).collect();
    for (i, k) in keys.iter().enumerate() {
        t.insert(k.as_str(), i as u64).unwrap();
    }
    (t, keys)
}

fn bench_insert_10k(c: &mut Criterion) {
    c.bench_function("table::insert_10k", |b| {
        b.iter_batched(
            || lcg(1).take(10_000).map(key).collect::<Vec<_>>(),
            |keys| {
                let mut t = DoubleHashTable::new();
                for (i, k) in keys.into_iter().enumerate() {
                    t.insert(k, i as u64).unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_insert_presized_10k(c: &mut Criterion) {
    c.bench_function("table::insert_presized_10k", |b| {
        b.iter_batched(
            || lcg(1).take(10_000).map(key).collect::<Vec<_>>(),
            |keys| {
                let mut t = DoubleHashTable::with_capacity(32_768);
                for (i, k) in keys.into_iter().enumerate() {
                    t.insert(k, i as u64).unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit(c: &mut Criterion) {
    c.bench_function("table::get_hit", |b| {
        let (t, keys) = filled(7, 20_000);
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(t.get(k).unwrap());
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("table::get_miss", |b| {
        let (t, _keys) = filled(11, 10_000);
        let mut miss = lcg(0xdead_beef).map(key);
        b.iter(|| {
            let k = miss.next().unwrap();
            black_box(t.contains_key(&k));
        })
    });
}

// Remove then reinsert keeps the table full of tombstones for lookups to
// walk past.
fn bench_remove_reinsert(c: &mut Criterion) {
    c.bench_function("table::remove_reinsert_10k", |b| {
        b.iter_batched(
            || filled(3, 10_000),
            |(mut t, keys)| {
                for k in &keys {
                    let v = t.remove(k).unwrap();
                    t.insert(k.as_str(), v + 1).unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_tracker_record(c: &mut Criterion) {
    c.bench_function("tracker::record_1k_clients", |b| {
        let clients: Vec<String> = (0..1_000).map(|i| format!("client{i}")).collect();
        let mut tracker = RequestTracker::new(50);
        let mut now = 0u64;
        let mut it = clients.iter().cycle();
        b.iter(|| {
            now += 1;
            let c = it.next().unwrap();
            black_box(tracker.record(now, "GET /", c).unwrap());
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_insert_10k, bench_insert_presized_10k, bench_get_hit, bench_get_miss,
        bench_remove_reinsert, bench_tracker_record
}
criterion_main!(benches);
