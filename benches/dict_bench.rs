use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use typed_dict::Dict;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn bench_insert(c: &mut Criterion) {
    c.bench_function("dict_insert_10k", |b| {
        b.iter_batched(
            Dict::<u64, u64>::new,
            |d| {
                for (i, x) in lcg(1).take(10_000).enumerate() {
                    d.insert(x, i as u64).unwrap();
                }
                black_box(d)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit(c: &mut Criterion) {
    c.bench_function("dict_get_hit", |b| {
        let d: Dict<u64, u64> = Dict::new();
        let keys: Vec<u64> = lcg(7).take(20_000).collect();
        for (i, &k) in keys.iter().enumerate() {
            d.insert(k, i as u64).unwrap();
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = *it.next().unwrap();
            black_box(d.get(k));
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("dict_get_miss", |b| {
        let d: Dict<u64, u64> = Dict::new();
        for (i, x) in lcg(11).take(10_000).enumerate() {
            d.insert(x, i as u64).unwrap();
        }
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            // generate keys unlikely in the dict
            let k = miss.next().unwrap();
            black_box(d.get(k));
        })
    });
}

fn bench_iterate(c: &mut Criterion) {
    c.bench_function("dict_iterate_10k", |b| {
        let d: Dict<u64, u64> = Dict::new();
        for (i, x) in lcg(13).take(10_000).enumerate() {
            d.insert(x, i as u64).unwrap();
        }
        b.iter(|| {
            let mut acc = 0u64;
            for (k, v) in d.items() {
                acc = acc.wrapping_add(k).wrapping_add(v);
            }
            black_box(acc)
        })
    });
}

fn bench_popitem_drain(c: &mut Criterion) {
    c.bench_function("dict_popitem_drain_1k", |b| {
        b.iter_batched(
            || {
                let d: Dict<u64, u64> = Dict::new();
                for (i, x) in lcg(17).take(1_000).enumerate() {
                    d.insert(x, i as u64).unwrap();
                }
                d
            },
            |d| {
                while d.popitem().is_ok() {}
                black_box(d)
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_insert,
    bench_get_hit,
    bench_get_miss,
    bench_iterate,
    bench_popitem_drain
);
criterion_main!(benches);
