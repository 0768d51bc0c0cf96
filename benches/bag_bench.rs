use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use hash_bag::Bag;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn bench_add_distinct(c: &mut Criterion) {
    c.bench_function("bag_add_10k_distinct", |b| {
        let keys: Vec<String> = lcg(1).take(10_000).map(key).collect();
        b.iter_batched(
            Bag::<String>::new,
            |mut bag| {
                for k in &keys {
                    bag.add(k.clone());
                }
                black_box(bag)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_add_duplicates(c: &mut Criterion) {
    c.bench_function("bag_add_10k_over_64_values", |b| {
        let keys: Vec<String> = lcg(3).take(10_000).map(|n| key(n % 64)).collect();
        b.iter_batched(
            Bag::<String>::new,
            |mut bag| {
                for k in &keys {
                    bag.add(k.clone());
                }
                black_box(bag)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_contains_count_hit(c: &mut Criterion) {
    c.bench_function("bag_contains_count_hit", |b| {
        let mut bag: Bag<String> = Bag::new();
        let keys: Vec<String> = lcg(7).take(20_000).map(key).collect();
        for k in &keys {
            bag.add(k.clone());
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(bag.contains_count(k.as_str()));
        })
    });
}

fn bench_contains_count_miss(c: &mut Criterion) {
    c.bench_function("bag_contains_count_miss", |b| {
        let mut bag: Bag<String> = Bag::new();
        for k in lcg(11).take(10_000).map(key) {
            bag.add(k);
        }
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            let k = key(miss.next().unwrap());
            black_box(bag.contains_count(k.as_str()));
        })
    });
}

fn bench_remove(c: &mut Criterion) {
    c.bench_function("bag_remove_10k", |b| {
        let keys: Vec<String> = lcg(13).take(10_000).map(|n| key(n % 2_000)).collect();
        b.iter_batched(
            || {
                let mut bag: Bag<String> = Bag::new();
                for k in &keys {
                    bag.add(k.clone());
                }
                bag
            },
            |mut bag| {
                for k in &keys {
                    black_box(bag.remove(k.as_str()));
                }
                black_box(bag)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_iterate(c: &mut Criterion) {
    c.bench_function("bag_iterate_occurrences", |b| {
        let mut bag: Bag<String> = Bag::new();
        for k in lcg(17).take(10_000).map(|n| key(n % 4_000)) {
            bag.add(k);
        }
        b.iter(|| {
            let mut n = 0usize;
            for item in &bag {
                n += item.len();
            }
            black_box(n)
        })
    });
}

criterion_group!(
    benches,
    bench_add_distinct,
    bench_add_duplicates,
    bench_contains_count_hit,
    bench_contains_count_miss,
    bench_remove,
    bench_iterate,
);
criterion_main!(benches);
