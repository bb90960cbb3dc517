//! Benchmark: k-nearest search and name selection over a synthetic table.
//!
//! Run with: `cargo bench -p tintbot-core --bench namer_bench`
//!
//! The table size roughly matches a full reference vocabulary blended at the
//! three default ratios.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use tintbot_core::{
    BlendTable, BlendWeights, BlendedName, Color, RecentNameMemory, UnigramSplit, k_nearest,
    name_color,
};

const WORDS: [&str; 12] = [
    "amber", "bunny", "tan", "leather", "moss", "frog", "acid", "teal", "dawn", "ash", "plum",
    "smoke",
];

fn synthetic_table(size: usize) -> BlendTable {
    let mut table = BlendTable::new();
    let mut state = 0x2545_f491_u32;
    for i in 0..size {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let [r, g, b, _] = state.to_le_bytes();
        let color = Color::from_rgb(r, g, b);
        let split = UnigramSplit::new(WORDS[i % WORDS.len()], WORDS[(i / WORDS.len()) % WORDS.len()]);
        table.insert(BlendedName {
            name: split.display_name(),
            split,
            head: color,
            modifier: color,
            weights: BlendWeights::EVEN,
            color,
        });
    }
    table
}

// ===========================================================================
// k-nearest
// ===========================================================================

fn bench_k_nearest(c: &mut Criterion) {
    let mut group = c.benchmark_group("k_nearest");
    let target = Color::from_rgb(0x37, 0x00, 0x28);

    for size in [1_000usize, 10_000, 50_000] {
        let table = synthetic_table(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &table, |b, table| {
            b.iter(|| k_nearest(black_box(&target), table.entries(), black_box(5)));
        });
    }

    group.finish();
}

// ===========================================================================
// name_color with a full memory
// ===========================================================================

fn bench_name_color(c: &mut Criterion) {
    let mut group = c.benchmark_group("name_color");
    let target = Color::from_rgb(0xb0, 0xbf, 0x1a);
    let table = synthetic_table(10_000);

    let empty = RecentNameMemory::default();
    let mut full = RecentNameMemory::default();
    for name in ["amber bunny", "tan leather", "moss frog", "acid teal"] {
        full.remember(name);
    }

    group.bench_function("empty_memory", |b| {
        b.iter(|| name_color(black_box(&target), &table, 5, &empty));
    });
    group.bench_function("busy_memory", |b| {
        b.iter(|| name_color(black_box(&target), &table, 5, &full));
    });

    group.finish();
}

criterion_group!(benches, bench_k_nearest, bench_name_color);
criterion_main!(benches);
