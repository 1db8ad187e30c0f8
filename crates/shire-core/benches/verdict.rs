use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use shire_core::{Block, BlockState, Policy, PolicyStore, VerdictEngine};

const URLS: &[&str] = &[
    "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
    "https://www.youtube.com/feed/subscriptions",
    "https://news.ycombinator.com/item?id=1",
    "https://docs.rs/tokio/latest/tokio/",
    "http://example.org/some/deep/path/index.html",
    "https://old.reddit.com/r/rust/comments/abc",
];

fn build_policy(blocks: usize, patterns_per_block: usize) -> Policy {
    (0..blocks)
        .map(|b| {
            let state = if b % 4 == 3 { BlockState::Unblocked } else { BlockState::Active };
            Block::new(format!("block-{b}"), state)
                .with_blacklist((0..patterns_per_block).map(|p| format!("site{b}-{p}.com")))
                .with_blacklist(["youtube.com", "reddit.com/*/rust"])
                .with_whitelist(["youtube.com/feed/subscriptions*"])
        })
        .collect()
}

fn bench_is_blocked(c: &mut Criterion) {
    let store = Arc::new(PolicyStore::new());
    store.apply(build_policy(16, 64));
    let engine = VerdictEngine::new(store);

    c.bench_function("is_blocked/16x64", |b| {
        b.iter(|| {
            for url in URLS {
                black_box(engine.is_blocked(black_box(url)));
            }
        })
    });
}

fn bench_apply(c: &mut Criterion) {
    let store = PolicyStore::new();
    let policy = build_policy(16, 64);

    c.bench_function("apply/16x64", |b| b.iter(|| black_box(store.apply(policy.clone()))));
}

criterion_group!(benches, bench_is_blocked, bench_apply);
criterion_main!(benches);
