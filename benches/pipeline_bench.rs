#![allow(unused)]
//! Card pipeline benchmarks.
//!
//! Every change to the mention list or the filter rebuilds the whole card
//! list and re-packs the grid, so these three steps run on every live
//! message. Sizes cover a first page up to a long scrolled session.
//!
//! # Groups
//!
//! | Group | What it measures |
//! |-------|-----------------|
//! | `merge` | Folding a fresh page into an accumulated mention list |
//! | `build_cards` | Filter + classify + visibility gate over the full list |
//! | `pack` | Masonry placement of the resulting cards into 4 columns |
//!
//! # Viewing results
//!
//! ```sh
//! cargo bench --bench pipeline_bench
//! open target/criterion/report/index.html
//! ```

use chrono::{DateTime, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use linkwall::core::cards::build_cards;
use linkwall::core::layout::pack_cards;
use linkwall::core::merge::{merge_into, merge_lists};
use linkwall::core::{FilterConfig, Mention};
use std::hint::black_box;

const SIZES: &[usize] = &[50, 500, 5_000];

const LINKS: &[&str] = &[
    "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=90",
    "https://x.com/someone/status/1234567890",
    "https://www.tiktok.com/@user/video/7312345678",
    "https://www.reddit.com/r/rust/comments/abc/title/",
    "https://i.imgur.com/cat.png",
    "https://example.com/movie.webm",
    "https://example.com/article",
];

fn now() -> DateTime<Utc> {
    Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
}

fn mentions(n: usize, start_ms: i64) -> Vec<Mention> {
    (0..n)
        .map(|i| {
            let mut m = Mention::new(
                Utc.timestamp_millis_opt(start_ms - i as i64 * 250).unwrap(),
                format!("user{}", i % 97),
                format!("term {} and {}", LINKS[i % LINKS.len()], LINKS[(i + 3) % LINKS.len()]),
            );
            m.add_term("term");
            m
        })
        .collect()
}

fn merge_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    for &n in SIZES {
        let acc = mentions(n, 1_700_000_000_000);
        // Half overlapping, half new.
        let page = mentions(100, 1_700_000_000_000 + 12_500);
        group.throughput(Throughput::Elements(page.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &(acc, page), |b, (acc, page)| {
            b.iter(|| {
                let mut acc = acc.clone();
                black_box(merge_into(&mut acc, page.iter().cloned()))
            })
        });
    }
    group.finish();
}

fn build_cards_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_cards");
    let cfg = FilterConfig::default();
    for &n in SIZES {
        let list = merge_lists([mentions(n, 1_700_000_000_000)]);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &list, |b, list| {
            b.iter(|| black_box(build_cards(list, &cfg, now())))
        });
    }
    group.finish();
}

fn pack_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("pack");
    let cfg = FilterConfig::default();
    for &n in SIZES {
        let list = mentions(n, 1_700_000_000_000);
        let cards = build_cards(&list, &cfg, now());
        group.throughput(Throughput::Elements(cards.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &(list, cards), |b, (list, cards)| {
            b.iter(|| black_box(pack_cards(cards, list, 4)))
        });
    }
    group.finish();
}

criterion_group!(benches, merge_bench, build_cards_bench, pack_bench);
criterion_main!(benches);
