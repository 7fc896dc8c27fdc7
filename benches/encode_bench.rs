// Copyright (c) 2026 Bountyy Oy. All rights reserved.

use std::time::Duration;

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sessionhttp::http::encoding::encode_pairs;
use sessionhttp::{Cache, MemoryCache, TextEncoding};

fn query_encoding_benchmark(c: &mut Criterion) {
    let pairs = vec![
        ("q", "rust http client"),
        ("lang", "zh-CN"),
        ("keyword", "中文搜索"),
        ("page", "2"),
    ];

    c.bench_function("encode_pairs_utf8", |b| {
        b.iter(|| black_box(encode_pairs(pairs.iter().copied(), None)))
    });

    c.bench_function("encode_pairs_gb18030", |b| {
        b.iter(|| black_box(encode_pairs(pairs.iter().copied(), Some(TextEncoding::GB18030))))
    });
}

fn cache_benchmark(c: &mut Criterion) {
    let cache = MemoryCache::new();
    let value = Bytes::from_static(br#"[{"name":"sid","value":"abc"}]"#);

    c.bench_function("memory_cache_set_get", |b| {
        b.iter(|| {
            cache.set("http/session", value.clone(), Duration::from_secs(600));
            black_box(cache.get("http/session"))
        })
    });
}

criterion_group!(benches, query_encoding_benchmark, cache_benchmark);
criterion_main!(benches);
