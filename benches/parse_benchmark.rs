//! Benchmarks for parsing, rendering and matching

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kv_condition::condition::{cache, Symbolic};
use kv_condition::{Attribute, KvCondition, LabelQuery};

const KV_RULE: &str = r#"env & tag = ONLINE & tag = "some label" & ip & ( ip != 1.1.1.1 | ip ^= "8.8" | tag *= "test\&" ) | ip $= 4.4"#;

const LABEL_QUERY: &str = r#"tag = ONLINE and tag = "some label" AND ( ip != 1.1.1.1 or ip = "8.8.8.8" or tag = test) OR ip = 4.4.4.4"#;

fn benchmark_parse(c: &mut Criterion) {
    c.bench_function("parse_kv_condition", |b| {
        b.iter(|| KvCondition::parse(black_box(KV_RULE)))
    });

    c.bench_function("parse_label_query", |b| {
        b.iter(|| LabelQuery::parse(black_box(LABEL_QUERY)))
    });

    c.bench_function("parse_kv_condition_cached", |b| {
        let _ = cache::get_or_parse::<Symbolic>(KV_RULE);
        b.iter(|| cache::get_or_parse::<Symbolic>(black_box(KV_RULE)))
    });
}

fn benchmark_render(c: &mut Criterion) {
    let cond = match KvCondition::parse(KV_RULE) {
        Ok(cond) => cond,
        Err(err) => panic!("benchmark input must parse: {}", err),
    };

    c.bench_function("render_kv_condition", |b| b.iter(|| black_box(&cond).to_text()));
}

fn benchmark_match(c: &mut Criterion) {
    let query = match LabelQuery::parse(LABEL_QUERY) {
        Ok(query) => query,
        Err(err) => panic!("benchmark input must parse: {}", err),
    };

    let attributes: Vec<Attribute> = (0..32)
        .map(|i| Attribute::new(format!("key{}", i), format!("value{}", i)))
        .chain([
            Attribute::new("tag", "online"),
            Attribute::new("tag", "some label"),
            Attribute::new("ip", "4.4.4.4"),
        ])
        .collect();

    c.bench_function("match_label_query", |b| {
        b.iter(|| black_box(&query).matches(black_box(&attributes)))
    });
}

criterion_group!(benches, benchmark_parse, benchmark_render, benchmark_match);
criterion_main!(benches);
