use criterion::{black_box, criterion_group, criterion_main, Criterion};

use lineage_rs::counters::parse_counters;
use lineage_rs::identity::feed_instance_key;

fn identity_benchmarks(c: &mut Criterion) {
    c.bench_function("feed_instance_key", |b| {
        b.iter(|| {
            feed_instance_key(
                black_box("imp-click-join"),
                black_box("primary-cluster"),
                black_box("/falcon/imp-click-join/2014-01-01-01"),
                black_box("2014-01-01T01:00Z"),
            )
        })
    });

    let counters = "TIMETAKEN:36956,COPY:30,BYTESCOPIED:1000,FILES:12,SKIPPED:0";
    c.bench_function("parse_counters", |b| {
        b.iter(|| parse_counters(black_box(counters)))
    });
}

criterion_group!(benches, identity_benchmarks);
criterion_main!(benches);
