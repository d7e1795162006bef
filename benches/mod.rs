use criterion::{criterion_group, criterion_main};


criterion_group!(
    benches,
    helper::bench_publish_int,
    helper::bench_publish_float,
    helper::bench_publish_truncated,
    helper::bench_state
);
criterion_main!(benches);
