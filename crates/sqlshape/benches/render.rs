use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sqlshape::{Filter, JoinOptions, OpMap, Query};

/// Build a query with `n` filter groups and `n / 5` joins:
/// SELECT ... FROM posts JOIN ... WHERE (col0 = ? AND views0 > 0) AND ...
fn build_query(n: usize) -> Query {
    let mut q = Query::new("posts");
    for i in 0..n / 5 {
        q.join(
            "comments",
            "post_id",
            JoinOptions::new().conditions(Filter::new().with("kind", format!("k{i}"))),
        )
        .unwrap();
    }
    for i in 0..n {
        q.filter(
            Filter::new()
                .with(format!("col{i}"), format!("v{i}"))
                .with(format!("views{i}"), OpMap::new().op("greater_than", i as i64)),
        )
        .unwrap();
    }
    q
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/build");

    for n in [1, 5, 10, 50, 100] {
        let q = build_query(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &q, |b, q| {
            b.iter(|| black_box(q.build()));
        });
    }

    group.finish();
}

fn bench_compose_and_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/compose_and_build");

    for n in [1, 5, 10, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let q = build_query(n);
                black_box(q.build());
            });
        });
    }

    group.finish();
}

fn bench_in_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/in_list");

    for n in [5, 20, 100, 500] {
        let numbers: Vec<i64> = (0..n).collect();
        let words: Vec<String> = (0..n).map(|i| format!("w{i}")).collect();
        group.bench_with_input(BenchmarkId::new("numeric", n), &numbers, |b, values| {
            b.iter(|| {
                let mut q = Query::new("posts");
                q.filter(Filter::new().with("id", values.clone())).unwrap();
                black_box(q.build());
            });
        });
        group.bench_with_input(BenchmarkId::new("bound", n), &words, |b, values| {
            b.iter(|| {
                let mut q = Query::new("posts");
                q.filter(Filter::new().with("name", values.clone())).unwrap();
                black_box(q.build());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_compose_and_build, bench_in_list);
criterion_main!(benches);
