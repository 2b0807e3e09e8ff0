use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sorm::{Payload, StatementBuilder, WhereMap};

/// Configure a SELECT with `n` quoted fields and `n` equality predicates:
/// SELECT `col0`,`col1`,... FROM `t` WHERE `col0` = ? AND `col1` = ? ...
fn configure_select(db: &mut StatementBuilder, n: usize) {
    let fields: Vec<String> = (0..n).map(|i| format!("col{i}")).collect();
    db.table("t").fields(&fields.join(","));
    for i in 0..n {
        db.eq(&format!("col{i}"), i as i64);
    }
}

fn bench_compile_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/compile_select");

    for n in [1, 5, 10, 50, 100] {
        let mut db = StatementBuilder::new();
        configure_select(&mut db, n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &db, |b, db| {
            b.iter(|| black_box(db.compile_select()));
        });
    }

    group.finish();
}

fn bench_configure_and_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/configure_and_compile");

    for n in [1, 5, 10, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let mut db = StatementBuilder::new();
            b.iter(|| {
                configure_select(&mut db, n);
                black_box(db.compile_select().ok());
                db.reset();
            });
        });
    }

    group.finish();
}

fn bench_in_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/in_list");

    for n in [5, 20, 100, 500] {
        let values: Vec<i64> = (0..n).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            let mut db = StatementBuilder::new();
            b.iter(|| {
                db.table("t").fields("*").in_list("id", values.as_slice());
                black_box(db.compile_select().ok());
                db.reset();
            });
        });
    }

    group.finish();
}

fn bench_where_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/where_map");

    for n in [1, 5, 10, 50] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let mut db = StatementBuilder::new();
            b.iter(|| {
                let conditions: WhereMap = (0..n)
                    .map(|i| (format!("col{i}"), i as i64))
                    .collect();
                db.table("t").fields("*").where_map(conditions);
                black_box(db.compile_select().ok());
                db.reset();
            });
        });
    }

    group.finish();
}

fn bench_compile_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/compile_update");

    for n in [1, 10, 50] {
        let data: Payload = (0..n).map(|i| (format!("col{i}"), i as i64)).collect();
        let mut db = StatementBuilder::new();
        db.table("t").eq("id", 1);
        group.bench_with_input(BenchmarkId::from_parameter(n), &data, |b, data| {
            b.iter(|| black_box(db.compile_update(data)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_compile_select,
    bench_configure_and_compile,
    bench_in_list,
    bench_where_map,
    bench_compile_update
);
criterion_main!(benches);
