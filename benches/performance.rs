use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use uuid::Uuid;

use ledger_engine::lock_manager;
use ledger_engine::models::TransactionType;
use ledger_engine::money::Money;
use ledger_engine::observability::LatencyTimer;

fn benchmark_money_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("money");

    group.bench_function("parse", |b| {
        b.iter(|| black_box(Money::parse(black_box("1234567.89")).unwrap()));
    });

    group.bench_function("display", |b| {
        let m = Money::parse("1234567.89").unwrap();
        b.iter(|| black_box(m.to_string()));
    });

    group.bench_function("checked_add", |b| {
        let a = Money::parse("1000.00").unwrap();
        let c = Money::parse("2500.50").unwrap();
        b.iter(|| black_box(a.checked_add(c)));
    });

    group.finish();
}

fn benchmark_lock_ordering(c: &mut Criterion) {
    let mut group = c.benchmark_group("lock_manager");

    for size in [2_usize, 10, 100].iter() {
        group.bench_with_input(BenchmarkId::new("accounts_to_lock_transfer", size), size, |b, &_size| {
            let a = Uuid::new_v4();
            let receiver = Uuid::new_v4();
            b.iter(|| {
                black_box(lock_manager::accounts_to_lock(
                    black_box(TransactionType::Transfer),
                    black_box(a),
                    black_box(Some(receiver)),
                ))
            });
        });
    }

    group.finish();
}

fn benchmark_latency_timer(c: &mut Criterion) {
    c.bench_function("latency_timer_elapsed", |b| {
        let timer = LatencyTimer::new();
        b.iter(|| black_box(timer.elapsed_ms()));
    });
}

criterion_group!(
    benches,
    benchmark_money_parsing,
    benchmark_lock_ordering,
    benchmark_latency_timer
);
criterion_main!(benches);
