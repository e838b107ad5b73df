//! Reward and timing math benchmarks.
//!
//! Measures:
//! - Per-check-in reward increment across principal sizes
//! - Full-term reward projection for N records
//! - Early-exit settlement
//! - Check-in window classification

use {
    criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput},
    goodcommit_bench::helpers::{GENESIS, STAKE},
    goodcommit_commitment_stake::{
        amount::Amount,
        check_in::{window, CheckInWindow},
        config::StakingConfig,
        constants::{ONE_TOKEN, SECONDS_PER_DAY},
        reward::{early_exit_settlement, projected_full_term_reward, reward_increment},
        state::StakeRecord,
    },
    std::hint::black_box,
};

fn records(n: usize) -> Vec<StakeRecord> {
    (0..n)
        .map(|i| {
            let duration = 30 + (i % 300) as u64;
            let mut record = StakeRecord::new(STAKE + i as Amount, duration, GENESIS);
            record.streak = (i % 30) as u64;
            record.accumulated_reward = reward_increment(record.principal, 1_000)
                .unwrap_or_default()
                * Amount::from(record.streak);
            record
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_reward_increment(c: &mut Criterion) {
    let mut group = c.benchmark_group("reward/increment");

    for principal in [ONE_TOKEN, 1_000 * ONE_TOKEN, 1_000_000_000 * ONE_TOKEN] {
        group.bench_with_input(
            BenchmarkId::new("principal_tokens", principal / ONE_TOKEN),
            &principal,
            |b, &principal| b.iter(|| reward_increment(black_box(principal), black_box(1_000))),
        );
    }

    group.finish();
}

fn bench_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("reward/projection");

    for &n in &[1_000usize, 10_000, 100_000] {
        let records = records(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("records", n), &records, |b, records| {
            b.iter(|| {
                records
                    .iter()
                    .filter_map(|record| projected_full_term_reward(record, 1_000).ok())
                    .fold(0 as Amount, Amount::saturating_add)
            });
        });
    }

    group.finish();
}

fn bench_early_exit(c: &mut Criterion) {
    let policy = StakingConfig {
        early_exit_reward_penalty_bps: 2_500,
        early_exit_principal_penalty_bps: 500,
        ..StakingConfig::default()
    };
    let records = records(10_000);

    let mut group = c.benchmark_group("reward/early_exit");
    group.throughput(Throughput::Elements(records.len() as u64));
    group.bench_function("settlement_10k", |b| {
        b.iter(|| {
            records
                .iter()
                .filter_map(|record| early_exit_settlement(record, &policy).ok())
                .count()
        });
    });
    group.finish();
}

fn bench_window(c: &mut Criterion) {
    let config = StakingConfig::default();
    let records = records(10_000);
    let probes = [
        GENESIS + SECONDS_PER_DAY / 2,
        GENESIS + SECONDS_PER_DAY,
        GENESIS + 3 * SECONDS_PER_DAY,
    ];

    let mut group = c.benchmark_group("check_in/window");
    group.throughput(Throughput::Elements((records.len() * probes.len()) as u64));
    group.bench_function("classify_10k", |b| {
        b.iter(|| {
            let mut open = 0usize;
            for now in probes {
                for record in &records {
                    if window(record, &config, black_box(now)) == CheckInWindow::Open {
                        open += 1;
                    }
                }
            }
            open
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_reward_increment,
    bench_projection,
    bench_early_exit,
    bench_window
);
criterion_main!(benches);
