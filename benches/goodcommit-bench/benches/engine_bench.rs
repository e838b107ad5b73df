//! Commitment engine benchmarks.
//!
//! Measures:
//! - Planting throughput for N owners
//! - One day of check-ins across N owners
//! - Overdue sweep over a ledger where half the owners missed a day

use {
    criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput},
    goodcommit_bench::helpers::BenchWorld,
    goodcommit_commitment_stake::state::HabitCategory,
    std::time::{Duration, Instant},
};

const OWNER_COUNTS: [usize; 3] = [100, 1_000, 10_000];

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_plant(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/plant");

    for &n in &OWNER_COUNTS {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("owners", n), &n, |b, &n| {
            b.iter_custom(|iters| {
                let mut total = Duration::ZERO;
                for _ in 0..iters {
                    let world = BenchWorld::new(n);
                    let start = Instant::now();
                    world.plant_all(HabitCategory::Health, 30);
                    total += start.elapsed();
                }
                total
            });
        });
    }

    group.finish();
}

fn bench_daily_check_in(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/daily_check_in");
    group.sample_size(20);

    for &n in &OWNER_COUNTS {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("owners", n), &n, |b, &n| {
            // A long commitment so every iteration has an open window.
            let world = BenchWorld::new(n);
            world.plant_all(HabitCategory::Focus, 365);
            let mut day = 0u64;

            b.iter(|| {
                day += 1;
                if day > 365 {
                    // Restart the commitments once they have matured.
                    for owner in &world.owners {
                        let _ = world.engine.harvest_rewards(owner, HabitCategory::Focus);
                    }
                    world.plant_all(HabitCategory::Focus, 365);
                    day = 1;
                }
                world.next_day();
                for owner in &world.owners {
                    world
                        .engine
                        .check_in(&world.operator, owner, HabitCategory::Focus)
                        .expect("window is open");
                }
            });
        });
    }

    group.finish();
}

fn bench_overdue_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/overdue_sweep");

    for &n in &OWNER_COUNTS {
        let world = BenchWorld::new(n);
        world.plant_all(HabitCategory::Academics, 30);
        world.next_day();
        for owner in world.owners.iter().step_by(2) {
            world
                .engine
                .check_in(&world.operator, owner, HabitCategory::Academics)
                .expect("window is open");
        }
        // Owners that skipped day one are now past their window.
        world.clock.advance(1);

        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("owners", n), &world, |b, world| {
            b.iter(|| world.engine.overdue_stakes().len());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_plant,
    bench_daily_check_in,
    bench_overdue_sweep
);
criterion_main!(benches);
