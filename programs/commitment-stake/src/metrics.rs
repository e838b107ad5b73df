//! Engine counters.

use {
    crate::amount::Amount,
    parking_lot::Mutex,
    serde::{Deserialize, Serialize},
    std::{
        fmt::Write,
        sync::atomic::{AtomicU64, Ordering},
    },
};

#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Running total of token base units.  `u128` has no stable atomic, so this
/// takes a short lock.
#[derive(Debug, Default)]
pub struct AmountCounter(Mutex<Amount>);

impl AmountCounter {
    pub fn add(&self, amount: Amount) {
        let mut total = self.0.lock();
        *total = total.saturating_add(amount);
    }

    pub fn get(&self) -> Amount {
        *self.0.lock()
    }
}

#[derive(Debug, Default)]
pub struct StakingMetrics {
    pub plants: Counter,
    pub check_ins: Counter,
    pub stalled_rewards: Counter,
    pub harvests: Counter,
    pub unstakes: Counter,
    pub slashes: Counter,
    pub rejected: Counter,
    pub harvested_amount: AmountCounter,
    pub slashed_amount: AmountCounter,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub plants: u64,
    pub check_ins: u64,
    pub stalled_rewards: u64,
    pub harvests: u64,
    pub unstakes: u64,
    pub slashes: u64,
    pub rejected: u64,
    pub harvested_amount: Amount,
    pub slashed_amount: Amount,
}

impl StakingMetrics {
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            plants: self.plants.get(),
            check_ins: self.check_ins.get(),
            stalled_rewards: self.stalled_rewards.get(),
            harvests: self.harvests.get(),
            unstakes: self.unstakes.get(),
            slashes: self.slashes.get(),
            rejected: self.rejected.get(),
            harvested_amount: self.harvested_amount.get(),
            slashed_amount: self.slashed_amount.get(),
        }
    }
}

impl MetricsSnapshot {
    /// Prometheus text exposition format.
    pub fn to_prometheus(&self) -> String {
        let counters: [(&str, &str, u128); 9] = [
            ("plants_total", "Stakes planted", self.plants.into()),
            ("check_ins_total", "Check-ins accepted", self.check_ins.into()),
            (
                "stalled_rewards_total",
                "Check-ins whose reward stalled on an empty treasury",
                self.stalled_rewards.into(),
            ),
            ("harvests_total", "Stakes harvested", self.harvests.into()),
            ("unstakes_total", "Stakes withdrawn early", self.unstakes.into()),
            ("slashes_total", "Stakes slashed to the pool", self.slashes.into()),
            ("rejected_total", "Operations rejected with an error", self.rejected.into()),
            (
                "harvested_base_units_total",
                "Base units paid out by harvests",
                self.harvested_amount,
            ),
            (
                "slashed_base_units_total",
                "Base units slashed to the pool",
                self.slashed_amount,
            ),
        ];

        let mut out = String::new();
        for (name, help, value) in counters {
            let _ = writeln!(out, "# HELP goodcommit_{name} {help}");
            let _ = writeln!(out, "# TYPE goodcommit_{name} counter");
            let _ = writeln!(out, "goodcommit_{name} {value}");
        }
        out
    }
}
