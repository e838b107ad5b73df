//! Time source for the engine.
//!
//! Operations never read the wall clock directly; they ask a [`Clock`] so
//! tests and the CLI can pin "now".

use std::{
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
    time::{SystemTime, UNIX_EPOCH},
};

/// Unix seconds.
pub type UnixTimestamp = i64;

pub trait Clock: Send + Sync {
    fn now(&self) -> UnixTimestamp;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> UnixTimestamp {
        (**self).now()
    }
}

/// Wall-clock time.  A clock set before the epoch reads as 0.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> UnixTimestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(now: UnixTimestamp) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    pub fn set(&self, now: UnixTimestamp) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    /// Move forward by `periods` whole periods of `period_secs`.
    pub fn advance_periods(&self, periods: u64, period_secs: i64) {
        let periods = i64::try_from(periods).unwrap_or(i64::MAX);
        self.advance(periods.saturating_mul(period_secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> UnixTimestamp {
        self.now.load(Ordering::SeqCst)
    }
}
