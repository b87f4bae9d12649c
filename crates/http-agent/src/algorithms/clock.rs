//! # Clock Sync
//!
//! Keeps the offset between the local clock and the replica's clock and
//! turns it into request expiries.
//!
//! A replica accepts an expiry up to `its_now + delta + drift`, so the
//! permitted drift is taken off the computed value: seen from the replica,
//! a request then has exactly `delta` of headroom.

use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::{Expiry, REPLICA_PERMITTED_DRIFT_MS};

/// Smallest headroom an expiry keeps over the replica's estimated now.
pub const MIN_EXPIRY_HEADROOM_MS: u64 = 1_000;

/// Local-to-replica clock offset.
///
/// Starts at zero; every successful sync overwrites it and failed syncs
/// leave it alone.
#[derive(Debug, Default)]
pub struct ClockSync {
    offset_ms: AtomicI64,
}

impl ClockSync {
    /// Offset of zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current offset (replica − local) in milliseconds.
    pub fn offset_ms(&self) -> i64 {
        self.offset_ms.load(Ordering::Acquire)
    }

    /// Store the offset implied by one observation and return it.
    pub fn record(&self, local_ms: u64, replica_ms: u64) -> i64 {
        let offset = (i128::from(replica_ms) - i128::from(local_ms))
            .clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64;
        self.offset_ms.store(offset, Ordering::Release);
        offset
    }

    /// Expiry for a request built at `local_ms` with `delta_ms` to live.
    ///
    /// Never earlier than the replica's estimated now plus
    /// [`MIN_EXPIRY_HEADROOM_MS`], so a short delta or a large negative
    /// offset cannot produce an expiry in the past.
    pub fn compute_expiry(&self, local_ms: u64, delta_ms: u64) -> Expiry {
        let replica_now = i128::from(local_ms) + i128::from(self.offset_ms());
        let drift_adjusted =
            replica_now + i128::from(delta_ms) - i128::from(REPLICA_PERMITTED_DRIFT_MS);
        let floor = replica_now + i128::from(MIN_EXPIRY_HEADROOM_MS);

        let millis = drift_adjusted.max(floor).clamp(0, i128::from(u64::MAX)) as u64;
        Expiry::from_millis(millis)
    }
}
