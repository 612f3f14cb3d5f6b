//! Launch counting and the "is it time to prompt?" predicate.
//!
//! [`LaunchTracker`] owns a [`PreferenceStore`] and a [`Clock`]. Every
//! operation is a synchronous read or write against the store and the tracker
//! keeps no copy of its own. Two trackers agree exactly when their stores do:
//! [`JsonFileStore`](crate::store::JsonFileStore) handles on one file always
//! do.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::DAY_MILLIS;
use crate::clock::{Clock, SystemClock};
use crate::store::{NOT_SET, PreferenceStore, Preferences};

/// Snapshot of the persisted launch record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LaunchRecord {
    /// Epoch milliseconds of the first tracked launch, `0` when unset.
    pub first_launch_date: i64,
    pub launch_count: u32,
    pub do_not_show_again: bool,
}

impl LaunchRecord {
    pub fn is_first_launch(&self) -> bool {
        self.first_launch_date == NOT_SET
    }

    /// Evaluate the prompt predicate against this snapshot at `now_millis`.
    ///
    /// True iff the prompt was never dismissed, at least `launches_threshold`
    /// launches were seen, and `days_threshold` whole days have elapsed since
    /// the first launch. A threshold of `0` always passes its gate.
    pub fn is_due(&self, now_millis: i64, days_threshold: u32, launches_threshold: u32) -> bool {
        let due_at = self
            .first_launch_date
            .saturating_add(i64::from(days_threshold).saturating_mul(DAY_MILLIS));
        !self.do_not_show_again && self.launch_count >= launches_threshold && now_millis >= due_at
    }
}

/// Tracks launches and decides when the rating prompt is due.
pub struct LaunchTracker<S> {
    prefs: Preferences<S>,
    clock: Box<dyn Clock>,
}

impl<S: PreferenceStore> LaunchTracker<S> {
    /// Tracker using wall-clock time.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }

    pub fn with_clock(store: S, clock: impl Clock + 'static) -> Self {
        Self {
            prefs: Preferences::new(store),
            clock: Box::new(clock),
        }
    }

    pub fn store(&self) -> &S {
        self.prefs.store()
    }

    pub fn into_store(self) -> S {
        self.prefs.into_store()
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Count one launch, stamping the first-launch date if it is unset.
    pub fn record_launch(&mut self) -> Result<(), String> {
        let launch_count = self.prefs.launch_count()?.saturating_add(1);
        self.prefs.set_launch_count(launch_count)?;

        let first_launch_date = self.prefs.first_launch_date()?;
        if first_launch_date == NOT_SET {
            let now = self.clock.now_millis();
            self.prefs.set_first_launch_date(now)?;
            debug!(launch_count, first_launch_date = now, "first launch recorded");
        } else {
            debug!(launch_count, first_launch_date, "launch recorded");
        }
        Ok(())
    }

    /// Whether the prompt should be shown now. Pure read.
    pub fn should_prompt(&self, days_threshold: u32, launches_threshold: u32) -> Result<bool, String> {
        let record = self.record()?;
        Ok(record.is_due(self.clock.now_millis(), days_threshold, launches_threshold))
    }

    /// Restart the prompt cycle: zero launches, first launch = now.
    ///
    /// Leaves `do_not_show_again` untouched; a permanent dismissal survives
    /// a reset.
    pub fn reset(&mut self) -> Result<(), String> {
        let now = self.clock.now_millis();
        self.prefs.set_launch_count(0)?.set_first_launch_date(now)?;
        info!(first_launch_date = now, "launch tracking reset");
        Ok(())
    }

    /// Never prompt again.
    pub fn dismiss_permanently(&mut self) -> Result<(), String> {
        self.prefs.set_do_not_show_again(true)?;
        info!("rating prompt dismissed permanently");
        Ok(())
    }

    /// Date of the first tracked launch, `None` before the first launch.
    pub fn first_launch_date(&self) -> Result<Option<DateTime<Utc>>, String> {
        let millis = self.prefs.first_launch_date()?;
        if millis == NOT_SET {
            return Ok(None);
        }
        DateTime::from_timestamp_millis(millis)
            .map(Some)
            .ok_or_else(|| format!("first launch date {millis} is out of range"))
    }

    /// Raw first-launch timestamp in epoch milliseconds, `0` when unset.
    pub fn first_launch_millis(&self) -> Result<i64, String> {
        self.prefs.first_launch_date()
    }

    pub fn launch_count(&self) -> Result<u32, String> {
        self.prefs.launch_count()
    }

    pub fn is_dismissed_permanently(&self) -> Result<bool, String> {
        self.prefs.do_not_show_again()
    }

    pub fn is_first_launch(&self) -> Result<bool, String> {
        Ok(self.prefs.first_launch_date()? == NOT_SET)
    }

    pub fn record(&self) -> Result<LaunchRecord, String> {
        Ok(LaunchRecord {
            first_launch_date: self.prefs.first_launch_date()?,
            launch_count: self.prefs.launch_count()?,
            do_not_show_again: self.prefs.do_not_show_again()?,
        })
    }
}
