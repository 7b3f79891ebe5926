//! Drive scheduler — pending hardware actions with fixed-interval retry.
//!
//! Owns the authoritative "currently requested" action per LED. New diff
//! results are merged in (superseding any stale pending entry for the same
//! LED), changed LEDs are driven, and failed drives stay pending until a
//! retry pass succeeds or a newer request replaces them.

use std::time::{Duration, Instant};

use crate::diff::StateDelta;
use crate::driver::LedDriver;
use crate::layout::Action;
use crate::resolve::LedState;

/// Fixed interval between retry passes while drives are still failing.
pub const RETRY_INTERVAL: Duration = Duration::from_secs(1);

// ── Retry timer ──

/// One-shot retry timer: armed after a drive pass that left work pending,
/// disarmed once both pending sets drain.
#[derive(Debug)]
pub struct RetryTimer {
    interval: Duration,
    deadline: Option<Instant>,
}

impl RetryTimer {
    pub fn new(interval: Duration) -> Self {
        RetryTimer { interval, deadline: None }
    }

    pub fn arm(&mut self) {
        self.deadline = Some(Instant::now() + self.interval);
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// True once the armed deadline has passed.
    pub fn due(&self) -> bool {
        match self.deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }

    /// Time remaining until the deadline; `None` when disarmed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }
}

// ── Scheduler ──

#[derive(Debug)]
pub struct DriveScheduler {
    req_assert: LedState,
    req_deassert: LedState,
    timer: RetryTimer,
}

impl DriveScheduler {
    pub fn new() -> Self {
        Self::with_interval(RETRY_INTERVAL)
    }

    /// Alternate retry interval (tests use a short one).
    pub fn with_interval(interval: Duration) -> Self {
        DriveScheduler {
            req_assert: LedState::new(),
            req_deassert: LedState::new(),
            timer: RetryTimer::new(interval),
        }
    }

    /// Fold a new transition's deltas into the pending sets.
    ///
    /// Any LED named by the new deltas supersedes its stale pending entry in
    /// *both* categories first, so a superseded action can never be driven
    /// after a newer one has been decided.
    pub fn merge(&mut self, delta: StateDelta) {
        self.timer.disarm();

        for name in delta.to_assert.keys().chain(delta.to_deassert.keys()) {
            self.req_assert.remove(name);
            self.req_deassert.remove(name);
        }
        self.req_assert.extend(delta.to_assert);
        self.req_deassert.extend(delta.to_deassert);
    }

    /// One drive pass over the pending sets. De-asserts run before asserts:
    /// a physical resource must be freed before it can be claimed again.
    ///
    /// Entries that drive successfully leave the pending sets; failures stay.
    /// Returns `true` when both sets drained (timer disarmed), `false` when
    /// work remains (timer re-armed for the next pass).
    pub fn drive_once(&mut self, driver: &impl LedDriver) -> bool {
        let mut failed_deassert = LedState::new();
        for (name, led) in std::mem::take(&mut self.req_deassert) {
            log::debug!("de-asserting LED {name}");
            if let Err(e) = driver.set_led(&name, Action::Off, led.duty_on, led.period) {
                log::warn!("de-assert failed for LED {name}: {e}");
                failed_deassert.insert(name, led);
            }
        }
        self.req_deassert = failed_deassert;

        let mut failed_assert = LedState::new();
        for (name, led) in std::mem::take(&mut self.req_assert) {
            log::debug!("asserting LED {name} -> {}", led.action);
            if let Err(e) = driver.set_led(&name, led.action, led.duty_on, led.period) {
                log::warn!("assert failed for LED {name}: {e}");
                failed_assert.insert(name, led);
            }
        }
        self.req_assert = failed_assert;

        if self.is_idle() {
            self.timer.disarm();
            true
        } else {
            self.timer.arm();
            false
        }
    }

    /// No pending work in either set.
    pub fn is_idle(&self) -> bool {
        self.req_assert.is_empty() && self.req_deassert.is_empty()
    }

    /// The retry timer has fired and a new drive pass is owed.
    pub fn retry_due(&self) -> bool {
        self.timer.due()
    }

    /// Time until the next retry pass; `None` when idle.
    pub fn next_retry(&self) -> Option<Duration> {
        self.timer.remaining()
    }

    pub fn pending_assert(&self) -> &LedState {
        &self.req_assert
    }

    pub fn pending_deassert(&self) -> &LedState {
        &self.req_deassert
    }
}

impl Default for DriveScheduler {
    fn default() -> Self {
        Self::new()
    }
}
