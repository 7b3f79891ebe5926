//! Manager — runs the resolve -> diff -> merge -> drive cycle on every
//! group transition.
//!
//! The manager is an explicitly owned object handed to whatever layer wires
//! up external triggers; there is no hidden global. All state it owns is
//! mutated only from the single control thread (transition calls and retry
//! ticks), never concurrently.

use std::collections::{BTreeSet, HashMap};

use crate::config::GroupMap;
use crate::diff::{self, StateDelta};
use crate::driver::LedDriver;
use crate::error::{LedgroupdError, Result};
use crate::resolve::{self, LedState};
use crate::scheduler::DriveScheduler;

/// Per-group transition dispatch, selected at construction time.
pub enum GroupHandler {
    /// Default: the full merge/drive pipeline.
    MergeDrive,
    /// Platform side effect: invoked with `(group, asserted)` and replaces
    /// the resolve/diff/merge/drive steps for this group's transitions. The
    /// observed asserted flag still updates; the handler owns the group's
    /// LEDs, so the group never feeds arbitration.
    Custom(Box<dyn FnMut(&str, bool)>),
}

/// Lamp-test override. Receives the transition's deltas; returning `true`
/// claims the drive step for this cycle and the scheduler is not run.
pub type LampTestHook = Box<dyn FnMut(&StateDelta) -> bool>;

pub struct Manager<D> {
    driver: D,
    groups: GroupMap,
    asserted: BTreeSet<String>,
    /// Resolver output from the last transition (the "desired" state).
    combined: LedState,
    /// What the scheduler was last asked to realize; diff baseline.
    current: LedState,
    scheduler: DriveScheduler,
    handlers: HashMap<String, GroupHandler>,
    lamp_test: Option<LampTestHook>,
}

impl<D: LedDriver> Manager<D> {
    pub fn new(driver: D, groups: GroupMap) -> Self {
        Manager {
            driver,
            groups,
            asserted: BTreeSet::new(),
            combined: LedState::new(),
            current: LedState::new(),
            scheduler: DriveScheduler::new(),
            handlers: HashMap::new(),
            lamp_test: None,
        }
    }

    /// Replace the default scheduler (tests shorten the retry interval).
    pub fn with_scheduler(mut self, scheduler: DriveScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Select a non-default handler for one group's transitions.
    pub fn set_handler(&mut self, group: &str, handler: GroupHandler) -> Result<()> {
        if !self.groups.contains_key(group) {
            return Err(LedgroupdError::UnknownGroup(group.into()));
        }
        self.handlers.insert(group.into(), handler);
        Ok(())
    }

    /// Register the lamp-test override hook.
    pub fn set_lamp_test_hook(&mut self, hook: LampTestHook) {
        self.lamp_test = Some(hook);
    }

    /// Assert or de-assert one group.
    ///
    /// Returns the accepted flag: the externally observed asserted state
    /// changes on return even if the hardware has not converged yet — drive
    /// failures are owned entirely by the retry scheduler and never surface
    /// here. The only caller-visible failure is an unknown group name.
    pub fn set_group_state(&mut self, group: &str, assert: bool) -> Result<bool> {
        if !self.groups.contains_key(group) {
            return Err(LedgroupdError::UnknownGroup(group.into()));
        }

        if assert {
            self.asserted.insert(group.into());
        } else {
            self.asserted.remove(group);
        }

        if let Some(GroupHandler::Custom(callback)) = self.handlers.get_mut(group) {
            callback(group, assert);
            return Ok(assert);
        }

        let handlers = &self.handlers;
        let groups = &self.groups;
        self.combined = resolve::resolve(self.asserted.iter().filter_map(|name| {
            if matches!(handlers.get(name), Some(GroupHandler::Custom(_))) {
                None
            } else {
                groups.get(name)
            }
        }));
        let delta = diff::diff(&self.current, &self.combined);
        self.current = self.combined.clone();

        if let Some(hook) = &mut self.lamp_test {
            if hook(&delta) {
                return Ok(assert);
            }
        }

        self.scheduler.merge(delta);
        self.scheduler.drive_once(&self.driver);
        Ok(assert)
    }

    /// Run a retry pass if the scheduler's timer has fired. Called from the
    /// event loop; a no-op while the scheduler is idle or not yet due.
    pub fn tick(&mut self) {
        if self.scheduler.retry_due() {
            self.scheduler.drive_once(&self.driver);
        }
    }

    /// Time until the next owed retry pass; `None` when converged.
    pub fn next_retry(&self) -> Option<std::time::Duration> {
        self.scheduler.next_retry()
    }

    pub fn is_asserted(&self, group: &str) -> bool {
        self.asserted.contains(group)
    }

    /// Currently asserted group names, sorted.
    pub fn asserted_groups(&self) -> impl Iterator<Item = &str> {
        self.asserted.iter().map(String::as_str)
    }

    /// Known group names, sorted.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// LEDs whose last commanded action has not yet been applied.
    pub fn pending_leds(&self) -> Vec<&str> {
        self.scheduler
            .pending_deassert()
            .keys()
            .chain(self.scheduler.pending_assert().keys())
            .map(String::as_str)
            .collect()
    }

    /// Hardware has converged to the last requested state.
    pub fn is_settled(&self) -> bool {
        self.scheduler.is_idle()
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }
}
