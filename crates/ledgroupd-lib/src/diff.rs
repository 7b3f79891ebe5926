//! Minimal-change computation between the applied and the desired LED state.

use crate::resolve::LedState;

/// The two action sets produced by one transition.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StateDelta {
    /// LEDs to drive to their new action: brand-new names plus names whose
    /// action, duty cycle, or period changed (e.g. On -> Blink).
    pub to_assert: LedState,
    /// LEDs with no remaining claimant at all, to be driven Off. A name that
    /// merely changes action never appears here.
    pub to_deassert: LedState,
}

impl StateDelta {
    pub fn is_empty(&self) -> bool {
        self.to_assert.is_empty() && self.to_deassert.is_empty()
    }
}

/// Diff the previously applied state against the newly desired one.
///
/// A given name can appear in at most one of the two output sets: names
/// leaving the desired set go to `to_deassert`, names entering or changing
/// value go to `to_assert`, unchanged names appear in neither.
pub fn diff(current: &LedState, desired: &LedState) -> StateDelta {
    let mut delta = StateDelta::default();

    for (name, led) in current {
        if !desired.contains_key(name) {
            delta.to_deassert.insert(name.clone(), led.clone());
        }
    }

    for (name, led) in desired {
        if current.get(name) != Some(led) {
            delta.to_assert.insert(name.clone(), led.clone());
        }
    }

    delta
}
