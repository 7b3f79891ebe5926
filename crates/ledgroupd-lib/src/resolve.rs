//! Arbitration of concurrently asserted groups into one action per LED.

use std::collections::BTreeMap;

use crate::layout::{GroupLayout, LedAction};

/// Per-LED desired state, keyed by physical LED name.
pub type LedState = BTreeMap<String, LedAction>;

/// Merge every asserted group's demands into one resolved action per LED.
///
/// Pure and total: never fails, and the result does not depend on the
/// iteration order of `asserted` (contributors are canonically sorted before
/// conflicts are broken).
pub fn resolve<'a>(asserted: impl IntoIterator<Item = &'a GroupLayout>) -> LedState {
    let mut contributions: BTreeMap<&str, Vec<&LedAction>> = BTreeMap::new();
    for group in asserted {
        for led in group {
            contributions.entry(led.name.as_str()).or_default().push(led);
        }
    }

    contributions
        .into_values()
        .map(|leds| {
            let winner = resolve_one(leds);
            (winner.name.clone(), winner)
        })
        .collect()
}

/// Break a same-LED conflict between contributing descriptors.
///
/// Rules, applied in order:
/// 1. all contributed actions equal — that action wins;
/// 2. contributors whose action matches their own priority are preferred; if
///    exactly one action survives among them, it wins (the priority field is
///    how a group author declares what this LED should do under contention);
/// 3. fixed fallback order On > Blink > Off over the contributed actions.
///
/// Duty cycle and period come from the winning contributor; when several
/// contributors carry the winning action they are expected to agree by
/// configuration convention, and the canonical sort makes the pick
/// deterministic regardless of group iteration order.
fn resolve_one(mut leds: Vec<&LedAction>) -> LedAction {
    debug_assert!(!leds.is_empty());
    debug_assert!(leds.windows(2).all(|w| w[0].name == w[1].name));

    // Canonical order so the outcome is commutative in group evaluation order.
    leds.sort_by_key(|l| (l.action, l.duty_on, l.period, l.priority));

    if leds.len() == 1 || leds.iter().all(|l| l.action == leds[0].action) {
        return leds[0].clone();
    }

    let preferred: Vec<&&LedAction> =
        leds.iter().filter(|l| l.action == l.priority).collect();
    if let Some(first) = preferred.first() {
        if preferred.iter().all(|l| l.action == first.action) {
            return (**first).clone();
        }
    }

    // Canonical sort is ascending, so the first contributor with the
    // strongest action is the deterministic winner.
    let mut best = leds[0];
    for led in &leds[1..] {
        if led.action.strength() > best.action.strength() {
            best = led;
        }
    }
    best.clone()
}
