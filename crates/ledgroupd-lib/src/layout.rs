//! Group layout value types — what each group wants its LEDs to do when asserted.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Physical LED action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Action {
    Off,
    On,
    Blink,
}

impl Action {
    /// Fixed fallback order used when priority-based conflict resolution
    /// cannot pick a single winner: On beats Blink beats Off.
    pub fn strength(self) -> u8 {
        match self {
            Action::On => 2,
            Action::Blink => 1,
            Action::Off => 0,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Off => write!(f, "Off"),
            Action::On => write!(f, "On"),
            Action::Blink => write!(f, "Blink"),
        }
    }
}

/// One LED's desired state within a group.
///
/// Pure value type: two `LedAction`s refer to the same physical LED iff `name`
/// matches, regardless of the remaining fields. `duty_on` (percent) and
/// `period` (ms) are meaningful only when `action` is `Blink`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedAction {
    pub name: String,
    pub action: Action,
    pub duty_on: u8,
    pub period: u16,
    /// Action to prefer for this LED when another asserted group claims the
    /// same LED with a different action.
    pub priority: Action,
}

impl LedAction {
    pub fn new(name: impl Into<String>, action: Action) -> Self {
        let name = name.into();
        LedAction {
            name,
            action,
            duty_on: 0,
            period: 0,
            priority: action,
        }
    }

    pub fn with_priority(mut self, priority: Action) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_blink(mut self, duty_on: u8, period: u16) -> Self {
        self.duty_on = duty_on;
        self.period = period;
        self
    }
}

/// Layout construction errors.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// Two members of one group name the same physical LED.
    DuplicateLed(String),
    /// `duty_on` above 100 percent.
    InvalidDutyCycle { led: String, duty_on: u8 },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::DuplicateLed(name) => {
                write!(f, "duplicate LED '{name}' within one group")
            }
            LayoutError::InvalidDutyCycle { led, duty_on } => {
                write!(f, "LED '{led}' has duty cycle {duty_on}% (max 100)")
            }
        }
    }
}

impl std::error::Error for LayoutError {}

/// One group's desired pattern: an ordered set of [`LedAction`], unique per
/// LED name, fixed at group-definition time and immutable thereafter.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupLayout {
    leds: Vec<LedAction>,
}

impl GroupLayout {
    /// Build a layout from member actions, sorting by LED name.
    ///
    /// Rejects duplicate LED names within the group and out-of-range duty
    /// cycles; everything else is accepted as-is.
    pub fn new(mut leds: Vec<LedAction>) -> Result<Self, LayoutError> {
        for led in &leds {
            if led.duty_on > 100 {
                return Err(LayoutError::InvalidDutyCycle {
                    led: led.name.clone(),
                    duty_on: led.duty_on,
                });
            }
        }
        leds.sort_by(|a, b| a.name.cmp(&b.name));
        if let Some(dup) = leds.windows(2).find(|w| w[0].name == w[1].name) {
            return Err(LayoutError::DuplicateLed(dup[0].name.clone()));
        }
        Ok(GroupLayout { leds })
    }

    /// Member actions in LED-name order.
    pub fn leds(&self) -> &[LedAction] {
        &self.leds
    }

    pub fn len(&self) -> usize {
        self.leds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leds.is_empty()
    }
}

impl<'a> IntoIterator for &'a GroupLayout {
    type Item = &'a LedAction;
    type IntoIter = std::slice::Iter<'a, LedAction>;

    fn into_iter(self) -> Self::IntoIter {
        self.leds.iter()
    }
}
