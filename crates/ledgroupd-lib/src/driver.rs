//! Physical LED drive — trait + Linux sysfs backend.

use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use crate::layout::Action;

// ── Error type ──

/// Physical drive errors. Never escalated past the retry scheduler; a failed
/// drive leaves the LED in the pending set and is retried on the next pass.
#[derive(Debug)]
pub enum DriveError {
    /// No sysfs entry for this LED name.
    NotPresent(String),
    /// Writing a sysfs attribute failed.
    WriteFailed { led: String, attr: &'static str, source: std::io::Error },
}

impl fmt::Display for DriveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriveError::NotPresent(led) => write!(f, "LED '{led}' not present in sysfs"),
            DriveError::WriteFailed { led, attr, source } => {
                write!(f, "failed to write {attr} for LED '{led}': {source}")
            }
        }
    }
}

impl std::error::Error for DriveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DriveError::WriteFailed { source, .. } => Some(source),
            DriveError::NotPresent(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DriveError>;

// ── Trait ──

/// Hardware-drive boundary: one call per changed LED per drive pass.
///
/// Implementations must be bounded synchronous calls — a wedged drive stalls
/// every group transition on the single control thread. Failure is reported
/// through the `Result` only, never by panicking.
pub trait LedDriver {
    fn set_led(&self, name: &str, action: Action, duty_on: u8, period: u16) -> Result<()>;
}

impl<T: LedDriver + ?Sized> LedDriver for &T {
    fn set_led(&self, name: &str, action: Action, duty_on: u8, period: u16) -> Result<()> {
        (**self).set_led(name, action, duty_on, period)
    }
}

// ── Sysfs implementation ──

/// Drives LEDs through the kernel LED class (`/sys/class/leds/<name>/`).
///
/// `On`/`Off` clear the trigger and write `brightness`; `Blink` uses the
/// kernel `timer` trigger with `delay_on`/`delay_off` derived from the duty
/// cycle and period.
#[derive(Debug)]
pub struct SysfsLedDriver {
    base: PathBuf,
}

const SYSFS_LED_BASE: &str = "/sys/class/leds";
const FULL_BRIGHTNESS: &str = "255";

impl SysfsLedDriver {
    pub fn new() -> Self {
        Self::with_base(SYSFS_LED_BASE)
    }

    /// Use an alternate base directory (tests point this at a tempdir).
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        SysfsLedDriver { base: base.into() }
    }

    fn write_attr(&self, led: &str, attr: &'static str, value: &str) -> Result<()> {
        let path = self.base.join(led).join(attr);
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&path)
            .map_err(|source| DriveError::WriteFailed { led: led.into(), attr, source })?;
        file.write_all(value.as_bytes())
            .map_err(|source| DriveError::WriteFailed { led: led.into(), attr, source })
    }
}

impl Default for SysfsLedDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl LedDriver for SysfsLedDriver {
    fn set_led(&self, name: &str, action: Action, duty_on: u8, period: u16) -> Result<()> {
        if !self.base.join(name).exists() {
            return Err(DriveError::NotPresent(name.into()));
        }
        match action {
            Action::Blink => {
                let on_ms = u32::from(period) * u32::from(duty_on.min(100)) / 100;
                let off_ms = u32::from(period).saturating_sub(on_ms);
                self.write_attr(name, "trigger", "timer")?;
                self.write_attr(name, "delay_on", &on_ms.to_string())?;
                self.write_attr(name, "delay_off", &off_ms.to_string())?;
                self.write_attr(name, "brightness", FULL_BRIGHTNESS)
            }
            Action::On => {
                self.write_attr(name, "trigger", "none")?;
                self.write_attr(name, "brightness", FULL_BRIGHTNESS)
            }
            Action::Off => {
                self.write_attr(name, "trigger", "none")?;
                self.write_attr(name, "brightness", "0")
            }
        }
    }
}

// ── Mock implementation ──

pub mod mock {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;

    /// One recorded drive call.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct DriveCall {
        pub name: String,
        pub action: Action,
        pub duty_on: u8,
        pub period: u16,
    }

    /// In-memory driver for unit tests. Records every call in order;
    /// `fail_leds` makes calls for specific LED names fail, `fail_all`
    /// makes every call fail.
    #[derive(Debug, Default)]
    pub struct MockDriver {
        pub calls: RefCell<Vec<DriveCall>>,
        pub fail_leds: RefCell<HashSet<String>>,
        pub fail_all: std::cell::Cell<bool>,
    }

    impl MockDriver {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make drive calls for `name` fail until cleared.
        pub fn fail_led(&self, name: &str) {
            self.fail_leds.borrow_mut().insert(name.into());
        }

        pub fn clear_failures(&self) {
            self.fail_leds.borrow_mut().clear();
            self.fail_all.set(false);
        }

        /// Recorded calls, oldest first.
        pub fn calls(&self) -> Vec<DriveCall> {
            self.calls.borrow().clone()
        }

        pub fn clear_calls(&self) {
            self.calls.borrow_mut().clear();
        }

        /// Recorded `(name, action)` pairs, for terse assertions.
        pub fn actions(&self) -> Vec<(String, Action)> {
            self.calls
                .borrow()
                .iter()
                .map(|c| (c.name.clone(), c.action))
                .collect()
        }
    }

    impl LedDriver for MockDriver {
        fn set_led(&self, name: &str, action: Action, duty_on: u8, period: u16) -> Result<()> {
            if self.fail_all.get() || self.fail_leds.borrow().contains(name) {
                return Err(DriveError::NotPresent(name.into()));
            }
            self.calls.borrow_mut().push(DriveCall {
                name: name.into(),
                action,
                duty_on,
                period,
            });
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockDriver;
    use super::*;

    #[test]
    fn mock_records_calls_in_order() {
        let driver = MockDriver::new();
        driver.set_led("a", Action::On, 0, 0).unwrap();
        driver.set_led("b", Action::Blink, 50, 1000).unwrap();
        assert_eq!(
            driver.actions(),
            vec![("a".into(), Action::On), ("b".into(), Action::Blink)]
        );
    }

    #[test]
    fn mock_injected_failure() {
        let driver = MockDriver::new();
        driver.fail_led("a");
        assert!(driver.set_led("a", Action::On, 0, 0).is_err());
        assert!(driver.set_led("b", Action::On, 0, 0).is_ok());
        driver.clear_failures();
        assert!(driver.set_led("a", Action::On, 0, 0).is_ok());
    }

    #[test]
    fn sysfs_missing_led_is_not_present() {
        let dir = tempfile::tempdir().unwrap();
        let driver = SysfsLedDriver::with_base(dir.path());
        let err = driver.set_led("ghost", Action::On, 0, 0).unwrap_err();
        assert!(matches!(err, DriveError::NotPresent(_)));
    }

    #[test]
    fn sysfs_on_off_write_brightness() {
        let dir = tempfile::tempdir().unwrap();
        let led = dir.path().join("front_fault");
        std::fs::create_dir(&led).unwrap();
        for attr in ["trigger", "brightness", "delay_on", "delay_off"] {
            std::fs::write(led.join(attr), "").unwrap();
        }
        let driver = SysfsLedDriver::with_base(dir.path());

        driver.set_led("front_fault", Action::On, 0, 0).unwrap();
        assert_eq!(std::fs::read_to_string(led.join("brightness")).unwrap(), "255");

        driver.set_led("front_fault", Action::Off, 0, 0).unwrap();
        assert_eq!(std::fs::read_to_string(led.join("brightness")).unwrap(), "0");
    }

    #[test]
    fn sysfs_blink_writes_timer_delays() {
        let dir = tempfile::tempdir().unwrap();
        let led = dir.path().join("front_id");
        std::fs::create_dir(&led).unwrap();
        for attr in ["trigger", "brightness", "delay_on", "delay_off"] {
            std::fs::write(led.join(attr), "").unwrap();
        }
        let driver = SysfsLedDriver::with_base(dir.path());

        driver.set_led("front_id", Action::Blink, 25, 1000).unwrap();
        assert_eq!(std::fs::read_to_string(led.join("trigger")).unwrap(), "timer");
        assert_eq!(std::fs::read_to_string(led.join("delay_on")).unwrap(), "250");
        assert_eq!(std::fs::read_to_string(led.join("delay_off")).unwrap(), "750");
    }
}
