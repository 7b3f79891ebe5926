//! ledgroupd — arbitration of logical LED groups onto physical indicator LEDs.

pub mod config;
pub mod control;
pub mod diff;
pub mod driver;
pub mod error;
pub mod layout;
pub mod manager;
pub mod persist;
pub mod resolve;
pub mod scheduler;

pub use error::LedgroupdError;
