//! Unified error type for the ledgroupd-lib crate.
//!
//! [`LedgroupdError`] wraps module-specific errors (`DriveError`,
//! `LayoutError`) and domain error kinds (`Config`, `UnknownGroup`). `From`
//! impls allow `?` to propagate across module boundaries seamlessly.

use std::fmt;

use crate::driver::DriveError;
use crate::layout::LayoutError;

/// Unified error type for ledgroupd-lib operations.
#[derive(Debug)]
pub enum LedgroupdError {
    /// Transition requested for a group name absent from the loaded mapping.
    UnknownGroup(String),
    /// Physical drive error (only surfaced by direct driver use; the manager's
    /// retry scheduler absorbs these).
    Drive(DriveError),
    /// Group layout validation error.
    Layout(LayoutError),
    /// Configuration file parse or validation error.
    Config(String),
    /// Error reply from the ledgroupd service over the control socket.
    Service(String),
    /// Standard I/O error (config read, persisted-state read/write).
    Io(std::io::Error),
}

impl fmt::Display for LedgroupdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgroupdError::UnknownGroup(name) => write!(f, "unknown LED group '{name}'"),
            LedgroupdError::Drive(e) => write!(f, "{e}"),
            LedgroupdError::Layout(e) => write!(f, "{e}"),
            LedgroupdError::Config(e) => write!(f, "Config error: {e}"),
            LedgroupdError::Service(e) => write!(f, "Service error: {e}"),
            LedgroupdError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for LedgroupdError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LedgroupdError::Drive(e) => Some(e),
            LedgroupdError::Layout(e) => Some(e),
            LedgroupdError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DriveError> for LedgroupdError {
    fn from(e: DriveError) -> Self {
        LedgroupdError::Drive(e)
    }
}

impl From<LayoutError> for LedgroupdError {
    fn from(e: LayoutError) -> Self {
        LedgroupdError::Layout(e)
    }
}

impl From<std::io::Error> for LedgroupdError {
    fn from(e: std::io::Error) -> Self {
        LedgroupdError::Io(e)
    }
}

/// Crate-level Result alias using [`LedgroupdError`].
pub type Result<T> = std::result::Result<T, LedgroupdError>;
