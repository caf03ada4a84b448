//! Modem command interface and event types
//!
//! Boundary to the external LoRaWAN modem. This module contains:
//! - The [`Modem`] trait, the command set the session core drives
//! - The event stream types ([`Event`], [`EventKind`] and the decoded
//!   sub-status helpers)
//! - The closed [`ModemError`] response-code taxonomy

use core::fmt;

/// Modem event stream types
pub mod event;

/// Modem command trait
pub mod traits;

pub use event::{DownlinkMetadata, DownlinkWindow, Event, EventKind, TxDoneStatus};
pub use traits::{AdrProfile, Modem, MulticastClassBStatus, MulticastClassCStatus};

/// Modem command response code, minus the two non-error codes
///
/// The modem answers every command with one code out of a closed set. `Ok`
/// maps to `Ok(_)` and the no-event-pending code maps to `Ok(None)` from
/// [`Modem::get_event`]; the remaining codes are this error. None of them
/// is fatal to the session core: failures are logged and the next
/// naturally occurring event is the retry path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModemError {
    /// The modem has not finished booting
    NotInitialized,
    /// A command argument was rejected
    InvalidArgument,
    /// The modem is busy with a previous command
    Busy,
    /// The command failed
    Fail,
    /// The time source is not synchronized yet
    NoTimeAvailable,
}

impl fmt::Display for ModemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModemError::NotInitialized => write!(f, "not initialized"),
            ModemError::InvalidArgument => write!(f, "invalid argument"),
            ModemError::Busy => write!(f, "busy"),
            ModemError::Fail => write!(f, "command failed"),
            ModemError::NoTimeAvailable => write!(f, "no time available"),
        }
    }
}
