use crate::config::device::DeviceClass;

/// Coarse lifecycle phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// No Reset event consumed yet, or a stale join was abandoned
    Uninitialized,
    /// Join request issued, waiting for the network
    Joining,
    /// Session established
    Joined,
}

/// Mutable session record
///
/// The single source of truth for "what to do next". Created when the first
/// Reset event arrives, mutated only by the session state machine (from
/// events or the user-action trigger), re-initialized in place on every
/// subsequent Reset (the modem emits one after each of its reboots).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionState {
    /// Lifecycle phase
    pub phase: Phase,
    /// Certification mode as last read from or written to the modem
    pub certification_mode: bool,
    /// Current device class
    pub device_class: DeviceClass,
    /// The network accepted our join
    pub joined: bool,
    /// Class B was requested; the modem is acquiring the beacon
    pub class_b_armed: bool,
    /// Beacon acquired and the enabling uplink sent; Class B downlinks can
    /// arrive
    pub class_b_ready: bool,
    /// The unicast session of the multicast class is set up; multicast
    /// sessions may be started
    pub multicast_unicast_ready: bool,
    /// Every configured multicast group received a start command since the
    /// last Reset and none was stopped since
    pub multicast_started: bool,
    /// Uplinks requested (speculatively incremented, rolled back when the
    /// modem reports not-sent)
    pub uplink_counter: u32,
    /// Confirmed uplinks acknowledged by the network
    pub confirmed_counter: u32,
}

impl SessionState {
    /// Fresh pre-join state: Class A, nothing armed, counters at zero
    pub const fn new() -> Self {
        Self {
            phase: Phase::Uninitialized,
            certification_mode: false,
            device_class: DeviceClass::A,
            joined: false,
            class_b_armed: false,
            class_b_ready: false,
            multicast_unicast_ready: false,
            multicast_started: false,
            uplink_counter: 0,
            confirmed_counter: 0,
        }
    }

    /// Re-initialize in place (Reset event)
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
