use core::fmt;

/// Modem event type tag
///
/// Closed enumeration of the events the modem reports on its queue. Tags
/// this crate does not know are carried through as `Unknown` so the session
/// machine can log them instead of silently dropping them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventKind {
    /// Modem rebooted; all session state on both sides is gone
    Reset,
    /// The alarm timer armed with `set_alarm_timer` elapsed
    Alarm,
    /// Network join completed
    Joined,
    /// An uplink left the modem (or was abandoned); sub-status in the data
    TxDone,
    /// Downlink payload pending in the modem
    DownlinkData,
    /// Join attempt failed
    JoinFail,
    /// Link check answer arrived
    LinkCheck,
    /// Class B ping slot info answer arrived
    ClassBPingSlotInfo,
    /// Class B status changed; nonzero data means the beacon is acquired
    ClassBStatus,
    /// Network MAC time answer arrived
    MacTime,
    /// The network started a Class B multicast session
    NewMulticastClassB,
    /// The network started a Class C multicast session
    NewMulticastClassC,
    /// The last Class B multicast session ended
    EndMulticastClassB,
    /// The last Class C multicast session ended
    EndMulticastClassC,
    /// ALC-sync clock synchronization update
    AlcSyncTime,
    /// Firmware-update-over-the-air transfer finished; status in the data
    FuotaDone,
    /// Regional duty-cycle state change
    RegionalDutyCycle,
    /// Event tag this crate does not recognize
    Unknown(u8),
}

/// Uplink completion sub-status, decoded from a `TxDone` event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxDoneStatus {
    /// The modem gave up without transmitting
    NotSent,
    /// Sent unconfirmed
    Unconfirmed,
    /// Sent confirmed and acknowledged by the network
    Confirmed,
    /// Sub-status value this crate does not recognize
    Unknown(u8),
}

/// One modem event
///
/// Produced by the modem event queue, consumed exactly once by the
/// dispatcher, never retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Event {
    /// Event type
    pub kind: EventKind,
    /// Opaque event payload; layout depends on the kind
    pub data: u32,
}

impl Event {
    /// Create an event
    pub fn new(kind: EventKind, data: u32) -> Self {
        Self { kind, data }
    }

    /// Decode the `TxDone` sub-status from the data word
    pub fn tx_done_status(&self) -> TxDoneStatus {
        match (self.data >> 8) as u8 {
            0 => TxDoneStatus::NotSent,
            1 => TxDoneStatus::Unconfirmed,
            2 => TxDoneStatus::Confirmed,
            other => TxDoneStatus::Unknown(other),
        }
    }

    /// Beacon-acquired flag of a `ClassBStatus` event
    pub fn beacon_acquired(&self) -> bool {
        self.data != 0
    }

    /// Group id of a `NewMulticastClassB`/`NewMulticastClassC` event
    pub fn multicast_group_id(&self) -> u8 {
        (self.data >> 1) as u8
    }

    /// Status code of a `FuotaDone` event
    pub fn fuota_status(&self) -> u8 {
        (self.data >> 8) as u8
    }
}

/// Receive window a downlink arrived in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DownlinkWindow {
    /// First Class A receive window
    Rx1,
    /// Second Class A receive window
    Rx2,
    /// Class C continuous receive window
    Rxc,
    /// Class C multicast window of the given group
    RxcMulticast(u8),
    /// Class B ping slot
    Rxb,
    /// Class B multicast ping slot of the given group
    RxbMulticast(u8),
    /// Beacon receive window
    RxBeacon,
    /// Window value this crate does not recognize
    Unknown(u8),
}

impl fmt::Display for DownlinkWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownlinkWindow::Rx1 => write!(f, "RX1"),
            DownlinkWindow::Rx2 => write!(f, "RX2"),
            DownlinkWindow::Rxc => write!(f, "RXC"),
            DownlinkWindow::RxcMulticast(group) => write!(f, "RXC_MULTICAST_GROUP{}", group),
            DownlinkWindow::Rxb => write!(f, "RXB"),
            DownlinkWindow::RxbMulticast(group) => write!(f, "RXB_MULTICAST_GROUP{}", group),
            DownlinkWindow::RxBeacon => write!(f, "RXBEACON"),
            DownlinkWindow::Unknown(raw) => write!(f, "UNKNOWN({:#04x})", raw),
        }
    }
}

/// Metadata of a pending downlink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DownlinkMetadata {
    /// Application port
    pub port: u8,
    /// Window the frame arrived in
    pub window: DownlinkWindow,
}
