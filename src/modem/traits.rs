use crate::config::device::{AESKey, DeviceClass, PingSlotPeriodicity, EUI64};
use crate::region::Region;

use super::event::{DownlinkMetadata, Event};
use super::ModemError;

/// ADR profile handed to the modem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdrProfile {
    /// Data rate fully controlled by the network server
    NetworkServerControlled,
    /// Mobile device, optimized for power
    MobileLowPower,
    /// Mobile device, optimized for range
    MobileLongRange,
    /// Device-supplied custom data rate list
    Custom,
}

/// Session status of one Class B multicast group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MulticastClassBStatus {
    /// A start command was issued and not yet stopped
    pub is_session_started: bool,
    /// The session is started but still waiting for beacon lock
    pub is_session_waiting_for_beacon: bool,
    /// Session downlink frequency in Hz
    pub frequency: u32,
    /// Session data rate index
    pub datarate: u8,
    /// Session ping slot periodicity
    pub ping_slot: PingSlotPeriodicity,
}

/// Session status of one Class C multicast group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MulticastClassCStatus {
    /// A start command was issued and not yet stopped
    pub is_session_started: bool,
    /// Session downlink frequency in Hz
    pub frequency: u32,
    /// Session data rate index
    pub datarate: u8,
}

/// Command interface of the external LoRaWAN modem
///
/// The modem owns the radio, the MAC layer (ADR, frame counters, MIC) and
/// the event queue; this trait is the narrow waist the session core talks
/// through. Every command surfaces the closed [`ModemError`] taxonomy and
/// is expected to return promptly; blocking is bounded by the modem's own
/// command timeout, outside this crate's control.
pub trait Modem {
    /// Pull the next pending event. `Ok(None)` is the end-of-queue
    /// sentinel, not an error.
    fn get_event(&mut self) -> Result<Option<Event>, ModemError>;

    /// Schedule a network join request
    fn join(&mut self) -> Result<(), ModemError>;

    /// Leave the network, abandoning any join in progress
    fn leave_network(&mut self) -> Result<(), ModemError>;

    /// Set the regulatory region
    fn set_region(&mut self, region: Region) -> Result<(), ModemError>;

    /// Read back the region currently active in the modem
    fn get_region(&mut self) -> Result<Region, ModemError>;

    /// Set the device EUI
    fn set_dev_eui(&mut self, eui: &EUI64) -> Result<(), ModemError>;

    /// Set the join EUI
    fn set_join_eui(&mut self, eui: &EUI64) -> Result<(), ModemError>;

    /// Set the application root key
    fn set_app_key(&mut self, key: &AESKey) -> Result<(), ModemError>;

    /// Set the network root key
    fn set_nwk_key(&mut self, key: &AESKey) -> Result<(), ModemError>;

    /// Switch the device class
    fn set_class(&mut self, class: DeviceClass) -> Result<(), ModemError>;

    /// Set the unicast Class B ping slot periodicity. Must be issued before
    /// switching to Class B.
    fn set_class_b_ping_slot_periodicity(
        &mut self,
        periodicity: PingSlotPeriodicity,
    ) -> Result<(), ModemError>;

    /// Enable or disable certification mode
    fn set_certification_mode(&mut self, enable: bool) -> Result<(), ModemError>;

    /// Read the certification mode, which the modem keeps across reboots
    fn get_certification_mode(&mut self) -> Result<bool, ModemError>;

    /// Set the ADR profile; `custom_list` is only read for
    /// [`AdrProfile::Custom`]
    fn set_adr_profile(
        &mut self,
        profile: AdrProfile,
        custom_list: &[u8; 16],
    ) -> Result<(), ModemError>;

    /// Request an uplink. An empty payload flushes pending MAC commands.
    fn request_tx(&mut self, port: u8, confirmed: bool, payload: &[u8])
        -> Result<(), ModemError>;

    /// Request an uplink without any application payload, optionally
    /// flushing pending MAC commands
    fn request_empty_tx(
        &mut self,
        flush_mac: bool,
        port: u8,
        confirmed: bool,
    ) -> Result<(), ModemError>;

    /// Remaining duty-cycle block time in milliseconds; zero or negative
    /// means clear to send
    fn get_duty_cycle_status(&mut self) -> Result<i32, ModemError>;

    /// Maximum application payload the next uplink can carry
    fn get_next_tx_max_payload(&mut self) -> Result<u8, ModemError>;

    /// Arm the alarm timer. A running alarm is replaced, never stacked.
    fn set_alarm_timer(&mut self, seconds: u32) -> Result<(), ModemError>;

    /// Cancel the alarm timer
    fn clear_alarm_timer(&mut self) -> Result<(), ModemError>;

    /// Size of the pending downlink and the number of further downlinks
    /// queued in the modem. Must be read before the payload and metadata.
    fn get_downlink_data_size(&mut self) -> Result<(u8, u8), ModemError>;

    /// Read the pending downlink payload into `buffer`
    fn get_downlink_data(&mut self, buffer: &mut [u8]) -> Result<(), ModemError>;

    /// Metadata of the pending downlink. Reading it consumes the modem's
    /// pending-downlink state.
    fn get_downlink_metadata(&mut self) -> Result<DownlinkMetadata, ModemError>;

    /// Program one multicast group's address and session keys
    fn set_multicast_group_config(
        &mut self,
        id: u8,
        address: u32,
        nwk_skey: &AESKey,
        app_skey: &AESKey,
    ) -> Result<(), ModemError>;

    /// Start a Class B multicast session on a provisioned group
    fn start_multicast_class_b(
        &mut self,
        id: u8,
        frequency: u32,
        datarate: u8,
        periodicity: PingSlotPeriodicity,
    ) -> Result<(), ModemError>;

    /// Start a Class C multicast session on a provisioned group
    fn start_multicast_class_c(
        &mut self,
        id: u8,
        frequency: u32,
        datarate: u8,
    ) -> Result<(), ModemError>;

    /// Stop every Class B multicast session
    fn stop_all_multicast_class_b(&mut self) -> Result<(), ModemError>;

    /// Stop every Class C multicast session
    fn stop_all_multicast_class_c(&mut self) -> Result<(), ModemError>;

    /// Query one Class B multicast group's session status
    fn get_multicast_class_b_status(&mut self, id: u8)
        -> Result<MulticastClassBStatus, ModemError>;

    /// Query one Class C multicast group's session status
    fn get_multicast_class_c_status(&mut self, id: u8)
        -> Result<MulticastClassCStatus, ModemError>;

    /// Start the ALC-sync application-layer clock service
    fn alc_sync_start_service(&mut self) -> Result<(), ModemError>;
}
