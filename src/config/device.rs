use heapless::Vec;

use crate::multicast::{MulticastClass, MAX_MULTICAST_GROUPS};
use crate::region::Region;

/// EUI-64 (8 bytes)
pub type EUI64 = [u8; 8];
/// AES-128 key (16 bytes)
pub type AESKey = [u8; 16];
/// Multicast group address (4 bytes)
pub type GroupAddr = [u8; 4];

/// LoRaWAN device class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceClass {
    /// Class A: receive windows only after an uplink
    A,
    /// Class B: additional beacon-synchronized ping slots
    B,
    /// Class C: continuous receive except when transmitting
    C,
}

/// Class B ping slot periodicity
///
/// How often the device opens a receive slot relative to the 128 s beacon
/// period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PingSlotPeriodicity {
    /// One ping slot every second
    Every1s,
    /// One ping slot every 2 seconds
    Every2s,
    /// One ping slot every 4 seconds
    Every4s,
    /// One ping slot every 8 seconds
    Every8s,
    /// One ping slot every 16 seconds
    Every16s,
    /// One ping slot every 32 seconds
    Every32s,
    /// One ping slot every 64 seconds
    Every64s,
    /// One ping slot every 128 seconds (one per beacon period)
    Every128s,
}

impl PingSlotPeriodicity {
    /// Slot interval in seconds
    pub fn seconds(&self) -> u16 {
        match self {
            PingSlotPeriodicity::Every1s => 1,
            PingSlotPeriodicity::Every2s => 2,
            PingSlotPeriodicity::Every4s => 4,
            PingSlotPeriodicity::Every8s => 8,
            PingSlotPeriodicity::Every16s => 16,
            PingSlotPeriodicity::Every32s => 32,
            PingSlotPeriodicity::Every64s => 64,
            PingSlotPeriodicity::Every128s => 128,
        }
    }
}

/// Fixed LoRaWAN credential set
///
/// Selected once at reset by the provisioning collaborator (user-supplied
/// or chip-internal) and applied to the modem verbatim.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Device EUI
    pub dev_eui: EUI64,
    /// Join EUI
    pub join_eui: EUI64,
    /// Network root key
    pub nwk_key: AESKey,
    /// Application root key
    pub app_key: AESKey,
}

impl Credentials {
    /// Create a credential set
    pub fn new(dev_eui: EUI64, join_eui: EUI64, nwk_key: AESKey, app_key: AESKey) -> Self {
        Self {
            dev_eui,
            join_eui,
            nwk_key,
            app_key,
        }
    }
}

/// Static configuration of one multicast group
///
/// Keys and address are config-time values shared with the network server;
/// they are never derived at runtime.
#[derive(Debug, Clone)]
pub struct MulticastGroupConfig {
    /// Group address
    pub address: GroupAddr,
    /// Multicast network session key
    pub nwk_skey: AESKey,
    /// Multicast application session key
    pub app_skey: AESKey,
    /// Ping slot periodicity of this group (Class B sessions only)
    pub ping_slot: PingSlotPeriodicity,
}

impl MulticastGroupConfig {
    /// Group address as the 32-bit word the modem command expects
    pub fn address_word(&self) -> u32 {
        u32::from_be_bytes(self.address)
    }
}

/// Application policy
///
/// Selects the session-machine variant. The variants share the join and
/// event plumbing and differ only in the bootstrap performed after join and
/// in what the user-action trigger toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassPolicy {
    /// Periodic confirmed counter uplink driven by the modem alarm. With
    /// `certification_toggle` set, the user action toggles certification
    /// mode instead of being unbound.
    PeriodicUplink {
        /// Bind the user action to the certification-mode toggle
        certification_toggle: bool,
    },
    /// Stay in Class A until the user action arms Class B (and reverts it)
    ClassBOnDemand,
    /// Periodic empty uplink plus the ALC-sync clock service, feeding a
    /// firmware-update-over-the-air session owned by the modem
    Fuota,
    /// Provision the multicast group table and switch class after join;
    /// the user action starts/stops all multicast sessions
    Multicast {
        /// Class family of the multicast sessions
        class: MulticastClass,
    },
}

/// Fixed device configuration
///
/// One value per device, created at startup and owned by the session state
/// machine for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Regulatory region compiled into this build
    pub region: Region,
    /// LoRaWAN credentials
    pub credentials: Credentials,
    /// Application policy
    pub policy: ClassPolicy,
    /// Desired certification mode after reset
    pub certification_default: bool,
    /// Periodic uplink alarm delay in seconds
    pub alarm_period_s: u32,
    /// Application port for periodic uplinks
    pub uplink_port: u8,
    /// Ping slot periodicity of the unicast Class B session
    pub ping_slot: PingSlotPeriodicity,
    /// Multicast group table (empty unless the policy is `Multicast`)
    pub groups: Vec<MulticastGroupConfig, MAX_MULTICAST_GROUPS>,
}

impl DeviceConfig {
    /// Create a configuration with the common defaults: periodic uplink on
    /// port 101 every 50 seconds, certification mode off, 8 s ping slots,
    /// no multicast groups.
    pub fn new(region: Region, credentials: Credentials, policy: ClassPolicy) -> Self {
        Self {
            region,
            credentials,
            policy,
            certification_default: false,
            alarm_period_s: 50,
            uplink_port: 101,
            ping_slot: PingSlotPeriodicity::Every8s,
            groups: Vec::new(),
        }
    }
}
