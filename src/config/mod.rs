//! Device, credential and application-policy configuration
//!
//! This module contains the fixed, config-time options of the session core:
//! - LoRaWAN credentials (DevEUI, JoinEUI, keys)
//! - Regulatory region and uplink timing
//! - The application policy selecting a session-machine variant
//! - The multicast group table

/// Device configuration and application policy
pub mod device;

pub use device::DeviceConfig;
