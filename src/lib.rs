//! Session and control logic for a modem-driven LoRaWAN end device
//!
//! This crate drives an external LoRaWAN modem (the device that owns the
//! radio, the MAC layer and the event queue) through join, device-class
//! transitions (A/B/C), multicast-group provisioning and duty-cycle-gated
//! uplink scheduling. The modem delivers its side of the conversation as an
//! asynchronous stream of events; this crate owns the session state and
//! decides which modem command to issue next.
//!
//! # Features
//! - Event-driven session state machine covering join, class switching,
//!   certification mode and multicast sessions
//! - Policy table collapsing the common application variants (periodic
//!   uplink, on-demand Class B, FUOTA/ALC-sync, multicast start/stop)
//! - Duty-cycle-gated uplink scheduler with max-payload clamping
//! - Class B and Class C multicast group management
//! - Interrupt-to-main-loop trigger flags with critical-section discipline
//! - No unsafe code
//!
//! The modem itself is an external collaborator, abstracted behind the
//! [`modem::Modem`] trait; board bring-up, button debouncing and credential
//! storage stay outside this crate.

#![warn(missing_docs)]
#![no_std]

/// Device, credential and application-policy configuration
pub mod config;

/// Event dispatcher and interrupt trigger flags
pub mod dispatch;

/// Modem command interface and event types
pub mod modem;

/// Multicast group provisioning and session control
pub mod multicast;

/// Regional parameters
pub mod region;

/// Session state machine
pub mod session;

/// Duty-cycle-gated uplink scheduling
pub mod uplink;
