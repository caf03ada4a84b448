//! Duty-cycle-gated uplink scheduling
//!
//! Every uplink attempt runs through the same gate: query the remaining
//! duty-cycle block time, clamp the payload to the advertised maximum, then
//! hand the frame to the modem. Nothing here retries; the caller's
//! periodic alarm is the retry mechanism.

use log::{error, info};

use crate::modem::{Modem, ModemError};

/// Largest application payload the modem accepts
pub const MAX_APP_PAYLOAD: usize = 242;

/// What a send attempt did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendOutcome {
    /// The frame was handed to the modem
    Sent,
    /// The payload exceeded the advertised maximum; an empty frame was
    /// sent instead on the same port to flush pending MAC commands
    FlushedEmpty {
        /// Maximum the modem advertised for this uplink
        max_payload: u8,
    },
    /// The duty cycle blocks transmission; nothing was sent. Not an error.
    Blocked {
        /// Milliseconds until the next uplink is allowed
        remaining_ms: u32,
    },
}

/// Uplink scheduler
///
/// Stateless apart from the configured alarm period; the duty-cycle status
/// and max payload are queried fresh from the modem on every attempt, never
/// cached across events.
#[derive(Debug, Clone, Copy)]
pub struct UplinkScheduler {
    alarm_period_s: u32,
}

impl UplinkScheduler {
    /// Create a scheduler re-arming the periodic alarm every
    /// `alarm_period_s` seconds
    pub const fn new(alarm_period_s: u32) -> Self {
        Self { alarm_period_s }
    }

    /// Configured alarm period in seconds
    pub fn alarm_period_s(&self) -> u32 {
        self.alarm_period_s
    }

    /// Send an application frame.
    ///
    /// Returns [`SendOutcome::Blocked`] without touching the radio while
    /// the duty cycle runs down. An oversized payload is replaced by an
    /// empty frame on the same port and confirmation flag rather than
    /// failing.
    pub fn send<M: Modem>(
        &self,
        modem: &mut M,
        port: u8,
        payload: &[u8],
        confirmed: bool,
    ) -> Result<SendOutcome, ModemError> {
        if let Some(blocked) = self.duty_cycle_gate(modem)? {
            return Ok(blocked);
        }

        let max_payload = modem.get_next_tx_max_payload()?;
        if payload.len() > max_payload as usize {
            info!(
                "payload of {} bytes exceeds max of {}, flushing empty frame",
                payload.len(),
                max_payload
            );
            modem.request_tx(port, confirmed, &[])?;
            return Ok(SendOutcome::FlushedEmpty { max_payload });
        }

        match modem.request_tx(port, confirmed, payload) {
            Ok(()) => {
                info!("uplink requested: {} bytes on port {}", payload.len(), port);
                Ok(SendOutcome::Sent)
            }
            Err(err) => {
                error!("uplink request rejected: {}", err);
                Err(err)
            }
        }
    }

    /// Send a payload-less frame, flushing pending MAC commands
    pub fn send_empty<M: Modem>(
        &self,
        modem: &mut M,
        port: u8,
        confirmed: bool,
    ) -> Result<SendOutcome, ModemError> {
        if let Some(blocked) = self.duty_cycle_gate(modem)? {
            return Ok(blocked);
        }

        match modem.request_empty_tx(true, port, confirmed) {
            Ok(()) => {
                info!("empty uplink requested on port {}", port);
                Ok(SendOutcome::Sent)
            }
            Err(err) => {
                error!("empty uplink request rejected: {}", err);
                Err(err)
            }
        }
    }

    /// Re-arm the periodic alarm. The modem replaces a running alarm, so
    /// exactly one is ever live.
    pub fn rearm_alarm<M: Modem>(&self, modem: &mut M) -> Result<(), ModemError> {
        modem.set_alarm_timer(self.alarm_period_s)
    }

    fn duty_cycle_gate<M: Modem>(&self, modem: &mut M) -> Result<Option<SendOutcome>, ModemError> {
        let blocked_ms = modem.get_duty_cycle_status()?;
        if blocked_ms > 0 {
            info!("duty cycle: next uplink available in {} ms", blocked_ms);
            return Ok(Some(SendOutcome::Blocked {
                remaining_ms: blocked_ms as u32,
            }));
        }
        Ok(None)
    }
}
