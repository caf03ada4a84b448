//! Multicast group provisioning and session control
//!
//! A multicast group is a shared-key session letting one network downlink
//! reach many devices, delivered either on Class B ping slots or on the
//! Class C continuous window. The modem stores the group records and runs
//! the sessions; this module owns the provisioning order (keys before any
//! class switch) and mirrors each group's session status.

use log::{info, warn};

use crate::config::device::MulticastGroupConfig;
use crate::modem::{Modem, ModemError};
use crate::region::MulticastParams;

/// Number of multicast groups the modem can hold
pub const MAX_MULTICAST_GROUPS: usize = 4;

/// Class family a multicast session runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MulticastClass {
    /// Beacon-synchronized ping slot sessions
    B,
    /// Continuous receive sessions
    C,
}

/// Session status of one group, as tracked on this side of the modem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GroupStatus {
    /// No keys programmed since the last reset
    Unprovisioned,
    /// Keys and address programmed, no session running
    Provisioned,
    /// Class B session started, beacon not yet acquired
    WaitingBeacon,
    /// Session running
    Active,
    /// Session stopped after having run
    Stopped,
}

/// Multicast group manager
///
/// Tracks the per-group session status and issues the group-related modem
/// commands. The group table itself is static configuration
/// ([`MulticastGroupConfig`]); only the statuses live here.
#[derive(Debug)]
pub struct MulticastManager {
    statuses: [GroupStatus; MAX_MULTICAST_GROUPS],
}

impl MulticastManager {
    /// Create a manager with every group unprovisioned
    pub const fn new() -> Self {
        Self {
            statuses: [GroupStatus::Unprovisioned; MAX_MULTICAST_GROUPS],
        }
    }

    /// Forget all session state (modem reset wipes the groups too)
    pub fn reset(&mut self) {
        self.statuses = [GroupStatus::Unprovisioned; MAX_MULTICAST_GROUPS];
    }

    /// Status of one group
    pub fn status(&self, id: u8) -> GroupStatus {
        self.statuses
            .get(id as usize)
            .copied()
            .unwrap_or(GroupStatus::Unprovisioned)
    }

    /// Program address and both session keys for every configured group.
    ///
    /// Must run before any class switch: the modem associates the keys with
    /// a class at switch time.
    pub fn provision<M: Modem>(
        &mut self,
        modem: &mut M,
        groups: &[MulticastGroupConfig],
    ) -> Result<(), ModemError> {
        for (id, group) in groups.iter().take(MAX_MULTICAST_GROUPS).enumerate() {
            modem.set_multicast_group_config(
                id as u8,
                group.address_word(),
                &group.nwk_skey,
                &group.app_skey,
            )?;
            self.statuses[id] = GroupStatus::Provisioned;
        }
        Ok(())
    }

    /// Start a session on every configured group.
    ///
    /// Class C sessions are addressable immediately; Class B sessions wait
    /// for beacon lock and are promoted by [`beacon_acquired`].
    ///
    /// [`beacon_acquired`]: MulticastManager::beacon_acquired
    pub fn start_all<M: Modem>(
        &mut self,
        modem: &mut M,
        groups: &[MulticastGroupConfig],
        class: MulticastClass,
        params: MulticastParams,
    ) -> Result<(), ModemError> {
        for (id, group) in groups.iter().take(MAX_MULTICAST_GROUPS).enumerate() {
            match class {
                MulticastClass::B => {
                    modem.start_multicast_class_b(
                        id as u8,
                        params.frequency,
                        params.datarate,
                        group.ping_slot,
                    )?;
                    self.statuses[id] = GroupStatus::WaitingBeacon;
                    info!("multicast group {}: session started, waiting for beacon", id);
                }
                MulticastClass::C => {
                    modem.start_multicast_class_c(id as u8, params.frequency, params.datarate)?;
                    self.statuses[id] = GroupStatus::Active;
                    info!("multicast group {}: session started", id);
                }
            }
        }
        Ok(())
    }

    /// Stop every session of the class family in one modem call.
    ///
    /// Best-effort: the tracked statuses drop to `Stopped` even if the
    /// modem rejects the command, mirroring the aggregate-only stop
    /// semantics of the command itself.
    pub fn stop_all<M: Modem>(
        &mut self,
        modem: &mut M,
        class: MulticastClass,
    ) -> Result<(), ModemError> {
        let result = match class {
            MulticastClass::B => modem.stop_all_multicast_class_b(),
            MulticastClass::C => modem.stop_all_multicast_class_c(),
        };
        for status in self.statuses.iter_mut() {
            if matches!(*status, GroupStatus::WaitingBeacon | GroupStatus::Active) {
                *status = GroupStatus::Stopped;
            }
        }
        result
    }

    /// Promote every beacon-waiting group to active. Returns how many
    /// groups were promoted.
    pub fn beacon_acquired(&mut self) -> usize {
        let mut promoted = 0;
        for (id, status) in self.statuses.iter_mut().enumerate() {
            if *status == GroupStatus::WaitingBeacon {
                *status = GroupStatus::Active;
                promoted += 1;
                info!("multicast group {}: beacon acquired, session active", id);
            }
        }
        promoted
    }

    /// Query one group's session status from the modem, log it and mirror
    /// the started/waiting flags into the tracked status.
    pub fn report_session_status<M: Modem>(
        &mut self,
        modem: &mut M,
        class: MulticastClass,
        id: u8,
    ) -> Result<(), ModemError> {
        if id as usize >= MAX_MULTICAST_GROUPS {
            warn!("multicast status query for out-of-range group {}", id);
            return Err(ModemError::InvalidArgument);
        }
        match class {
            MulticastClass::B => {
                let status = modem.get_multicast_class_b_status(id)?;
                info!(
                    "multicast group {}: class B session started={} waiting_beacon={} freq={} Hz dr={} ping_slot={} s",
                    id,
                    status.is_session_started,
                    status.is_session_waiting_for_beacon,
                    status.frequency,
                    status.datarate,
                    status.ping_slot.seconds(),
                );
                self.statuses[id as usize] = if !status.is_session_started {
                    GroupStatus::Stopped
                } else if status.is_session_waiting_for_beacon {
                    GroupStatus::WaitingBeacon
                } else {
                    GroupStatus::Active
                };
            }
            MulticastClass::C => {
                let status = modem.get_multicast_class_c_status(id)?;
                info!(
                    "multicast group {}: class C session started={} freq={} Hz dr={}",
                    id, status.is_session_started, status.frequency, status.datarate,
                );
                self.statuses[id as usize] = if status.is_session_started {
                    GroupStatus::Active
                } else {
                    GroupStatus::Stopped
                };
            }
        }
        Ok(())
    }
}

impl Default for MulticastManager {
    fn default() -> Self {
        Self::new()
    }
}
