//! Event-driven session state machine
//!
//! The machine owns the [`SessionState`] record and moves the device
//! through `Uninitialized → Joining → Joined`, with Class B arming,
//! certification mode and multicast sessions layered on top. It consumes
//! one modem event at a time ([`Session::on_event`]) plus the independent
//! user-action trigger ([`Session::on_user_action`]), and drives the
//! uplink scheduler and multicast group manager as side effects.
//!
//! Command failures are logged once, centrally, and never retried: the
//! next naturally occurring event (Alarm, user action, Reset) is the only
//! retry path. The one deliberate corrective action is the region-mismatch
//! guard on Reset, which leaves the network instead of continuing a join
//! on the wrong region.

/// Session state record
pub mod state;

pub use state::{Phase, SessionState};

use log::{error, info, warn};

use crate::config::device::{ClassPolicy, DeviceClass, DeviceConfig};
use crate::modem::{AdrProfile, Event, EventKind, Modem, ModemError, TxDoneStatus};
use crate::multicast::{MulticastClass, MulticastManager};
use crate::region::MulticastParams;
use crate::uplink::{SendOutcome, UplinkScheduler, MAX_APP_PAYLOAD};

/// Port of the uplink that enables a freshly switched class or multicast
/// session on the network server
const ENABLING_UPLINK_PORT: u8 = 10;

/// Session state machine
///
/// One per device. Both entry points require the caller to serialize
/// access (the dispatcher and the user-action handler run on the same
/// cooperative loop); nothing here is safe under reentry.
pub struct Session {
    config: DeviceConfig,
    state: SessionState,
    scheduler: UplinkScheduler,
    multicast: MulticastManager,
}

impl Session {
    /// Create a machine in the pre-reset state
    pub fn new(config: DeviceConfig) -> Self {
        let scheduler = UplinkScheduler::new(config.alarm_period_s);
        Self {
            config,
            state: SessionState::new(),
            scheduler,
            multicast: MulticastManager::new(),
        }
    }

    /// Current session state
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Multicast group manager
    pub fn multicast(&self) -> &MulticastManager {
        &self.multicast
    }

    /// Device configuration
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Consume one modem event
    pub fn on_event<M: Modem>(&mut self, modem: &mut M, event: Event) {
        match event.kind {
            EventKind::Reset => {
                info!("event: reset");
                self.on_reset(modem);
            }
            EventKind::Alarm => {
                info!("event: alarm");
                self.on_alarm(modem);
            }
            EventKind::Joined => {
                info!("event: joined");
                self.on_joined(modem);
            }
            EventKind::TxDone => self.on_tx_done(&event),
            EventKind::DownlinkData => {
                info!("event: downlink data");
                self.on_downlink_data(modem);
            }
            EventKind::JoinFail => warn!("event: join failed"),
            EventKind::LinkCheck => info!("event: link check"),
            EventKind::ClassBPingSlotInfo => info!("event: class B ping slot info"),
            EventKind::ClassBStatus => self.on_class_b_status(modem, &event),
            EventKind::MacTime => info!("event: MAC time"),
            EventKind::NewMulticastClassB => {
                let group = event.multicast_group_id();
                info!("event: new class B multicast session, group {}", group);
                check(
                    "get_multicast_class_b_status",
                    self.multicast
                        .report_session_status(modem, MulticastClass::B, group),
                );
            }
            EventKind::NewMulticastClassC => {
                let group = event.multicast_group_id();
                info!("event: new class C multicast session, group {}", group);
                check(
                    "get_multicast_class_c_status",
                    self.multicast
                        .report_session_status(modem, MulticastClass::C, group),
                );
            }
            EventKind::EndMulticastClassB => info!("event: no more class B multicast sessions"),
            EventKind::EndMulticastClassC => info!("event: no more class C multicast sessions"),
            EventKind::AlcSyncTime => info!("event: ALC sync time"),
            EventKind::FuotaDone => {
                info!("event: FUOTA done, status {:#04x}", event.fuota_status())
            }
            EventKind::RegionalDutyCycle => info!("event: regional duty cycle"),
            EventKind::Unknown(tag) => warn!("event not handled: {:#04x}", tag),
        }
    }

    /// Handle the debounced user-action trigger.
    ///
    /// What it toggles depends on the configured policy: certification
    /// mode, the unicast Class B session, or the multicast sessions.
    pub fn on_user_action<M: Modem>(&mut self, modem: &mut M) {
        info!("user action");
        match self.config.policy {
            ClassPolicy::PeriodicUplink {
                certification_toggle: true,
            } => self.toggle_certification(modem),
            ClassPolicy::PeriodicUplink { .. } | ClassPolicy::Fuota => {
                info!("no action bound to the user trigger")
            }
            ClassPolicy::ClassBOnDemand => self.toggle_class_b(modem),
            ClassPolicy::Multicast { class } => self.toggle_multicast(modem, class),
        }
    }

    fn on_reset<M: Modem>(&mut self, modem: &mut M) {
        self.state.reset();
        self.multicast.reset();

        // The modem keeps certification mode across its reboots.
        let was_enabled =
            check("get_certification_mode", modem.get_certification_mode()).unwrap_or(false);
        self.state.certification_mode = was_enabled;
        info!(
            "certification mode {}",
            if was_enabled { "enabled" } else { "disabled" }
        );

        if was_enabled {
            // A modem region differing from ours means a join on the wrong
            // region is in progress, left over from a certification run of
            // another build. Stop it; recovery is operator-driven.
            if let Some(modem_region) = check("get_region", modem.get_region()) {
                if modem_region != self.config.region {
                    warn!(
                        "modem region {} differs from configured {}: stale join assumed",
                        modem_region.name(),
                        self.config.region.name()
                    );
                    warn!("leaving network; disable certification and reset to recover");
                    check("leave_network", modem.leave_network());
                    return;
                }
            }
        }

        if was_enabled != self.config.certification_default {
            if check(
                "set_certification_mode",
                modem.set_certification_mode(self.config.certification_default),
            )
            .is_some()
            {
                self.state.certification_mode = self.config.certification_default;
            }
        }

        let credentials = &self.config.credentials;
        check("set_dev_eui", modem.set_dev_eui(&credentials.dev_eui));
        check("set_join_eui", modem.set_join_eui(&credentials.join_eui));
        check("set_app_key", modem.set_app_key(&credentials.app_key));
        check("set_nwk_key", modem.set_nwk_key(&credentials.nwk_key));

        check("set_region", modem.set_region(self.config.region));
        info!("region {}", self.config.region.name());

        if check("join", modem.join()).is_some() {
            self.state.phase = Phase::Joining;
            info!("joining");
        }
    }

    fn on_joined<M: Modem>(&mut self, modem: &mut M) {
        info!("modem is now joined");
        self.state.joined = true;
        self.state.phase = Phase::Joined;

        check(
            "set_adr_profile",
            modem.set_adr_profile(AdrProfile::NetworkServerControlled, &[0u8; 16]),
        );

        match self.config.policy {
            ClassPolicy::PeriodicUplink { .. } => {
                // In certification mode the harness owns the radio.
                if !self.state.certification_mode {
                    self.send_counter_uplink(modem);
                    check("set_alarm_timer", self.scheduler.rearm_alarm(modem));
                }
            }
            ClassPolicy::Fuota => {
                check(
                    "request_empty_tx",
                    self.scheduler
                        .send_empty(modem, self.config.uplink_port, false),
                );
                check("alc_sync_start_service", modem.alc_sync_start_service());
                check("set_alarm_timer", self.scheduler.rearm_alarm(modem));
            }
            ClassPolicy::ClassBOnDemand => {
                info!("user action switches to class B");
            }
            ClassPolicy::Multicast { class } => self.bootstrap_multicast(modem, class),
        }
    }

    fn bootstrap_multicast<M: Modem>(&mut self, modem: &mut M, class: MulticastClass) {
        // Keys must reach the modem before the class switch; it associates
        // them with a class at switch time.
        if check(
            "set_multicast_group_config",
            self.multicast.provision(modem, &self.config.groups),
        )
        .is_none()
        {
            return;
        }

        match class {
            MulticastClass::B => {
                check(
                    "set_class_b_ping_slot_periodicity",
                    modem.set_class_b_ping_slot_periodicity(self.config.ping_slot),
                );
                if check("set_class", modem.set_class(DeviceClass::B)).is_some() {
                    self.state.device_class = DeviceClass::B;
                    self.state.class_b_armed = true;
                    info!("switched to class B, waiting for beacon");
                }
            }
            MulticastClass::C => {
                if check("set_class", modem.set_class(DeviceClass::C)).is_some() {
                    self.state.device_class = DeviceClass::C;
                    self.state.multicast_unicast_ready = true;
                    // Enable the unicast Class C session on the network
                    // server with one uplink.
                    let payload = [0u8; 8];
                    check(
                        "request_tx",
                        self.scheduler
                            .send(modem, ENABLING_UPLINK_PORT, &payload, false),
                    );
                }
            }
        }
    }

    fn on_alarm<M: Modem>(&mut self, modem: &mut M) {
        if self.state.certification_mode {
            // The certification harness owns the radio; do not stack
            // application uplinks on top of it.
            check("clear_alarm_timer", modem.clear_alarm_timer());
            return;
        }
        if !self.state.joined {
            return;
        }
        match self.config.policy {
            ClassPolicy::PeriodicUplink { .. } => {
                self.send_counter_uplink(modem);
                check("set_alarm_timer", self.scheduler.rearm_alarm(modem));
            }
            ClassPolicy::Fuota => {
                check(
                    "request_empty_tx",
                    self.scheduler
                        .send_empty(modem, self.config.uplink_port, false),
                );
                check("set_alarm_timer", self.scheduler.rearm_alarm(modem));
            }
            _ => {}
        }
    }

    fn on_tx_done(&mut self, event: &Event) {
        match event.tx_done_status() {
            TxDoneStatus::NotSent => {
                info!("tx done: not sent");
                // Roll back the speculative increment of the uplink that
                // never left the modem.
                self.state.uplink_counter = self.state.uplink_counter.saturating_sub(1);
            }
            TxDoneStatus::Confirmed => {
                info!("tx done: confirmed, acked");
                self.state.confirmed_counter = self.state.confirmed_counter.wrapping_add(1);
            }
            TxDoneStatus::Unconfirmed => info!("tx done: unconfirmed"),
            TxDoneStatus::Unknown(raw) => warn!("tx done: unknown status {:#04x}", raw),
        }

        if self.state.class_b_armed && !self.state.class_b_ready {
            // The switch uplink flushed; ping slots are live from here.
            self.state.class_b_ready = true;
            info!("class B downlinks can now be received");
        }
        if self.state.multicast_unicast_ready && !self.state.multicast_started {
            info!("unicast session set up; user action starts the multicast sessions");
        }
    }

    fn on_downlink_data<M: Modem>(&mut self, modem: &mut M) {
        // Size first: the modem clears its pending-downlink state as the
        // payload and metadata are consumed.
        let Some((size, remaining)) =
            check("get_downlink_data_size", modem.get_downlink_data_size())
        else {
            return;
        };
        let size = usize::from(size).min(MAX_APP_PAYLOAD);
        let mut payload = [0u8; MAX_APP_PAYLOAD];
        if check(
            "get_downlink_data",
            modem.get_downlink_data(&mut payload[..size]),
        )
        .is_none()
        {
            return;
        }
        let Some(metadata) = check("get_downlink_metadata", modem.get_downlink_metadata()) else {
            return;
        };
        info!(
            "downlink on {} window, port {}, {} bytes ({} more pending): {:02x?}",
            metadata.window,
            metadata.port,
            size,
            remaining,
            &payload[..size]
        );
    }

    fn on_class_b_status<M: Modem>(&mut self, modem: &mut M, event: &Event) {
        if !event.beacon_acquired() {
            info!("event: class B status, no beacon");
            return;
        }
        info!("event: class B status, beacon acquired");

        self.multicast.beacon_acquired();

        match self.config.policy {
            ClassPolicy::ClassBOnDemand => {
                if self.state.class_b_armed && !self.state.class_b_ready {
                    info!("enabling the class B session on the network server");
                    let outcome = check(
                        "request_empty_tx",
                        self.scheduler.send_empty(modem, ENABLING_UPLINK_PORT, false),
                    );
                    if sent(outcome) {
                        self.state.class_b_ready = true;
                    }
                }
            }
            ClassPolicy::Multicast {
                class: MulticastClass::B,
            } => {
                if !self.state.multicast_unicast_ready {
                    self.state.multicast_unicast_ready = true;
                    // Enable the unicast Class B session on the network
                    // server with one uplink.
                    let payload = [0u8; 8];
                    check(
                        "request_tx",
                        self.scheduler
                            .send(modem, ENABLING_UPLINK_PORT, &payload, false),
                    );
                }
            }
            _ => {}
        }
    }

    fn toggle_certification<M: Modem>(&mut self, modem: &mut M) {
        let enable = !self.state.certification_mode;
        if check(
            "set_certification_mode",
            modem.set_certification_mode(enable),
        )
        .is_none()
        {
            return;
        }
        self.state.certification_mode = enable;
        info!(
            "certification mode {}",
            if enable { "enabled" } else { "disabled" }
        );

        // A mode change invalidates the running session on the network
        // side; force a fresh join.
        check("leave_network", modem.leave_network());
        self.state.joined = false;
        self.state.phase = Phase::Uninitialized;
        if check("join", modem.join()).is_some() {
            self.state.phase = Phase::Joining;
            info!("joining");
        }
    }

    fn toggle_class_b<M: Modem>(&mut self, modem: &mut M) {
        if !self.state.joined {
            info!("not joined; class toggle ignored");
            return;
        }
        if !self.state.class_b_armed {
            check(
                "set_class_b_ping_slot_periodicity",
                modem.set_class_b_ping_slot_periodicity(self.config.ping_slot),
            );
            if check("set_class", modem.set_class(DeviceClass::B)).is_some() {
                self.state.device_class = DeviceClass::B;
                self.state.class_b_armed = true;
                info!("switched to class B, waiting for beacon");
            }
        } else if check("set_class", modem.set_class(DeviceClass::A)).is_some() {
            self.state.device_class = DeviceClass::A;
            self.state.class_b_armed = false;
            self.state.class_b_ready = false;
            info!("reverted to class A");
        }
    }

    fn toggle_multicast<M: Modem>(&mut self, modem: &mut M, class: MulticastClass) {
        if !self.state.joined || !self.state.multicast_unicast_ready {
            info!("unicast session not ready; multicast toggle ignored");
            self.state.multicast_started = false;
            return;
        }

        if self.state.multicast_started {
            // Aggregate stop: the flag clears even if the modem rejects
            // the command (documented divergence from per-group tracking).
            check(
                "stop_all_multicast",
                self.multicast.stop_all(modem, class),
            );
            self.state.multicast_started = false;
            info!("stopped all multicast sessions");
        } else {
            let params = match self.multicast_params(class) {
                Some(params) => params,
                None => {
                    error!(
                        "class B multicast is not specified for region {}",
                        self.config.region.name()
                    );
                    return;
                }
            };
            if check(
                "start_multicast",
                self.multicast
                    .start_all(modem, &self.config.groups, class, params),
            )
            .is_some()
            {
                self.state.multicast_started = true;
            }
        }
    }

    fn multicast_params(&self, class: MulticastClass) -> Option<MulticastParams> {
        match class {
            MulticastClass::B => self.config.region.default_multicast_class_b(),
            MulticastClass::C => Some(self.config.region.default_multicast_class_c()),
        }
    }

    fn send_counter_uplink<M: Modem>(&mut self, modem: &mut M) {
        let mut payload = [0u8; 8];
        payload[..4].copy_from_slice(&self.state.uplink_counter.to_be_bytes());
        payload[4..].copy_from_slice(&self.state.confirmed_counter.to_be_bytes());
        let outcome = check(
            "request_tx",
            self.scheduler
                .send(modem, self.config.uplink_port, &payload, true),
        );
        if sent(outcome) {
            // Speculative; rolled back if the modem reports not-sent.
            self.state.uplink_counter = self.state.uplink_counter.wrapping_add(1);
        }
    }
}

/// Log a command failure at the severity its error code calls for and
/// convert the result to an `Option`. This is the single place command
/// errors are graded; nothing retries them.
fn check<T>(op: &'static str, result: Result<T, ModemError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err @ ModemError::NoTimeAvailable) => {
            warn!("{}: {}", op, err);
            None
        }
        Err(err) => {
            error!("{}: {}", op, err);
            None
        }
    }
}

fn sent(outcome: Option<SendOutcome>) -> bool {
    matches!(
        outcome,
        Some(SendOutcome::Sent) | Some(SendOutcome::FlushedEmpty { .. })
    )
}
