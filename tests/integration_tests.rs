use lorawan_session::config::device::{
    ClassPolicy, Credentials, DeviceClass, DeviceConfig, MulticastGroupConfig,
    PingSlotPeriodicity,
};
use lorawan_session::dispatch::{EventDispatcher, Triggers};
use lorawan_session::modem::{Event, EventKind, ModemError};
use lorawan_session::multicast::{GroupStatus, MulticastClass};
use lorawan_session::region::Region;
use lorawan_session::session::Session;

use mock::{Command, MockModem};

fn multicast_config(class: MulticastClass) -> DeviceConfig {
    let mut config = DeviceConfig::new(
        Region::Eu868,
        Credentials::new([0x01; 8], [0x02; 8], [0x03; 16], [0x04; 16]),
        ClassPolicy::Multicast { class },
    );
    config
        .groups
        .push(MulticastGroupConfig {
            address: [0x01, 0x02, 0x03, 0x04],
            nwk_skey: [0x05; 16],
            app_skey: [0x15; 16],
            ping_slot: PingSlotPeriodicity::Every8s,
        })
        .unwrap();
    config
        .groups
        .push(MulticastGroupConfig {
            address: [0x25, 0x26, 0x27, 0x28],
            nwk_skey: [0x29; 16],
            app_skey: [0x3A; 16],
            ping_slot: PingSlotPeriodicity::Every16s,
        })
        .unwrap();
    config
}

fn join(session: &mut Session, modem: &mut MockModem) {
    session.on_event(modem, Event::new(EventKind::Reset, 0));
    session.on_event(modem, Event::new(EventKind::Joined, 0));
}

#[test]
fn test_drain_processes_every_event_in_order() {
    let mut modem = MockModem::new();
    let mut session = Session::new(DeviceConfig::new(
        Region::Eu868,
        Credentials::new([0x01; 8], [0x02; 8], [0x03; 16], [0x04; 16]),
        ClassPolicy::PeriodicUplink {
            certification_toggle: false,
        },
    ));
    let mut dispatcher = EventDispatcher::new();

    join(&mut session, &mut modem);

    // Three confirmed tx-done events: each must be consumed exactly once.
    for _ in 0..3 {
        modem.queue_event(EventKind::TxDone, 2 << 8);
    }
    let processed = dispatcher.drain(&mut modem, &mut session);

    assert_eq!(processed, 3);
    assert_eq!(session.state().confirmed_counter, 3);
    assert!(modem.events.is_empty());
}

#[test]
fn test_drain_on_empty_queue_terminates() {
    let mut modem = MockModem::new();
    let mut session = Session::new(DeviceConfig::new(
        Region::Eu868,
        Credentials::new([0x01; 8], [0x02; 8], [0x03; 16], [0x04; 16]),
        ClassPolicy::ClassBOnDemand,
    ));
    let mut dispatcher = EventDispatcher::new();

    assert_eq!(dispatcher.drain(&mut modem, &mut session), 0);
}

#[test]
fn test_drain_aborts_on_command_error_and_resumes() {
    let mut modem = MockModem::new();
    let mut session = Session::new(DeviceConfig::new(
        Region::Eu868,
        Credentials::new([0x01; 8], [0x02; 8], [0x03; 16], [0x04; 16]),
        ClassPolicy::ClassBOnDemand,
    ));
    let mut dispatcher = EventDispatcher::new();

    modem.queue_event(EventKind::LinkCheck, 0);
    modem.queue_event(EventKind::MacTime, 0);
    modem.event_error = Some(ModemError::Busy);

    // The error aborts the drain without consuming the queue.
    assert_eq!(dispatcher.drain(&mut modem, &mut session), 0);
    assert_eq!(modem.events.len(), 2);

    // The next trigger picks the events back up.
    assert_eq!(dispatcher.drain(&mut modem, &mut session), 2);
}

#[test]
fn test_triggers_collapse_and_clear() {
    let triggers = Triggers::new();

    // Two edges inside the debounce window raise the same flag once.
    triggers.raise_user_action();
    triggers.raise_user_action();
    triggers.raise_event_pending();

    let snapshot = triggers.take();
    assert!(snapshot.user_action);
    assert!(snapshot.event_pending);

    let snapshot = triggers.take();
    assert!(!snapshot.any());
}

#[test]
fn test_service_runs_handlers_outside_the_flag_window() {
    let mut modem = MockModem::new();
    let mut session = Session::new(DeviceConfig::new(
        Region::Eu868,
        Credentials::new([0x01; 8], [0x02; 8], [0x03; 16], [0x04; 16]),
        ClassPolicy::ClassBOnDemand,
    ));
    let mut dispatcher = EventDispatcher::new();
    let triggers = Triggers::new();

    join(&mut session, &mut modem);
    modem.clear_commands();

    modem.queue_event(EventKind::LinkCheck, 0);
    triggers.raise_event_pending();
    triggers.raise_user_action();

    let processed = dispatcher.service(&triggers, &mut modem, &mut session);

    assert_eq!(processed, 1);
    // The user action armed Class B.
    assert_eq!(
        modem.count(|c| matches!(c, Command::SetClass(DeviceClass::B))),
        1
    );
    // Flags consumed; a second pass is a no-op.
    assert_eq!(dispatcher.service(&triggers, &mut modem, &mut session), 0);
}

#[test]
fn test_multicast_class_c_provisions_before_class_switch() {
    let mut modem = MockModem::new();
    let mut session = Session::new(multicast_config(MulticastClass::C));

    join(&mut session, &mut modem);

    assert_eq!(
        modem.count(|c| matches!(c, Command::SetMulticastGroupConfig { .. })),
        2
    );
    let last_group = modem
        .commands
        .iter()
        .rposition(|c| matches!(c, Command::SetMulticastGroupConfig { .. }))
        .unwrap();
    let class_switch = modem
        .position(|c| matches!(c, Command::SetClass(DeviceClass::C)))
        .expect("class switched to C");
    assert!(
        last_group < class_switch,
        "group keys must be programmed before the class switch"
    );

    // One unconfirmed enabling uplink on the dedicated port.
    assert_eq!(
        modem.count(|c| matches!(
            c,
            Command::RequestTx {
                port: 10,
                confirmed: false,
                payload,
            } if payload.len() == 8
        )),
        1
    );
    assert!(session.state().multicast_unicast_ready);
    assert_eq!(
        modem.count(|c| matches!(c, Command::SetMulticastGroupConfig { address: 0x01020304, .. })),
        1
    );
}

#[test]
fn test_multicast_class_c_start_stop_toggle() {
    let mut modem = MockModem::new();
    let mut session = Session::new(multicast_config(MulticastClass::C));

    join(&mut session, &mut modem);
    modem.clear_commands();

    session.on_user_action(&mut modem);

    // Every group started with the regional Class C defaults.
    assert_eq!(
        modem.count(|c| matches!(
            c,
            Command::StartMulticastClassC {
                frequency: 869_525_000,
                datarate: 0,
                ..
            }
        )),
        2
    );
    assert!(session.state().multicast_started);
    assert_eq!(session.multicast().status(0), GroupStatus::Active);
    assert_eq!(session.multicast().status(1), GroupStatus::Active);

    modem.clear_commands();
    session.on_user_action(&mut modem);

    // One aggregate stop for the whole class family.
    assert_eq!(
        modem.count(|c| matches!(c, Command::StopAllMulticastClassC)),
        1
    );
    assert!(!session.state().multicast_started);
    assert_eq!(session.multicast().status(0), GroupStatus::Stopped);
}

#[test]
fn test_multicast_toggle_before_unicast_ready_is_rejected() {
    let mut modem = MockModem::new();
    let mut session = Session::new(multicast_config(MulticastClass::C));

    session.on_event(&mut modem, Event::new(EventKind::Reset, 0));
    modem.clear_commands();

    session.on_user_action(&mut modem);

    assert_eq!(
        modem.count(|c| matches!(c, Command::StartMulticastClassC { .. })),
        0
    );
    assert!(!session.state().multicast_started);
}

#[test]
fn test_multicast_class_b_waits_for_beacon() {
    let mut modem = MockModem::new();
    let mut session = Session::new(multicast_config(MulticastClass::B));

    join(&mut session, &mut modem);

    // Joined bootstrap: keys, ping slots, then Class B.
    assert_eq!(
        modem.count(|c| matches!(c, Command::SetMulticastGroupConfig { .. })),
        2
    );
    assert_eq!(
        modem.count(|c| matches!(c, Command::SetClass(DeviceClass::B))),
        1
    );
    assert!(!session.state().multicast_unicast_ready);

    // Beacon acquired: enable the unicast session with one uplink.
    session.on_event(&mut modem, Event::new(EventKind::ClassBStatus, 1));
    assert!(session.state().multicast_unicast_ready);
    assert_eq!(
        modem.count(|c| matches!(c, Command::RequestTx { port: 10, .. })),
        1
    );

    modem.clear_commands();
    session.on_user_action(&mut modem);

    // Class B sessions start against the regional defaults with each
    // group's own ping slot periodicity, then wait for beacon lock.
    assert_eq!(
        modem.count(|c| matches!(
            c,
            Command::StartMulticastClassB {
                frequency: 869_525_000,
                datarate: 3,
                ..
            }
        )),
        2
    );
    assert_eq!(
        modem.count(|c| matches!(
            c,
            Command::StartMulticastClassB {
                periodicity: PingSlotPeriodicity::Every16s,
                ..
            }
        )),
        1
    );
    assert!(session.state().multicast_started);
    assert_eq!(session.multicast().status(0), GroupStatus::WaitingBeacon);

    // The next beacon report promotes the sessions to active.
    session.on_event(&mut modem, Event::new(EventKind::ClassBStatus, 1));
    assert_eq!(session.multicast().status(0), GroupStatus::Active);
    assert_eq!(session.multicast().status(1), GroupStatus::Active);
}

#[test]
fn test_new_multicast_session_event_mirrors_status() {
    let mut modem = MockModem::new();
    let mut session = Session::new(multicast_config(MulticastClass::C));

    join(&mut session, &mut modem);

    modem.class_c_status.is_session_started = true;
    modem.class_c_status.frequency = 869_525_000;
    session.on_event(&mut modem, Event::new(EventKind::NewMulticastClassC, 1 << 1));

    assert_eq!(session.multicast().status(1), GroupStatus::Active);
}

#[test]
fn test_multicast_reset_clears_group_state() {
    let mut modem = MockModem::new();
    let mut session = Session::new(multicast_config(MulticastClass::C));

    join(&mut session, &mut modem);
    session.on_user_action(&mut modem);
    assert!(session.state().multicast_started);

    session.on_event(&mut modem, Event::new(EventKind::Reset, 0));

    assert!(!session.state().multicast_started);
    assert_eq!(session.multicast().status(0), GroupStatus::Unprovisioned);
}
