//! Event dispatcher and interrupt trigger flags
//!
//! Two external interrupt signals reach the session core: "modem events
//! pending" and "user action". The interrupt context only raises a flag in
//! [`Triggers`]; all handling happens on the cooperative main loop, which
//! reads and clears the flags inside a critical section and then runs the
//! (potentially slow) handlers with interrupts live. That keeps
//! [`SessionState`](crate::session::SessionState) mutation out of
//! interrupt context entirely.
//!
//! The [`EventDispatcher`] drains the modem event queue until the
//! end-of-queue sentinel. The queue is polled, not snapshotted: events
//! arriving while a drain is in progress are picked up by the same drain.

use core::cell::Cell;

use critical_section::Mutex;
use log::error;

use crate::modem::Modem;
use crate::session::Session;

/// Flags raised by interrupt handlers, consumed by the main loop
pub struct Triggers {
    event_pending: Mutex<Cell<bool>>,
    user_action: Mutex<Cell<bool>>,
}

/// One atomic read-and-clear of both trigger flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerSnapshot {
    /// The modem raised its event line since the last pass
    pub event_pending: bool,
    /// The debounced user action fired since the last pass
    pub user_action: bool,
}

impl TriggerSnapshot {
    /// Anything to do this pass?
    pub fn any(&self) -> bool {
        self.event_pending || self.user_action
    }
}

impl Triggers {
    /// Create both flags cleared
    pub const fn new() -> Self {
        Self {
            event_pending: Mutex::new(Cell::new(false)),
            user_action: Mutex::new(Cell::new(false)),
        }
    }

    /// Raise the modem-event-pending flag. Safe to call from interrupt
    /// context.
    pub fn raise_event_pending(&self) {
        critical_section::with(|cs| self.event_pending.borrow(cs).set(true));
    }

    /// Raise the user-action flag. Safe to call from interrupt context.
    /// Debouncing happens upstream: repeated edges inside the debounce
    /// window collapse into the single flag this sets.
    pub fn raise_user_action(&self) {
        critical_section::with(|cs| self.user_action.borrow(cs).set(true));
    }

    /// Read and clear both flags in one critical section. Only the
    /// check-and-clear is masked; handling runs outside.
    pub fn take(&self) -> TriggerSnapshot {
        critical_section::with(|cs| TriggerSnapshot {
            event_pending: self.event_pending.borrow(cs).replace(false),
            user_action: self.user_action.borrow(cs).replace(false),
        })
    }
}

impl Default for Triggers {
    fn default() -> Self {
        Self::new()
    }
}

/// Modem event queue dispatcher
///
/// Non-reentrant: a drain invoked while another is in progress is
/// coalesced into the running one instead of executing concurrently,
/// because session mutation is not safe under reentry.
pub struct EventDispatcher {
    draining: bool,
    deferred: bool,
}

impl EventDispatcher {
    /// Create an idle dispatcher
    pub const fn new() -> Self {
        Self {
            draining: false,
            deferred: false,
        }
    }

    /// Drain the modem event queue, feeding each event to the session
    /// machine until the queue reports empty. Returns the number of events
    /// processed.
    ///
    /// A command-layer error aborts the drain (logged, not retried); the
    /// next trigger resumes from whatever is still queued.
    pub fn drain<M: Modem>(&mut self, modem: &mut M, session: &mut Session) -> usize {
        if self.draining {
            self.deferred = true;
            return 0;
        }
        self.draining = true;

        let mut processed = 0;
        loop {
            match modem.get_event() {
                Ok(Some(event)) => {
                    session.on_event(modem, event);
                    processed += 1;
                }
                Ok(None) => {
                    if self.deferred {
                        // A coalesced invocation arrived mid-drain; poll
                        // once more before going idle.
                        self.deferred = false;
                        continue;
                    }
                    break;
                }
                Err(err) => {
                    error!("get_event: {}", err);
                    break;
                }
            }
        }

        self.draining = false;
        processed
    }

    /// One main-loop pass: take the trigger flags and handle them until
    /// both stay clear. Returns the number of events processed.
    pub fn service<M: Modem>(
        &mut self,
        triggers: &Triggers,
        modem: &mut M,
        session: &mut Session,
    ) -> usize {
        let mut processed = 0;
        loop {
            let snapshot = triggers.take();
            if !snapshot.any() {
                break;
            }
            if snapshot.user_action {
                session.on_user_action(modem);
            }
            if snapshot.event_pending {
                processed += self.drain(modem, session);
            }
        }
        processed
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
