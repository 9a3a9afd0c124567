//! Access-control state machine and polling loop.
//!
//! The controller polls the reader once per cycle and drives everything
//! else from each successfully read identifier: debounce filtering,
//! master/reset classification, single-shot enrollment, store lookups and
//! relay actuation.
//!
//! # Modes
//!
//! The controller is in one of two modes between reads:
//!
//! - **Scanning** (the default): a known card energizes the relay for the
//!   grant duration; an unknown card is denied with no actuation.
//! - **Enrollment armed**: entered by the master card and acknowledged
//!   with a distinct pulse pattern. Exactly one following non-special read
//!   is consumed by enrollment — successful or not — before the controller
//!   drops back to scanning. The operator must re-present the master card
//!   for every card added, which bounds the window during which an
//!   arbitrary card can be enrolled.
//!
//! The reset card is handled in either mode: it wipes the store and makes
//! [`Controller::run`] return so the host can restart the controller.
//!
//! # Debounce
//!
//! A physically presented card is read many times per second. Reads within
//! the debounce window of the last accepted read are discarded — this also
//! keeps the grant pulse itself from re-triggering on the same card.

use crate::config::ControllerConfig;
use latchkey_core::CardUid;
use latchkey_hardware::{CardReader, HardwareError, Nvram, Relay};
use latchkey_store::{CardStore, StoreError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Classification of a decoded identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardClass {
    /// The master card; arms enrollment, never stored.
    Master,

    /// The reset card; wipes the store, never stored.
    Reset,

    /// Any other card; checked against or added to the store.
    Normal,
}

/// Why an enrollment attempt was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollRefusal {
    /// The card is already stored.
    AlreadyStored,

    /// The store is at capacity.
    StoreFull,
}

/// What one polling cycle did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanOutcome {
    /// No card in the reader field.
    NoCard,

    /// A read arrived inside the debounce window and was discarded.
    Debounced,

    /// The raw read could not be encoded canonically (overlong) and was
    /// ignored.
    RejectedRead,

    /// Master card accepted; enrollment armed and acknowledged.
    EnrollmentArmed,

    /// Reset card accepted; the store has been wiped and a restart is due.
    ResetRequested,

    /// A card was added to the store through enrollment.
    Enrolled(CardUid),

    /// Enrollment consumed a read but the insert was refused.
    EnrollmentRefused {
        uid: CardUid,
        reason: EnrollRefusal,
    },

    /// Known card; the relay was driven for the grant duration.
    Granted(CardUid),

    /// Unknown card; no actuation.
    Denied(CardUid),
}

impl fmt::Display for ScanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanOutcome::NoCard => write!(f, "no card"),
            ScanOutcome::Debounced => write!(f, "debounced"),
            ScanOutcome::RejectedRead => write!(f, "rejected read"),
            ScanOutcome::EnrollmentArmed => write!(f, "enrollment armed"),
            ScanOutcome::ResetRequested => write!(f, "reset requested"),
            ScanOutcome::Enrolled(uid) => write!(f, "enrolled {uid}"),
            ScanOutcome::EnrollmentRefused { uid, .. } => {
                write!(f, "enrollment refused for {uid}")
            }
            ScanOutcome::Granted(uid) => write!(f, "granted {uid}"),
            ScanOutcome::Denied(uid) => write!(f, "denied {uid}"),
        }
    }
}

/// Why [`Controller::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerExit {
    /// The reset card was presented; the host must restart the controller.
    RestartRequested,
}

/// Errors escaping the control loop.
///
/// Everything recoverable (duplicate enrollment, full store, corrupt
/// header) is handled inside the loop; what escapes is hardware faults and
/// unrecoverable store failures.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Hardware(#[from] HardwareError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for controller operations.
pub type ControllerResult<T> = std::result::Result<T, ControllerError>;

/// The access-control state machine.
///
/// Owns the reader, the relay, the card store and all transient state; the
/// whole context is constructed at boot and dropped (or rebuilt) on
/// restart, so nothing controller-side survives a reset.
pub struct Controller<R: CardReader, L: Relay, M: Nvram> {
    reader: R,
    relay: L,
    store: CardStore<M>,
    config: ControllerConfig,
    enrollment_armed: bool,
    last_accepted: Option<Instant>,
}

impl<R: CardReader, L: Relay, M: Nvram> Controller<R, L, M> {
    /// Create a controller in scanning mode.
    ///
    /// The store is taken as already loaded and seeded; boot-time
    /// sequencing belongs to the host.
    pub fn new(reader: R, relay: L, store: CardStore<M>, config: ControllerConfig) -> Self {
        Self {
            reader,
            relay,
            store,
            config,
            enrollment_armed: false,
            last_accepted: None,
        }
    }

    /// Whether the next non-special read will be consumed by enrollment.
    pub fn enrollment_armed(&self) -> bool {
        self.enrollment_armed
    }

    /// Shared access to the card store.
    pub fn store(&self) -> &CardStore<M> {
        &self.store
    }

    /// Consume the controller and give the store back, for host-driven
    /// restarts that keep the backing memory alive.
    pub fn into_store(self) -> CardStore<M> {
        self.store
    }

    /// Classify a decoded identifier.
    ///
    /// Master and reset are compile-time identities, never stored and never
    /// checked against the store.
    pub fn classify(&self, uid: &CardUid) -> CardClass {
        if *uid == self.config.master_uid {
            CardClass::Master
        } else if *uid == self.config.reset_uid {
            CardClass::Reset
        } else {
            CardClass::Normal
        }
    }

    /// Run the control loop until a restart is requested.
    ///
    /// # Errors
    ///
    /// Returns the first hardware or unrecoverable store error; recoverable
    /// outcomes never end the loop.
    pub async fn run(&mut self) -> ControllerResult<ControllerExit> {
        info!(
            cards = self.store.count(),
            "controller running, scanning for cards"
        );
        loop {
            if let ScanOutcome::ResetRequested = self.step().await? {
                return Ok(ControllerExit::RestartRequested);
            }
            sleep(self.config.poll_interval).await;
        }
    }

    /// Execute one polling cycle.
    ///
    /// # Errors
    ///
    /// Returns hardware faults from the reader, relay or backing memory;
    /// duplicate/capacity enrollment refusals are reported through the
    /// outcome instead.
    pub async fn step(&mut self) -> ControllerResult<ScanOutcome> {
        let Some(read) = self.reader.try_read_uid().await? else {
            return Ok(ScanOutcome::NoCard);
        };

        if self.in_debounce_window() {
            debug!(raw = %read.uid_hex(), "read inside debounce window, discarded");
            return Ok(ScanOutcome::Debounced);
        }

        let uid = match CardUid::from_raw(&read.uid) {
            Ok(uid) => uid,
            Err(err) => {
                warn!(raw = %read.uid_hex(), %err, "rejecting unusable card read");
                return Ok(ScanOutcome::RejectedRead);
            }
        };
        info!(%uid, "card read");

        match self.classify(&uid) {
            CardClass::Master => {
                self.enrollment_armed = true;
                info!("master card accepted, enrollment armed");
                self.pulse_master_ack().await?;
                self.mark_accepted();
                Ok(ScanOutcome::EnrollmentArmed)
            }
            CardClass::Reset => {
                warn!("reset card accepted, wiping card store");
                self.store.reset()?;
                Ok(ScanOutcome::ResetRequested)
            }
            CardClass::Normal if self.enrollment_armed => {
                // Single-shot: this read consumes enrollment whatever the
                // insert outcome.
                self.enrollment_armed = false;
                let outcome = match self.store.insert(&uid) {
                    Ok(()) => {
                        info!(%uid, cards = self.store.count(), "card enrolled");
                        ScanOutcome::Enrolled(uid)
                    }
                    Err(StoreError::DuplicateCard(_)) => {
                        warn!(%uid, "enrollment refused, card already stored");
                        ScanOutcome::EnrollmentRefused {
                            uid,
                            reason: EnrollRefusal::AlreadyStored,
                        }
                    }
                    Err(StoreError::StoreFull { capacity }) => {
                        warn!(%uid, capacity, "enrollment refused, card store full");
                        ScanOutcome::EnrollmentRefused {
                            uid,
                            reason: EnrollRefusal::StoreFull,
                        }
                    }
                    Err(e) => return Err(e.into()),
                };
                self.mark_accepted();
                Ok(outcome)
            }
            CardClass::Normal => {
                let outcome = if self.store.contains(&uid)? {
                    info!(%uid, "access granted");
                    self.hold_relay().await?;
                    ScanOutcome::Granted(uid)
                } else {
                    info!(%uid, "access denied");
                    ScanOutcome::Denied(uid)
                };
                self.mark_accepted();
                Ok(outcome)
            }
        }
    }

    /// Energize the relay for the grant duration, then release it.
    ///
    /// Deliberately blocking within the single control task: once a grant
    /// starts it runs to completion, and no other read is processed.
    async fn hold_relay(&mut self) -> ControllerResult<()> {
        self.relay.set_energized(true).await?;
        sleep(self.config.grant_duration).await;
        self.relay.set_energized(false).await?;
        Ok(())
    }

    /// Emit the operator-feedback pulse pattern for the master card.
    async fn pulse_master_ack(&mut self) -> ControllerResult<()> {
        for pulse in 0..self.config.master_pulse_count {
            self.relay.set_energized(true).await?;
            sleep(self.config.master_pulse_on).await;
            self.relay.set_energized(false).await?;
            if pulse + 1 < self.config.master_pulse_count {
                sleep(self.config.master_pulse_off).await;
            }
        }
        Ok(())
    }

    fn in_debounce_window(&self) -> bool {
        self.last_accepted
            .is_some_and(|at| at.elapsed() < self.config.debounce_window)
    }

    fn mark_accepted(&mut self) {
        self.last_accepted = Some(Instant::now());
    }
}
