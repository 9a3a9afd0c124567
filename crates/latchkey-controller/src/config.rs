//! Controller configuration.

use latchkey_core::{
    CardUid,
    constants::{
        DEBOUNCE_WINDOW_MS, DEFAULT_POLL_INTERVAL_MS, GRANT_DURATION_MS, MASTER_PULSE_COUNT,
        MASTER_PULSE_OFF_MS, MASTER_PULSE_ON_MS, MASTER_UID, RESET_UID,
    },
};
use std::time::Duration;

/// Explicit controller context constructed once at startup.
///
/// Replaces what would otherwise be process-wide mutable configuration: the
/// special card identities and every timing knob of the control loop live
/// here and are owned by the [`Controller`](crate::Controller).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Master card: arms single-shot enrollment.
    pub master_uid: CardUid,

    /// Reset card: wipes the store and requests a restart.
    pub reset_uid: CardUid,

    /// Minimum time between two reads treated as distinct events.
    pub debounce_window: Duration,

    /// How long the relay stays energized on a successful authorization.
    pub grant_duration: Duration,

    /// Number of short relay pulses acknowledging the master card.
    pub master_pulse_count: u32,

    /// Energized phase of one acknowledge pulse.
    pub master_pulse_on: Duration,

    /// Gap between acknowledge pulses.
    pub master_pulse_off: Duration,

    /// Reader polling interval of [`Controller::run`](crate::Controller::run).
    pub poll_interval: Duration,
}

impl ControllerConfig {
    /// Build the default configuration from the workspace constants.
    ///
    /// # Errors
    ///
    /// Returns a codec error if a special-card constant is not a canonical
    /// identifier.
    pub fn new() -> latchkey_core::Result<Self> {
        Ok(Self {
            master_uid: CardUid::parse(MASTER_UID)?,
            reset_uid: CardUid::parse(RESET_UID)?,
            debounce_window: Duration::from_millis(DEBOUNCE_WINDOW_MS),
            grant_duration: Duration::from_millis(GRANT_DURATION_MS),
            master_pulse_count: MASTER_PULSE_COUNT,
            master_pulse_on: Duration::from_millis(MASTER_PULSE_ON_MS),
            master_pulse_off: Duration::from_millis(MASTER_PULSE_OFF_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        })
    }

    /// Set the debounce window.
    #[must_use]
    pub fn with_debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    /// Set the grant duration.
    #[must_use]
    pub fn with_grant_duration(mut self, duration: Duration) -> Self {
        self.grant_duration = duration;
        self
    }

    /// Set the master-acknowledge pulse pattern.
    #[must_use]
    pub fn with_master_pulse(mut self, count: u32, on: Duration, off: Duration) -> Self {
        self.master_pulse_count = count;
        self.master_pulse_on = on;
        self.master_pulse_off = off;
        self
    }

    /// Set the reader polling interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}
