//! Timed auto-clear for sensors that only report activations.
//!
//! Hubs speaking the legacy header format never send a "clear" report; a
//! sensor is considered occupied for a fixed hold time after its last
//! activation. [`HoldTimer`] tracks those deadlines outside the dispatcher
//! and produces synthetic clear events once they pass. The caller feeds the
//! events back through [`HubContext::dispatch`](crate::HubContext::dispatch),
//! so observers see the clear like any other transition.
//!
//! ```
//! use std::time::{Duration, Instant};
//! use sensorhub_core::DeviceId;
//! use sensorhub_hub::HoldTimer;
//!
//! let mut hold = HoldTimer::new(Duration::from_millis(5000));
//! let start = Instant::now();
//!
//! hold.arm(DeviceId::new(1), start);
//! assert!(hold.expired(start + Duration::from_millis(4999)).is_empty());
//!
//! let cleared = hold.expired(start + Duration::from_millis(5000));
//! assert_eq!(cleared.len(), 1);
//! assert!(!cleared[0].occupied);
//! ```

use sensorhub_core::DeviceId;
use sensorhub_core::constants::DEFAULT_HOLD_MS;
use sensorhub_protocol::OccupancyEvent;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::dispatcher::DispatchOutcome;

/// Per-device deadlines after which a sensor reverts to unoccupied.
#[derive(Debug, Clone)]
pub struct HoldTimer {
    hold: Duration,
    deadlines: HashMap<DeviceId, Instant>,
}

impl HoldTimer {
    /// Create a timer that clears sensors `hold` after their last activation.
    pub fn new(hold: Duration) -> Self {
        Self {
            hold,
            deadlines: HashMap::new(),
        }
    }

    /// Configured hold time.
    pub fn hold(&self) -> Duration {
        self.hold
    }

    /// Start or extend the hold for `id`, counting from `now`.
    pub fn arm(&mut self, id: DeviceId, now: Instant) {
        self.deadlines.insert(id, now + self.hold);
    }

    /// Cancel the hold for `id`. Returns `true` if one was pending.
    pub fn disarm(&mut self, id: DeviceId) -> bool {
        self.deadlines.remove(&id).is_some()
    }

    /// Update the timer from the result of a dispatch.
    ///
    /// Occupied reports for known sensors arm (or re-arm) the hold, clear
    /// reports cancel it. Unknown devices are ignored.
    pub fn observe(&mut self, outcome: &DispatchOutcome, now: Instant) {
        match outcome.occupied() {
            Some(true) => self.arm(outcome.device_id(), now),
            Some(false) => {
                self.disarm(outcome.device_id());
            }
            None => {}
        }
    }

    /// Remove and return clear events for every hold that ended by `now`.
    ///
    /// Events are ordered by deadline, then by identifier.
    pub fn expired(&mut self, now: Instant) -> Vec<OccupancyEvent> {
        let mut due: Vec<(Instant, DeviceId)> = self
            .deadlines
            .iter()
            .filter(|&(_, &deadline)| deadline <= now)
            .map(|(&id, &deadline)| (deadline, id))
            .collect();
        due.sort_unstable();

        due.into_iter()
            .map(|(_, id)| {
                self.deadlines.remove(&id);
                debug!("Hold expired for {}", id);
                OccupancyEvent::new(id, false)
            })
            .collect()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    /// Number of sensors currently held.
    pub fn pending(&self) -> usize {
        self.deadlines.len()
    }
}

impl Default for HoldTimer {
    /// Five second hold, as used by hubs that only report activations.
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_HOLD_MS))
    }
}
