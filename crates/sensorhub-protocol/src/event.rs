use sensorhub_core::constants::{STATE_CLEAR, STATE_OCCUPIED};
use sensorhub_core::{DeviceId, OccupancyState};
use serde::Serialize;
use std::fmt;

use crate::frame::Frame;

/// Occupancy report decoded from one frame
///
/// Transient: produced by the decoder and consumed immediately by the
/// dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct OccupancyEvent {
    /// Sensor that reported.
    pub device_id: DeviceId,

    /// Reported presence.
    pub occupied: bool,
}

impl OccupancyEvent {
    /// Create a new event.
    pub fn new(device_id: DeviceId, occupied: bool) -> Self {
        Self {
            device_id,
            occupied,
        }
    }

    /// Reported state as an [`OccupancyState`].
    pub fn state(&self) -> OccupancyState {
        OccupancyState::from(self.occupied)
    }

    /// Wire payload carrying this event.
    pub fn to_payload(&self) -> [u8; 3] {
        let [hi, lo] = self.device_id.to_be_bytes();
        let state = if self.occupied {
            STATE_OCCUPIED
        } else {
            STATE_CLEAR
        };
        [hi, lo, state]
    }
}

/// Convert an event into the checksummed frame that carries it
impl From<OccupancyEvent> for Frame {
    fn from(event: OccupancyEvent) -> Self {
        let payload = event.to_payload();
        let checksum = crate::frame::checksum(&payload);
        Frame::from_validated(bytes::Bytes::copy_from_slice(&payload), checksum)
    }
}

impl fmt::Display for OccupancyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.device_id, self.state())
    }
}
