//! Payload decoding for validated frames.
//!
//! [`FrameDecoder`] maps the payload of a frame that already passed
//! checksum validation to an [`OccupancyEvent`]:
//!
//! ```text
//! offset  0        1        2
//!        [ID hi ] [ID lo ] [STATE]   STATE: 0x00 clear, 0x01 occupied
//! ```
//!
//! Decoding is a pure function of the payload. The decoder holds no state
//! and has no side effects, so the same frame always decodes to the same
//! result.

use sensorhub_core::DeviceId;
use sensorhub_core::constants::{
    DEVICE_ID_LEN, DEVICE_ID_OFFSET, OCCUPANCY_PAYLOAD_LEN, STATE_CLEAR, STATE_OCCUPIED,
    STATE_OFFSET,
};
use std::fmt;
use thiserror::Error;

use crate::event::OccupancyEvent;
use crate::frame::Frame;

/// What made a payload unrecognisable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatViolation {
    /// Payload is not exactly one occupancy report long.
    PayloadLength { expected: usize, actual: usize },

    /// State byte is neither clear nor occupied.
    StateByte(u8),
}

impl fmt::Display for FormatViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PayloadLength { expected, actual } => {
                write!(f, "payload is {actual} bytes, expected {expected}")
            }
            Self::StateByte(value) => write!(f, "state byte 0x{value:02X} is not 0x00 or 0x01"),
        }
    }
}

/// Errors returned by [`FrameDecoder::decode`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Payload does not match the occupancy report schema.
    #[error("Unknown payload format: {0}")]
    UnknownFormat(FormatViolation),
}

impl From<DecodeError> for sensorhub_core::Error {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::UnknownFormat(violation) => sensorhub_core::Error::UnknownFormat {
                message: violation.to_string(),
            },
        }
    }
}

/// Stateless decoder from frames to occupancy events.
///
/// # Example
///
/// ```
/// use sensorhub_protocol::{Frame, FrameDecoder};
///
/// let frame = Frame::new(vec![0x00, 0x01, 0x01]).unwrap();
/// let event = FrameDecoder::new().decode(&frame).unwrap();
///
/// assert_eq!(event.device_id.as_u16(), 1);
/// assert!(event.occupied);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameDecoder;

impl FrameDecoder {
    /// Create a decoder.
    pub const fn new() -> Self {
        FrameDecoder
    }

    /// Decode the occupancy report carried by `frame`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnknownFormat`] if the payload length is not
    /// three bytes or the state byte is not `0x00`/`0x01`.
    pub fn decode(&self, frame: &Frame) -> Result<OccupancyEvent, DecodeError> {
        let payload = frame.payload();

        if payload.len() != OCCUPANCY_PAYLOAD_LEN {
            return Err(DecodeError::UnknownFormat(FormatViolation::PayloadLength {
                expected: OCCUPANCY_PAYLOAD_LEN,
                actual: payload.len(),
            }));
        }

        let id_bytes = &payload[DEVICE_ID_OFFSET..DEVICE_ID_OFFSET + DEVICE_ID_LEN];
        let device_id = DeviceId::from_be_bytes([id_bytes[0], id_bytes[1]]);

        let occupied = match payload[STATE_OFFSET] {
            STATE_CLEAR => false,
            STATE_OCCUPIED => true,
            other => return Err(DecodeError::UnknownFormat(FormatViolation::StateByte(other))),
        };

        Ok(OccupancyEvent::new(device_id, occupied))
    }
}
