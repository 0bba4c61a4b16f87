//! Core constants for the occupancy hub wire protocol.
//!
//! The hub streams fixed-layout binary frames over a UART link. Every frame
//! starts with a marker byte, declares its payload length, and ends with an
//! additive checksum:
//!
//! ```text
//! [START=0xAA][LEN][PAYLOAD ... LEN bytes][CHECKSUM]
//! ```
//!
//! The occupancy payload is three bytes long:
//!
//! ```text
//! [DEVICE_ID hi][DEVICE_ID lo][STATE]
//!  big-endian u16              0 = clear, 1 = occupied
//! ```
//!
//! # Legacy Header Format
//!
//! Older hub firmware emits a five byte activation header with no checksum
//! and no state byte:
//!
//! ```text
//! [0xEB][0xAF][0x05][DEVICE_ID hi][DEVICE_ID lo]
//! ```
//!
//! Each header means "device activated". Devices are cleared again by the
//! hold timer after [`DEFAULT_HOLD_MS`].
//!
//! # Usage
//!
//! ```
//! use sensorhub_core::constants::*;
//!
//! let wire = [START_MARKER, 0x03, 0x00, 0x01, STATE_OCCUPIED, 0x02];
//! assert_eq!(wire[1] as usize, OCCUPANCY_PAYLOAD_LEN);
//! assert_eq!(wire.len(), OCCUPANCY_PAYLOAD_LEN + FRAME_OVERHEAD);
//! ```

// ============================================================================
// Frame Layout
// ============================================================================

/// Start-of-frame marker.
///
/// Bytes seen while waiting for this marker are treated as line noise and
/// skipped. Inside a payload the same value is ordinary data.
pub const START_MARKER: u8 = 0xAA;

/// Bytes of framing around a payload: start marker, length and checksum.
pub const FRAME_OVERHEAD: usize = 3;

/// Largest payload the one-byte length field can describe.
pub const MAX_WIRE_PAYLOAD_LEN: usize = u8::MAX as usize;

/// Default payload limit for the frame reader.
///
/// Frames declaring a longer payload are aborted as soon as the length byte
/// is read, so a corrupted length can never make the reader swallow more
/// than this many bytes before it resyncs.
pub const DEFAULT_MAX_PAYLOAD_LEN: usize = 64;

// ============================================================================
// Occupancy Payload
// ============================================================================

/// Exact payload length of an occupancy report.
pub const OCCUPANCY_PAYLOAD_LEN: usize = 3;

/// Offset of the big-endian device identifier inside the payload.
pub const DEVICE_ID_OFFSET: usize = 0;

/// Width of the device identifier in bytes.
pub const DEVICE_ID_LEN: usize = 2;

/// Offset of the state byte inside the payload.
pub const STATE_OFFSET: usize = 2;

/// State byte: zone clear.
pub const STATE_CLEAR: u8 = 0x00;

/// State byte: zone occupied.
pub const STATE_OCCUPIED: u8 = 0x01;

// ============================================================================
// Legacy Header Format
// ============================================================================

/// Activation header emitted by legacy hub firmware.
///
/// ```
/// use sensorhub_core::constants::{LEGACY_HEADER, LEGACY_FRAME_LEN};
///
/// assert_eq!(LEGACY_HEADER, [0xEB, 0xAF, 0x05]);
/// assert_eq!(LEGACY_FRAME_LEN, 5);
/// ```
pub const LEGACY_HEADER: [u8; 3] = [0xEB, 0xAF, 0x05];

/// Total length of a legacy activation frame: header plus identifier.
pub const LEGACY_FRAME_LEN: usize = LEGACY_HEADER.len() + DEVICE_ID_LEN;

// ============================================================================
// Timing
// ============================================================================

/// Default hold time before an activated device is cleared again (ms).
///
/// Matches the activation window of the legacy hub integration.
pub const DEFAULT_HOLD_MS: u64 = 5000;
