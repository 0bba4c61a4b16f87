//! Reader for the legacy activation-header format.
//!
//! Older hub firmware announces activity with a bare five byte header:
//!
//! ```text
//! [0xEB][0xAF][0x05][DEVICE_ID hi][DEVICE_ID lo]
//! ```
//!
//! There is no length, checksum or state byte. Every complete header means
//! the device was activated. [`HeaderReader`] turns each one into a regular
//! occupancy [`Frame`] so the rest of the pipeline does not need to know
//! which format the hub speaks.

use sensorhub_core::DeviceId;
use sensorhub_core::constants::{LEGACY_FRAME_LEN, LEGACY_HEADER};

use crate::event::OccupancyEvent;
use crate::frame::Frame;
use crate::reader::{FrameFault, ReadOutcome, ReaderStats};

/// Stateful reader for legacy activation headers.
///
/// # Example
///
/// ```
/// use sensorhub_protocol::{FrameDecoder, HeaderReader};
///
/// let mut reader = HeaderReader::new();
/// let frame = [0x00, 0xEB, 0xAF, 0x05, 0x12, 0x34]
///     .into_iter()
///     .find_map(|b| reader.feed(b))
///     .unwrap();
///
/// let event = FrameDecoder::new().decode(&frame).unwrap();
/// assert_eq!(event.device_id.as_u16(), 0x1234);
/// assert!(event.occupied);
/// ```
#[derive(Debug, Default)]
pub struct HeaderReader {
    /// Bytes of the current candidate collected so far.
    buffer: [u8; LEGACY_FRAME_LEN],

    /// Number of valid bytes in `buffer`.
    matched: usize,

    stats: ReaderStats,
}

impl HeaderReader {
    /// Create a new header reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte, returning a frame if it completed a header.
    pub fn feed(&mut self, byte: u8) -> Option<Frame> {
        self.push(byte).into_frame()
    }

    /// Feed one byte and report what it did to the candidate header.
    ///
    /// A byte that breaks the header drops the candidate and is then
    /// re-examined as the possible start of a new header.
    pub fn push(&mut self, byte: u8) -> ReadOutcome {
        if self.matched < LEGACY_HEADER.len() {
            if byte == LEGACY_HEADER[self.matched] {
                self.buffer[self.matched] = byte;
                self.matched += 1;
                return ReadOutcome::Pending;
            }

            if self.matched == 0 {
                self.stats.bytes_skipped += 1;
                return ReadOutcome::Pending;
            }

            let fault = FrameFault::InvalidHeader {
                position: self.matched,
                found: byte,
            };
            self.stats.invalid_headers += 1;
            self.matched = 0;
            if byte == LEGACY_HEADER[0] {
                self.buffer[0] = byte;
                self.matched = 1;
            }
            return ReadOutcome::Dropped(fault);
        }

        self.buffer[self.matched] = byte;
        self.matched += 1;

        if self.matched < LEGACY_FRAME_LEN {
            return ReadOutcome::Pending;
        }

        self.matched = 0;
        self.stats.frames_emitted += 1;
        let id = DeviceId::from_be_bytes([self.buffer[3], self.buffer[4]]);
        ReadOutcome::Frame(Frame::from(OccupancyEvent::new(id, true)))
    }

    /// Returns `true` when no header is partially matched.
    pub fn is_idle(&self) -> bool {
        self.matched == 0
    }

    /// Counters accumulated since creation.
    pub fn stats(&self) -> ReaderStats {
        self.stats
    }

    /// Discard any partially matched header. Statistics are kept.
    pub fn clear(&mut self) {
        self.matched = 0;
    }
}
