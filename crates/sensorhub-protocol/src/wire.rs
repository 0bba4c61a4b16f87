//! Enum wrapper for frame reader dispatch.
//!
//! The hub speaks one of two framings, chosen at configuration time.
//! [`AnyFrameReader`] gives the ingestion loop a single concrete type for
//! either of them, so it can be stored by value without boxing.
//!
//! ```
//! use sensorhub_protocol::WireFormat;
//!
//! let mut reader = WireFormat::Checksummed.reader(64);
//! let frame = [0xAA, 0x03, 0x00, 0x01, 0x01, 0x02]
//!     .into_iter()
//!     .find_map(|b| reader.feed(b));
//! assert!(frame.is_some());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::frame::Frame;
use crate::header::HeaderReader;
use crate::reader::{FrameReader, ReadOutcome, ReaderStats};

/// Framing spoken by the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// `[0xAA][LEN][PAYLOAD][CHECKSUM]`
    #[default]
    Checksummed,

    /// Legacy `[0xEB 0xAF 0x05][ID hi][ID lo]` activation headers.
    Header,
}

impl WireFormat {
    /// Create a reader for this format.
    ///
    /// `max_payload_len` only applies to the checksummed format; legacy
    /// headers have a fixed size.
    pub fn reader(self, max_payload_len: usize) -> AnyFrameReader {
        match self {
            Self::Checksummed => {
                AnyFrameReader::Checksummed(FrameReader::with_max_payload_len(max_payload_len))
            }
            Self::Header => AnyFrameReader::Header(HeaderReader::new()),
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checksummed => write!(f, "checksummed"),
            Self::Header => write!(f, "header"),
        }
    }
}

/// Enum wrapper over the supported frame readers.
#[derive(Debug)]
pub enum AnyFrameReader {
    /// Reader for checksummed frames.
    Checksummed(FrameReader),

    /// Reader for legacy activation headers.
    Header(HeaderReader),
}

impl AnyFrameReader {
    /// Feed one byte, returning a frame if it completed one.
    pub fn feed(&mut self, byte: u8) -> Option<Frame> {
        self.push(byte).into_frame()
    }

    /// Feed one byte and report what it did to the frame in progress.
    pub fn push(&mut self, byte: u8) -> ReadOutcome {
        match self {
            Self::Checksummed(reader) => reader.push(byte),
            Self::Header(reader) => reader.push(byte),
        }
    }

    /// Returns `true` when no frame is partially assembled.
    pub fn is_idle(&self) -> bool {
        match self {
            Self::Checksummed(reader) => reader.is_idle(),
            Self::Header(reader) => reader.is_idle(),
        }
    }

    /// Counters accumulated since creation.
    pub fn stats(&self) -> ReaderStats {
        match self {
            Self::Checksummed(reader) => reader.stats(),
            Self::Header(reader) => reader.stats(),
        }
    }

    /// Discard any partially assembled frame.
    pub fn clear(&mut self) {
        match self {
            Self::Checksummed(reader) => reader.clear(),
            Self::Header(reader) => reader.clear(),
        }
    }

    /// Format this reader understands.
    pub fn format(&self) -> WireFormat {
        match self {
            Self::Checksummed(_) => WireFormat::Checksummed,
            Self::Header(_) => WireFormat::Header,
        }
    }
}

impl Default for AnyFrameReader {
    fn default() -> Self {
        Self::Checksummed(FrameReader::new())
    }
}

impl From<FrameReader> for AnyFrameReader {
    fn from(reader: FrameReader) -> Self {
        Self::Checksummed(reader)
    }
}

impl From<HeaderReader> for AnyFrameReader {
    fn from(reader: HeaderReader) -> Self {
        Self::Header(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_selects_reader() {
        assert_eq!(
            WireFormat::Checksummed.reader(64).format(),
            WireFormat::Checksummed
        );
        assert_eq!(WireFormat::Header.reader(64).format(), WireFormat::Header);
        assert_eq!(AnyFrameReader::default().format(), WireFormat::Checksummed);
    }

    #[test]
    fn test_header_reader_through_wrapper() {
        let mut reader = WireFormat::Header.reader(64);

        let frames: Vec<_> = [0xEB, 0xAF, 0x05, 0x00, 0x09]
            .into_iter()
            .filter_map(|b| reader.feed(b))
            .collect();

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload(), &[0x00, 0x09, 0x01]);
        assert!(reader.is_idle());
        assert_eq!(reader.stats().frames_emitted, 1);
    }

    #[test]
    fn test_clear_through_wrapper() {
        let mut reader = AnyFrameReader::from(FrameReader::new());
        reader.push(0xAA);
        assert!(!reader.is_idle());

        reader.clear();
        assert!(reader.is_idle());
    }

    #[test]
    fn test_format_display() {
        assert_eq!(WireFormat::Header.to_string(), "header");
        assert_eq!(WireFormat::Checksummed.to_string(), "checksummed");
        assert_eq!(WireFormat::default(), WireFormat::Checksummed);
    }
}
