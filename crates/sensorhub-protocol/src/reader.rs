//! Byte-at-a-time frame reader for the hub's checksummed wire format.
//!
//! The UART delivers an unbounded byte stream with no guarantees about
//! alignment: the reader may be started mid-frame, RF noise may inject or
//! corrupt bytes, and reads may end anywhere. [`FrameReader`] rebuilds
//! discrete frames from that stream one byte at a time.
//!
//! # Protocol Framing
//!
//! ```text
//! [START=0xAA][LEN][PAYLOAD ... LEN bytes][CHECKSUM]
//! ```
//!
//! # Usage
//!
//! ```
//! use sensorhub_protocol::FrameReader;
//!
//! let mut reader = FrameReader::new();
//!
//! // Garbage, then ID 0x0001 reporting "occupied"
//! let mut emitted = Vec::new();
//! for byte in [0x13, 0x37, 0xAA, 0x03, 0x00, 0x01, 0x01, 0x02] {
//!     if let Some(frame) = reader.feed(byte) {
//!         emitted.push(frame);
//!     }
//! }
//!
//! assert_eq!(emitted.len(), 1);
//! assert_eq!(emitted[0].payload(), &[0x00, 0x01, 0x01]);
//! ```
//!
//! # Error Policy
//!
//! Malformed frames never surface as errors. A checksum mismatch or an
//! oversized length field drops the candidate, bumps a counter in
//! [`ReaderStats`] and returns the reader to [`ReaderState::AwaitStart`].
//! Callers that need to tell "nothing yet" apart from "frame dropped" use
//! [`FrameReader::push`], which reports a [`ReadOutcome`].

use bytes::{BufMut, BytesMut};
use sensorhub_core::Error;
use sensorhub_core::constants::{DEFAULT_MAX_PAYLOAD_LEN, MAX_WIRE_PAYLOAD_LEN, START_MARKER};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

use crate::frame::{Frame, checksum};

/// Recommended initial capacity for the frame queue used by [`FrameReader::extend`].
const INITIAL_FRAME_QUEUE_CAPACITY: usize = 4;

/// State machine states for reading hub frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    /// Waiting for the start marker. Other bytes are skipped as noise.
    AwaitStart,

    /// Start marker seen, next byte is the payload length.
    ReadLength,

    /// Accumulating payload bytes until the declared length is reached.
    ///
    /// A start marker in this state is payload data, not a new frame.
    ReadPayload,

    /// Payload complete, next byte is the checksum.
    ReadChecksum,
}

/// Reason a candidate frame was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFault {
    /// Trailing checksum byte did not match the payload sum.
    ChecksumMismatch { expected: u8, actual: u8 },

    /// Length field exceeded the reader's payload limit.
    Oversized { declared: usize, max: usize },

    /// Legacy activation header broken off by an unexpected byte.
    InvalidHeader { position: usize, found: u8 },
}

impl fmt::Display for FrameFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChecksumMismatch { expected, actual } => write!(
                f,
                "checksum mismatch (expected 0x{expected:02X}, got 0x{actual:02X})"
            ),
            Self::Oversized { declared, max } => {
                write!(f, "oversized frame ({declared} bytes declared, limit {max})")
            }
            Self::InvalidHeader { position, found } => write!(
                f,
                "invalid header byte 0x{found:02X} at position {position}"
            ),
        }
    }
}

impl From<FrameFault> for Error {
    fn from(fault: FrameFault) -> Self {
        match fault {
            FrameFault::ChecksumMismatch { expected, actual } => {
                Error::ChecksumMismatch { expected, actual }
            }
            FrameFault::Oversized { declared, max } => Error::OversizedFrame { declared, max },
            FrameFault::InvalidHeader { .. } => Error::UnknownFormat {
                message: fault.to_string(),
            },
        }
    }
}

/// Result of pushing one byte into a reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// No complete frame yet.
    Pending,

    /// A validated frame is ready.
    Frame(Frame),

    /// The in-progress frame was discarded; the reader has resynced.
    Dropped(FrameFault),
}

impl ReadOutcome {
    /// Keep only a completed frame.
    pub fn into_frame(self) -> Option<Frame> {
        match self {
            Self::Frame(frame) => Some(frame),
            Self::Pending | Self::Dropped(_) => None,
        }
    }

    /// Returns `true` if no frame completed and nothing was dropped.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Counters describing what a reader has seen on the line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReaderStats {
    /// Bytes discarded while waiting for a frame start.
    pub bytes_skipped: u64,

    /// Frames that passed validation.
    pub frames_emitted: u64,

    /// Frames dropped for a bad checksum.
    pub checksum_mismatches: u64,

    /// Frames aborted because the length field exceeded the limit.
    pub oversized_frames: u64,

    /// Legacy headers broken off by an unexpected byte.
    pub invalid_headers: u64,
}

impl ReaderStats {
    /// Total number of candidate frames that were discarded.
    pub fn frames_dropped(&self) -> u64 {
        self.checksum_mismatches + self.oversized_frames + self.invalid_headers
    }
}

/// Stateful reader for the hub's checksummed frames.
///
/// # State Machine
///
/// ```text
///             START                 LEN <= max             LEN bytes
/// ┌──────────┐─────>┌────────────┐──────────────>┌─────────────┐────────>┌──────────────┐
/// │AwaitStart│      │ ReadLength │               │ ReadPayload │         │ ReadChecksum │
/// └──────────┘<─────└────────────┘               └─────────────┘         └──────────────┘
///   ^    │ noise     LEN > max (Oversized)                                       │
///   │    └──(skip)                                                               │
///   └──────────────── checksum ok -> Frame / checksum bad -> Dropped ────────────┘
/// ```
///
/// A zero length goes straight from `ReadLength` to `ReadChecksum`.
///
/// The reader is not reentrant: a single ingestion loop owns it and feeds
/// bytes in arrival order.
#[derive(Debug)]
pub struct FrameReader {
    /// Current state of the reader state machine.
    state: ReaderState,

    /// Payload limit; longer declared lengths abort the frame.
    max_payload_len: usize,

    /// Payload length declared by the current frame.
    expected_len: usize,

    /// Payload bytes collected for the current frame.
    payload: BytesMut,

    /// Frames completed by [`FrameReader::extend`] and not yet taken.
    frames: VecDeque<Frame>,

    stats: ReaderStats,
}

impl FrameReader {
    /// Create a reader with the default payload limit.
    ///
    /// ```
    /// use sensorhub_protocol::{FrameReader, ReaderState};
    ///
    /// let reader = FrameReader::new();
    /// assert_eq!(reader.state(), ReaderState::AwaitStart);
    /// assert_eq!(reader.max_payload_len(), 64);
    /// ```
    pub fn new() -> Self {
        Self::with_max_payload_len(DEFAULT_MAX_PAYLOAD_LEN)
    }

    /// Create a reader with a custom payload limit.
    ///
    /// The limit is capped at 255, the largest length the wire can express.
    pub fn with_max_payload_len(max_payload_len: usize) -> Self {
        let max_payload_len = max_payload_len.min(MAX_WIRE_PAYLOAD_LEN);
        Self {
            state: ReaderState::AwaitStart,
            max_payload_len,
            expected_len: 0,
            payload: BytesMut::with_capacity(max_payload_len),
            frames: VecDeque::with_capacity(INITIAL_FRAME_QUEUE_CAPACITY),
            stats: ReaderStats::default(),
        }
    }

    /// Get the configured payload limit.
    pub fn max_payload_len(&self) -> usize {
        self.max_payload_len
    }

    /// Feed one byte, returning a frame if it completed one.
    ///
    /// Dropped frames and incomplete frames both yield `None`; use
    /// [`push`](Self::push) to tell them apart.
    pub fn feed(&mut self, byte: u8) -> Option<Frame> {
        self.push(byte).into_frame()
    }

    /// Feed one byte and report exactly what it did to the frame in progress.
    ///
    /// ```
    /// use sensorhub_protocol::{FrameFault, FrameReader, ReadOutcome};
    ///
    /// let mut reader = FrameReader::new();
    /// for byte in [0xAA, 0x03, 0x00, 0x01, 0x01] {
    ///     assert!(reader.push(byte).is_pending());
    /// }
    ///
    /// // Wrong checksum: frame dropped, reader resynced
    /// assert_eq!(
    ///     reader.push(0x05),
    ///     ReadOutcome::Dropped(FrameFault::ChecksumMismatch { expected: 0x02, actual: 0x05 })
    /// );
    /// ```
    pub fn push(&mut self, byte: u8) -> ReadOutcome {
        match self.state {
            ReaderState::AwaitStart => {
                if byte == START_MARKER {
                    self.begin_frame();
                } else {
                    self.stats.bytes_skipped += 1;
                }
                ReadOutcome::Pending
            }
            ReaderState::ReadLength => self.handle_length(byte),
            ReaderState::ReadPayload => {
                self.payload.put_u8(byte);
                if self.payload.len() == self.expected_len {
                    self.state = ReaderState::ReadChecksum;
                }
                ReadOutcome::Pending
            }
            ReaderState::ReadChecksum => self.handle_checksum(byte),
        }
    }

    /// Feed a chunk of bytes, queueing every frame it completes.
    ///
    /// Queued frames are taken with [`next_frame`](Self::next_frame) or
    /// [`drain_frames`](Self::drain_frames).
    pub fn extend(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if let ReadOutcome::Frame(frame) = self.push(byte) {
                self.frames.push_back(frame);
            }
        }
    }

    /// Take the oldest queued frame.
    pub fn next_frame(&mut self) -> Option<Frame> {
        self.frames.pop_front()
    }

    /// Returns number of queued frames.
    pub fn frames_available(&self) -> usize {
        self.frames.len()
    }

    /// Returns an iterator that drains all queued frames.
    ///
    /// ```
    /// use sensorhub_protocol::FrameReader;
    ///
    /// let mut reader = FrameReader::new();
    /// reader.extend(&[0xAA, 0x03, 0x00, 0x01, 0x01, 0x02]);
    /// reader.extend(&[0xAA, 0x03, 0x00, 0x02, 0x00, 0x02]);
    ///
    /// let frames: Vec<_> = reader.drain_frames().collect();
    /// assert_eq!(frames.len(), 2);
    /// assert_eq!(reader.frames_available(), 0);
    /// ```
    pub fn drain_frames(&mut self) -> DrainFrames<'_> {
        DrainFrames { reader: self }
    }

    /// Returns current reader state.
    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Returns `true` when no frame is partially assembled.
    pub fn is_idle(&self) -> bool {
        self.state == ReaderState::AwaitStart
    }

    /// Counters accumulated since creation.
    pub fn stats(&self) -> ReaderStats {
        self.stats
    }

    /// Discard any partial frame and queued frames.
    ///
    /// Statistics are kept.
    pub fn clear(&mut self) {
        self.reset();
        self.frames.clear();
    }

    fn handle_length(&mut self, byte: u8) -> ReadOutcome {
        let declared = byte as usize;

        if declared > self.max_payload_len {
            self.stats.oversized_frames += 1;
            let fault = FrameFault::Oversized {
                declared,
                max: self.max_payload_len,
            };

            // The rejected length byte may itself open the next frame
            if byte == START_MARKER {
                self.begin_frame();
            } else {
                self.reset();
            }
            return ReadOutcome::Dropped(fault);
        }

        self.expected_len = declared;
        self.state = if declared == 0 {
            ReaderState::ReadChecksum
        } else {
            ReaderState::ReadPayload
        };
        ReadOutcome::Pending
    }

    fn handle_checksum(&mut self, received: u8) -> ReadOutcome {
        let expected = checksum(&self.payload);
        let payload = self.payload.split().freeze();
        self.reset();

        if received == expected {
            self.stats.frames_emitted += 1;
            ReadOutcome::Frame(Frame::from_validated(payload, received))
        } else {
            self.stats.checksum_mismatches += 1;
            ReadOutcome::Dropped(FrameFault::ChecksumMismatch {
                expected,
                actual: received,
            })
        }
    }

    fn begin_frame(&mut self) {
        self.state = ReaderState::ReadLength;
        self.expected_len = 0;
        self.payload.clear();
    }

    fn reset(&mut self) {
        self.state = ReaderState::AwaitStart;
        self.expected_len = 0;
        self.payload.clear();
    }
}

impl Default for FrameReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator that drains queued frames from a [`FrameReader`].
///
/// Created by [`FrameReader::drain_frames`].
pub struct DrainFrames<'a> {
    reader: &'a mut FrameReader,
}

impl<'a> Iterator for DrainFrames<'a> {
    type Item = Frame;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.next_frame()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.reader.frames_available();
        (len, Some(len))
    }
}

impl<'a> ExactSizeIterator for DrainFrames<'a> {
    fn len(&self) -> usize {
        self.reader.frames_available()
    }
}
