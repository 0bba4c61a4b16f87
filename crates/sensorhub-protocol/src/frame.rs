use bytes::{BufMut, Bytes, BytesMut};
use sensorhub_core::{Error, Result, constants::*};
use std::fmt;

/// Frame is one validated unit of hub transport data
///
/// A Frame holds the payload bytes together with the checksum that
/// protected them on the wire. Frames are only constructed through
/// validating constructors, so every `Frame` value satisfies the wire
/// invariants: the payload fits the one-byte length field and the stored
/// checksum equals the additive checksum of the payload.
///
/// # Wire Format
/// ```text
/// [0xAA][LEN][PAYLOAD ... LEN bytes][CHECKSUM = sum(PAYLOAD) mod 256]
/// ```
///
/// # Basic Usage
/// ```
/// use sensorhub_protocol::Frame;
///
/// // ID 0x0001, STATE = occupied
/// let frame = Frame::new(vec![0x00, 0x01, 0x01]).unwrap();
/// assert_eq!(frame.checksum(), 0x02);
/// assert_eq!(&frame.encode()[..], &[0xAA, 0x03, 0x00, 0x01, 0x01, 0x02]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Payload bytes between the length field and the checksum
    payload: Bytes,

    /// Additive checksum of the payload
    checksum: u8,
}

/// Additive checksum used by the hub: sum of all bytes modulo 256.
///
/// ```
/// use sensorhub_protocol::checksum;
///
/// assert_eq!(checksum(&[0x00, 0x01, 0x01]), 0x02);
/// assert_eq!(checksum(&[0xFF, 0x02]), 0x01);
/// assert_eq!(checksum(&[]), 0x00);
/// ```
#[inline]
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

impl Frame {
    /// Create a Frame from payload bytes, computing its checksum
    ///
    /// # Errors
    /// Returns `Error::OversizedFrame` if the payload does not fit the
    /// one-byte length field.
    pub fn new(payload: impl Into<Bytes>) -> Result<Self> {
        let payload = payload.into();
        ensure_wire_len(payload.len())?;
        let checksum = checksum(&payload);
        Ok(Frame { payload, checksum })
    }

    /// Create a Frame from payload bytes and the checksum received with them
    ///
    /// # Errors
    /// Returns `Error::OversizedFrame` if the payload is too long and
    /// `Error::ChecksumMismatch` if the received checksum does not match.
    pub fn from_parts(payload: impl Into<Bytes>, received: u8) -> Result<Self> {
        let frame = Self::new(payload)?;
        if frame.checksum != received {
            return Err(Error::ChecksumMismatch {
                expected: frame.checksum,
                actual: received,
            });
        }
        Ok(frame)
    }

    /// Build a frame whose checksum the caller has already verified.
    pub(crate) fn from_validated(payload: Bytes, checksum: u8) -> Self {
        debug_assert!(payload.len() <= MAX_WIRE_PAYLOAD_LEN);
        debug_assert_eq!(self::checksum(&payload), checksum);
        Frame { payload, checksum }
    }

    /// Get the payload bytes
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload length in bytes (the value of the LEN field)
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Check if the payload is empty
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Get the payload checksum
    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    /// Recompute the payload checksum and compare it with the stored one
    ///
    /// Always `true` for frames built by this crate.
    pub fn verify_checksum(&self) -> bool {
        checksum(&self.payload) == self.checksum
    }

    /// Total size on the wire, framing included
    pub fn wire_len(&self) -> usize {
        self.payload.len() + FRAME_OVERHEAD
    }

    /// Append the wire representation of this frame to `dst`
    pub fn encode_into(&self, dst: &mut BytesMut) {
        dst.reserve(self.wire_len());
        dst.put_u8(START_MARKER);
        // Length fits by construction
        dst.put_u8(self.payload.len() as u8);
        dst.put_slice(&self.payload);
        dst.put_u8(self.checksum);
    }

    /// Wire representation of this frame
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.wire_len());
        self.encode_into(&mut buf);
        buf.freeze()
    }
}

fn ensure_wire_len(len: usize) -> Result<()> {
    if len > MAX_WIRE_PAYLOAD_LEN {
        return Err(Error::OversizedFrame {
            declared: len,
            max: MAX_WIRE_PAYLOAD_LEN,
        });
    }
    Ok(())
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex: String = self
            .payload
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(" ");
        write!(
            f,
            "Frame[len={}, checksum=0x{:02X}, payload='{}']",
            self.len(),
            self.checksum,
            hex
        )
    }
}
