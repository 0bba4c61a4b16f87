//! Tokio codec for hub occupancy frames.
//!
//! `HubCodec` plugs the frame reader and decoder into Tokio's codec traits
//! so an async byte stream (a serial adapter, a socket bridge, a test
//! duplex pipe) can be consumed as a stream of [`OccupancyEvent`]s with
//! `FramedRead`/`Framed`.
//!
//! # Architecture
//!
//! ```text
//! Byte stream -> Decoder (AnyFrameReader + FrameDecoder) -> OccupancyEvent
//! OccupancyEvent -> Encoder -> Byte stream (wire frame)
//! ```
//!
//! # Usage with Tokio
//!
//! ```
//! use futures::StreamExt;
//! use sensorhub_protocol::HubCodec;
//! use tokio_util::codec::FramedRead;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let wire: &[u8] = &[0x55, 0xAA, 0x03, 0x00, 0x01, 0x01, 0x02];
//! let mut events = FramedRead::new(wire, HubCodec::new());
//!
//! let event = events.next().await.unwrap().unwrap();
//! assert_eq!(event.device_id.as_u16(), 1);
//! assert!(event.occupied);
//! # }
//! ```
//!
//! # Error Handling
//!
//! The serial link is lossy, so the decoder never fails on bad data:
//! frames with a wrong checksum, oversized lengths and payloads that do not
//! decode are logged at debug level, counted, and skipped. Only I/O errors
//! from the underlying stream terminate a `FramedRead`.

use bytes::{Buf, BytesMut};
use sensorhub_core::constants::LEGACY_HEADER;
use sensorhub_core::{Error, Result};
use tokio_util::codec::{Decoder, Encoder};
use tracing::debug;

use crate::decoder::FrameDecoder;
use crate::event::OccupancyEvent;
use crate::frame::Frame;
use crate::reader::{ReadOutcome, ReaderStats};
use crate::wire::{AnyFrameReader, WireFormat};

/// Tokio codec for hub occupancy events.
#[derive(Debug)]
pub struct HubCodec {
    /// Frame reader for the configured wire format.
    reader: AnyFrameReader,

    decoder: FrameDecoder,

    /// Frames that passed validation but did not decode.
    undecodable: u64,
}

impl HubCodec {
    /// Create a codec for the checksummed format with the default limit.
    pub fn new() -> Self {
        Self::from_reader(AnyFrameReader::default())
    }

    /// Create a codec for a specific wire format.
    ///
    /// ```
    /// use sensorhub_protocol::{HubCodec, WireFormat};
    ///
    /// let codec = HubCodec::with_format(WireFormat::Header, 64);
    /// assert_eq!(codec.format(), WireFormat::Header);
    /// ```
    pub fn with_format(format: WireFormat, max_payload_len: usize) -> Self {
        Self::from_reader(format.reader(max_payload_len))
    }

    fn from_reader(reader: AnyFrameReader) -> Self {
        Self {
            reader,
            decoder: FrameDecoder::new(),
            undecodable: 0,
        }
    }

    /// Wire format handled by this codec.
    pub fn format(&self) -> WireFormat {
        self.reader.format()
    }

    /// Reader counters for the decoding side.
    pub fn reader_stats(&self) -> ReaderStats {
        self.reader.stats()
    }

    /// Number of valid frames whose payload could not be decoded.
    pub fn undecodable_frames(&self) -> u64 {
        self.undecodable
    }
}

impl Default for HubCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for HubCodec {
    type Item = OccupancyEvent;
    type Error = Error;

    /// Decode the next occupancy event from the byte stream.
    ///
    /// Bytes are consumed one at a time. When an event completes, the
    /// remaining bytes stay in `src` for the next call. `Ok(None)` means
    /// every buffered byte was consumed without completing an event.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        while src.has_remaining() {
            let byte = src.get_u8();

            match self.reader.push(byte) {
                ReadOutcome::Pending => {}
                ReadOutcome::Dropped(fault) => {
                    debug!("Dropping malformed frame: {}", fault);
                }
                ReadOutcome::Frame(frame) => match self.decoder.decode(&frame) {
                    Ok(event) => return Ok(Some(event)),
                    Err(e) => {
                        self.undecodable += 1;
                        debug!("Dropping undecodable {}: {}", frame, e);
                    }
                },
            }
        }

        Ok(None)
    }
}

impl Encoder<OccupancyEvent> for HubCodec {
    type Error = Error;

    /// Encode an event in the codec's wire format.
    ///
    /// # Errors
    ///
    /// The legacy header format can only announce activations, so encoding
    /// a clear event for it returns `Error::UnknownFormat`.
    fn encode(&mut self, item: OccupancyEvent, dst: &mut BytesMut) -> Result<()> {
        match self.reader.format() {
            WireFormat::Checksummed => {
                Frame::from(item).encode_into(dst);
            }
            WireFormat::Header => {
                if !item.occupied {
                    return Err(Error::UnknownFormat {
                        message: format!(
                            "legacy header format cannot carry a clear state for {}",
                            item.device_id
                        ),
                    });
                }
                dst.extend_from_slice(&LEGACY_HEADER);
                dst.extend_from_slice(&item.device_id.to_be_bytes());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensorhub_core::DeviceId;

    fn event(id: u16, occupied: bool) -> OccupancyEvent {
        OccupancyEvent::new(DeviceId::new(id), occupied)
    }

    #[test]
    fn test_codec_new() {
        let codec = HubCodec::new();
        assert_eq!(codec.format(), WireFormat::Checksummed);
        assert_eq!(codec.undecodable_frames(), 0);
    }

    #[test]
    fn test_decode_complete_frame() {
        let mut codec = HubCodec::new();
        let mut buffer = BytesMut::from(&[0xAA, 0x03, 0x00, 0x01, 0x01, 0x02][..]);

        let decoded = codec.decode(&mut buffer).unwrap();

        assert_eq!(decoded, Some(event(1, true)));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_decode_partial_frame() {
        let mut codec = HubCodec::new();
        let mut buffer = BytesMut::from(&[0xAA, 0x03, 0x00][..]);

        assert_eq!(codec.decode(&mut buffer).unwrap(), None);
        assert!(buffer.is_empty());

        buffer.extend_from_slice(&[0x01, 0x01, 0x02]);
        assert_eq!(codec.decode(&mut buffer).unwrap(), Some(event(1, true)));
    }

    #[test]
    fn test_decode_leaves_following_bytes_buffered() {
        let mut codec = HubCodec::new();
        let mut buffer = BytesMut::new();
        codec.encode(event(1, true), &mut buffer).unwrap();
        codec.encode(event(2, false), &mut buffer).unwrap();

        assert_eq!(codec.decode(&mut buffer).unwrap(), Some(event(1, true)));
        assert_eq!(buffer.len(), 6);
        assert_eq!(codec.decode(&mut buffer).unwrap(), Some(event(2, false)));
        assert_eq!(codec.decode(&mut buffer).unwrap(), None);
    }

    #[test]
    fn test_decode_skips_bad_checksum() {
        let mut codec = HubCodec::new();
        let mut buffer = BytesMut::from(
            &[
                0xAA, 0x03, 0x00, 0x01, 0x01, 0x07, // bad checksum
                0xAA, 0x03, 0x00, 0x02, 0x01, 0x03,
            ][..],
        );

        assert_eq!(codec.decode(&mut buffer).unwrap(), Some(event(2, true)));
        assert_eq!(codec.reader_stats().checksum_mismatches, 1);
    }

    #[test]
    fn test_decode_skips_undecodable_payload() {
        let mut codec = HubCodec::new();
        let mut buffer = BytesMut::new();
        Frame::new(vec![0x00, 0x01, 0x09])
            .unwrap()
            .encode_into(&mut buffer);
        codec.encode(event(3, true), &mut buffer).unwrap();

        assert_eq!(codec.decode(&mut buffer).unwrap(), Some(event(3, true)));
        assert_eq!(codec.undecodable_frames(), 1);
    }

    #[test]
    fn test_encode_checksummed() {
        let mut codec = HubCodec::new();
        let mut buffer = BytesMut::new();

        codec.encode(event(1, true), &mut buffer).unwrap();

        assert_eq!(&buffer[..], &[0xAA, 0x03, 0x00, 0x01, 0x01, 0x02]);
    }

    #[test]
    fn test_header_format_roundtrip() {
        let mut codec = HubCodec::with_format(WireFormat::Header, 64);
        let mut buffer = BytesMut::new();

        codec.encode(event(0x1234, true), &mut buffer).unwrap();
        assert_eq!(&buffer[..], &[0xEB, 0xAF, 0x05, 0x12, 0x34]);

        assert_eq!(
            codec.decode(&mut buffer).unwrap(),
            Some(event(0x1234, true))
        );
    }

    #[test]
    fn test_header_format_rejects_clear_event() {
        let mut codec = HubCodec::with_format(WireFormat::Header, 64);
        let mut buffer = BytesMut::new();

        let result = codec.encode(event(1, false), &mut buffer);

        assert!(matches!(result, Err(Error::UnknownFormat { .. })));
        assert!(buffer.is_empty());
    }
}
