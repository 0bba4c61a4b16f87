//! Property-based tests for the frame reader and decoder.
//!
//! These use proptest to generate arbitrary byte streams and check that
//! the framing invariants hold for all of them, not just for the handful
//! of captures used in the unit tests.

mod common;

use proptest::prelude::*;
use sensorhub_protocol::{Frame, FrameDecoder, FrameReader, ReaderState};

/// Strategy for byte streams that never contain the start marker.
fn markerless_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>().prop_filter("no start marker", |b| *b != 0xAA), 0..512)
}

/// Strategy for payloads that fit under the default length limit.
fn valid_payload() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=64)
}

/// Strategy for occupancy reports.
fn occupancy() -> impl Strategy<Value = (u16, bool)> {
    (any::<u16>(), any::<bool>())
}

proptest! {
    /// Property: A stream without the start marker never yields a frame.
    #[test]
    fn prop_no_marker_no_frames(bytes in markerless_bytes()) {
        let mut reader = FrameReader::new();

        for b in &bytes {
            prop_assert!(reader.feed(*b).is_none());
        }

        prop_assert_eq!(reader.state(), ReaderState::AwaitStart);
        prop_assert_eq!(reader.stats().bytes_skipped, bytes.len() as u64);
    }

    /// Property: Any payload under the limit survives framing untouched.
    #[test]
    fn prop_valid_frame_is_emitted(payload in valid_payload()) {
        let payloads = common::read_payloads(&common::wire_frame(&payload));

        prop_assert_eq!(payloads, vec![payload]);
    }

    /// Property: Garbage between two valid frames does not affect either.
    #[test]
    fn prop_garbage_between_frames(
        first in occupancy(),
        garbage in markerless_bytes(),
        second in occupancy(),
    ) {
        let mut stream = common::occupancy_frame(first.0, first.1);
        stream.extend_from_slice(&garbage);
        stream.extend_from_slice(&common::occupancy_frame(second.0, second.1));

        let payloads = common::read_payloads(&stream);

        prop_assert_eq!(payloads.len(), 2);
        prop_assert_eq!(&payloads[0][..2], &first.0.to_be_bytes()[..]);
        prop_assert_eq!(&payloads[1][..2], &second.0.to_be_bytes()[..]);
    }

    /// Property: Corrupting one payload byte drops that frame only.
    ///
    /// The corrupted frame is followed by a clean one. Whatever the reader
    /// does with the bad frame, it must be back in sync for the next one.
    #[test]
    fn prop_corrupted_payload_is_dropped(
        (id, occupied) in occupancy(),
        offset in 0usize..3,
        flip in 1u8..=255,
        next in occupancy(),
    ) {
        let mut stream = common::occupancy_frame(id, occupied);
        // skip START and LEN
        stream[2 + offset] ^= flip;
        stream.extend_from_slice(&common::occupancy_frame(next.0, next.1));

        let payloads = common::read_payloads(&stream);
        let expected_next = common::occupancy_frame(next.0, next.1)[2..5].to_vec();

        prop_assert_eq!(payloads, vec![expected_next]);
    }

    /// Property: A wrong checksum byte drops its frame, and the byte is not
    /// mistaken for the start of the next one even when it reads 0xAA.
    #[test]
    fn prop_corrupted_checksum_is_dropped(
        (id, occupied) in occupancy(),
        flip in 1u8..=255,
        next in occupancy(),
    ) {
        let mut stream = common::occupancy_frame(id, occupied);
        stream[5] ^= flip;
        stream.extend_from_slice(&common::occupancy_frame(next.0, next.1));

        let payloads = common::read_payloads(&stream);
        let expected_next = common::occupancy_frame(next.0, next.1)[2..5].to_vec();

        prop_assert_eq!(payloads, vec![expected_next]);
    }

    /// Property: Decoding is a pure function of the frame.
    #[test]
    fn prop_decode_is_deterministic(payload in prop::collection::vec(any::<u8>(), 0..8)) {
        let frame = Frame::new(payload).unwrap();
        let decoder = FrameDecoder::new();

        prop_assert_eq!(decoder.decode(&frame), decoder.decode(&frame));
        prop_assert_eq!(decoder.decode(&frame), FrameDecoder::new().decode(&frame.clone()));
    }

    /// Property: Every well-formed occupancy frame decodes to its report.
    #[test]
    fn prop_occupancy_frame_decodes((id, occupied) in occupancy()) {
        let mut reader = FrameReader::new();
        let frame = common::occupancy_frame(id, occupied)
            .into_iter()
            .find_map(|b| reader.feed(b))
            .unwrap();

        let event = FrameDecoder::new().decode(&frame).unwrap();

        common::assert_event(&event, id, occupied);
    }
}
