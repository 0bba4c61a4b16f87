//! Common test utilities for protocol integration tests.
//!
//! Helpers here build raw wire bytes by hand instead of going through
//! [`Frame::encode`], so the tests check the reader against the framing
//! rules rather than against the crate's own encoder.

#![allow(dead_code)]

use sensorhub_protocol::{FrameReader, OccupancyEvent};

/// Start marker of a checksummed frame.
pub const START: u8 = 0xAA;

/// Build the wire bytes of a checksummed frame around `payload`.
pub fn wire_frame(payload: &[u8]) -> Vec<u8> {
    let sum = payload.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    let mut bytes = Vec::with_capacity(payload.len() + 3);
    bytes.push(START);
    bytes.push(payload.len() as u8);
    bytes.extend_from_slice(payload);
    bytes.push(sum);
    bytes
}

/// Build the wire bytes of an occupancy report.
pub fn occupancy_frame(id: u16, occupied: bool) -> Vec<u8> {
    let [hi, lo] = id.to_be_bytes();
    wire_frame(&[hi, lo, u8::from(occupied)])
}

/// Build the wire bytes of a legacy activation header.
pub fn legacy_header(id: u16) -> Vec<u8> {
    let [hi, lo] = id.to_be_bytes();
    vec![0xEB, 0xAF, 0x05, hi, lo]
}

/// Feed `bytes` through a fresh reader and collect every emitted payload.
pub fn read_payloads(bytes: &[u8]) -> Vec<Vec<u8>> {
    let mut reader = FrameReader::new();
    bytes
        .iter()
        .filter_map(|&b| reader.feed(b))
        .map(|frame| frame.payload().to_vec())
        .collect()
}

/// Assert that an event carries the expected identifier and state.
pub fn assert_event(event: &OccupancyEvent, id: u16, occupied: bool) {
    assert_eq!(event.device_id.as_u16(), id, "device id mismatch in {event}");
    assert_eq!(event.occupied, occupied, "state mismatch in {event}");
}
