//! Common test utilities for hub integration tests.

#![allow(dead_code)]

use sensorhub_core::DeviceId;
use sensorhub_hub::{DeviceRegistry, HubContext, RecordingObserver};
use sensorhub_protocol::{Frame, FrameReader, OccupancyEvent};

/// Reference capture: device 0x0001 reports "occupied".
pub const OCCUPIED_0001: [u8; 6] = [0xAA, 0x03, 0x00, 0x01, 0x01, 0x02];

/// Build a registry with one sensor per identifier.
pub fn registry(ids: &[u16]) -> DeviceRegistry {
    let mut registry = DeviceRegistry::new();
    for &id in ids {
        registry
            .register_device(DeviceId::new(id), format!("Sensor {id}"))
            .unwrap();
    }
    registry
}

/// Checksummed hub context recording every state change.
pub fn recording_hub(ids: &[u16]) -> HubContext<RecordingObserver> {
    HubContext::new(FrameReader::new(), registry(ids), RecordingObserver::new())
}

/// Wire bytes of an occupancy report.
pub fn report(id: u16, occupied: bool) -> Vec<u8> {
    Frame::from(OccupancyEvent::new(DeviceId::new(id), occupied))
        .encode()
        .to_vec()
}
