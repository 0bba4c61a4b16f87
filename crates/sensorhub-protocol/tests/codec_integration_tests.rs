//! Integration tests for HubCodec with Tokio streams.
//!
//! These tests run the codec over in-memory duplex pipes to check event
//! roundtrips, frames split across reads, and recovery from line noise.

mod common;

use futures::{SinkExt, StreamExt};
use sensorhub_core::DeviceId;
use sensorhub_protocol::{HubCodec, OccupancyEvent, WireFormat};
use tokio::io::{AsyncWriteExt, DuplexStream};
use tokio_util::codec::{Framed, FramedRead};

/// Helper function to create a framed duplex stream for testing.
fn create_framed_duplex(
    buffer_size: usize,
) -> (Framed<DuplexStream, HubCodec>, Framed<DuplexStream, HubCodec>) {
    let (hub, sensor) = tokio::io::duplex(buffer_size);
    (
        Framed::new(hub, HubCodec::new()),
        Framed::new(sensor, HubCodec::new()),
    )
}

fn event(id: u16, occupied: bool) -> OccupancyEvent {
    OccupancyEvent::new(DeviceId::new(id), occupied)
}

#[tokio::test]
async fn test_codec_roundtrip_single_event() {
    let (mut hub, mut sensor) = create_framed_duplex(1024);

    sensor.send(event(1, true)).await.unwrap();

    let received = hub.next().await.unwrap().unwrap();
    common::assert_event(&received, 1, true);
}

#[tokio::test]
async fn test_codec_roundtrip_sequence_in_order() {
    let (hub, mut sensor) = create_framed_duplex(1024);

    let sent = vec![event(1, true), event(2, true), event(1, false), event(0xBEEF, true)];
    for e in &sent {
        sensor.send(*e).await.unwrap();
    }
    drop(sensor);

    let received: Vec<_> = hub.map(|r| r.unwrap()).collect().await;
    assert_eq!(received, sent);
}

#[tokio::test]
async fn test_codec_frame_split_across_writes() {
    let (mut writer, reader) = tokio::io::duplex(64);
    let mut events = FramedRead::new(reader, HubCodec::new());

    let task = tokio::spawn(async move {
        for byte in common::occupancy_frame(0x0042, true) {
            writer.write_all(&[byte]).await.unwrap();
            tokio::task::yield_now().await;
        }
    });

    let received = events.next().await.unwrap().unwrap();
    common::assert_event(&received, 0x0042, true);
    task.await.unwrap();
}

#[tokio::test]
async fn test_codec_recovers_from_noise() {
    let (mut writer, reader) = tokio::io::duplex(1024);
    let mut events = FramedRead::new(reader, HubCodec::new());

    let mut wire = vec![0x00, 0x13, 0x37];
    wire.extend_from_slice(&common::occupancy_frame(1, true));
    // Corrupt checksum
    let mut bad = common::occupancy_frame(2, true);
    *bad.last_mut().unwrap() ^= 0xFF;
    wire.extend_from_slice(&bad);
    // Length over the limit
    wire.extend_from_slice(&[0xAA, 0xC8]);
    wire.extend_from_slice(&common::occupancy_frame(3, false));

    writer.write_all(&wire).await.unwrap();
    drop(writer);

    let first = events.next().await.unwrap().unwrap();
    let second = events.next().await.unwrap().unwrap();
    assert!(events.next().await.is_none());

    common::assert_event(&first, 1, true);
    common::assert_event(&second, 3, false);

    let stats = events.decoder().reader_stats();
    assert_eq!(stats.checksum_mismatches, 1);
    assert_eq!(stats.oversized_frames, 1);
    assert_eq!(stats.frames_emitted, 2);
}

#[tokio::test]
async fn test_codec_truncated_tail_is_not_an_error() {
    let (mut writer, reader) = tokio::io::duplex(1024);
    let mut events = FramedRead::new(reader, HubCodec::new());

    let mut wire = common::occupancy_frame(7, true);
    wire.extend_from_slice(&[0xAA, 0x03, 0x00]);
    writer.write_all(&wire).await.unwrap();
    drop(writer);

    common::assert_event(&events.next().await.unwrap().unwrap(), 7, true);
    assert!(events.next().await.is_none());
}

#[tokio::test]
async fn test_codec_legacy_header_stream() {
    let (mut writer, reader) = tokio::io::duplex(1024);
    let mut events = FramedRead::new(reader, HubCodec::with_format(WireFormat::Header, 64));

    let mut wire = vec![0x55];
    wire.extend_from_slice(&common::legacy_header(0x1234));
    wire.extend_from_slice(&common::legacy_header(0x0001));
    writer.write_all(&wire).await.unwrap();
    drop(writer);

    let received: Vec<_> = events.by_ref().map(|r| r.unwrap()).collect().await;
    assert_eq!(received, vec![event(0x1234, true), event(0x0001, true)]);
}
