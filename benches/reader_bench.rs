//! Performance benchmarks for the byte-at-a-time frame readers.
//!
//! Run benchmarks with:
//! ```sh
//! cargo bench --bench reader_bench
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sensorhub_core::DeviceId;
use sensorhub_protocol::{Frame, FrameDecoder, FrameReader, HeaderReader, OccupancyEvent};
use std::hint::black_box;

/// Build a stream of `count` occupancy frames.
fn create_stream(count: usize) -> Vec<u8> {
    (0..count)
        .flat_map(|i| {
            let event = OccupancyEvent::new(DeviceId::new(i as u16), i % 3 != 0);
            Frame::from(event).encode().to_vec()
        })
        .collect()
}

/// Benchmark feeding clean frame streams byte by byte.
fn bench_feed_clean(c: &mut Criterion) {
    let mut group = c.benchmark_group("feed_clean");

    for count in [10, 100, 1000] {
        let stream = create_stream(count);
        group.throughput(Throughput::Bytes(stream.len() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(count), &stream, |b, stream| {
            b.iter(|| {
                let mut reader = FrameReader::new();
                let emitted = stream.iter().filter_map(|&b| reader.feed(b)).count();
                black_box(emitted);
            });
        });
    }

    group.finish();
}

/// Benchmark the reader skipping pure noise.
fn bench_feed_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("feed_noise");

    let noise: Vec<u8> = (0..4096u32).map(|i| (i % 0xAA) as u8).collect();
    group.throughput(Throughput::Bytes(noise.len() as u64));

    group.bench_function("skip_4096_bytes", |b| {
        b.iter(|| {
            let mut reader = FrameReader::new();
            for &byte in &noise {
                black_box(reader.feed(byte));
            }
        });
    });

    group.finish();
}

/// Benchmark chunked ingestion through the frame queue.
fn bench_extend_and_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("extend_and_drain");

    let stream = create_stream(1000);
    group.throughput(Throughput::Elements(1000));

    for chunk_size in [1, 16, 256] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("chunk_{}_bytes", chunk_size)),
            &chunk_size,
            |b, &size| {
                b.iter(|| {
                    let mut reader = FrameReader::new();
                    let mut count = 0;
                    for chunk in stream.chunks(size) {
                        reader.extend(chunk);
                        count += reader.drain_frames().count();
                    }
                    black_box(count);
                });
            },
        );
    }

    group.finish();
}

/// Benchmark read and decode together, as the hub loop does.
fn bench_read_and_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_and_decode");

    let stream = create_stream(1000);
    group.throughput(Throughput::Elements(1000));

    group.bench_function("checksummed_1000_frames", |b| {
        let decoder = FrameDecoder::new();
        b.iter(|| {
            let mut reader = FrameReader::new();
            let occupied = stream
                .iter()
                .filter_map(|&b| reader.feed(b))
                .filter_map(|frame| decoder.decode(&frame).ok())
                .filter(|event| event.occupied)
                .count();
            black_box(occupied);
        });
    });

    let legacy: Vec<u8> = (0..1000u16)
        .flat_map(|id| {
            let [hi, lo] = id.to_be_bytes();
            [0xEB, 0xAF, 0x05, hi, lo]
        })
        .collect();

    group.bench_function("header_1000_frames", |b| {
        let decoder = FrameDecoder::new();
        b.iter(|| {
            let mut reader = HeaderReader::new();
            let count = legacy
                .iter()
                .filter_map(|&b| reader.feed(b))
                .filter_map(|frame| decoder.decode(&frame).ok())
                .count();
            black_box(count);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_feed_clean,
    bench_feed_noise,
    bench_extend_and_drain,
    bench_read_and_decode,
);

criterion_main!(benches);
