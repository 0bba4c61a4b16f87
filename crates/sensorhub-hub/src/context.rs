//! Hub ingestion context.
//!
//! [`HubContext`] owns everything the ingestion loop touches: the frame
//! reader, the decoder, the device registry and the dispatcher with its
//! observer. It is driven one byte at a time from a single thread and needs
//! no locks or globals.
//!
//! # Examples
//!
//! ```
//! use sensorhub_core::{DeviceId, OccupancyState};
//! use sensorhub_hub::{DeviceRegistry, HubContext, RecordingObserver};
//! use sensorhub_protocol::FrameReader;
//!
//! let mut registry = DeviceRegistry::new();
//! registry.register_device(DeviceId::new(1), "Meeting room").unwrap();
//!
//! let mut hub = HubContext::new(FrameReader::new(), registry, RecordingObserver::new());
//! let consumed = hub.run(&mut [0xAA, 0x03, 0x00, 0x01, 0x01, 0x02].into_iter());
//!
//! assert_eq!(consumed, 6);
//! assert_eq!(hub.state(DeviceId::new(1)), Some(OccupancyState::Occupied));
//! assert_eq!(hub.observer().len(), 1);
//! ```

use sensorhub_core::{DeviceId, OccupancyState};
use sensorhub_protocol::{
    AnyFrameReader, DecodeError, FrameDecoder, FrameFault, OccupancyEvent, ReadOutcome,
    ReaderStats, WireFormat,
};
use serde::Serialize;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::{self, Instant};
use tracing::debug;

use crate::dispatcher::{DispatchOutcome, DispatchStats, OccupancyDispatcher};
use crate::hold::HoldTimer;
use crate::observer::StateObserver;
use crate::registry::DeviceRegistry;
use crate::source::ByteSource;

/// Size of each read in [`HubContext::run_with_hold`].
const READ_CHUNK: usize = 256;

/// What one ingested byte did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// No frame completed.
    Pending,

    /// A candidate frame failed validation and was discarded.
    FrameDropped(FrameFault),

    /// A valid frame carried a payload that is not an occupancy report.
    DecodeFailed(DecodeError),

    /// A report was decoded and dispatched.
    Dispatched(DispatchOutcome),
}

/// Combined counters of the whole pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HubStats {
    /// Frame reader counters.
    pub reader: ReaderStats,

    /// Valid frames whose payload did not decode.
    pub decode_failures: u64,

    /// Dispatcher counters.
    pub dispatch: DispatchStats,
}

/// Reader, decoder, registry and dispatcher bundled for the ingestion loop.
#[derive(Debug)]
pub struct HubContext<O> {
    reader: AnyFrameReader,
    decoder: FrameDecoder,
    registry: DeviceRegistry,
    dispatcher: OccupancyDispatcher<O>,
    decode_failures: u64,
}

impl<O: StateObserver> HubContext<O> {
    /// Create a context.
    ///
    /// The registry is taken by value, so no sensor can be added or removed
    /// once ingestion starts.
    pub fn new(reader: impl Into<AnyFrameReader>, registry: DeviceRegistry, observer: O) -> Self {
        Self {
            reader: reader.into(),
            decoder: FrameDecoder::new(),
            registry,
            dispatcher: OccupancyDispatcher::new(observer),
            decode_failures: 0,
        }
    }

    /// Feed one byte through the whole pipeline.
    pub fn ingest(&mut self, byte: u8) -> IngestOutcome {
        let frame = match self.reader.push(byte) {
            ReadOutcome::Pending => return IngestOutcome::Pending,
            ReadOutcome::Dropped(fault) => {
                debug!("Dropping malformed frame: {}", fault);
                return IngestOutcome::FrameDropped(fault);
            }
            ReadOutcome::Frame(frame) => frame,
        };

        match self.decoder.decode(&frame) {
            Ok(event) => IngestOutcome::Dispatched(self.dispatch(event)),
            Err(e) => {
                self.decode_failures += 1;
                debug!("Dropping undecodable {}: {}", frame, e);
                IngestOutcome::DecodeFailed(e)
            }
        }
    }

    /// Dispatch an event that did not come from the byte stream.
    ///
    /// Used by policies layered on top of the context, such as
    /// [`HoldTimer`](crate::HoldTimer) clears.
    pub fn dispatch(&mut self, event: OccupancyEvent) -> DispatchOutcome {
        self.dispatcher.dispatch(&mut self.registry, event)
    }

    /// Drain `source`, returning the number of bytes consumed.
    pub fn run<S>(&mut self, source: &mut S) -> usize
    where
        S: ByteSource + ?Sized,
    {
        let mut consumed = 0;
        while let Some(byte) = source.read_byte() {
            self.ingest(byte);
            consumed += 1;
        }
        consumed
    }

    /// Drain an async `input` while clearing held sensors on time.
    ///
    /// Occupied reports arm `hold`. When the earliest deadline passes before
    /// more bytes arrive, the expired clears are dispatched. Returns the
    /// number of bytes consumed once `input` reaches end of stream; holds
    /// still pending then stay in `hold`.
    ///
    /// Deadlines follow Tokio's clock, so a paused runtime drives them.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error from `input`.
    pub async fn run_with_hold<R>(
        &mut self,
        input: &mut R,
        hold: &mut HoldTimer,
    ) -> io::Result<usize>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let mut buf = [0u8; READ_CHUNK];
        let mut consumed = 0;

        loop {
            let deadline = hold.next_deadline();
            let wake_at = deadline.map_or_else(Instant::now, Instant::from_std);

            tokio::select! {
                read = input.read(&mut buf) => {
                    let n = read?;
                    if n == 0 {
                        return Ok(consumed);
                    }
                    consumed += n;

                    let now = Instant::now().into_std();
                    for &byte in &buf[..n] {
                        if let IngestOutcome::Dispatched(outcome) = self.ingest(byte) {
                            hold.observe(&outcome, now);
                        }
                    }
                }
                _ = time::sleep_until(wake_at), if deadline.is_some() => {
                    for event in hold.expired(Instant::now().into_std()) {
                        self.dispatch(event);
                    }
                }
            }
        }
    }
}

impl<O> HubContext<O> {
    /// Registered sensors.
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Current state of the sensor registered under `id`.
    pub fn state(&self, id: DeviceId) -> Option<OccupancyState> {
        self.registry.state(id)
    }

    /// Wire format the reader expects.
    pub fn format(&self) -> WireFormat {
        self.reader.format()
    }

    /// Counters accumulated since creation.
    pub fn stats(&self) -> HubStats {
        HubStats {
            reader: self.reader.stats(),
            decode_failures: self.decode_failures,
            dispatch: self.dispatcher.stats(),
        }
    }

    /// Borrow the observer.
    pub fn observer(&self) -> &O {
        self.dispatcher.observer()
    }

    /// Mutably borrow the observer.
    pub fn observer_mut(&mut self) -> &mut O {
        self.dispatcher.observer_mut()
    }
}
