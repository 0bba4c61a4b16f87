//! Device registry, occupancy dispatch and the hub ingestion loop.
//!
//! This crate sits on top of `sensorhub-protocol`. It owns the logical
//! sensors paired with the hub and turns decoded occupancy reports into
//! debounced state changes:
//!
//! ```text
//! bytes -> AnyFrameReader -> FrameDecoder -> OccupancyDispatcher -> StateObserver
//!                                                  |
//!                                            DeviceRegistry
//! ```
//!
//! [`HubContext`] bundles all of it so a single ingestion thread can feed
//! bytes in and nothing else needs shared state.

pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod hold;
pub mod observer;
pub mod registry;
pub mod source;

pub use config::{DeviceConfig, HubConfig};
pub use context::{HubContext, HubStats, IngestOutcome};
pub use dispatcher::{DispatchOutcome, DispatchStats, OccupancyDispatcher};
pub use error::RegistrationError;
pub use hold::HoldTimer;
pub use observer::{ChannelObserver, NullObserver, RecordingObserver, StateChange, StateObserver};
pub use registry::{DeviceRegistry, SensorHandle};
pub use source::{ByteSource, ReadSource};
