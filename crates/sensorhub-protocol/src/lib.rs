pub mod codec;
pub mod decoder;
pub mod event;
pub mod frame;
pub mod header;
pub mod reader;
pub mod wire;

pub use codec::HubCodec;
pub use decoder::{DecodeError, FormatViolation, FrameDecoder};
pub use event::OccupancyEvent;
pub use frame::{Frame, checksum};
pub use header::HeaderReader;
pub use reader::{DrainFrames, FrameFault, FrameReader, ReadOutcome, ReaderState, ReaderStats};
pub use wire::{AnyFrameReader, WireFormat};
