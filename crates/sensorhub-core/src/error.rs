use thiserror::Error;

use crate::types::DeviceId;

#[derive(Error, Debug)]
pub enum Error {
    // Stream errors
    #[error("Checksum mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    #[error("Oversized frame: declared {declared} bytes, limit is {max}")]
    OversizedFrame { declared: usize, max: usize },

    // Decode errors
    #[error("Unknown payload format: {message}")]
    UnknownFormat { message: String },

    // Registry errors
    #[error("Device identifier {id} is already registered")]
    DuplicateIdentifier { id: DeviceId },

    #[error("Invalid device identifier: {message}")]
    InvalidDeviceId { message: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing configuration key: {0}")]
    MissingConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
