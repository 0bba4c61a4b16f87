//! Byte sources for the ingestion loop.
//!
//! [`HubContext::run`](crate::HubContext::run) pulls bytes one at a time
//! from a [`ByteSource`]. Any `Iterator<Item = u8>` is a source, which
//! covers captures held in memory; [`ReadSource`] adapts a blocking
//! [`std::io::Read`] such as a file, stdin, or an already opened serial
//! device.

use std::io::{self, BufRead, BufReader, Read};
use tracing::warn;

/// Pull-based stream of bytes.
///
/// `None` means the stream has ended and will not produce more bytes.
pub trait ByteSource {
    /// Next byte, or `None` once the stream is exhausted.
    fn read_byte(&mut self) -> Option<u8>;
}

impl<I> ByteSource for I
where
    I: Iterator<Item = u8>,
{
    fn read_byte(&mut self) -> Option<u8> {
        self.next()
    }
}

/// Buffered [`ByteSource`] over any blocking reader.
///
/// End of input and I/O errors both end the stream. Errors are logged and
/// kept for inspection with [`error`](Self::error).
///
/// ```
/// use sensorhub_hub::{ByteSource, ReadSource};
///
/// let mut source = ReadSource::new(&[0xAA, 0x03][..]);
/// assert_eq!(source.read_byte(), Some(0xAA));
/// assert_eq!(source.read_byte(), Some(0x03));
/// assert_eq!(source.read_byte(), None);
/// assert_eq!(source.bytes_read(), 2);
/// ```
#[derive(Debug)]
pub struct ReadSource<R> {
    reader: BufReader<R>,
    bytes_read: u64,
    error: Option<io::Error>,
}

impl<R: Read> ReadSource<R> {
    /// Wrap `reader` with a default-sized buffer.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            bytes_read: 0,
            error: None,
        }
    }

    /// Bytes delivered so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Error that ended the stream, if any.
    pub fn error(&self) -> Option<&io::Error> {
        self.error.as_ref()
    }

    /// Consume the source, returning the error that ended it.
    pub fn into_error(self) -> Option<io::Error> {
        self.error
    }
}

impl<R: Read> ByteSource for ReadSource<R> {
    fn read_byte(&mut self) -> Option<u8> {
        if self.error.is_some() {
            return None;
        }

        loop {
            match self.reader.fill_buf() {
                Ok([]) => return None,
                Ok(buf) => {
                    let byte = buf[0];
                    self.reader.consume(1);
                    self.bytes_read += 1;
                    return Some(byte);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("Byte source failed after {} bytes: {}", self.bytes_read, e);
                    self.error = Some(e);
                    return None;
                }
            }
        }
    }
}
