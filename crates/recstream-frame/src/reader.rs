use std::io::{ErrorKind, Read};
use std::path::Path;

use bytes::BytesMut;
use recstream_io::ByteSource;
use tracing::trace;

use crate::codec::{decode_prefix, RecordConfig, PREFIX_SIZE};
use crate::error::{FrameError, Result};
use crate::record::Record;

/// Reads framed records from any `Read` stream, one frame per call.
///
/// Each frame's payload is read into a window of exactly its declared length
/// before the record decoder runs, so a decode can neither cross into the
/// next frame nor end short of its own without being reported.
///
/// The stream ends at a zero-length frame (the explicit sentinel) or at EOF
/// on a frame boundary; both latch the reader, and later calls return
/// `Ok(None)` without touching the underlying stream.
#[derive(Debug)]
pub struct RecordReader<R> {
    inner: R,
    buf: BytesMut,
    config: RecordConfig,
    done: bool,
}

impl<R: Read> RecordReader<R> {
    /// Create a new record reader with default configuration.
    pub fn new(inner: R) -> Self {
        Self::with_config(inner, RecordConfig::default())
    }

    /// Create a new record reader with explicit configuration.
    pub fn with_config(inner: R, config: RecordConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::new(),
            config,
            done: false,
        }
    }

    /// Read the next record (blocking).
    ///
    /// Returns `Ok(None)` at end of stream. A stream ending inside a frame is
    /// [`FrameError::TruncatedStream`], never a silent short record.
    pub fn try_read<M: Record>(&mut self) -> Result<Option<M>> {
        if self.done {
            return Ok(None);
        }

        let len = match self.read_prefix()? {
            None | Some(0) => {
                trace!("end of record stream");
                self.done = true;
                return Ok(None);
            }
            Some(len) => len as usize,
        };
        trace!(len, "frame");

        if len > self.config.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: len,
                max: self.config.max_payload_size,
            });
        }

        self.read_payload(len)?;

        let mut window: &[u8] = &self.buf[..len];
        let record = M::decode(&mut window)?;
        if !window.is_empty() {
            return Err(FrameError::TrailingBytes {
                remaining: window.len(),
            });
        }
        Ok(Some(record))
    }

    /// Read exactly one length prefix; `None` on clean EOF before any prefix
    /// byte.
    fn read_prefix(&mut self) -> Result<Option<u32>> {
        let mut prefix = [0u8; PREFIX_SIZE];
        let mut filled = 0;
        while filled < PREFIX_SIZE {
            match self.inner.read(&mut prefix[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                // A gzip filter over a cut-off file surfaces as UnexpectedEof.
                Err(err) if err.kind() == ErrorKind::UnexpectedEof => break,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        match filled {
            0 => Ok(None),
            PREFIX_SIZE => Ok(Some(decode_prefix(prefix))),
            got => Err(FrameError::TruncatedStream {
                expected: PREFIX_SIZE,
                got,
            }),
        }
    }

    /// Fill the scratch buffer with exactly `len` payload bytes.
    fn read_payload(&mut self, len: usize) -> Result<()> {
        self.buf.resize(len, 0);
        let mut filled = 0;
        while filled < len {
            match self.inner.read(&mut self.buf[filled..len]) {
                Ok(0) => {
                    return Err(FrameError::TruncatedStream {
                        expected: len,
                        got: filled,
                    })
                }
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::UnexpectedEof => {
                    return Err(FrameError::TruncatedStream {
                        expected: len,
                        got: filled,
                    })
                }
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        Ok(())
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Current reader configuration.
    pub fn config(&self) -> &RecordConfig {
        &self.config
    }
}

impl RecordReader<ByteSource> {
    /// Open `path` for reading with default configuration.
    ///
    /// A `.gz` suffix interposes a gzip decoder between the file and the
    /// codec; the selection is fixed for the session.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, RecordConfig::default())
    }

    /// Open `path` for reading with explicit configuration.
    pub fn open_with_config(path: impl AsRef<Path>, config: RecordConfig) -> Result<Self> {
        let source = ByteSource::open(path)?;
        Ok(Self::with_config(source, config))
    }
}
