use std::path::PathBuf;

use crate::record::DecodeError;

/// Errors that can occur while reading or writing framed records.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The file could not be opened for the requested mode.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A write would produce a zero-length frame, which is reserved as the
    /// end-of-stream sentinel.
    #[error("zero-length record (reserved as end-of-stream sentinel)")]
    ZeroLength,

    /// A write was attempted on a record with required fields missing.
    #[error("record not fully initialized")]
    Uninitialized,

    /// A write was attempted after the end-of-stream sentinel.
    #[error("stream already terminated by sentinel")]
    Finished,

    /// The stream ended inside a frame (partial length prefix or short
    /// payload).
    #[error("truncated stream (expected {expected} bytes, got {got})")]
    TruncatedStream { expected: usize, got: usize },

    /// The decoder stopped short of its frame's declared boundary.
    #[error("decoder left {remaining} bytes of the frame unconsumed")]
    TrailingBytes { remaining: usize },

    /// The encoder produced a different number of bytes than it declared.
    #[error("encoded length mismatch (declared {expected}, wrote {actual})")]
    LengthMismatch { expected: usize, actual: usize },

    /// The payload bytes did not parse as a record.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// An I/O error occurred on the underlying byte stream.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<recstream_io::StoreError> for FrameError {
    fn from(err: recstream_io::StoreError) -> Self {
        match err {
            recstream_io::StoreError::Open { path, source } => FrameError::Open { path, source },
            recstream_io::StoreError::Io(io) | recstream_io::StoreError::Finalize(io) => {
                FrameError::Io(io)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
