//! Bounded length-delimited frame codec for record-stream files.
//!
//! This is the core value-add layer of recstream. Every record on disk is one
//! frame:
//! - A 4-byte little-endian payload length
//! - Exactly that many payload bytes
//!
//! A zero length is the reserved end-of-stream sentinel, never a valid
//! payload. Each parse is restricted to exactly its frame's window; a decoder
//! can neither read past its frame nor stop short of it silently.

pub mod codec;
pub mod error;
pub mod reader;
pub mod record;
pub mod writer;

pub use codec::{decode_prefix, encode_prefix, RecordConfig, DEFAULT_MAX_PAYLOAD, PREFIX_SIZE, SENTINEL};
pub use error::{FrameError, Result};
pub use reader::RecordReader;
pub use record::{DecodeError, Record};
pub use writer::RecordWriter;
