use bytes::{Buf, BufMut, Bytes, BytesMut};

/// The payload bytes did not parse as a record.
#[derive(Debug, Clone, thiserror::Error)]
#[error("record decode failed: {reason}")]
pub struct DecodeError {
    reason: String,
}

impl DecodeError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// An opaque unit of stream content.
///
/// The codec never inspects record content; it only enforces length bounds.
/// A decoder is handed a window of exactly its frame's declared length and
/// must consume all of it — the reader rejects leftover bytes, and the window
/// itself makes over-reading impossible. An encoder must append exactly
/// [`encoded_len`] bytes — the writer verifies.
///
/// [`encoded_len`]: Record::encoded_len
pub trait Record: Sized {
    /// Parse from a window of exactly the framed length, consuming it fully.
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, DecodeError>;

    /// Serialized length in bytes.
    fn encoded_len(&self) -> usize;

    /// Append the serialized form to `dst`.
    fn encode(&self, dst: &mut BytesMut);

    /// Whether all required fields are present. Writing a record for which
    /// this returns `false` is an error.
    fn is_initialized(&self) -> bool {
        true
    }
}

/// Raw payload bytes, for streams whose records need no further structure.
impl Record for Bytes {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, DecodeError> {
        Ok(buf.copy_to_bytes(buf.remaining()))
    }

    fn encoded_len(&self) -> usize {
        self.len()
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_slice(self);
    }
}
