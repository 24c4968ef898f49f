//! Wire-level constants and configuration for the frame codec.

/// Size of the length prefix: one little-endian `u32`.
pub const PREFIX_SIZE: usize = 4;

/// The explicit end-of-stream marker: a zero-length frame.
pub const SENTINEL: [u8; PREFIX_SIZE] = [0; PREFIX_SIZE];

/// Default maximum payload size: 256 MiB.
///
/// The prefix admits up to 4 GiB − 1; this guard keeps a corrupt or hostile
/// length from turning into a multi-gigabyte allocation. Raise it through
/// [`RecordConfig`] for streams that genuinely carry larger records.
pub const DEFAULT_MAX_PAYLOAD: usize = 256 * 1024 * 1024;

/// Encode a payload length as the on-disk prefix bytes.
pub fn encode_prefix(len: u32) -> [u8; PREFIX_SIZE] {
    len.to_le_bytes()
}

/// Decode the on-disk prefix bytes into a payload length.
pub fn decode_prefix(bytes: [u8; PREFIX_SIZE]) -> u32 {
    u32::from_le_bytes(bytes)
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct RecordConfig {
    /// Maximum payload size in bytes, enforced on both read and write.
    pub max_payload_size: usize,
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}
