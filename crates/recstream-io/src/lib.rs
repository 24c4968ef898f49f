//! Byte-stream backend for record-stream files.
//!
//! Provides a sequential, blocking byte source ([`ByteSource`]) and sink
//! ([`ByteSink`]) over one file each, with a gzip filter interposed when the
//! path carries the `.gz` suffix. The stream presented to the layers above is
//! always logically uncompressed; compression is an on-disk-only concern.
//!
//! This is the lowest layer of recstream. The frame codec builds on top of
//! the `Read`/`Write` types provided here.

pub mod error;
pub mod sink;
pub mod source;

pub use error::{Result, StoreError};
pub use sink::ByteSink;
pub use source::ByteSource;

use std::path::Path;

/// Whether `path` selects the gzip filter.
///
/// Exact, case-sensitive tail match on the literal bytes `.gz`. No content
/// sniffing: a gzip file under another name is read raw, and vice versa.
pub fn is_gzip_path(path: &Path) -> bool {
    path.as_os_str().as_encoded_bytes().ends_with(b".gz")
}
