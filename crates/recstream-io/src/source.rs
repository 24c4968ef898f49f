use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::is_gzip_path;

const BUFFER_CAPACITY: usize = 64 * 1024;

/// A sequential, blocking byte source over one file.
///
/// Owns the descriptor for its entire lifetime. When the path ends in `.gz`
/// a gzip decoder sits between the file and the caller, so the bytes read
/// are always the logical (uncompressed) stream. The filter selection is
/// made once at open and is immutable for the session.
pub struct ByteSource {
    inner: SourceInner,
}

enum SourceInner {
    Plain(BufReader<File>),
    Gzip(GzDecoder<BufReader<File>>),
}

impl ByteSource {
    /// Open `path` for reading, interposing a gzip decoder iff the path ends
    /// in `.gz`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = open_read(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let buffered = BufReader::with_capacity(BUFFER_CAPACITY, file);

        let inner = if is_gzip_path(path) {
            SourceInner::Gzip(GzDecoder::new(buffered))
        } else {
            SourceInner::Plain(buffered)
        };
        debug!(?path, compressed = matches!(inner, SourceInner::Gzip(_)), "opened record stream");
        Ok(Self { inner })
    }

    /// Whether a gzip decoder is interposed for this session.
    pub fn is_compressed(&self) -> bool {
        matches!(self.inner, SourceInner::Gzip(_))
    }
}

impl Read for ByteSource {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            SourceInner::Plain(reader) => reader.read(buf),
            SourceInner::Gzip(decoder) => decoder.read(buf),
        }
    }
}

impl std::fmt::Debug for ByteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteSource")
            .field("compressed", &self.is_compressed())
            .finish()
    }
}

#[cfg(target_os = "linux")]
fn open_read(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;

    // O_NOATIME is refused unless the caller owns the file; retry plain.
    match std::fs::OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_NOATIME)
        .open(path)
    {
        Ok(file) => Ok(file),
        Err(err) if err.kind() == std::io::ErrorKind::PermissionDenied => File::open(path),
        Err(err) => Err(err),
    }
}

#[cfg(not(target_os = "linux"))]
fn open_read(path: &Path) -> std::io::Result<File> {
    File::open(path)
}
