use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::is_gzip_path;

const BUFFER_CAPACITY: usize = 64 * 1024;

#[cfg(unix)]
const CREATE_MODE: u32 = 0o644;

/// A sequential, blocking byte sink over one file.
///
/// Created with truncate semantics: opening an existing path discards its
/// contents. When the path ends in `.gz` a gzip encoder sits between the
/// caller and the file; callers always write the logical (uncompressed)
/// stream.
///
/// Output is buffered. Durability is guaranteed only at teardown: [`finish`]
/// (or `Drop`, best-effort) finalizes the gzip envelope and flushes the
/// buffer. There is no per-write flush.
///
/// [`finish`]: ByteSink::finish
pub struct ByteSink {
    inner: Option<SinkInner>,
    compressed: bool,
}

enum SinkInner {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl ByteSink {
    /// Create (or truncate) `path` for writing, interposing a gzip encoder
    /// iff the path ends in `.gz`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = open_write(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let buffered = BufWriter::with_capacity(BUFFER_CAPACITY, file);

        let compressed = is_gzip_path(path);
        let inner = if compressed {
            SinkInner::Gzip(GzEncoder::new(buffered, Compression::default()))
        } else {
            SinkInner::Plain(buffered)
        };
        debug!(?path, compressed, "created record stream");
        Ok(Self {
            inner: Some(inner),
            compressed,
        })
    }

    /// Whether a gzip encoder is interposed for this session.
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Finalize the compression envelope (if any) and flush all buffered
    /// output to the file.
    ///
    /// Dropping the sink performs the same teardown best-effort; call this
    /// when the error matters.
    pub fn finish(mut self) -> Result<()> {
        self.teardown().map_err(StoreError::Finalize)
    }

    fn teardown(&mut self) -> std::io::Result<()> {
        match self.inner.take() {
            None => Ok(()),
            Some(SinkInner::Plain(mut writer)) => writer.flush(),
            Some(SinkInner::Gzip(encoder)) => {
                let mut writer = encoder.finish()?;
                writer.flush()
            }
        }
    }
}

impl Write for ByteSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self.inner.as_mut() {
            Some(SinkInner::Plain(writer)) => writer.write(buf),
            Some(SinkInner::Gzip(encoder)) => encoder.write(buf),
            None => Err(std::io::Error::other("byte sink already finalized")),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self.inner.as_mut() {
            Some(SinkInner::Plain(writer)) => writer.flush(),
            Some(SinkInner::Gzip(encoder)) => encoder.flush(),
            None => Err(std::io::Error::other("byte sink already finalized")),
        }
    }
}

impl Drop for ByteSink {
    fn drop(&mut self) {
        if self.inner.is_some() {
            if let Err(err) = self.teardown() {
                warn!(%err, "failed to finalize record stream on drop");
            }
        }
    }
}

impl std::fmt::Debug for ByteSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteSink")
            .field("compressed", &self.compressed)
            .field("finalized", &self.inner.is_none())
            .finish()
    }
}

#[cfg(unix)]
fn open_write(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;

    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(CREATE_MODE)
        .open(path)
}

#[cfg(not(unix))]
fn open_write(path: &Path) -> std::io::Result<File> {
    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::path::PathBuf;

    use super::*;

    fn unique_temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "recstream-io-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ))
    }

    #[test]
    fn plain_write_reaches_file_after_finish() {
        let path = unique_temp_path("plain").with_extension("dat");
        let mut sink = ByteSink::create(&path).unwrap();
        assert!(!sink.is_compressed());

        sink.write_all(b"some frames").unwrap();
        sink.finish().unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"some frames");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn gz_write_produces_gzip_envelope() {
        let path = unique_temp_path("gz").with_extension("gz");
        let mut sink = ByteSink::create(&path).unwrap();
        assert!(sink.is_compressed());

        sink.write_all(b"logical stream").unwrap();
        sink.finish().unwrap();

        let raw = std::fs::read(&path).unwrap();
        // Gzip magic, then a stream that inflates back to the input.
        assert_eq!(&raw[..2], &[0x1f, 0x8b]);

        let mut decoder = flate2::read::GzDecoder::new(raw.as_slice());
        let mut inflated = Vec::new();
        decoder.read_to_end(&mut inflated).unwrap();
        assert_eq!(inflated, b"logical stream");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn drop_without_finish_still_flushes() {
        let path = unique_temp_path("drop").with_extension("gz");
        {
            let mut sink = ByteSink::create(&path).unwrap();
            sink.write_all(b"buffered").unwrap();
        }

        let raw = std::fs::read(&path).unwrap();
        let mut decoder = flate2::read::GzDecoder::new(raw.as_slice());
        let mut inflated = Vec::new();
        decoder.read_to_end(&mut inflated).unwrap();
        assert_eq!(inflated, b"buffered");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn create_truncates_existing_file() {
        let path = unique_temp_path("trunc").with_extension("dat");
        std::fs::write(&path, b"previous session, much longer").unwrap();

        let mut sink = ByteSink::create(&path).unwrap();
        sink.write_all(b"new").unwrap();
        sink.finish().unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"new");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn create_in_missing_directory_reports_open_error() {
        let path = unique_temp_path("missing-dir").join("out.dat");
        let err = ByteSink::create(&path).unwrap_err();
        assert!(matches!(err, StoreError::Open { .. }));
    }
}
