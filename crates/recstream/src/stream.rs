//! Consumer-facing stream handles with fail-fast semantics.
//!
//! [`Reader`] and [`Writer`] bind to one file path for one directional
//! session. They own the descriptor and its filter chain exclusively and
//! release them in reverse construction order when dropped.
//!
//! This surface is for trusted offline pipelines: every failure — unusable
//! path, truncated stream, undecodable payload, zero-length record — is
//! treated as unrecoverable corruption. It is reported with full diagnostic
//! context through [`recstream_diag`] and the process aborts. Use the
//! `try_*` API of [`recstream_frame`] where errors must be observable.

use std::path::{Path, PathBuf};

use recstream_diag as diag;
use recstream_frame::{Record, RecordConfig, RecordReader, RecordWriter};
use recstream_io::{ByteSink, ByteSource};

/// A read session over one record-stream file.
pub struct Reader {
    inner: RecordReader<ByteSource>,
    path: PathBuf,
}

impl Reader {
    /// Open `path` for reading. A nonexistent or unreadable path is fatal.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::open_with_config(path, RecordConfig::default())
    }

    /// Open `path` for reading with explicit codec configuration.
    pub fn open_with_config(path: impl AsRef<Path>, config: RecordConfig) -> Self {
        let path = path.as_ref();
        match RecordReader::open_with_config(path, config) {
            Ok(inner) => Self {
                inner,
                path: path.to_path_buf(),
            },
            Err(err) => diag::fail!("Reader::open", "{err}"),
        }
    }

    /// Read the next record; `None` at end of stream (explicit sentinel or
    /// end-of-file at a frame boundary).
    ///
    /// Anything between those two outcomes — a partial frame, an oversized
    /// length, a payload that does not decode, a decoder that leaves bytes
    /// unconsumed — is fatal.
    pub fn try_read<M: Record>(&mut self) -> Option<M> {
        match self.inner.try_read() {
            Ok(record) => record,
            Err(err) => diag::fail!("Reader::try_read", "{} in {}", err, self.path.display()),
        }
    }

    /// The path this session was opened on.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for Reader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader").field("path", &self.path).finish()
    }
}

/// A write session over one record-stream file.
///
/// Created with truncate semantics. Dropping the writer finalizes the
/// compression envelope and flushes best-effort; call [`finish`] when the
/// teardown outcome matters.
///
/// [`finish`]: Writer::finish
pub struct Writer {
    inner: RecordWriter<ByteSink>,
    path: PathBuf,
}

impl Writer {
    /// Create (or truncate) `path` for writing. An unusable path is fatal.
    pub fn create(path: impl AsRef<Path>) -> Self {
        Self::create_with_config(path, RecordConfig::default())
    }

    /// Create (or truncate) `path` for writing with explicit codec
    /// configuration.
    pub fn create_with_config(path: impl AsRef<Path>, config: RecordConfig) -> Self {
        let path = path.as_ref();
        match RecordWriter::create_with_config(path, config) {
            Ok(inner) => Self {
                inner,
                path: path.to_path_buf(),
            },
            Err(err) => diag::fail!("Writer::create", "{err}"),
        }
    }

    /// Frame and write one record.
    ///
    /// The record must be fully initialized and serialize to at least one
    /// byte (a zero length would forge the end-of-stream sentinel); either
    /// violation is fatal.
    pub fn write<M: Record>(&mut self, record: &M) {
        diag::check1!(
            record.is_initialized(),
            "Writer::write",
            "record not fully initialized ({})",
            self.path.display()
        );
        diag::check1!(
            record.encoded_len() > 0,
            "Writer::write",
            "zero sized record ({})",
            self.path.display()
        );
        if let Err(err) = self.inner.try_write(record) {
            diag::fail!("Writer::write", "{} in {}", err, self.path.display());
        }
    }

    /// Write the explicit zero-length end-of-stream marker.
    pub fn write_sentinel(&mut self) {
        if let Err(err) = self.inner.write_sentinel() {
            diag::fail!("Writer::write_sentinel", "{} in {}", err, self.path.display());
        }
    }

    /// Tear the session down, finalizing the compression envelope and
    /// flushing all buffered output. Failure to do so is fatal.
    pub fn finish(self) {
        let Self { inner, path } = self;
        if let Err(err) = inner.finish() {
            diag::fail!("Writer::finish", "{} in {}", err, path.display());
        }
    }

    /// The path this session was created on.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for Writer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Writer").field("path", &self.path).finish()
    }
}
