use std::io::{ErrorKind, Write};
use std::path::Path;

use bytes::BytesMut;
use recstream_io::ByteSink;
use tracing::trace;

use crate::codec::{encode_prefix, RecordConfig, PREFIX_SIZE, SENTINEL};
use crate::error::{FrameError, Result};
use crate::record::Record;

/// Writes framed records to any `Write` stream.
///
/// Each record becomes one frame: a 4-byte little-endian length prefix then
/// the payload, with no padding or alignment. Zero-length payloads are
/// refused — on disk a zero prefix is the end-of-stream sentinel.
///
/// Individual writes are not flushed; durability comes at teardown (the sink
/// finalizes its compression filter and flushes when dropped or finished).
#[derive(Debug)]
pub struct RecordWriter<W> {
    inner: W,
    buf: BytesMut,
    config: RecordConfig,
    done: bool,
}

impl<W: Write> RecordWriter<W> {
    /// Create a new record writer with default configuration.
    pub fn new(inner: W) -> Self {
        Self::with_config(inner, RecordConfig::default())
    }

    /// Create a new record writer with explicit configuration.
    pub fn with_config(inner: W, config: RecordConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::new(),
            config,
            done: false,
        }
    }

    /// Frame and write one record (blocking).
    pub fn try_write<M: Record>(&mut self, record: &M) -> Result<()> {
        if self.done {
            return Err(FrameError::Finished);
        }
        if !record.is_initialized() {
            return Err(FrameError::Uninitialized);
        }

        let len = record.encoded_len();
        if len == 0 {
            return Err(FrameError::ZeroLength);
        }
        let max = self.config.max_payload_size.min(u32::MAX as usize);
        if len > max {
            return Err(FrameError::PayloadTooLarge { size: len, max });
        }

        self.buf.clear();
        self.buf.reserve(PREFIX_SIZE + len);
        self.buf.extend_from_slice(&encode_prefix(len as u32));
        record.encode(&mut self.buf);

        let actual = self.buf.len() - PREFIX_SIZE;
        if actual != len {
            return Err(FrameError::LengthMismatch {
                expected: len,
                actual,
            });
        }

        trace!(len, "frame");
        self.write_buffered()
    }

    /// Write the explicit zero-length end-of-stream marker.
    ///
    /// Optional: plain end-of-file at a frame boundary terminates a stream
    /// just as well. The sentinel latches the writer; later writes (and a
    /// second sentinel) are rejected with [`FrameError::Finished`].
    pub fn write_sentinel(&mut self) -> Result<()> {
        if self.done {
            return Err(FrameError::Finished);
        }
        self.buf.clear();
        self.buf.extend_from_slice(&SENTINEL);
        self.write_buffered()?;
        self.done = true;
        Ok(())
    }

    fn write_buffered(&mut self) -> Result<()> {
        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => {
                    return Err(FrameError::Io(std::io::Error::new(
                        ErrorKind::WriteZero,
                        "sink accepted no bytes",
                    )))
                }
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        Ok(())
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Current writer configuration.
    pub fn config(&self) -> &RecordConfig {
        &self.config
    }
}

impl RecordWriter<ByteSink> {
    /// Create (or truncate) `path` for writing with default configuration.
    ///
    /// A `.gz` suffix interposes a gzip encoder between the codec and the
    /// file; the selection is fixed for the session.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::create_with_config(path, RecordConfig::default())
    }

    /// Create (or truncate) `path` for writing with explicit configuration.
    pub fn create_with_config(path: impl AsRef<Path>, config: RecordConfig) -> Result<Self> {
        let sink = ByteSink::create(path)?;
        Ok(Self::with_config(sink, config))
    }

    /// Tear the stream down: finalize the compression envelope (if any) and
    /// flush all buffered output to the file.
    pub fn finish(self) -> Result<()> {
        self.inner.finish().map_err(FrameError::from)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::{Buf, BufMut, Bytes};

    use super::*;
    use crate::reader::RecordReader;
    use crate::record::DecodeError;

    #[test]
    fn frames_carry_prefix_then_payload() {
        let mut writer = RecordWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.try_write(&Bytes::from_static(b"hello")).unwrap();

        let wire = writer.into_inner().into_inner();
        assert_eq!(&wire[..4], &[0x05, 0x00, 0x00, 0x00]);
        assert_eq!(&wire[4..], b"hello");
    }

    #[test]
    fn no_padding_between_frames() {
        let mut writer = RecordWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.try_write(&Bytes::from_static(b"12345")).unwrap();
        writer.try_write(&Bytes::from_static(b"abc")).unwrap();

        let wire = writer.into_inner().into_inner();
        assert_eq!(wire.len(), 16);
        assert_eq!(&wire[..4], &[0x05, 0x00, 0x00, 0x00]);
        assert_eq!(&wire[4..9], b"12345");
        assert_eq!(&wire[9..13], &[0x03, 0x00, 0x00, 0x00]);
        assert_eq!(&wire[13..], b"abc");
    }

    #[test]
    fn zero_length_record_is_rejected_before_any_byte() {
        let mut writer = RecordWriter::new(Cursor::new(Vec::<u8>::new()));
        let err = writer.try_write(&Bytes::new()).unwrap_err();
        assert!(matches!(err, FrameError::ZeroLength));
        assert!(writer.into_inner().into_inner().is_empty());
    }

    #[test]
    fn uninitialized_record_is_rejected() {
        struct Partial;
        impl Record for Partial {
            fn decode<B: Buf>(_buf: &mut B) -> std::result::Result<Self, DecodeError> {
                Ok(Self)
            }
            fn encoded_len(&self) -> usize {
                1
            }
            fn encode(&self, dst: &mut BytesMut) {
                dst.put_u8(0);
            }
            fn is_initialized(&self) -> bool {
                false
            }
        }

        let mut writer = RecordWriter::new(Cursor::new(Vec::<u8>::new()));
        let err = writer.try_write(&Partial).unwrap_err();
        assert!(matches!(err, FrameError::Uninitialized));
        assert!(writer.into_inner().into_inner().is_empty());
    }

    #[test]
    fn oversized_record_is_rejected() {
        let config = RecordConfig {
            max_payload_size: 4,
        };
        let mut writer = RecordWriter::with_config(Cursor::new(Vec::<u8>::new()), config);
        let err = writer.try_write(&Bytes::from_static(b"oversized")).unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { size: 9, max: 4 }));
    }

    #[test]
    fn lying_encoder_is_caught() {
        struct Lies;
        impl Record for Lies {
            fn decode<B: Buf>(_buf: &mut B) -> std::result::Result<Self, DecodeError> {
                Ok(Self)
            }
            fn encoded_len(&self) -> usize {
                4
            }
            fn encode(&self, dst: &mut BytesMut) {
                dst.put_slice(b"123"); // one byte short of its declaration
            }
        }

        let mut writer = RecordWriter::new(Cursor::new(Vec::<u8>::new()));
        let err = writer.try_write(&Lies).unwrap_err();
        assert!(matches!(
            err,
            FrameError::LengthMismatch {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn sentinel_is_four_zero_bytes() {
        let mut writer = RecordWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.try_write(&Bytes::from_static(b"last")).unwrap();
        writer.write_sentinel().unwrap();

        let wire = writer.into_inner().into_inner();
        assert_eq!(&wire[wire.len() - 4..], &[0, 0, 0, 0]);
    }

    #[test]
    fn sentinel_latches_the_writer() {
        let mut writer = RecordWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.try_write(&Bytes::from_static(b"last")).unwrap();
        writer.write_sentinel().unwrap();

        // Frames after the sentinel would be invisible to readers.
        let err = writer.try_write(&Bytes::from_static(b"orphan")).unwrap_err();
        assert!(matches!(err, FrameError::Finished));
        let err = writer.write_sentinel().unwrap_err();
        assert!(matches!(err, FrameError::Finished));

        // Nothing was appended past the sentinel.
        let wire = writer.into_inner().into_inner();
        assert_eq!(wire.len(), 4 + 4 + 4);
        assert_eq!(&wire[wire.len() - 4..], &[0, 0, 0, 0]);
    }

    #[test]
    fn written_frames_read_back() {
        let mut writer = RecordWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.try_write(&Bytes::from_static(b"one")).unwrap();
        writer.try_write(&Bytes::from_static(b"two")).unwrap();

        let wire = writer.into_inner().into_inner();
        let mut reader = RecordReader::new(Cursor::new(wire));
        assert_eq!(
            reader.try_read::<Bytes>().unwrap().unwrap().as_ref(),
            b"one"
        );
        assert_eq!(
            reader.try_read::<Bytes>().unwrap().unwrap().as_ref(),
            b"two"
        );
        assert!(reader.try_read::<Bytes>().unwrap().is_none());
    }

    #[test]
    fn interrupted_write_retries() {
        struct InterruptedOnce {
            interrupted: bool,
            data: Vec<u8>,
        }
        impl Write for InterruptedOnce {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                if !self.interrupted {
                    self.interrupted = true;
                    return Err(std::io::Error::from(ErrorKind::Interrupted));
                }
                self.data.extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut writer = RecordWriter::new(InterruptedOnce {
            interrupted: false,
            data: Vec::new(),
        });
        writer.try_write(&Bytes::from_static(b"retry")).unwrap();
        assert_eq!(writer.into_inner().data.len(), 4 + 5);
    }

    #[test]
    fn zero_byte_sink_is_an_error() {
        struct ZeroWriter;
        impl Write for ZeroWriter {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Ok(0)
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut writer = RecordWriter::new(ZeroWriter);
        let err = writer.try_write(&Bytes::from_static(b"x")).unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::WriteZero));
    }

    #[test]
    fn create_in_missing_directory_reports_open_error() {
        let path = std::env::temp_dir()
            .join(format!(
                "recstream-frame-no-such-dir-{}-{}",
                std::process::id(),
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .expect("time should be after epoch")
                    .as_nanos()
            ))
            .join("out.dat");
        let err = RecordWriter::create(&path).unwrap_err();
        assert!(matches!(err, FrameError::Open { .. }));
    }
}
