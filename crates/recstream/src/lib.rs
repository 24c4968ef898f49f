//! Length-delimited record-stream files with optional gzip compression.
//!
//! recstream persists and replays sequences of serialized records. On disk a
//! stream is zero or more frames — `{length: u32 LE}{payload: length bytes}`
//! — optionally ending with an explicit zero-length sentinel, and wrapped in
//! a gzip envelope iff the path ends in `.gz`.
//!
//! # Crate Structure
//!
//! - [`io`] — File byte source/sink with suffix-selected gzip filtering
//! - [`frame`] — Bounded frame codec: `Record` trait, reader, writer
//! - [`diag`] — Leveled fail-fast assertions
//! - [`Reader`]/[`Writer`] — Consumer-facing stream handles: fatal on any
//!   invariant violation, with full diagnostic context
//!
//! The `Reader`/`Writer` pair is the offline-pipeline surface: open, stream,
//! tear down; any irregularity aborts. Callers that need to observe errors
//! (tests, tooling) use the `try_*` API of [`frame`] directly.

pub mod stream;

pub use stream::{Reader, Writer};

/// Re-export byte-stream backend types.
pub mod io {
    pub use recstream_io::*;
}

/// Re-export frame codec types.
pub mod frame {
    pub use recstream_frame::*;
}

/// Re-export the fail-fast diagnostics facility.
pub mod diag {
    pub use recstream_diag::*;
}

pub use recstream_frame::{DecodeError, Record};
