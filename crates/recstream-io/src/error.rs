use std::path::PathBuf;

/// Errors that can occur in the file byte-stream backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Failed to open the file for the requested mode.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred on the byte stream.
    #[error("record store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to finalize the compression filter or flush buffered output.
    #[error("failed to finalize output stream: {0}")]
    Finalize(std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
