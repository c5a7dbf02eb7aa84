//! Chunked view over an in-memory file snapshot, plus the retry backoff
//! policy and file-name validation shared with the receiver.

mod backoff;
mod snapshot;
mod validation;

pub use backoff::BackoffPolicy;
pub use snapshot::{Chunk, FileSnapshot, total_chunks};
pub use validation::validate_file_name;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid file name: {0}")]
    InvalidName(String),
}
