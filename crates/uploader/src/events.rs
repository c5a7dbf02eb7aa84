//! Status events emitted by the controller.
//!
//! The status surface is one-way and observational: anything that can
//! format an event (the `Display` impl renders the canonical strings)
//! can act as the display collaborator.

use std::fmt;

/// Progress and lifecycle events for one upload session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    /// A chunk was confirmed; `uploaded` chunks of `total` are done.
    Progress { uploaded: usize, total: usize },
    /// The session stopped at a chunk boundary; `next_chunk` is the
    /// first index that has not been delivered.
    Paused { next_chunk: usize, total: usize },
    /// All chunks delivered; session state has been reset.
    Completed,
    /// The session aborted.
    Failed { message: String },
}

impl fmt::Display for UploadEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Progress { uploaded, total } => {
                write!(f, "Uploaded {uploaded}/{total} chunks")
            }
            Self::Paused { next_chunk, total } => {
                write!(f, "Paused at chunk {next_chunk}/{total}")
            }
            Self::Completed => write!(f, "Upload complete!"),
            Self::Failed { message } => write!(f, "Error: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_canonical_status_strings() {
        assert_eq!(
            UploadEvent::Progress {
                uploaded: 1,
                total: 3
            }
            .to_string(),
            "Uploaded 1/3 chunks"
        );
        assert_eq!(
            UploadEvent::Paused {
                next_chunk: 2,
                total: 3
            }
            .to_string(),
            "Paused at chunk 2/3"
        );
        assert_eq!(UploadEvent::Completed.to_string(), "Upload complete!");
        assert_eq!(
            UploadEvent::Failed {
                message: "no file selected".into()
            }
            .to_string(),
            "Error: no file selected"
        );
    }
}
