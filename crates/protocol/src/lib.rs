//! Wire types and constants for the chunkferry upload protocol.
//!
//! The protocol is a single repeated exchange: the client POSTs one raw
//! chunk to [`UPLOAD_PATH`] with the target file name in the
//! [`FILE_NAME_HEADER`] header, and the receiver replies with a
//! [`ChunkAck`] JSON body.

use serde::{Deserialize, Serialize};

/// Path the receiver accepts chunk POSTs on.
pub const UPLOAD_PATH: &str = "/upload";

/// Request header carrying the target file name.
pub const FILE_NAME_HEADER: &str = "file-name";

/// Content type of a chunk body (opaque bytes).
pub const CHUNK_CONTENT_TYPE: &str = "application/octet-stream";

/// Default chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 50_000;

/// Default number of delivery attempts per chunk.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default backoff base in milliseconds (the wait before attempt 2 is
/// one base; subsequent waits grow linearly).
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 1_000;

/// Outcome tag of a chunk acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckStatus {
    Success,
    Error,
}

/// Structured acknowledgment returned by the receiver for one chunk.
///
/// Serialized as `{"status":"success","message":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkAck {
    pub status: AckStatus,
    pub message: String,
}

impl ChunkAck {
    /// Creates a success acknowledgment.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: AckStatus::Success,
            message: message.into(),
        }
    }

    /// Creates an error acknowledgment.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: AckStatus::Error,
            message: message.into(),
        }
    }

    /// Returns `true` if the chunk was accepted.
    pub fn is_success(&self) -> bool {
        self.status == AckStatus::Success
    }
}
