//! Client-side chunked upload controller.
//!
//! [`Uploader`] owns one upload session at a time and drives it as an
//! explicit state machine consuming [`UploadCommand`]s from a channel.
//! Chunks are delivered strictly in order, one in flight at a time,
//! through the [`ChunkDelivery`] collaborator; each chunk gets a bounded
//! retry protocol with linear backoff. Pausing is cooperative: commands
//! take effect at chunk boundaries only, so an in-flight chunk always
//! resolves (or exhausts its retries) first.

mod controller;
mod delivery;
mod events;
mod retry;
mod source;

pub use controller::{UploadCommand, UploadState, Uploader, UploaderHandle};
pub use delivery::{ChunkDelivery, DeliveryError, DeliveryFuture, HttpDelivery};
pub use events::UploadEvent;
pub use retry::{Sleeper, TokioSleeper, retry_with_backoff};
pub use source::{FileSource, PathSource};

use std::time::Duration;

use chunkferry_protocol::{DEFAULT_BACKOFF_BASE_MS, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_RETRIES};
use chunkferry_transfer::TransferError;

/// Upload controller configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploaderConfig {
    /// Chunk size in bytes.
    pub chunk_size: usize,
    /// Delivery attempts per chunk before the session aborts.
    pub max_retries: u32,
    /// Backoff base; the wait after failed attempt `n` is `n * base`.
    pub backoff_base: Duration,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: Duration::from_millis(DEFAULT_BACKOFF_BASE_MS),
        }
    }
}

impl UploaderConfig {
    /// Checks the configuration for values that could never deliver a
    /// file. A zero chunk size or zero retry budget is rejected here
    /// rather than producing a session that always fails.
    pub fn validate(&self) -> Result<(), UploadError> {
        if self.chunk_size == 0 {
            return Err(UploadError::InvalidConfig("chunk_size must be > 0".into()));
        }
        if self.max_retries == 0 {
            return Err(UploadError::InvalidConfig("max_retries must be > 0".into()));
        }
        Ok(())
    }
}

/// Errors produced by the upload controller.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("no file selected")]
    NoFileSelected,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("chunk {chunk_index} failed after {attempts} attempts: {source}")]
    RetryExhausted {
        chunk_index: usize,
        attempts: u32,
        #[source]
        source: DeliveryError,
    },

    #[error(transparent)]
    Transfer(#[from] TransferError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_protocol_defaults() {
        let config = UploaderConfig::default();
        assert_eq!(config.chunk_size, 50_000);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.backoff_base, Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let config = UploaderConfig {
            chunk_size: 0,
            ..UploaderConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(UploadError::InvalidConfig(_))
        ));
    }

    #[test]
    fn zero_max_retries_is_rejected() {
        let config = UploaderConfig {
            max_retries: 0,
            ..UploaderConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(UploadError::InvalidConfig(_))
        ));
    }
}
