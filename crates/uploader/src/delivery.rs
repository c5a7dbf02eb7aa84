//! The "deliver one chunk over the network" collaborator.
//!
//! `ChunkDelivery` is implemented over plain HTTP by [`HttpDelivery`].
//! Using a trait keeps the controller decoupled from transport and
//! testable with mocks.

use std::future::Future;
use std::pin::Pin;

use chunkferry_protocol::{CHUNK_CONTENT_TYPE, ChunkAck, FILE_NAME_HEADER, UPLOAD_PATH};
use tracing::debug;

/// A boxed future returned by [`ChunkDelivery::deliver`].
pub type DeliveryFuture<'a> = Pin<Box<dyn Future<Output = Result<ChunkAck, DeliveryError>> + Send + 'a>>;

/// Errors from a single delivery attempt.
///
/// Any variant counts as one failed attempt; the retry protocol decides
/// whether to try again.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server rejected chunk ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Abstract chunk transport.
///
/// Implementations must copy whatever they need out of `file_name` and
/// `data` before constructing the returned future.
pub trait ChunkDelivery: Send + Sync {
    /// Delivers one chunk; resolves to the receiver's acknowledgment.
    fn deliver(&self, file_name: &str, chunk_index: usize, data: &[u8]) -> DeliveryFuture<'_>;
}

/// HTTP chunk transport: POSTs raw chunk bytes to the receiver's upload
/// path with the target file name in a request header.
pub struct HttpDelivery {
    client: reqwest::Client,
    upload_url: String,
}

impl HttpDelivery {
    /// Creates a delivery client for the receiver at `base_url`
    /// (e.g. `http://192.168.1.20:8080`).
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            upload_url: format!("{}{}", base_url.trim_end_matches('/'), UPLOAD_PATH),
        }
    }

    /// The full upload URL requests are sent to.
    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }
}

impl ChunkDelivery for HttpDelivery {
    fn deliver(&self, file_name: &str, chunk_index: usize, data: &[u8]) -> DeliveryFuture<'_> {
        // Build the request eagerly so the future owns its inputs.
        let request = self
            .client
            .post(&self.upload_url)
            .header("content-type", CHUNK_CONTENT_TYPE)
            .header(FILE_NAME_HEADER, file_name)
            .body(data.to_vec());
        let bytes = data.len();

        Box::pin(async move {
            let response = request.send().await?;
            let status = response.status();

            if !status.is_success() {
                // Prefer the structured ack message when the server sent one.
                let message = match response.json::<ChunkAck>().await {
                    Ok(ack) => ack.message,
                    Err(_) => status.to_string(),
                };
                return Err(DeliveryError::Rejected {
                    status: status.as_u16(),
                    message,
                });
            }

            let ack = response.json::<ChunkAck>().await?;
            debug!(chunk = chunk_index, bytes, "chunk accepted");
            Ok(ack)
        })
    }
}
