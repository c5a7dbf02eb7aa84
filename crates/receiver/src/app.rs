//! Request routing and the chunk append handler.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use axum::routing::post;
use tokio::io::AsyncWriteExt;
use tower_http::services::ServeDir;
use tracing::{debug, error};

use chunkferry_protocol::{ChunkAck, FILE_NAME_HEADER, UPLOAD_PATH};
use chunkferry_transfer::validate_file_name;

/// Shared handler state: the uploads directory plus one append lock per
/// output file name.
#[derive(Clone)]
pub struct AppState {
    uploads_dir: PathBuf,
    locks: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

impl AppState {
    pub fn new(uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The lock guarding appends to `name`, created on first use.
    fn lock_for(&self, name: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(
            locks
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }

    /// Appends `data` to the output file for `name`, holding the
    /// per-name lock for the whole open/write/flush sequence so
    /// concurrent requests for one name cannot interleave.
    ///
    /// Names are validated before they reach here, so `name` is always a
    /// single path component directly inside the uploads directory.
    async fn append_chunk(&self, name: &str, data: &[u8]) -> std::io::Result<()> {
        let lock = self.lock_for(name);
        let result = async {
            let _guard = lock.lock().await;
            let path = self.uploads_dir.join(name);
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .await?;
            file.write_all(data).await?;
            file.flush().await
        }
        .await;
        drop(lock);
        self.prune_lock(name);
        result
    }

    /// Removes the lock entry for `name` when no request holds it, so
    /// the map stays bounded by the number of in-flight names rather
    /// than every name ever seen. Callers must drop their clone first.
    fn prune_lock(&self, name: &str) {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if locks.get(name).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(name);
        }
    }
}

/// Builds the receiver's router: the upload endpoint plus static file
/// serving from `public_dir` (content type from the file extension,
/// `application/octet-stream` fallback).
pub fn router(state: AppState, public_dir: &Path) -> Router {
    Router::new()
        .route(UPLOAD_PATH, post(handle_upload))
        .fallback_service(ServeDir::new(public_dir))
        .with_state(state)
}

async fn handle_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<ChunkAck>) {
    let Some(name) = headers
        .get(FILE_NAME_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        return ack_error(StatusCode::BAD_REQUEST, "missing file-name header");
    };

    if let Err(invalid) = validate_file_name(name) {
        return ack_error(StatusCode::BAD_REQUEST, invalid.to_string());
    }

    match state.append_chunk(name, &body).await {
        Ok(()) => {
            debug!(file = name, bytes = body.len(), "chunk appended");
            (
                StatusCode::CREATED,
                Json(ChunkAck::success("Chunk uploaded successfully")),
            )
        }
        Err(io_err) => {
            error!(file = name, error = %io_err, "chunk write failed");
            ack_error(StatusCode::INTERNAL_SERVER_ERROR, io_err.to_string())
        }
    }
}

fn ack_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ChunkAck>) {
    (status, Json(ChunkAck::error(message)))
}
