//! Receiver lifecycle: directory bootstrap, bind, serve, shutdown.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::ReceiverError;
use crate::app::{AppState, router};

/// Receiver configuration.
#[derive(Debug, Clone)]
pub struct ReceiverConfig {
    /// TCP port to listen on (0 = OS-assigned).
    pub port: u16,
    /// Directory served as static content.
    pub public_dir: PathBuf,
    /// Directory output files are appended into.
    pub uploads_dir: PathBuf,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            port: 0,
            public_dir: PathBuf::from("public"),
            uploads_dir: PathBuf::from("uploads"),
        }
    }
}

/// The chunk receiver server.
pub struct Receiver {
    config: ReceiverConfig,
    cancel: CancellationToken,
    local_addr: Mutex<Option<SocketAddr>>,
}

impl Receiver {
    /// Creates a new receiver with the given configuration.
    pub fn new(config: ReceiverConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            cancel: CancellationToken::new(),
            local_addr: Mutex::new(None),
        })
    }

    /// Returns the local address the server is listening on.
    ///
    /// Only available after [`run`](Self::run) binds the socket.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock().await
    }

    /// Returns the listening port (0 if not yet bound).
    pub async fn port(&self) -> u16 {
        self.local_addr.lock().await.map(|a| a.port()).unwrap_or(0)
    }

    /// Gracefully shuts down the server.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Runs the server until cancellation.
    ///
    /// Creates the public/uploads directories, clears leftover uploads
    /// from a previous run, binds the configured port and serves until
    /// [`shutdown`](Self::shutdown).
    pub async fn run(self: &Arc<Self>) -> Result<(), ReceiverError> {
        prepare_dirs(&self.config);

        let state = AppState::new(&self.config.uploads_dir);
        let app = router(state, &self.config.public_dir);

        let addr: SocketAddr = ([0, 0, 0, 0], self.config.port).into();
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        *self.local_addr.lock().await = Some(local_addr);
        info!("receiver listening on {local_addr}");

        axum::serve(listener, app)
            .with_graceful_shutdown(self.cancel.clone().cancelled_owned())
            .await?;
        info!("receiver shut down");
        Ok(())
    }
}

/// Creates the working directories and clears files left in the uploads
/// directory by a previous run. Failures here are logged and never block
/// startup.
fn prepare_dirs(config: &ReceiverConfig) {
    for dir in [&config.public_dir, &config.uploads_dir] {
        if let Err(e) = std::fs::create_dir_all(dir) {
            warn!(dir = %dir.display(), error = %e, "failed to create directory");
        }
    }

    let entries = match std::fs::read_dir(&config.uploads_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "failed to read uploads directory for cleanup");
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!(file = %path.display(), error = %e, "failed to remove stale upload");
            }
        }
    }
}
