//! Upload session state machine.
//!
//! One [`Uploader`] task owns all session state and consumes commands
//! from a channel, so a resume can never race a fresh start: every
//! transition happens inside the single loop in [`Uploader::run`].

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use chunkferry_transfer::BackoffPolicy;

use crate::delivery::ChunkDelivery;
use crate::events::UploadEvent;
use crate::retry::{Sleeper, TokioSleeper, retry_with_backoff};
use crate::source::FileSource;
use crate::{UploadError, UploaderConfig};

/// Discrete commands driving the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadCommand {
    /// Begin a session, or resume one that aborted. A no-op while a
    /// session is running or paused.
    Start,
    /// Flip between running and paused. Takes effect at the next chunk
    /// boundary; an in-flight chunk always resolves first.
    TogglePause,
    /// Stop the control loop.
    Shutdown,
}

/// Session lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Running,
    Paused,
    Completed,
    Aborted,
}

/// Cloneable command sender for a running [`Uploader`].
#[derive(Clone)]
pub struct UploaderHandle {
    commands: mpsc::Sender<UploadCommand>,
}

impl UploaderHandle {
    pub async fn start(&self) {
        let _ = self.commands.send(UploadCommand::Start).await;
    }

    pub async fn toggle_pause(&self) {
        let _ = self.commands.send(UploadCommand::TogglePause).await;
    }

    pub async fn shutdown(&self) {
        let _ = self.commands.send(UploadCommand::Shutdown).await;
    }
}

/// Drives one upload session at a time to completion, pause or abort.
pub struct Uploader {
    config: UploaderConfig,
    source: Arc<dyn FileSource>,
    delivery: Arc<dyn ChunkDelivery>,
    sleeper: Arc<dyn Sleeper>,
    commands: mpsc::Receiver<UploadCommand>,
    events: mpsc::Sender<UploadEvent>,
    state: UploadState,
    snapshot: Option<chunkferry_transfer::FileSnapshot>,
    /// Index of the next chunk to deliver. Monotonically non-decreasing
    /// within a session; reset to 0 only on completion or a fresh start.
    next_index: usize,
    shutdown: bool,
}

impl Uploader {
    /// Creates an uploader with the tokio sleeper.
    ///
    /// Returns the uploader (to be driven via [`run`](Self::run)), its
    /// command handle, and the status event stream.
    pub fn new(
        config: UploaderConfig,
        source: Arc<dyn FileSource>,
        delivery: Arc<dyn ChunkDelivery>,
    ) -> Result<(Self, UploaderHandle, mpsc::Receiver<UploadEvent>), UploadError> {
        Self::with_sleeper(config, source, delivery, Arc::new(TokioSleeper))
    }

    /// Like [`new`](Self::new) but with an injected sleeper, so tests
    /// can observe backoff waits without real timers.
    pub fn with_sleeper(
        config: UploaderConfig,
        source: Arc<dyn FileSource>,
        delivery: Arc<dyn ChunkDelivery>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<(Self, UploaderHandle, mpsc::Receiver<UploadEvent>), UploadError> {
        config.validate()?;
        let (commands_tx, commands_rx) = mpsc::channel(32);
        let (events_tx, events_rx) = mpsc::channel(256);
        let uploader = Self {
            config,
            source,
            delivery,
            sleeper,
            commands: commands_rx,
            events: events_tx,
            state: UploadState::Idle,
            snapshot: None,
            next_index: 0,
            shutdown: false,
        };
        let handle = UploaderHandle {
            commands: commands_tx,
        };
        Ok((uploader, handle, events_rx))
    }

    /// Current state.
    pub fn state(&self) -> UploadState {
        self.state
    }

    /// Index of the most recently confirmed chunk, if any chunk of the
    /// current session has been confirmed.
    pub fn last_confirmed(&self) -> Option<usize> {
        self.next_index.checked_sub(1)
    }

    /// Index of the next chunk to deliver.
    pub fn next_chunk_index(&self) -> usize {
        self.next_index
    }

    /// Consumes commands and drives sessions until [`UploadCommand::Shutdown`]
    /// arrives or every handle is dropped (a running session still
    /// finishes first). Returns itself so callers can inspect the final
    /// state.
    pub async fn run(mut self) -> Self {
        loop {
            if self.shutdown {
                break;
            }
            if self.state == UploadState::Running {
                // Commands queued during the previous chunk take effect
                // here, at the chunk boundary.
                while let Ok(cmd) = self.commands.try_recv() {
                    self.apply_command(cmd).await;
                }
                if self.state != UploadState::Running || self.shutdown {
                    continue;
                }
                if let Err(error) = self.process_next_chunk().await {
                    self.state = UploadState::Aborted;
                    warn!(error = %error, "upload aborted");
                    let _ = self
                        .events
                        .send(UploadEvent::Failed {
                            message: error.to_string(),
                        })
                        .await;
                }
            } else {
                match self.commands.recv().await {
                    Some(cmd) => self.apply_command(cmd).await,
                    None => break,
                }
            }
        }
        self
    }

    async fn apply_command(&mut self, cmd: UploadCommand) {
        match (cmd, self.state) {
            (
                UploadCommand::Start,
                UploadState::Idle | UploadState::Completed | UploadState::Aborted,
            ) => {
                if self.snapshot.is_none() {
                    match self.source.snapshot() {
                        Ok(snapshot) => {
                            info!(
                                file = %snapshot.name(),
                                bytes = snapshot.size(),
                                chunks = snapshot.total_chunks(self.config.chunk_size),
                                "starting upload"
                            );
                            self.next_index = 0;
                            self.snapshot = Some(snapshot);
                        }
                        Err(error) => {
                            warn!(error = %error, "cannot start upload");
                            let _ = self
                                .events
                                .send(UploadEvent::Failed {
                                    message: error.to_string(),
                                })
                                .await;
                            return;
                        }
                    }
                } else {
                    info!(next_chunk = self.next_index, "resuming aborted upload");
                }
                self.state = UploadState::Running;
            }
            (UploadCommand::Start, UploadState::Running | UploadState::Paused) => {
                debug!("upload already in progress; ignoring start");
            }
            (UploadCommand::TogglePause, UploadState::Running) => {
                self.state = UploadState::Paused;
                if let Some(snapshot) = &self.snapshot {
                    let total = snapshot.total_chunks(self.config.chunk_size);
                    info!(next_chunk = self.next_index, total, "upload paused");
                    let _ = self
                        .events
                        .send(UploadEvent::Paused {
                            next_chunk: self.next_index,
                            total,
                        })
                        .await;
                }
            }
            (UploadCommand::TogglePause, UploadState::Paused) => {
                info!(next_chunk = self.next_index, "upload resumed");
                self.state = UploadState::Running;
            }
            (UploadCommand::TogglePause, _) => {
                debug!("no session to pause; ignoring");
            }
            (UploadCommand::Shutdown, _) => {
                self.shutdown = true;
            }
        }
    }

    /// Delivers the next chunk (with its full retry protocol), or
    /// finishes the session when every chunk is confirmed.
    async fn process_next_chunk(&mut self) -> Result<(), UploadError> {
        let Some(snapshot) = self.snapshot.take() else {
            self.state = UploadState::Idle;
            return Ok(());
        };

        let total = snapshot.total_chunks(self.config.chunk_size);
        if self.next_index >= total {
            info!(file = %snapshot.name(), chunks = total, "upload complete");
            self.state = UploadState::Completed;
            self.next_index = 0;
            let _ = self.events.send(UploadEvent::Completed).await;
            return Ok(());
        }

        let index = self.next_index;
        let policy = BackoffPolicy::new(self.config.backoff_base);
        let result = {
            let Some(chunk) = snapshot.chunk(index, self.config.chunk_size) else {
                // Unreachable given the bound check above; restore and bail.
                self.snapshot = Some(snapshot);
                return Ok(());
            };
            let delivery = self.delivery.as_ref();
            let name = snapshot.name();
            retry_with_backoff(
                self.config.max_retries,
                policy,
                self.sleeper.as_ref(),
                || delivery.deliver(name, index, chunk.data),
            )
            .await
        };
        self.snapshot = Some(snapshot);

        match result {
            Ok(_ack) => {
                self.next_index = index + 1;
                debug!(chunk = index, total, "chunk confirmed");
                let _ = self
                    .events
                    .send(UploadEvent::Progress {
                        uploaded: self.next_index,
                        total,
                    })
                    .await;
                Ok(())
            }
            Err(exhausted) => Err(UploadError::RetryExhausted {
                chunk_index: index,
                attempts: exhausted.attempts,
                source: exhausted.last_error,
            }),
        }
    }
}
