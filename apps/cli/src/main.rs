//! Command line upload client.
//!
//! Splits the given file into chunks and streams them to a chunkferry
//! server, printing each status line as it arrives. With `--interactive`,
//! pressing Enter toggles pause/resume at the next chunk boundary.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use chunkferry_uploader::{
    HttpDelivery, PathSource, UploadEvent, Uploader, UploaderConfig,
};

#[derive(Parser)]
#[command(name = "chunkferry", version, about = "Chunked file upload client")]
struct Args {
    /// File to upload.
    file: PathBuf,

    /// Base URL of the receiver.
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server: String,

    /// Chunk size in bytes.
    #[arg(long, default_value_t = 50_000)]
    chunk_size: usize,

    /// Delivery attempts per chunk before the upload aborts.
    #[arg(long, default_value_t = 3)]
    max_retries: u32,

    /// Base backoff delay between retries, in milliseconds.
    #[arg(long, default_value_t = 1_000)]
    backoff_ms: u64,

    /// Read stdin; each Enter toggles pause/resume.
    #[arg(long)]
    interactive: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let config = UploaderConfig {
        chunk_size: args.chunk_size,
        max_retries: args.max_retries,
        backoff_base: Duration::from_millis(args.backoff_ms),
    };

    let (uploader, handle, mut events) = Uploader::new(
        config,
        Arc::new(PathSource::new(&args.file)),
        Arc::new(HttpDelivery::new(&args.server)),
    )?;
    let uploader_task = tokio::spawn(uploader.run());

    if args.interactive {
        let pause_handle = handle.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(_)) = lines.next_line().await {
                pause_handle.toggle_pause().await;
            }
        });
    }

    handle.start().await;
    let outcome = loop {
        let Some(event) = events.recv().await else {
            bail!("uploader stopped unexpectedly");
        };
        println!("{event}");
        match event {
            UploadEvent::Completed => break Ok(()),
            UploadEvent::Failed { message } => break Err(anyhow::anyhow!(message)),
            _ => {}
        }
    };

    handle.shutdown().await;
    uploader_task.await?;
    outcome
}
