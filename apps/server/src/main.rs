//! Chunk receiver server entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use chunkferry_receiver::{Receiver, ReceiverConfig};

#[derive(Parser)]
#[command(name = "chunkferry-server", version, about = "Chunked upload receiver")]
struct Args {
    /// TCP port to listen on.
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Directory served as static content.
    #[arg(long, default_value = "public")]
    public_dir: PathBuf,

    /// Directory uploaded files are written into.
    #[arg(long, default_value = "uploads")]
    uploads_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        port = args.port,
        "starting chunkferry server"
    );

    let receiver = Receiver::new(ReceiverConfig {
        port: args.port,
        public_dir: args.public_dir,
        uploads_dir: args.uploads_dir,
    });

    let shutdown = Arc::clone(&receiver);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            shutdown.shutdown();
        }
    });

    receiver.run().await?;
    Ok(())
}
