//! Full client/server round trip over real HTTP on a loopback port.

use std::sync::Arc;
use std::time::Duration;

use chunkferry_receiver::{Receiver, ReceiverConfig};
use chunkferry_uploader::{
    HttpDelivery, PathSource, UploadEvent, Uploader, UploaderConfig,
};

async fn start_receiver(dir: &std::path::Path) -> (Arc<Receiver>, tokio::task::JoinHandle<()>, String) {
    let receiver = Receiver::new(ReceiverConfig {
        port: 0,
        public_dir: dir.join("public"),
        uploads_dir: dir.join("uploads"),
    });
    let server = Arc::clone(&receiver);
    let handle = tokio::spawn(async move {
        server.run().await.expect("receiver failed");
    });

    let addr = loop {
        if let Some(addr) = receiver.local_addr().await {
            break addr;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    };
    (receiver, handle, format!("http://{addr}"))
}

#[tokio::test]
async fn uploads_file_in_three_chunks_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let (receiver, server_task, base_url) = start_receiver(dir.path()).await;

    // 120000 patterned bytes at chunk size 50000: chunks of 50000,
    // 50000 and 20000.
    let payload: Vec<u8> = (0..120_000u32).map(|i| (i % 251) as u8).collect();
    let source_path = dir.path().join("payload.bin");
    std::fs::write(&source_path, &payload).unwrap();

    let config = UploaderConfig {
        chunk_size: 50_000,
        max_retries: 3,
        backoff_base: Duration::from_millis(10),
    };
    let (uploader, handle, mut events) = Uploader::new(
        config,
        Arc::new(PathSource::new(&source_path)),
        Arc::new(HttpDelivery::new(&base_url)),
    )
    .unwrap();
    let uploader_task = tokio::spawn(uploader.run());

    handle.start().await;
    let mut statuses = Vec::new();
    loop {
        let ev = events.recv().await.expect("events closed early");
        let done = ev == UploadEvent::Completed;
        statuses.push(ev.to_string());
        if done {
            break;
        }
    }
    assert_eq!(
        statuses,
        vec![
            "Uploaded 1/3 chunks",
            "Uploaded 2/3 chunks",
            "Uploaded 3/3 chunks",
            "Upload complete!",
        ]
    );

    let stored = std::fs::read(dir.path().join("uploads/payload.bin")).unwrap();
    assert_eq!(stored, payload);

    handle.shutdown().await;
    uploader_task.await.unwrap();
    receiver.shutdown();
    server_task.await.unwrap();
}

#[tokio::test]
async fn pause_and_resume_never_resends_confirmed_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let (receiver, server_task, base_url) = start_receiver(dir.path()).await;

    let payload: Vec<u8> = (0..50_000u32).map(|i| (i % 199) as u8).collect();
    let source_path = dir.path().join("resume.bin");
    std::fs::write(&source_path, &payload).unwrap();

    let config = UploaderConfig {
        chunk_size: 500,
        max_retries: 3,
        backoff_base: Duration::from_millis(10),
    };
    let (uploader, handle, mut events) = Uploader::new(
        config,
        Arc::new(PathSource::new(&source_path)),
        Arc::new(HttpDelivery::new(&base_url)),
    )
    .unwrap();
    let uploader_task = tokio::spawn(uploader.run());

    handle.start().await;

    // Request a pause after the first confirmation; it takes effect at
    // the next chunk boundary.
    let first = events.recv().await.expect("events closed early");
    assert_eq!(first.to_string(), "Uploaded 1/100 chunks");
    handle.toggle_pause().await;

    let paused_at = loop {
        match events.recv().await.expect("events closed early") {
            UploadEvent::Paused { next_chunk, total } => {
                assert_eq!(total, 100);
                break next_chunk;
            }
            UploadEvent::Progress { .. } => {}
            other => panic!("unexpected event: {other}"),
        }
    };
    assert!(paused_at >= 1);

    // While paused, exactly the confirmed prefix is on disk.
    let stored = std::fs::read(dir.path().join("uploads/resume.bin")).unwrap();
    assert_eq!(stored.len(), paused_at * 500);
    assert_eq!(stored[..], payload[..stored.len()]);

    // Resume and finish; the file must equal the source exactly, which
    // also proves no confirmed chunk was delivered twice.
    handle.toggle_pause().await;
    loop {
        match events.recv().await.expect("events closed early") {
            UploadEvent::Completed => break,
            UploadEvent::Failed { message } => panic!("upload failed: {message}"),
            _ => {}
        }
    }

    let stored = std::fs::read(dir.path().join("uploads/resume.bin")).unwrap();
    assert_eq!(stored, payload);

    handle.shutdown().await;
    uploader_task.await.unwrap();
    receiver.shutdown();
    server_task.await.unwrap();
}
