//! Local smoke run.
//!
//! Wires the processing core to in-memory collaborators and drives one file
//! through submit, processing, completion and download authorization.
//!
//! Usage: `vproc-local [PATH]`. Without a path a tiny generated MP4 header is
//! submitted instead.

use std::sync::Arc;

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{info, warn};

use vproc_core::{
    init_tracing, Collaborators, CoreConfig, MagicByteDetector, ProcessingCore,
    StaticOwnerDirectory, StatusUpdate, SubmitUpload,
};
use vproc_models::{format_bytes, Outcome};
use vproc_notify::LogNotifier;
use vproc_queue::InMemoryQueue;
use vproc_storage::{InMemoryStorage, ObjectStorage};
use vproc_store::InMemoryRequestRepository;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus recorder")?;

    let config = CoreConfig::from_env();
    info!("Core config: {:?}", config);

    let owner_id = std::env::var("VPROC_LOCAL_OWNER").unwrap_or_else(|_| "local-user".to_string());
    let (filename, data) = load_input().await?;

    let storage = Arc::new(InMemoryStorage::new(
        std::env::var("VPROC_LOCAL_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:9000/objects".to_string()),
        std::env::var("VPROC_DOWNLOAD_SIGNING_SECRET")
            .unwrap_or_else(|_| "local-dev-secret".to_string()),
    ));
    let queue = Arc::new(InMemoryQueue::new());

    let core = ProcessingCore::new(
        &config,
        Collaborators {
            storage: storage.clone(),
            queue: queue.clone(),
            repository: Arc::new(InMemoryRequestRepository::new()),
            notifier: Arc::new(LogNotifier),
            detector: Arc::new(MagicByteDetector::new()),
            owners: Arc::new(StaticOwnerDirectory::allow_all()),
        },
    );

    let upload = SubmitUpload::new(&owner_id, &filename, content_type_for(&filename), data);
    let receipt = match core.submit(upload).await? {
        Outcome::Success(receipt) => receipt,
        Outcome::Failure(rejection) => {
            warn!("Upload rejected [{}]: {}", rejection.code(), rejection);
            println!("{}", metrics.render());
            return Ok(());
        }
    };
    info!("Submitted {} as {}", filename, receipt.request_id);

    // Stand-in consumer: "process" by copying the original next to it
    for (message_id, job) in queue.drain_ready().await {
        info!("Consuming message {} ({})", message_id, job.idempotency_key());

        let started = core
            .update_status(StatusUpdate::processing(job.request_id.clone()))
            .await?;
        if let Outcome::Failure(rejection) = started {
            warn!("Skipping job {}: {}", job.request_id, rejection);
            continue;
        }

        let processed_ref = format!("processed/{}/{}", job.request_id, job.filename);
        let update = match storage.copy(&job.storage_reference, &processed_ref).await {
            Ok(()) => StatusUpdate::completed(job.request_id.clone(), processed_ref),
            Err(e) => StatusUpdate::failed(job.request_id.clone(), e.to_string()),
        };
        if let Outcome::Failure(rejection) = core.update_status(update).await? {
            warn!("Status update rejected for {}: {}", job.request_id, rejection);
        }
    }

    match core.authorize_download(&receipt.request_id, &owner_id).await? {
        Outcome::Success(grant) => info!(
            "Download {} until {}: {}",
            grant.filename, grant.expires_at, grant.url
        ),
        Outcome::Failure(rejection) => warn!("Download not authorized: {}", rejection),
    }

    for summary in core.list_by_owner(&owner_id).await? {
        info!(
            "{} {} {} ({})",
            summary.request_id,
            summary.status,
            summary.original_filename,
            format_bytes(summary.size_bytes)
        );
    }

    println!("{}", metrics.render());
    Ok(())
}

/// Read the file named on the command line, or generate a sample clip.
async fn load_input() -> anyhow::Result<(String, Vec<u8>)> {
    match std::env::args().nth(1) {
        Some(path) => {
            let data = tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read {}", path))?;
            let filename = std::path::Path::new(&path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or(path);
            Ok((filename, data))
        }
        None => {
            let mut data = vec![0x00, 0x00, 0x00, 0x18];
            data.extend_from_slice(b"ftypisom");
            data.resize(4096, 0);
            Ok(("sample.mp4".to_string(), data))
        }
    }
}

/// Content type a browser would declare for `filename`.
fn content_type_for(filename: &str) -> &'static str {
    match vproc_models::file_extension(filename).as_deref() {
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        Some("webm") => "video/webm",
        _ => "application/octet-stream",
    }
}
