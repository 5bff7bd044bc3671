//! End-to-end lifecycle tests against the in-memory collaborators.

use std::sync::Arc;
use std::time::Duration;

use vproc_core::{
    Collaborators, CoreConfig, MagicByteDetector, ProcessingCore, StaticOwnerDirectory,
    StatusUpdate, SubmitUpload,
};
use vproc_models::{ProcessingStatus, Rejection, RequestId};
use vproc_notify::{NotificationEvent, RecordingNotifier};
use vproc_queue::InMemoryQueue;
use vproc_storage::InMemoryStorage;
use vproc_store::{InMemoryRequestRepository, RequestRepository};

const MB: usize = 1024 * 1024;

struct Env {
    core: ProcessingCore,
    storage: Arc<InMemoryStorage>,
    queue: Arc<InMemoryQueue>,
    repository: Arc<InMemoryRequestRepository>,
    notifier: Arc<RecordingNotifier>,
}

fn env() -> Env {
    env_with(CoreConfig::default())
}

fn env_with(config: CoreConfig) -> Env {
    let storage = Arc::new(InMemoryStorage::default());
    let queue = Arc::new(InMemoryQueue::new());
    let repository = Arc::new(InMemoryRequestRepository::new());
    let notifier = Arc::new(RecordingNotifier::new());

    let core = ProcessingCore::new(
        &config,
        Collaborators {
            storage: storage.clone(),
            queue: queue.clone(),
            repository: repository.clone(),
            notifier: notifier.clone(),
            detector: Arc::new(MagicByteDetector::new()),
            owners: Arc::new(StaticOwnerDirectory::allow_all().with_inactive("suspended")),
        },
    );

    Env {
        core,
        storage,
        queue,
        repository,
        notifier,
    }
}

fn mp4(len: usize) -> Vec<u8> {
    let mut data = vec![0x00, 0x00, 0x00, 0x20];
    data.extend_from_slice(b"ftypmp42");
    data.resize(len, 0);
    data
}

async fn submit_clip(env: &Env, owner: &str) -> RequestId {
    let upload = SubmitUpload::new(owner, "clip.mp4", "video/mp4", mp4(64));
    env.core
        .submit(upload)
        .await
        .unwrap()
        .into_result()
        .unwrap()
        .request_id
}

#[tokio::test]
async fn submit_then_poll_returns_pending() {
    let env = env();
    let upload = SubmitUpload::new("u1", "clip.mp4", "video/mp4", mp4(10 * MB));

    let receipt = env.core.submit(upload).await.unwrap().into_result().unwrap();
    assert_eq!(receipt.status, ProcessingStatus::Pending);

    let view = env.core.get_status(&receipt.request_id, "u1").await.unwrap();
    assert_eq!(view.status, ProcessingStatus::Pending);
    assert_eq!(view.original_filename, "clip.mp4");
    assert_eq!(view.size_bytes, (10 * MB) as u64);
}

#[tokio::test]
async fn oversized_submit_persists_nothing() {
    let env = env();
    let upload = SubmitUpload::new("u1", "clip.mp4", "video/mp4", mp4(64))
        .with_declared_size(600 * MB as u64);

    let outcome = env.core.submit(upload).await.unwrap();
    assert!(matches!(
        outcome.rejection(),
        Some(Rejection::FileTooLarge { .. })
    ));
    assert!(env.repository.is_empty().await);
    assert!(env.storage.is_empty().await);
    assert!(env.queue.is_empty().await);
}

#[tokio::test]
async fn inactive_owner_cannot_submit() {
    let env = env();
    let upload = SubmitUpload::new("suspended", "clip.mp4", "video/mp4", mp4(64));

    let outcome = env.core.submit(upload).await.unwrap();
    assert_eq!(outcome.rejection(), Some(&Rejection::OwnerInactive));
}

#[tokio::test]
async fn full_lifecycle_to_download() {
    let env = env();
    let id = submit_clip(&env, "u1").await;

    // Consumer picks up the job
    let jobs = env.queue.drain_ready().await;
    assert_eq!(jobs.len(), 1);
    let job = &jobs[0].1;
    assert_eq!(job.request_id, id);
    assert!(env.storage.get(&job.storage_reference).await.is_some());

    assert!(env
        .core
        .update_status(StatusUpdate::processing(id.clone()))
        .await
        .unwrap()
        .is_success());

    let early = env.core.authorize_download(&id, "u1").await.unwrap();
    assert_eq!(
        early.rejection(),
        Some(&Rejection::NotReady {
            status: ProcessingStatus::Processing
        })
    );

    env.storage
        .put("out/1.zip", b"processed".to_vec(), "application/zip")
        .await;
    assert!(env
        .core
        .update_status(StatusUpdate::completed(id.clone(), "out/1.zip"))
        .await
        .unwrap()
        .is_success());

    let late = env
        .core
        .update_status(StatusUpdate::processing(id.clone()))
        .await
        .unwrap();
    assert!(late.is_failure());

    let grant = env
        .core
        .authorize_download(&id, "u1")
        .await
        .unwrap()
        .into_result()
        .unwrap();
    assert_eq!(grant.filename, "clip.mp4");
    assert_eq!(
        env.storage.verify_download_url(&grant.url).unwrap(),
        Some("out/1.zip".to_string())
    );

    let view = env.core.get_status(&id, "u1").await.unwrap();
    assert!(view.download_ready);

    assert_eq!(
        env.notifier.events().await,
        vec![
            NotificationEvent::UploadConfirmed,
            NotificationEvent::ProcessingStarted,
            NotificationEvent::ProcessingCompleted,
        ]
    );
}

#[tokio::test]
async fn repeated_completion_changes_state_once() {
    let env = env();
    let id = submit_clip(&env, "u1").await;
    let _ = env
        .core
        .update_status(StatusUpdate::processing(id.clone()))
        .await
        .unwrap();

    let first = env
        .core
        .update_status(StatusUpdate::completed(id.clone(), "out/1.zip"))
        .await
        .unwrap();
    assert!(first.is_success());
    let stored = env.repository.find_by_id(&id).await.unwrap().unwrap();

    let second = env
        .core
        .update_status(StatusUpdate::completed(id.clone(), "out/1.zip"))
        .await
        .unwrap();
    assert_eq!(second.rejection().unwrap().code(), "illegal_transition");
    assert_eq!(env.repository.find_by_id(&id).await.unwrap().unwrap(), stored);
}

#[tokio::test]
async fn completion_without_reference_stays_processing() {
    let env = env();
    let id = submit_clip(&env, "u1").await;
    let _ = env
        .core
        .update_status(StatusUpdate::processing(id.clone()))
        .await
        .unwrap();

    let outcome = env
        .core
        .update_status(StatusUpdate::new(id.clone(), ProcessingStatus::Completed))
        .await
        .unwrap();
    assert!(matches!(
        outcome.rejection(),
        Some(Rejection::MissingField { .. })
    ));

    let view = env.core.get_status(&id, "u1").await.unwrap();
    assert_eq!(view.status, ProcessingStatus::Processing);
}

#[tokio::test]
async fn non_owner_sees_the_same_fault_as_missing_id() {
    let env = env();
    let id = submit_clip(&env, "u1").await;
    let unknown = RequestId::new();

    let foreign_download = env.core.authorize_download(&id, "u2").await.unwrap_err();
    let missing_download = env.core.authorize_download(&unknown, "u2").await.unwrap_err();
    assert_eq!(foreign_download.to_string(), missing_download.to_string());
    assert_eq!(foreign_download.code(), missing_download.code());

    let foreign_status = env.core.get_status(&id, "u2").await.unwrap_err();
    let missing_status = env.core.get_status(&unknown, "u2").await.unwrap_err();
    assert_eq!(foreign_status.to_string(), missing_status.to_string());
    assert!(foreign_status.is_not_found());
}

#[tokio::test]
async fn failed_request_can_be_retried() {
    let env = env();
    let id = submit_clip(&env, "u1").await;
    env.queue.drain_ready().await;

    let _ = env
        .core
        .update_status(StatusUpdate::failed(id.clone(), "no video stream"))
        .await
        .unwrap();
    let view = env.core.get_status(&id, "u1").await.unwrap();
    assert!(view.can_retry);
    assert!(!view.download_ready);
    assert_eq!(view.error_message.as_deref(), Some("no video stream"));

    let change = env.core.retry(&id, "u1").await.unwrap().into_result().unwrap();
    assert_eq!(change.current, ProcessingStatus::Pending);

    let jobs = env.queue.drain_ready().await;
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].1.attempt, 2);

    let view = env.core.get_status(&id, "u1").await.unwrap();
    assert_eq!(view.retry_count, 1);
    assert!(view.error_message.is_none());
}

#[tokio::test]
async fn delayed_retry_is_not_immediately_visible() {
    let env = env_with(CoreConfig::default().with_retry_delay_secs(60));
    let id = submit_clip(&env, "u1").await;
    env.queue.drain_ready().await;

    let _ = env
        .core
        .update_status(StatusUpdate::failed(id.clone(), "timeout"))
        .await
        .unwrap();
    assert!(env.core.retry(&id, "u1").await.unwrap().is_success());

    assert!(env.queue.drain_ready().await.is_empty());
    assert_eq!(env.queue.len().await, 1);
}

#[tokio::test]
async fn list_by_owner_only_returns_own_requests() {
    let env = env();
    let oldest = submit_clip(&env, "u1").await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    let foreign = submit_clip(&env, "u2").await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    let newest = submit_clip(&env, "u1").await;

    let listed = env.core.list_by_owner("u1").await.unwrap();
    let ids: Vec<RequestId> = listed.iter().map(|s| s.request_id.clone()).collect();
    assert_eq!(ids, vec![newest, oldest]);
    assert!(listed[0].created_at > listed[1].created_at);
    assert!(!ids.contains(&foreign));
}
