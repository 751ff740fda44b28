//! End-to-end wizard runs against a mock generation service.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mixtape_client::{ClientConfig, MixtapeClient};
use mixtape_models::{AudioFile, Phase, WizardStep};
use mixtape_workflow::{ServiceStatus, WorkflowConfig, WorkflowController, WorkflowError};

fn write_track(dir: &Path, name: &str, len: usize) -> AudioFile {
    let path = dir.join(name);
    std::fs::write(&path, vec![0x55u8; len]).unwrap();
    AudioFile::new(path, len as u64, "audio/mpeg")
}

fn controller_for(server: &MockServer, output_dir: &Path) -> WorkflowController {
    let client = MixtapeClient::new(ClientConfig::new(server.uri())).unwrap();
    let config = WorkflowConfig {
        settle_delay: Duration::from_millis(10),
        cooldown: Duration::from_millis(10),
        output_dir: output_dir.to_path_buf(),
    };
    WorkflowController::new(Arc::new(client), config)
}

fn with_tracks(server: &MockServer, dir: &TempDir) -> WorkflowController {
    let mut controller = controller_for(server, &dir.path().join("out"));
    controller
        .add_files(vec![
            write_track(dir.path(), "opening.mp3", 8 * 1024),
            write_track(dir.path(), "closing.mp3", 4 * 1024),
        ])
        .unwrap();
    controller
}

#[tokio::test]
async fn test_description_only_reaches_reviewing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "description": "X",
            "video_path": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut controller = with_tracks(&server, &dir);

    let step = controller.generate().await.unwrap();

    assert_eq!(step, WizardStep::Reviewing);
    assert_eq!(controller.description(), Some("X"));
    assert!(controller.video_path().is_none());
    assert_eq!(controller.progress().percent, 100);
    assert_eq!(controller.progress().phase, Phase::Done);
    assert!(!controller.is_loading());
}

#[tokio::test]
async fn test_video_reaches_complete_and_downloads_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "description": null,
            "video_path": "/download/a.mp4",
            "status": "success",
            "video_filename": "a.mp4"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/download/a.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"not really a video".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut controller = with_tracks(&server, &dir);

    assert_eq!(controller.generate().await.unwrap(), WizardStep::Complete);
    assert!(controller.description().is_none());

    let saved = controller.download().await.unwrap();
    assert_eq!(saved, dir.path().join("out").join("a.mp4"));
    assert_eq!(std::fs::read(&saved).unwrap(), b"not really a video");
    assert_eq!(controller.step(), WizardStep::Complete);

    let downloads = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/download/a.mp4")
        .count();
    assert_eq!(downloads, 1);
}

#[tokio::test]
async fn test_payload_too_large_keeps_files() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(413).set_body_json(json!({
            "detail": "Request entity too large"
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut controller = with_tracks(&server, &dir);
    let before = controller.files().snapshot();

    let err = controller.generate().await.unwrap_err();

    assert!(matches!(err, WorkflowError::Transport(_)));
    assert_eq!(controller.step(), WizardStep::Collecting);
    assert!(controller
        .error()
        .map(|m| m.contains("Maximum 2GB per file"))
        .unwrap_or(false));
    assert_eq!(*controller.files().snapshot(), *before);
    assert_eq!(controller.progress().percent, 0);
    assert!(!controller.progress().visible);
}

#[tokio::test]
async fn test_empty_response_is_incomplete() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success"
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut controller = with_tracks(&server, &dir);

    let err = controller.generate().await.unwrap_err();
    assert!(matches!(err, WorkflowError::IncompleteResult));
    assert_eq!(controller.step(), WizardStep::Collecting);
    assert_eq!(controller.files().len(), 2);
}

#[tokio::test]
async fn test_snapshots_stay_monotonic() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "description": "slow one" }))
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut controller = with_tracks(&server, &dir);
    let mut updates = controller.subscribe();

    let watcher = tokio::spawn(async move {
        let mut seen = Vec::new();
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            if snapshot.step == WizardStep::Generating {
                seen.push(snapshot.progress.percent);
            }
        }
        seen
    });

    controller.generate().await.unwrap();
    drop(controller);

    let seen = watcher.await.unwrap();
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert!(seen.iter().all(|p| *p < 100));
}

#[tokio::test]
async fn test_file_change_after_review_resets() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "description": "first pass"
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut controller = with_tracks(&server, &dir);
    controller.generate().await.unwrap();
    assert_eq!(controller.step(), WizardStep::Reviewing);

    controller.remove_file(1).unwrap();

    assert_eq!(controller.step(), WizardStep::Collecting);
    assert!(controller.description().is_none());
    assert_eq!(controller.files().len(), 1);
}

#[tokio::test]
async fn test_check_service_reports_unreachable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = MixtapeClient::new(ClientConfig::new(format!("http://{}", addr))).unwrap();
    let controller = WorkflowController::new(Arc::new(client), WorkflowConfig::default());

    assert!(matches!(
        controller.check_service().await,
        ServiceStatus::Unavailable(_)
    ));
}
