mod support;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use relay_core::{MediaReference, RunState, DOWNLOADING_TEXT, PROCESSING_TEXT, UPLOADING_TEXT};
use relay_engine::{
    FileRetriever, Pipeline, PublishError, Publisher, RetrievalError, RunError, StagedFile,
    StagingArea,
};
use serde_json::json;
use support::{
    dir_entries, init_logging, json_bodies, mount_download, mount_get_file, pipeline_for, Call,
    RecordingNotifier, BOT_TOKEN, TELEGRAPH_TOKEN,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn image_run_publishes_page_and_reports_url() {
    init_logging();
    let server = MockServer::start().await;
    mount_get_file(&server, "AgAC1", "photos/file_1.jpg").await;
    mount_download(&server, "photos/file_1.jpg", b"\xff\xd8\xff\xe0jpeg").await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "src": "/file/abc.png" }])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/createPage"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "url": "https://telegra.ph/Shared-Media" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let work = TempDir::new().unwrap();
    let notifier = Arc::new(RecordingNotifier::new());
    let pipeline = pipeline_for(&server, work.path(), notifier.clone());

    let report = pipeline
        .handle_media(42, MediaReference::new("AgAC1", "photo_AgAC1.jpg"))
        .await;

    assert_eq!(report.state, RunState::Done);
    assert_eq!(report.url(), Some("https://telegra.ph/Shared-Media"));

    let calls = notifier.calls();
    assert_eq!(
        calls[0],
        Call::Send {
            chat_id: 42,
            text: PROCESSING_TEXT.to_string()
        }
    );
    assert_eq!(
        calls[1],
        Call::Edit {
            text: DOWNLOADING_TEXT.to_string(),
            link_preview: false
        }
    );
    assert_eq!(
        calls[2],
        Call::Edit {
            text: UPLOADING_TEXT.to_string(),
            link_preview: false
        }
    );
    let (final_text, preview) = notifier.last_edit().unwrap();
    assert!(final_text.contains("https://telegra.ph/Shared-Media"));
    assert!(preview);

    let pages = json_bodies(&server, "/createPage").await;
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0]["access_token"], TELEGRAPH_TOKEN);
    assert_eq!(pages[0]["title"], "Shared Media");
    assert_eq!(pages[0]["author_name"], "Telegraph Bot");
    assert_eq!(
        pages[0]["content"],
        json!([{
            "tag": "figure",
            "children": [{ "tag": "img", "attrs": { "src": format!("{}/file/abc.png", server.uri()) } }]
        }])
    );

    assert_eq!(dir_entries(work.path()), 0);
}

#[tokio::test]
async fn document_run_creates_reference_page_without_upload() {
    init_logging();
    let server = MockServer::start().await;
    mount_get_file(&server, "BQAC2", "documents/file_2.pdf").await;
    mount_download(&server, "documents/file_2.pdf", b"%PDF-1.7").await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/createPage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": { "path": "report-xyz", "url": "https://telegra.ph/report-xyz" }
        })))
        .mount(&server)
        .await;

    let work = TempDir::new().unwrap();
    let notifier = Arc::new(RecordingNotifier::new());
    let pipeline = pipeline_for(&server, work.path(), notifier.clone());

    let report = pipeline
        .handle_media(7, MediaReference::new("BQAC2", "report.pdf"))
        .await;

    assert_eq!(report.state, RunState::Done);
    assert_eq!(report.url(), Some("https://telegra.ph/report-xyz"));

    let pages = json_bodies(&server, "/createPage").await;
    assert_eq!(pages[0]["title"], "Shared Media: report.pdf");
    assert_eq!(pages[0]["content"][0]["tag"], "p");
    let text = pages[0]["content"][0]["children"][0].as_str().unwrap();
    assert!(text.contains("report.pdf"));

    let (final_text, _) = notifier.last_edit().unwrap();
    assert!(final_text.contains("https://telegra.ph/report-xyz"));
    assert_eq!(dir_entries(work.path()), 0);
}

#[tokio::test]
async fn download_failure_fails_run_and_leaves_no_staged_file() {
    init_logging();
    let server = MockServer::start().await;
    mount_get_file(&server, "BAAD3", "videos/file_3.mp4").await;
    Mock::given(method("GET"))
        .and(path(format!("/file/bot{BOT_TOKEN}/videos/file_3.mp4")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/createPage"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let work = TempDir::new().unwrap();
    let notifier = Arc::new(RecordingNotifier::new());
    let pipeline = pipeline_for(&server, work.path(), notifier.clone());

    let report = pipeline
        .handle_media(9, MediaReference::new("BAAD3", "clip.mp4"))
        .await;

    assert_eq!(report.state, RunState::Failed);
    assert!(matches!(
        report.result,
        Err(RunError::Retrieval(RetrievalError::HttpStatus(404)))
    ));
    let (final_text, preview) = notifier.last_edit().unwrap();
    assert!(final_text.contains("Error: download failed with http status 404"));
    assert!(!preview);
    assert_eq!(dir_entries(work.path()), 0);
}

#[tokio::test]
async fn upload_server_error_is_publish_failure() {
    init_logging();
    let server = MockServer::start().await;
    mount_get_file(&server, "AgAC4", "photos/file_4.jpg").await;
    mount_download(&server, "photos/file_4.jpg", b"jpeg").await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/createPage"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let work = TempDir::new().unwrap();
    let notifier = Arc::new(RecordingNotifier::new());
    let pipeline = pipeline_for(&server, work.path(), notifier.clone());

    let report = pipeline
        .handle_media(11, MediaReference::new("AgAC4", "photo_AgAC4.jpg"))
        .await;

    assert_eq!(report.state, RunState::Failed);
    let err = report.result.unwrap_err();
    assert!(matches!(err, RunError::Publish(PublishError::HttpStatus(500))));
    assert!(!err.to_string().is_empty());

    let (final_text, _) = notifier.last_edit().unwrap();
    let description = final_text.split("Error: ").nth(1).unwrap();
    assert!(!description.trim().is_empty());
    assert_eq!(dir_entries(work.path()), 0);
}

#[tokio::test]
async fn lookup_failure_surfaces_platform_description() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{BOT_TOKEN}/getFile")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: file is too big"
        })))
        .mount(&server)
        .await;

    let work = TempDir::new().unwrap();
    let notifier = Arc::new(RecordingNotifier::new());
    let pipeline = pipeline_for(&server, work.path(), notifier.clone());

    let report = pipeline
        .handle_media(5, MediaReference::new("BQAC5", "huge.zip"))
        .await;

    assert_eq!(report.state, RunState::Failed);
    match report.result {
        Err(RunError::Retrieval(RetrievalError::Lookup { file_id, message })) => {
            assert_eq!(file_id, "BQAC5");
            assert!(message.contains("file is too big"));
        }
        other => panic!("unexpected result {other:?}"),
    }
    assert_eq!(dir_entries(work.path()), 0);
}

#[tokio::test]
async fn run_completes_when_status_message_cannot_be_posted() {
    init_logging();
    let server = MockServer::start().await;
    mount_get_file(&server, "BQAC6", "documents/file_6.txt").await;
    mount_download(&server, "documents/file_6.txt", b"hello").await;
    Mock::given(method("POST"))
        .and(path("/createPage"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "url": "https://telegra.ph/notes" })),
        )
        .mount(&server)
        .await;

    let work = TempDir::new().unwrap();
    let notifier = Arc::new(RecordingNotifier::failing());
    let pipeline = pipeline_for(&server, work.path(), notifier.clone());

    let report = pipeline
        .handle_media(3, MediaReference::new("BQAC6", "notes.txt"))
        .await;

    assert_eq!(report.state, RunState::Done);
    assert!(notifier.calls().is_empty());
}

struct StalledRetriever;

#[async_trait]
impl FileRetriever for StalledRetriever {
    async fn fetch(
        &self,
        _media: &MediaReference,
        _staged: &StagedFile,
    ) -> Result<u64, RetrievalError> {
        std::future::pending().await
    }
}

struct UnreachablePublisher;

#[async_trait]
impl Publisher for UnreachablePublisher {
    async fn upload_image_direct(&self, _staged: &StagedFile) -> Result<String, PublishError> {
        panic!("publisher must not be reached");
    }

    async fn publish_as_page_reference(&self, _filename: &str) -> Result<String, PublishError> {
        panic!("publisher must not be reached");
    }
}

#[tokio::test]
async fn abandoned_run_still_deletes_staged_file() {
    init_logging();
    let work = TempDir::new().unwrap();
    let pipeline = Pipeline::new(
        StagingArea::new(work.path().to_path_buf()),
        Arc::new(StalledRetriever),
        Arc::new(UnreachablePublisher),
        Arc::new(RecordingNotifier::new()),
    );

    let outcome = tokio::time::timeout(
        Duration::from_millis(100),
        pipeline.handle_media(1, MediaReference::new("AgAC7", "photo_AgAC7.jpg")),
    )
    .await;

    assert!(outcome.is_err());
    assert_eq!(dir_entries(work.path()), 0);
}

#[tokio::test]
async fn staging_failure_fails_before_download() {
    init_logging();
    let work = TempDir::new().unwrap();
    let missing = work.path().join("gone");
    let notifier = Arc::new(RecordingNotifier::new());
    let pipeline = Pipeline::new(
        StagingArea::new(missing),
        Arc::new(StalledRetriever),
        Arc::new(UnreachablePublisher),
        notifier.clone(),
    );

    let report = pipeline
        .handle_media(1, MediaReference::new("AgAC8", "photo.jpg"))
        .await;

    assert_eq!(report.state, RunState::Failed);
    assert!(matches!(report.result, Err(RunError::Staging(_))));
    // Only the initial status and the failure edit.
    assert_eq!(notifier.calls().len(), 2);
}
