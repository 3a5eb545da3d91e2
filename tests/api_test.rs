use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use qa_relay::api::{routes, ApiState};
use qa_relay::error::LlmError;
use qa_relay::{ChatCompleter, Config, QuestionFlow};
use serde_json::{json, Value};
use warp::http::StatusCode;
use zip::write::SimpleFileOptions;

const BOUNDARY: &str = "qa-relay-test-boundary";

/// 记录收到的问题，按预设表回答
#[derive(Default)]
struct ScriptedCompleter {
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl ChatCompleter for ScriptedCompleter {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.seen.lock().unwrap().push(prompt.to_string());
        let answer = match prompt {
            "2+2?" => "4",
            "capital of France?" => "Paris",
            _ => "I don't know",
        };
        Ok(answer.to_string())
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

fn zip_of(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn multipart_body(field: &str, file_name: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    write!(
        body,
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .unwrap();
    body.extend_from_slice(content);
    write!(body, "\r\n--{BOUNDARY}--\r\n").unwrap();
    body
}

struct Harness {
    completer: Arc<ScriptedCompleter>,
    state: ApiState,
    scratch: tempfile::TempDir,
}

impl Harness {
    fn new(api_key: Option<&str>) -> Self {
        let scratch = tempfile::tempdir().unwrap();
        let config = Config {
            scratch_dir: scratch.path().join("extracted_files"),
            llm_api_key: api_key.map(str::to_string),
            max_upload_bytes: 64 * 1024,
            ..Config::default()
        };
        let completer = Arc::new(ScriptedCompleter::default());
        let flow = Arc::new(QuestionFlow::new(&config, completer.clone()));
        let state = ApiState::new(flow, config.max_upload_bytes);
        Self {
            completer,
            state,
            scratch,
        }
    }

    async fn upload(&self, field: &str, file_name: &str, content: &[u8]) -> (StatusCode, Value) {
        let resp = warp::test::request()
            .method("POST")
            .path("/api/")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(multipart_body(field, file_name, content))
            .reply(&routes(self.state.clone()))
            .await;
        let body = serde_json::from_slice(resp.body()).unwrap();
        (resp.status(), body)
    }

    fn calls(&self) -> usize {
        self.completer.seen.lock().unwrap().len()
    }

    fn scratch_root(&self) -> &Path {
        self.scratch.path()
    }
}

fn scratch_is_empty(root: &Path) -> bool {
    let dir = root.join("extracted_files");
    !dir.exists() || std::fs::read_dir(dir).unwrap().next().is_none()
}

#[tokio::test]
async fn root_returns_greeting() {
    let harness = Harness::new(Some("key"));
    let resp = warp::test::request()
        .method("GET")
        .path("/")
        .reply(&routes(harness.state.clone()))
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(body, json!({ "message": "Hello, World!" }));
}

#[tokio::test]
async fn answers_every_question_in_the_csv() {
    let harness = Harness::new(Some("key"));
    let archive = zip_of(&[("q.csv", "question\n2+2?\ncapital of France?\n")]);

    let (status, body) = harness.upload("files", "q.zip", &archive).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "responses": { "2+2?": "4", "capital of France?": "Paris" } })
    );
    assert_eq!(harness.calls(), 2);
    assert!(scratch_is_empty(harness.scratch_root()));
}

#[tokio::test]
async fn legacy_file_field_is_accepted() {
    let harness = Harness::new(Some("key"));
    let archive = zip_of(&[("q.csv", "question\n2+2?\n")]);

    let (status, body) = harness.upload("file", "q.zip", &archive).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "responses": { "2+2?": "4" } }));
}

#[tokio::test]
async fn duplicate_questions_collapse_to_one_entry() {
    let harness = Harness::new(Some("key"));
    let archive = zip_of(&[("q.csv", "question\n2+2?\nwhat?\n2+2?\n")]);

    let (status, body) = harness.upload("files", "q.zip", &archive).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["responses"].as_object().unwrap().len(), 2);
    assert_eq!(harness.calls(), 3);
}

#[tokio::test]
async fn two_csv_files_are_rejected() {
    let harness = Harness::new(Some("key"));
    let archive = zip_of(&[("a.csv", "question\n2+2?\n"), ("b.csv", "question\nwhy?\n")]);

    let (status, body) = harness.upload("files", "q.zip", &archive).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "ZIP must contain exactly one CSV file." }));
    assert_eq!(harness.calls(), 0);
}

#[tokio::test]
async fn non_zip_upload_is_rejected() {
    let harness = Harness::new(Some("key"));

    let (status, body) = harness.upload("files", "q.csv", b"question\n2+2?\n").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Uploaded file must be a ZIP file." }));
    assert_eq!(harness.calls(), 0);
}

#[tokio::test]
async fn corrupt_zip_is_rejected() {
    let harness = Harness::new(Some("key"));

    let (status, body) = harness.upload("files", "q.zip", b"definitely not a zip").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Uploaded file is not a valid ZIP archive." }));
    assert_eq!(harness.calls(), 0);
}

#[tokio::test]
async fn missing_question_column_is_rejected_and_cleaned_up() {
    let harness = Harness::new(Some("key"));
    let archive = zip_of(&[("q.csv", "prompt\n2+2?\n")]);

    let (status, body) = harness.upload("files", "q.zip", &archive).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "CSV file must contain a 'question' column." }));
    assert_eq!(harness.calls(), 0);
    assert!(scratch_is_empty(harness.scratch_root()));
}

#[tokio::test]
async fn missing_api_key_fails_without_remote_calls() {
    let harness = Harness::new(None);
    let archive = zip_of(&[("q.csv", "question\n2+2?\n")]);

    let (status, body) = harness.upload("files", "q.zip", &archive).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("API key"));
    assert_eq!(harness.calls(), 0);
}

#[tokio::test]
async fn form_without_file_field_is_rejected() {
    let harness = Harness::new(Some("key"));

    let (status, body) = harness.upload("attachment", "q.zip", b"ignored").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "No file uploaded." }));
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let harness = Harness::new(Some("key"));
    let big = vec![b'x'; 128 * 1024];

    let (status, body) = harness.upload("files", "q.zip", &big).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].is_string());
    assert_eq!(harness.calls(), 0);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let harness = Harness::new(Some("key"));
    let resp = warp::test::request()
        .method("GET")
        .path("/nope")
        .reply(&routes(harness.state.clone()))
        .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn csv_in_sub_folder_is_answered() {
    let harness = Harness::new(Some("key"));
    let archive = zip_of(&[("batch/week1/q.csv", "question\n2+2?\n")]);

    let (status, body) = harness.upload("files", "q.zip", &archive).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "responses": { "2+2?": "4" } }));
    assert!(scratch_is_empty(harness.scratch_root()));
}

#[tokio::test]
async fn entry_escaping_archive_root_is_rejected() {
    let harness = Harness::new(Some("key"));
    let archive = zip_of(&[("../../q.csv", "question\n2+2?\n")]);

    let (status, body) = harness.upload("files", "q.zip", &archive).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("../../q.csv"));
    assert_eq!(harness.calls(), 0);
    assert!(!harness.scratch_root().join("q.csv").exists());
    assert!(scratch_is_empty(harness.scratch_root()));
}
