use std::time::Duration;

use osf_api::types::PreprintInput;
use osf_api::{CancellationToken, Client, Error, Stage, Upload};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

fn client_for(server: &MockServer) -> Client {
    Client::with_http_client(reqwest::Client::new())
        .unwrap()
        .with_base_url(&format!("{}/v2/", server.uri()))
        .unwrap()
        .with_storage_url(&format!("{}/v1/", server.uri()))
        .unwrap()
}

fn draft_body(is_published: bool) -> String {
    json!({
        "data": {
            "id": "draft1",
            "type": "preprints",
            "attributes": {"title": "Playing 2048", "is_published": is_published},
            "relationships": {},
            "links": {"self": "https://api.osf.io/v2/preprints/draft1/"}
        }
    })
    .to_string()
}

fn input() -> PreprintInput {
    PreprintInput::for_provider("osf")
        .with_title("Playing 2048")
        .with_description("Expectimax search")
        .with_tag("2048")
}

async fn mount_draft(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v2/preprints/"))
        .respond_with(ResponseTemplate::new(201).set_body_string(draft_body(false)))
        .mount(server)
        .await;
}

async fn mount_upload(server: &MockServer) {
    Mock::given(method("PUT"))
        .and(path("/v1/resources/draft1/providers/osfstorage/"))
        .and(query_param("kind", "file"))
        .and(query_param("name", "paper.pdf"))
        .respond_with(ResponseTemplate::new(201).set_body_string(load_fixture("upload.json")))
        .mount(server)
        .await;
}

async fn mount_attach(server: &MockServer) {
    Mock::given(method("PATCH"))
        .and(path("/v2/preprints/draft1/"))
        .and(body_partial_json(json!({
            "data": {"relationships": {"primary_file": {"data": {"type": "files", "id": "abc123"}}}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(draft_body(false)))
        .mount(server)
        .await;
}

async fn mount_publish(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("PATCH"))
        .and(path("/v2/preprints/draft1/"))
        .and(body_partial_json(json!({
            "data": {"attributes": {"is_published": true}}
        })))
        .respond_with(template)
        .mount(server)
        .await;
}

async fn received(server: &MockServer) -> Vec<Request> {
    server.received_requests().await.unwrap()
}

fn json_body(request: &Request) -> Value {
    serde_json::from_slice(&request.body).unwrap()
}

#[tokio::test]
async fn create_and_publish_runs_all_four_stages() {
    let mock_server = MockServer::start().await;
    mount_draft(&mock_server).await;
    mount_upload(&mock_server).await;
    mount_attach(&mock_server).await;
    mount_publish(
        &mock_server,
        ResponseTemplate::new(200).set_body_string(draft_body(true)),
    )
    .await;

    let client = client_for(&mock_server);
    let created = client
        .preprints()
        .create(
            input().with_published(true),
            Upload::from_bytes("paper.pdf", "hello world"),
        )
        .run()
        .await
        .unwrap();

    assert_eq!(created.stage, Stage::Publish);
    assert_eq!(created.file_id, "abc123");
    assert_eq!(created.preprint.id, "draft1");
    assert!(created.preprint.is_published);

    let requests = received(&mock_server).await;
    let methods: Vec<_> = requests.iter().map(|r| r.method.as_str()).collect();
    assert_eq!(methods, ["POST", "PUT", "PATCH", "PATCH"]);

    let draft = json_body(&requests[0]);
    assert_eq!(draft["data"]["type"], "preprints");
    assert!(draft["data"].get("id").is_none());
    assert!(draft["data"]["attributes"].get("is_published").is_none());
    assert_eq!(draft["data"]["attributes"]["title"], "Playing 2048");
    assert_eq!(
        draft["data"]["relationships"]["provider"]["data"],
        json!({"type": "preprint_providers", "id": "osf"})
    );

    assert_eq!(requests[1].body, b"hello world");

    let attach = json_body(&requests[2]);
    assert_eq!(
        attach,
        json!({"data": {
            "type": "preprints",
            "id": "draft1",
            "relationships": {"primary_file": {"data": {"type": "files", "id": "abc123"}}}
        }})
    );

    let publish = json_body(&requests[3]);
    assert_eq!(
        publish,
        json!({"data": {
            "type": "preprints",
            "id": "draft1",
            "attributes": {"is_published": true}
        }})
    );
}

#[tokio::test]
async fn create_without_publish_stops_after_patch() {
    let mock_server = MockServer::start().await;
    mount_draft(&mock_server).await;
    mount_upload(&mock_server).await;
    mount_attach(&mock_server).await;

    let client = client_for(&mock_server);
    let created = client
        .preprints()
        .create(input(), Upload::from_bytes("paper.pdf", "hello world"))
        .run()
        .await
        .unwrap();

    assert_eq!(created.stage, Stage::Patch);
    assert!(!created.preprint.is_published);
    assert_eq!(received(&mock_server).await.len(), 3);
}

#[tokio::test]
async fn create_failure_created_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/preprints/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string(load_fixture("validation_errors.json")),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .preprints()
        .create(input(), Upload::from_bytes("paper.pdf", "hello world"))
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::Create);
    assert!(err.created_nothing());
    assert!(err.file_id.is_none());
    let service = err.source.service_errors().unwrap();
    assert_eq!(service.errors.len(), 2);
    assert_eq!(received(&mock_server).await.len(), 1);
}

#[tokio::test]
async fn upload_failure_reports_the_draft() {
    let mock_server = MockServer::start().await;
    mount_draft(&mock_server).await;

    Mock::given(method("PUT"))
        .and(path("/v1/resources/draft1/providers/osfstorage/"))
        .respond_with(ResponseTemplate::new(507).set_body_string("Insufficient Storage"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .preprints()
        .create(
            input().with_published(true),
            Upload::from_bytes("paper.pdf", "hello world"),
        )
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::Upload);
    assert_eq!(err.preprint_id.as_deref(), Some("draft1"));
    assert!(err.file_id.is_none());
    assert!(!err.created_nothing());
    assert!(matches!(err.source, Error::HttpStatus { status: 507, .. }));

    let methods: Vec<_> = received(&mock_server)
        .await
        .iter()
        .map(|r| r.method.to_string())
        .collect();
    assert_eq!(methods, ["POST", "PUT"]);
}

#[tokio::test]
async fn publish_failure_reports_draft_and_file() {
    let mock_server = MockServer::start().await;
    mount_draft(&mock_server).await;
    mount_upload(&mock_server).await;
    mount_attach(&mock_server).await;
    mount_publish(
        &mock_server,
        ResponseTemplate::new(409).set_body_string(
            r#"{"errors": [{"detail": "Preprint must have a primary file."}]}"#,
        ),
    )
    .await;

    let client = client_for(&mock_server);
    let err = client
        .preprints()
        .create(
            input().with_published(true),
            Upload::from_bytes("paper.pdf", "hello world"),
        )
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::Publish);
    assert_eq!(err.preprint_id.as_deref(), Some("draft1"));
    assert_eq!(err.file_id.as_deref(), Some("abc123"));
    assert_eq!(
        err.source.service_errors().unwrap().to_string(),
        "Preprint must have a primary file."
    );
}

#[tokio::test]
async fn patch_failure_reports_draft_and_file() {
    let mock_server = MockServer::start().await;
    mount_draft(&mock_server).await;
    mount_upload(&mock_server).await;

    Mock::given(method("PATCH"))
        .and(path("/v2/preprints/draft1/"))
        .respond_with(ResponseTemplate::new(400).set_body_string(
            r#"{"errors": [{"source": {"pointer": "/data/relationships/primary_file"}, "detail": "This file is not a valid primary file for this preprint."}]}"#,
        ))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .preprints()
        .create(
            input().with_published(true),
            Upload::from_bytes("paper.pdf", "hello world"),
        )
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::Patch);
    assert_eq!(err.preprint_id.as_deref(), Some("draft1"));
    assert_eq!(err.file_id.as_deref(), Some("abc123"));
    assert!(!err.created_nothing());
    assert_eq!(
        err.source.service_errors().unwrap().to_string(),
        "/data/relationships/primary_file: This file is not a valid primary file for this preprint."
    );

    let methods: Vec<_> = received(&mock_server)
        .await
        .iter()
        .map(|r| r.method.to_string())
        .collect();
    assert_eq!(methods, ["POST", "PUT", "PATCH"]);
}

#[tokio::test]
async fn cancelled_before_start_sends_nothing() {
    let mock_server = MockServer::start().await;
    mount_draft(&mock_server).await;

    let token = CancellationToken::new();
    token.cancel();

    let client = client_for(&mock_server);
    let err = client
        .preprints()
        .create(input(), Upload::from_bytes("paper.pdf", "hello world"))
        .with_cancellation(token)
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::Create);
    assert!(err.created_nothing());
    assert!(matches!(err.source, Error::Cancelled));
    assert!(received(&mock_server).await.is_empty());
}

#[tokio::test]
async fn timeout_during_upload_reports_the_draft() {
    let mock_server = MockServer::start().await;
    mount_draft(&mock_server).await;

    Mock::given(method("PUT"))
        .and(path("/v1/resources/draft1/providers/osfstorage/"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_string(load_fixture("upload.json"))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .preprints()
        .create(input(), Upload::from_bytes("paper.pdf", "hello world"))
        .with_timeout(Duration::from_millis(500))
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::Upload);
    assert_eq!(err.preprint_id.as_deref(), Some("draft1"));
    assert!(matches!(err.source, Error::Cancelled));
}

#[tokio::test]
async fn upload_from_path_streams_file_contents() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("paper.pdf");
    std::fs::write(&file_path, b"%PDF-1.4 fake").unwrap();

    let upload = Upload::from_path(&file_path).await.unwrap();
    assert_eq!(upload.name(), "paper.pdf");
    assert_eq!(upload.content_length(), Some(13));

    let mock_server = MockServer::start().await;
    mount_draft(&mock_server).await;
    mount_upload(&mock_server).await;
    mount_attach(&mock_server).await;

    let client = client_for(&mock_server);
    let created = client
        .preprints()
        .create(input(), upload)
        .run()
        .await
        .unwrap();
    assert_eq!(created.file_id, "abc123");

    let requests = received(&mock_server).await;
    assert_eq!(requests[1].body, b"%PDF-1.4 fake");
    assert_eq!(
        requests[1]
            .headers
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("application/octet-stream")
    );
}

#[tokio::test]
async fn upload_from_missing_path_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Upload::from_path(dir.path().join("missing.pdf"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[tokio::test]
async fn default_client_waits_out_a_slow_upload() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/resources/draft1/providers/osfstorage/"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_string(load_fixture("upload.json"))
                .set_delay(Duration::from_secs(32)),
        )
        .mount(&mock_server)
        .await;

    let client = Client::new()
        .unwrap()
        .with_storage_url(&format!("{}/v1/", mock_server.uri()))
        .unwrap();
    let uploaded = client
        .files()
        .upload("draft1", Upload::from_bytes("paper.pdf", "hello world"))
        .await
        .unwrap();
    assert_eq!(uploaded.status, 201);
    assert_eq!(uploaded.data.id, "osfstorage/abc123");
}
