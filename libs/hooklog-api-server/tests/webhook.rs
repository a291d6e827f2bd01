use std::sync::Arc;

use hooklog_api_server::signature::{SIGNATURE_256_HEADER, SIGNATURE_HEADER, sign_sha256};
use hooklog_api_server::{EVENT_HEADER, WebhookConfig, serve};
use hooklog_stream::{CancellationToken, Stream};
use reqwest::StatusCode;
use tokio::net::TcpListener;

const SECRET: &str = "webhook-secret";
const TOPIC: &str = "github/issues";

struct TestServer {
    base: String,
    stream: Arc<Stream>,
    shutdown: CancellationToken,
    handle: tokio::task::JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    async fn start(secret: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let stream = Arc::new(Stream::new());
        let shutdown = CancellationToken::new();
        let webhook = WebhookConfig {
            secret: secret.to_string(),
            issues_topic: TOPIC.to_string(),
        };
        let handle = tokio::spawn(serve(listener, stream.clone(), webhook, shutdown.clone()));
        Self { base, stream, shutdown, handle }
    }

    async fn stop(self) {
        self.shutdown.cancel();
        self.handle.await.unwrap().unwrap();
        self.stream.stop().await;
    }

    fn webhook(&self, event: &str, body: &str) -> reqwest::RequestBuilder {
        reqwest::Client::new()
            .post(format!("{}/github", self.base))
            .header(EVENT_HEADER, event)
            .body(body.to_string())
    }
}

fn opened_event() -> String {
    r#"{"action":"opened","issue":{"id":42,"node_id":"I_42","number":7,"title":"crash"},"repository":{"full_name":"acme/widgets"}}"#.to_string()
}

async fn response(req: reqwest::RequestBuilder) -> (StatusCode, String) {
    let resp = req.send().await.unwrap();
    let status = resp.status();
    (status, resp.text().await.unwrap())
}

#[tokio::test]
async fn rejects_other_methods() {
    let server = TestServer::start(SECRET).await;

    let req = reqwest::Client::new().get(format!("{}/github", server.base));
    let (status, body) = response(req).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, "method not allowed");

    server.stop().await;
}

#[tokio::test]
async fn rejects_unsupported_event_type() {
    let server = TestServer::start(SECRET).await;

    let (status, body) = response(server.webhook("push", "{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"not supported event "push""#);

    server.stop().await;
}

#[tokio::test]
async fn rejects_missing_or_wrong_signature() {
    let server = TestServer::start(SECRET).await;
    let event = opened_event();

    let (status, body) = response(server.webhook("issues", &event)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "bad event");

    let forged = sign_sha256(b"another-secret", event.as_bytes());
    let req = server.webhook("issues", &event).header(SIGNATURE_256_HEADER, forged);
    let (status, body) = response(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "bad event");

    let req = server.webhook("issues", &event).header(SIGNATURE_HEADER, "sha1=zz");
    let (status, _) = response(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(server.stream.topic(TOPIC).is_none());
    server.stop().await;
}

#[tokio::test]
async fn opened_issue_is_published() {
    let server = TestServer::start(SECRET).await;
    let event = opened_event();

    let signature = sign_sha256(SECRET.as_bytes(), event.as_bytes());
    let req = server.webhook("issues", &event).header(SIGNATURE_256_HEADER, signature);
    let (status, body) = response(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");

    let topic = server.stream.topic(TOPIC).expect("issues topic");
    let payload = topic.lookup(0).expect("published issue");
    let issue: serde_json::Value = serde_json::from_slice(&payload).unwrap();
    assert_eq!(issue["node_id"], "I_42");
    assert_eq!(issue["number"], 7);

    server.stop().await;
}

#[tokio::test]
async fn other_actions_are_rejected() {
    let server = TestServer::start("").await;

    let event = r#"{"action":"closed","issue":{"id":1}}"#;
    let (status, body) = response(server.webhook("issues", event)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"not supported event action "closed""#);
    assert!(server.stream.topic(TOPIC).is_none());

    server.stop().await;
}

#[tokio::test]
async fn undecodable_body_is_a_bad_event() {
    let server = TestServer::start("").await;

    let (status, body) = response(server.webhook("issues", "not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "bad event");

    server.stop().await;
}

#[tokio::test]
async fn topics_api_reports_stream_state() {
    let server = TestServer::start("").await;
    server.stream.publish("a", "one");
    server.stream.publish("b", "two");
    server.stream.publish("b", "three");

    let client = reqwest::Client::new();
    let names: Vec<String> = client
        .get(format!("{}/api/topics", server.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(names, vec!["a".to_string(), "b".to_string()]);

    let stats: serde_json::Value = client
        .get(format!("{}/api/topics/b", server.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["name"], "b");
    assert_eq!(stats["next_offset"], 2);
    assert_eq!(stats["retained"], 2);

    let resp = client
        .get(format!("{}/api/topics/missing", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    server.stop().await;
}
