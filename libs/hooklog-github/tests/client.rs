use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

use hooklog_github::{GithubClient, GithubError, GithubService};

async fn spawn_graphql(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/graphql")
}

fn service(endpoint: String, token: &str) -> GithubService {
    GithubService::new(GithubClient::new(endpoint, token, None).unwrap())
}

#[tokio::test]
async fn issue_project_cards_sends_token_and_variables() {
    let app = Router::new().route(
        "/graphql",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            let auth = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            assert_eq!(auth, "bearer s3cret");
            assert!(body["query"].as_str().unwrap().contains("IssueProjectCards"));
            assert_eq!(body["variables"]["id"], "ISSUE_NODE");

            Json(json!({
                "data": {
                    "node": {
                        "repository": {"id": "R1", "name": "backend", "nameWithOwner": "acme/backend"},
                        "projectCards": {"nodes": [
                            {"id": "C1", "url": "u", "project": {
                                "id": "P1", "name": "Board", "url": "u",
                                "resourcePath": "/orgs/acme/projects/13"
                            }}
                        ]}
                    }
                }
            }))
        }),
    );
    let svc = service(spawn_graphql(app).await, "s3cret");

    let cards = svc.issue_project_cards("ISSUE_NODE").await.unwrap();
    assert_eq!(cards.repository.name, "backend");
    assert_eq!(cards.cards().len(), 1);
    assert!(cards.has_project("/orgs/acme/projects/13"));
}

#[tokio::test]
async fn missing_node_is_not_found() {
    let app = Router::new().route(
        "/graphql",
        post(|| async { Json(json!({"data": {"node": null}})) }),
    );
    let svc = service(spawn_graphql(app).await, "");

    let err = svc.issue_project_cards("nope").await.unwrap_err();
    assert!(matches!(err, GithubError::NotFound(_)), "{err}");
}

#[tokio::test]
async fn graphql_errors_surface_first_message() {
    let app = Router::new().route(
        "/graphql",
        post(|| async {
            Json(json!({
                "data": null,
                "errors": [{"message": "Could not resolve to a node"}, {"message": "second"}]
            }))
        }),
    );
    let svc = service(spawn_graphql(app).await, "t");

    let err = svc.issue_project_cards("x").await.unwrap_err();
    match err {
        GithubError::GraphQl(msg) => assert_eq!(msg, "Could not resolve to a node"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn http_failure_reports_status() {
    let app = Router::new().route(
        "/graphql",
        post(|| async { (StatusCode::UNAUTHORIZED, "Bad credentials") }),
    );
    let svc = service(spawn_graphql(app).await, "t");

    let err = svc.issue_project_cards("x").await.unwrap_err();
    match err {
        GithubError::Status { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "Bad credentials");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn find_project_id_by_org_and_repo_path() {
    let app = Router::new().route(
        "/graphql",
        post(|Json(body): Json<Value>| async move {
            let vars = &body["variables"];
            if let Some(login) = vars["login"].as_str() {
                assert_eq!(login, "acme");
                assert_eq!(vars["number"], 13);
                Json(json!({"data": {"organization": {"project": {"id": "ORG_P", "name": "Org"}}}}))
            } else {
                assert_eq!(vars["owner"], "acme");
                assert_eq!(vars["name"], "backend");
                assert_eq!(vars["number"], 1);
                Json(json!({"data": {"repository": {"project": {"id": "REPO_P", "name": "Repo"}}}}))
            }
        }),
    );
    let svc = service(spawn_graphql(app).await, "t");

    let org = svc.find_project_id("/orgs/acme/projects/13").await.unwrap();
    assert_eq!(org.id.as_str(), "ORG_P");
    let repo = svc.find_project_id("/acme/backend/projects/1").await.unwrap();
    assert_eq!(repo.id.as_str(), "REPO_P");

    let err = svc.find_project_id("acme").await.unwrap_err();
    assert!(matches!(err, GithubError::BadProjectPath { .. }));
}

#[tokio::test]
async fn add_issue_project_card_returns_updated_cards() {
    let app = Router::new().route(
        "/graphql",
        post(|Json(body): Json<Value>| async move {
            assert!(body["query"].as_str().unwrap().contains("updateIssue"));
            assert_eq!(body["variables"]["id"], "I1");
            assert_eq!(body["variables"]["projectId"], "P1");
            Json(json!({"data": {"updateIssue": {"issue": {
                "repository": {"name": "backend"},
                "projectCards": {"nodes": [{"id": "C9", "project": {"id": "P1", "resourcePath": "/orgs/acme/projects/13"}}]}
            }}}}))
        }),
    );
    let svc = service(spawn_graphql(app).await, "t");

    let cards = svc.add_issue_project_card("I1", "P1").await.unwrap();
    assert!(cards.has_project("/orgs/acme/projects/13"));
}
