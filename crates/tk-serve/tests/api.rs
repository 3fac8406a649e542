use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tk_core::types::{IssueId, IssueStatus, UserId};
use tk_core::{VcsConfig, VcsService};
use tk_db::issue_repo::IssueRepo;
use tk_db::schema;
use tk_serve::{AppState, app, build_tracker};
use tower::ServiceExt;

struct Harness {
    _dir: tempfile::TempDir,
    state: AppState,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let config = VcsConfig::from_json_str(
        r#"{
            "repositories": [
                { "name": "app", "type": "GIT", "path": "missing-app" },
                { "name": "legacy", "type": "SVN", "path": "missing-legacy",
                  "auth": { "username": "svc", "password": "topsecret" } }
            ],
            "commandTimeoutSeconds": 5
        }"#,
    )
    .map(|mut config| {
        config.resolve_paths(dir.path());
        config
    })
    .unwrap();
    let db_path = dir.path().join("tracker.db");
    let state = AppState::new(&db_path, Arc::new(VcsService::from_config(&config)));
    Harness { _dir: dir, state }
}

fn seed_issues(db_path: &Path, count: usize, creator: UserId) {
    let conn = schema::open_and_migrate(db_path).unwrap();
    let repo = IssueRepo::new(&conn);
    for n in 0..count {
        repo.create(&format!("issue {n}"), Some(creator)).unwrap();
    }
}

async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = app(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn commits_for_unreachable_repositories_are_empty() {
    let h = harness();
    let (status, body) = send(&h.state, get("/api/issues/42/commits")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn invalid_issue_id_is_rejected() {
    let h = harness();
    let (status, body) = send(&h.state, get("/api/issues/abc/commits")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_input");
}

#[tokio::test]
async fn diff_for_unknown_repository_is_not_found() {
    let h = harness();
    let (status, body) = send(
        &h.state,
        get("/api/issues/1/commits/diff?repo=Unknown%20Repo&revision=abc123"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
    assert_eq!(body["message"], "repository not found: Unknown Repo");
    assert!(body["correlation_id"].as_str().unwrap().starts_with("corr_"));
}

#[tokio::test]
async fn diff_with_option_like_revision_is_bad_request() {
    let h = harness();
    let (status, body) = send(
        &h.state,
        get("/api/issues/1/commits/diff?repo=app&revision=--output%3D%2Ftmp%2Fx"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_input");
}

#[tokio::test]
async fn diff_for_unreachable_repository_is_empty() {
    let h = harness();
    let (status, body) = send(
        &h.state,
        get("/api/issues/1/commits/diff?repo=app&revision=abc123"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "diff": "" }));
}

#[tokio::test]
async fn repositories_are_listed_without_credentials() {
    let h = harness();
    let (status, body) = send(&h.state, get("/api/repos")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "app");
    assert_eq!(body[0]["type"], "GIT");
    assert_eq!(body[1]["hasCredentials"], true);
    assert!(!body.to_string().contains("topsecret"));
}

#[tokio::test]
async fn webhook_requires_message() {
    let h = harness();
    let (status, body) = send(
        &h.state,
        post_json("/api/integrations/webhook/vcs", &json!({ "author": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_input");

    let (status, _) = send(
        &h.state,
        post_json("/api/integrations/webhook/vcs", &json!({ "message": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_webhook_body_uses_error_envelope() {
    let h = harness();
    let request = Request::builder()
        .method("POST")
        .uri("/api/integrations/webhook/vcs")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&h.state, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_input");
    assert!(body["correlation_id"].as_str().unwrap().starts_with("corr_"));

    let (status, body) = send(
        &h.state,
        post_json("/api/integrations/webhook/vcs", &json!({ "message": 42 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_input");
}

#[tokio::test]
async fn webhook_closes_referenced_issue() {
    let h = harness();
    seed_issues(&h.state.db_path, 2, UserId::new(7));

    let (status, body) = send(
        &h.state,
        post_json(
            "/api/integrations/webhook/vcs",
            &json!({ "message": "Fixes #2", "author": "alice" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "message": "Processed" }));

    let id = IssueId::new(2).unwrap();
    let mut closed = false;
    for _ in 0..100 {
        let tracker = build_tracker(&h.state).unwrap();
        if tracker.issues().get(&id).unwrap().status == IssueStatus::Closed {
            closed = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(closed);

    let (status, audit) = send(&h.state, get("/api/issues/2/audit")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(audit[0]["action"], "VCS_AUTO_UPDATE");
    assert_eq!(audit[0]["actorId"], 0);
    assert_eq!(audit[0]["newValue"], "alice: Fixes #2");
}

#[tokio::test]
async fn correlation_id_is_echoed() {
    let h = harness();
    let request = Request::builder()
        .uri("/api/repos")
        .header("x-correlation-id", "corr_test")
        .body(Body::empty())
        .unwrap();
    let response = app(h.state.clone()).oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("x-correlation-id").unwrap(),
        "corr_test"
    );
}

#[tokio::test]
async fn openapi_document_lists_routes() {
    let h = harness();
    let (status, body) = send(&h.state, get("/api/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    let paths = body["paths"].as_object().unwrap();
    assert!(paths.contains_key("/api/issues/{id}/commits"));
    assert!(paths.contains_key("/api/integrations/webhook/vcs"));
}
