//! Router-level tests for the command relay
//!
//! Requests go through the real axum router via `oneshot`. Most tests use a
//! spy executor so they can assert that rejected requests never reach the
//! shell; a few run real commands through `/bin/sh`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use command_relay::server::{create_router, AppState};
use command_relay::{
    AuthToken, CommandExecutor, CommandRelay, ExecutionResult, RelayConfig, SudoPolicy,
};

// ============================================================================
// Helpers
// ============================================================================

#[derive(Default)]
struct SpyExecutor {
    calls: Mutex<Vec<String>>,
}

impl SpyExecutor {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandExecutor for SpyExecutor {
    async fn execute(&self, command: &str) -> ExecutionResult {
        self.calls.lock().unwrap().push(command.to_string());
        ExecutionResult::completed(b"spy\n", b"", Some(0))
    }
}

fn spy_app(spy: Arc<SpyExecutor>) -> axum::Router {
    let relay = CommandRelay::new(
        AuthToken::new("secret"),
        SudoPolicy::new(["apt update"]),
        spy,
    );
    create_router(AppState::new(relay, false))
}

fn shell_app(expose_exit_code: bool) -> axum::Router {
    let config = RelayConfig {
        api_token: "secret".to_string(),
        allowed_sudo: vec!["apt update".to_string()],
        shell: "/bin/sh".to_string(),
        expose_exit_code,
        ..Default::default()
    };
    create_router(AppState::from_config(&config))
}

fn run_request(auth: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/run")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn allowed_sudo_is_executed_verbatim() {
    let spy = Arc::new(SpyExecutor::default());
    let (status, body) = send(
        spy_app(spy.clone()),
        run_request(Some("Bearer secret"), json!({ "cmd": "sudo apt update" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "output": "spy\n" }));
    assert_eq!(spy.calls(), vec!["sudo apt update"]);
}

#[tokio::test]
async fn disallowed_sudo_is_forbidden() {
    let spy = Arc::new(SpyExecutor::default());
    let (status, body) = send(
        spy_app(spy.clone()),
        run_request(Some("Bearer secret"), json!({ "cmd": "sudo rm -rf /" })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "detail": "Sudo command not allowed" }));
    assert!(spy.calls().is_empty());
}

#[tokio::test]
async fn echo_runs_through_shell() {
    let (status, body) = send(
        shell_app(false),
        run_request(Some("Bearer secret"), json!({ "cmd": "echo hello" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["output"].as_str().unwrap().contains("hello"));
    assert!(body.get("exit_code").is_none());
}

#[tokio::test]
async fn wrong_or_missing_token_is_unauthorized() {
    let spy = Arc::new(SpyExecutor::default());
    for auth in [None, Some("Bearer nope"), Some("Bearer secret2"), Some("secret")] {
        let (status, body) = send(
            spy_app(spy.clone()),
            run_request(auth, json!({ "cmd": "echo hello" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "detail": "Unauthorized" }));
    }
    assert!(spy.calls().is_empty());
}

#[tokio::test]
async fn empty_command_is_bad_request() {
    let spy = Arc::new(SpyExecutor::default());
    for cmd in ["", "    "] {
        let (status, body) = send(
            spy_app(spy.clone()),
            run_request(Some("Bearer secret"), json!({ "cmd": cmd })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "detail": "Command must not be empty" }));
    }
    assert!(spy.calls().is_empty());
}

// ============================================================================
// Edge cases
// ============================================================================

#[tokio::test]
async fn auth_is_checked_before_body() {
    let spy = Arc::new(SpyExecutor::default());
    let request = Request::builder()
        .method("POST")
        .uri("/run")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, _) = send(spy_app(spy.clone()), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(spy.calls().is_empty());
}

#[tokio::test]
async fn malformed_body_after_auth_is_unprocessable() {
    let spy = Arc::new(SpyExecutor::default());
    let (status, body) = send(
        spy_app(spy.clone()),
        run_request(Some("Bearer secret"), json!({ "command": "echo hi" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
    assert!(spy.calls().is_empty());
}

#[tokio::test]
async fn nonzero_exit_is_still_ok() {
    let (status, body) = send(
        shell_app(false),
        run_request(
            Some("Bearer secret"),
            json!({ "cmd": "echo out; echo err 1>&2; exit 4" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "output": "out\nerr\n" }));
}

#[tokio::test]
async fn exit_code_exposed_when_enabled() {
    let (status, body) = send(
        shell_app(true),
        run_request(Some("Bearer secret"), json!({ "cmd": "exit 4" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "output": "", "exit_code": 4 }));
}

#[tokio::test]
async fn spawn_failure_is_ok_with_description() {
    let config = RelayConfig {
        api_token: "secret".to_string(),
        shell: "/nonexistent/shell".to_string(),
        ..Default::default()
    };
    let app = create_router(AppState::from_config(&config));
    let (status, body) = send(
        app,
        run_request(Some("Bearer secret"), json!({ "cmd": "echo hi" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["output"]
        .as_str()
        .unwrap()
        .contains("/nonexistent/shell"));
}

#[tokio::test]
async fn health_needs_no_token() {
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let spy = Arc::new(SpyExecutor::default());
    let (status, body) = send(spy_app(spy), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn concurrent_requests_are_independent() {
    let spy = Arc::new(SpyExecutor::default());
    let app = spy_app(spy.clone());

    let mut handles = Vec::new();
    for i in 0..16 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let cmd = if i % 2 == 0 { "sudo apt update" } else { "sudo reboot" };
            let (status, _) = send(
                app,
                run_request(Some("Bearer secret"), json!({ "cmd": cmd })),
            )
            .await;
            (i, status)
        }));
    }

    for handle in handles {
        let (i, status) = handle.await.unwrap();
        let expected = if i % 2 == 0 {
            StatusCode::OK
        } else {
            StatusCode::FORBIDDEN
        };
        assert_eq!(status, expected);
    }
    assert_eq!(spy.calls().len(), 8);
    assert!(spy.calls().iter().all(|c| c == "sudo apt update"));
}
