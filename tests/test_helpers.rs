// tests/test_helpers.rs
#![allow(dead_code)] // not every test binary uses every helper

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::{Router, body::Body, http::Request, response::Response};
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

use chameleon::api::create_router;
use chameleon::llm::{CompletionClient, CompletionRequest};
use chameleon::rotation::RotationCurve;
use chameleon::server::{create_pool, run_migrations};
use chameleon::state::{AppState, create_app_state};

/// In-memory SQLite with the schema applied. One connection so every
/// query sees the same database.
pub async fn test_pool() -> SqlitePool {
    let pool = create_pool("sqlite::memory:", 1)
        .await
        .expect("create in-memory sqlite");
    run_migrations(&pool).await.expect("run migrations");
    pool
}

/// Completion backend that answers from a script and records every request
/// so tests can inspect the prompts that were sent.
pub struct MockCompletionClient {
    reply: String,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletionClient {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded(&self) -> Vec<CompletionRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.requests.lock().expect("requests lock").push(request);
        Ok(self.reply.clone())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// A curve that never rotates by chance, so chat tests stay deterministic
/// once the rotation clock has been set.
pub fn frozen_curve() -> RotationCurve {
    RotationCurve {
        early_chance: 0.0,
        mid_chance: 0.0,
        late_chance: 0.0,
        ..RotationCurve::default()
    }
}

pub async fn create_test_state(
    curve: RotationCurve,
    reply: &str,
) -> (Arc<AppState>, Arc<MockCompletionClient>) {
    let pool = test_pool().await;
    let mock = Arc::new(MockCompletionClient::replying(reply));
    let state = Arc::new(create_app_state(pool, mock.clone(), curve));
    (state, mock)
}

/// Full router plus the state behind it, for asserting on stores directly.
pub async fn create_test_app() -> (Router, Arc<AppState>) {
    let (state, _) = create_test_state(RotationCurve::default(), "scripted reply").await;
    (create_router(state.clone()), state)
}

pub async fn request(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
    request_with_cookie(app, method, uri, None, body).await
}

pub async fn request_with_cookie(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    app.clone()
        .oneshot(builder.body(body).expect("build request"))
        .await
        .expect("send request")
}

pub async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json body")
}

pub async fn text_body(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}
