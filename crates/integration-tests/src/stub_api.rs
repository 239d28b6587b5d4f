//! In-process stand-in for the forum search API.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// How an endpoint answers.
#[derive(Debug, Clone)]
pub enum Behavior {
    Json(Value),
    Status(u16, &'static str),
    /// Answers with the JSON body only after the delay
    Slow(Duration, Value),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub path: String,
    pub params: HashMap<String, String>,
    pub authorization: Option<String>,
}

struct StubState {
    search: Behavior,
    suggestions: Behavior,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct StubApi {
    pub addr: SocketAddr,
    state: Arc<StubState>,
    server: JoinHandle<()>,
}

impl StubApi {
    pub async fn spawn(search: Behavior, suggestions: Behavior) -> Self {
        let state = Arc::new(StubState {
            search,
            suggestions,
            requests: Mutex::new(Vec::new()),
        });
        let router = Router::new()
            .route("/search", get(answer))
            .route("/search/suggestions", get(answer))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub api");
        let addr = listener.local_addr().expect("stub api address");
        let server = tokio::spawn(async move {
            axum::serve(listener, router).await.expect("stub api server");
        });

        Self { addr, state, server }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("requests lock").clone()
    }
}

impl Drop for StubApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn answer(
    State(state): State<Arc<StubState>>,
    uri: Uri,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let path = uri.path().to_string();
    state.requests.lock().expect("requests lock").push(RecordedRequest {
        path: path.clone(),
        params,
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
    });

    let behavior = if path.ends_with("/suggestions") {
        &state.suggestions
    } else {
        &state.search
    };
    match behavior.clone() {
        Behavior::Json(body) => Json(body).into_response(),
        Behavior::Status(code, body) => {
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, body).into_response()
        }
        Behavior::Slow(delay, body) => {
            tokio::time::sleep(delay).await;
            Json(body).into_response()
        }
    }
}
