//! Fake chat search API server for integration tests.
//!
//! Spins up a minimal `axum` HTTP server on a random TCP port bound to
//! 127.0.0.1. Serves:
//! - `GET /mentions/{term}?size=N&offset=N` — primary search, JSON array
//! - `GET /search?terms=..&size=N[&cursor=T]` — fallback search, or a 429
//!   with `Retry-After` once [`FakeChatApi::rate_limit`] is set
//! - `GET /stream` — newline-delimited frames, then the body ends
//!
//! # Example
//!
//! ```rust,no_run
//! let api = FakeChatApi::start().await.unwrap();
//! api.add_mention("rust", 1_000, "ferris", "https://youtu.be/abc").await;
//! let primary = HttpPrimary::new(&api.base_url(), Duration::from_secs(2))?;
//! ```

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

#[derive(Default)]
struct ApiState {
    /// Per-term mentions served by /mentions/{term}, newest first.
    mentions: HashMap<String, Vec<Value>>,
    /// Pages served by /search keyed by incoming cursor ("" for none).
    search_pages: HashMap<String, Value>,
    /// When set, /search answers 429 with this Retry-After value.
    retry_after: Option<String>,
    /// Frames written by /stream, one per line.
    frames: Vec<String>,
    /// Query strings received, in order, for every route.
    requests: Vec<String>,
}

/// Handle to the running fake chat API server.
pub struct FakeChatApi {
    addr: SocketAddr,
    state: Arc<Mutex<ApiState>>,
}

impl FakeChatApi {
    /// Start the server on a random port. Returns once it is listening.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(ApiState::default()));

        let app = Router::new()
            .route("/mentions/{term}", get(mentions))
            .route("/search", get(search))
            .route("/stream", get(stream))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the task a moment to register.
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        Ok(Self { addr, state })
    }

    /// Base URL for the API (e.g. `http://127.0.0.1:PORT`).
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn stream_url(&self) -> String {
        format!("http://{}/stream", self.addr)
    }

    /// Append a mention to the primary results for `term`.
    pub async fn add_mention(&self, term: &str, ms: i64, nick: &str, text: &str) {
        let date = chrono::DateTime::from_timestamp_millis(ms).unwrap();
        let mut state = self.state.lock().await;
        state.mentions.entry(term.to_string()).or_default().push(json!({
            "date": date.to_rfc3339(),
            "nick": nick,
            "text": text,
        }));
    }

    /// Register the /search response for an incoming `cursor`.
    pub async fn add_search_page(
        &self,
        cursor: Option<&str>,
        messages: &[(i64, &str, &str)],
        next: Option<&str>,
    ) {
        let messages: Vec<Value> = messages
            .iter()
            .map(|(ms, nick, text)| {
                let date = chrono::DateTime::from_timestamp_millis(*ms).unwrap();
                json!({ "date": date.to_rfc3339(), "nick": nick, "text": text })
            })
            .collect();
        let mut state = self.state.lock().await;
        state.search_pages.insert(
            cursor.unwrap_or_default().to_string(),
            json!({ "messages": messages, "cursor": next, "has_more": next.is_some() }),
        );
    }

    /// Make /search answer 429 with `Retry-After: {value}`.
    pub async fn rate_limit(&self, value: &str) {
        self.state.lock().await.retry_after = Some(value.to_string());
    }

    pub async fn add_frame(&self, frame: &str) {
        self.state.lock().await.frames.push(frame.to_string());
    }

    /// Every request's path and query string, in arrival order.
    pub async fn requests(&self) -> Vec<String> {
        self.state.lock().await.requests.clone()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

fn param(q: &HashMap<String, String>, key: &str) -> usize {
    q.get(key).and_then(|v| v.parse().ok()).unwrap_or(0)
}

async fn mentions(
    Path(term): Path<String>,
    Query(q): Query<HashMap<String, String>>,
    State(state): State<Arc<Mutex<ApiState>>>,
) -> impl IntoResponse {
    let mut state = state.lock().await;
    let (size, offset) = (param(&q, "size"), param(&q, "offset"));
    state.requests.push(format!("/mentions/{term}?size={size}&offset={offset}"));
    let items: Vec<Value> = state
        .mentions
        .get(&term)
        .map(|all| all.iter().skip(offset).take(size).cloned().collect())
        .unwrap_or_default();
    Json(items)
}

async fn search(
    Query(q): Query<HashMap<String, String>>,
    State(state): State<Arc<Mutex<ApiState>>>,
) -> impl IntoResponse {
    let mut state = state.lock().await;
    let cursor = q.get("cursor").cloned().unwrap_or_default();
    state.requests.push(format!(
        "/search?terms={}&cursor={}",
        q.get("terms").cloned().unwrap_or_default(),
        cursor
    ));

    if let Some(ref retry) = state.retry_after {
        let mut headers = HeaderMap::new();
        if let Ok(v) = HeaderValue::from_str(retry) {
            headers.insert(header::RETRY_AFTER, v);
        }
        return (StatusCode::TOO_MANY_REQUESTS, headers, Json(json!({ "error": "slow down" })));
    }

    let page = state
        .search_pages
        .get(&cursor)
        .cloned()
        .unwrap_or_else(|| json!({ "messages": [], "cursor": null, "has_more": false }));
    (StatusCode::OK, HeaderMap::new(), Json(page))
}

async fn stream(State(state): State<Arc<Mutex<ApiState>>>) -> impl IntoResponse {
    let mut state = state.lock().await;
    state.requests.push("/stream".to_string());
    let mut body = state.frames.join("\n");
    body.push('\n');
    body
}
