//! Mock Gemini backend for integration tests
//!
//! Serves `generateContent` with a scripted reply and records what it was sent

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// What the mock answers to every `generateContent` call
#[derive(Debug, Clone)]
pub enum Reply {
    /// A caption part followed by one inline image
    Image { mime_type: String, bytes: Vec<u8> },
    /// Only a text part, no image
    TextOnly(String),
    /// Prompt rejected through `promptFeedback`
    Blocked(String),
    /// A non-success status with a JSON error body
    Status(u16),
}

/// A request the mock received
#[derive(Debug, Clone)]
pub struct Recorded {
    /// Path segment after `models/`, e.g. `gemini-2.0-flash-exp:generateContent`
    pub model_action: String,
    /// Value of the `x-goog-api-key` header
    pub api_key: Option<String>,
    /// Parsed JSON body
    pub body: Value,
}

/// Mock Gemini backend
pub struct MockGemini {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    reply: Reply,
    request_count: AtomicU32,
    requests: Mutex<Vec<Recorded>>,
}

impl MockGemini {
    /// Start a mock that returns a small PNG
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_with(Reply::Image {
            mime_type: "image/png".to_owned(),
            bytes: b"\x89PNG fake image".to_vec(),
        })
        .await
    }

    /// Start a mock with the given reply
    pub async fn start_with(reply: Reply) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            reply,
            request_count: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1beta/models/{model_action}", routing::post(handle_generate_content))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for configuring the mock as the Google provider
    ///
    /// Includes `/v1beta` since the provider appends `/models/{model}:generateContent`
    pub fn base_url(&self) -> String {
        format!("http://{}/v1beta", self.addr)
    }

    /// Number of `generateContent` requests received
    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::Relaxed)
    }

    /// Most recent request received
    pub fn last_request(&self) -> Option<Recorded> {
        self.state.requests.lock().unwrap().last().cloned()
    }
}

impl Drop for MockGemini {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Base URL of a port nothing listens on
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/v1beta")
}

async fn handle_generate_content(
    State(state): State<Arc<MockState>>,
    Path(model_action): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    state.requests.lock().unwrap().push(Recorded {
        model_action,
        api_key: headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
        body,
    });

    match &state.reply {
        Reply::Image { mime_type, bytes } => Json(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "Here is your image" },
                        { "inlineData": { "mimeType": mime_type, "data": STANDARD.encode(bytes) } }
                    ]
                },
                "finishReason": "STOP"
            }]
        }))
        .into_response(),
        Reply::TextOnly(text) => Json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        }))
        .into_response(),
        Reply::Blocked(reason) => Json(json!({
            "promptFeedback": { "blockReason": reason }
        }))
        .into_response(),
        Reply::Status(code) => {
            let status = StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (
                status,
                Json(json!({
                    "error": { "code": code, "message": "mock upstream failure", "status": "UNAVAILABLE" }
                })),
            )
                .into_response()
        }
    }
}
