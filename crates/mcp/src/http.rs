//! HTTP transports.
//!
//! Two wire styles share one router:
//!
//! - `POST /mcp` accepts one JSON-RPC message and answers with its response;
//!   notifications are acknowledged with `202 Accepted`.
//! - `GET /sse` opens an event stream whose first `endpoint` event names
//!   `/messages?sessionId=<id>`. Messages POSTed there are acknowledged with
//!   `202 Accepted` and their responses arrive on the stream as `message`
//!   events.
//!
//! `GET /health` reports the server name and version.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Mutex};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tower_http::cors::CorsLayer;
use tracing::{debug, warn};

use crate::error::McpError;
use crate::server::McpServer;

/// Path clients POST to once the SSE stream is open.
pub const MESSAGES_PATH: &str = "/messages";

#[derive(Clone)]
struct HttpState {
    server: Arc<McpServer>,
    /// Open SSE streams by session id.
    sessions: Arc<Mutex<HashMap<String, mpsc::Sender<String>>>>,
}

/// Build the router serving `server`.
pub fn router(server: Arc<McpServer>) -> Router {
    let state = HttpState {
        server,
        sessions: Arc::new(Mutex::new(HashMap::new())),
    };
    Router::new()
        .route("/mcp", post(handle_mcp))
        .route("/sse", get(handle_sse))
        .route(MESSAGES_PATH, post(handle_session_message))
        .route("/health", get(handle_health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `host:port`. Kept separate from [`serve`] so the caller can report
/// the listening address before blocking.
pub async fn bind(host: &str, port: u16) -> Result<TcpListener, McpError> {
    Ok(TcpListener::bind((host, port)).await?)
}

/// Serve until the listener fails.
pub async fn serve(server: Arc<McpServer>, listener: TcpListener) -> Result<(), McpError> {
    axum::serve(listener, router(server)).await?;
    Ok(())
}

async fn handle_mcp(State(state): State<HttpState>, body: Bytes) -> Response {
    let line = String::from_utf8_lossy(&body);
    match state.server.handle_message(&line).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

async fn handle_sse(
    State(state): State<HttpState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let session_id = uuid::Uuid::new_v4().to_string();
    let (tx, rx) = mpsc::channel::<String>(32);
    state.sessions.lock().await.insert(session_id.clone(), tx);
    debug!(session = %session_id, "SSE session opened");

    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("{MESSAGES_PATH}?sessionId={session_id}"));
    let messages =
        ReceiverStream::new(rx).map(|json| Ok(Event::default().event("message").data(json)));

    Sse::new(tokio_stream::once(Ok(endpoint)).chain(messages)).keep_alive(KeepAlive::default())
}

#[derive(Debug, Deserialize)]
struct SessionQuery {
    #[serde(rename = "sessionId")]
    session_id: String,
}

async fn handle_session_message(
    State(state): State<HttpState>,
    Query(query): Query<SessionQuery>,
    body: Bytes,
) -> Response {
    let sender = state.sessions.lock().await.get(&query.session_id).cloned();
    let Some(sender) = sender else {
        return (StatusCode::NOT_FOUND, "Unknown session").into_response();
    };

    let line = String::from_utf8_lossy(&body);
    let Some(response) = state.server.handle_message(&line).await else {
        return StatusCode::ACCEPTED.into_response();
    };

    let json = match serde_json::to_string(&response) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "Failed to serialize response");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if sender.send(json).await.is_err() {
        debug!(session = %query.session_id, "SSE session closed");
        state.sessions.lock().await.remove(&query.session_id);
        return (StatusCode::GONE, "Session closed").into_response();
    }
    StatusCode::ACCEPTED.into_response()
}

async fn handle_health(State(state): State<HttpState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "name": state.server.name(),
        "version": state.server.version(),
    }))
}
