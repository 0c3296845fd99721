//! HTTP transport for MCP server.
//!
//! Routes:
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `POST /mcp` | JSON-RPC request, JSON response |
//! | `GET /sse` | legacy SSE stream; first event announces the message URL |
//! | `POST /messages/?session_id=` | JSON-RPC for an SSE session, answered on the stream |
//! | `GET /`, `GET /health` | health check |
//! | `GET /exports/{name}` | download (or regenerate) an export artifact |
//!
//! Every request is handled inside a credential scope built from its own
//! headers.

use crate::credential;
use crate::error::McpError;
use crate::protocol::JsonRpcRequest;
use crate::server::McpServer;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response, Sse, sse::Event, sse::KeepAlive},
    routing::{get, post},
};
use rolodex_core::TenantId;
use rolodex_export::ExportError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, mpsc};
use tower_http::trace::TraceLayer;

/// HTTP transport handler state.
pub struct HttpTransportState {
    server: Arc<McpServer>,
    /// Active SSE sessions by id.
    sse_sessions: RwLock<HashMap<String, mpsc::Sender<SseEvent>>>,
}

impl HttpTransportState {
    /// Create a new HTTP transport state.
    pub fn new(server: Arc<McpServer>) -> Self {
        Self {
            server,
            sse_sessions: RwLock::new(HashMap::new()),
        }
    }

    fn credential(&self, headers: &HeaderMap) -> Option<TenantId> {
        credential::from_headers(headers, self.server.header_names())
    }
}

/// SSE event for streaming.
#[derive(Debug, Clone, Serialize)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

/// Query parameters for the SSE message endpoint.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    session_id: Option<String>,
}

/// Create the HTTP router for MCP.
pub fn create_router(state: Arc<HttpTransportState>) -> Router {
    Router::new()
        .route("/", get(handle_health))
        .route("/health", get(handle_health))
        .route("/mcp", post(handle_mcp_post))
        .route("/sse", get(handle_sse))
        .route("/messages", post(handle_sse_message))
        .route("/messages/", post(handle_sse_message))
        .route("/exports/{name}", get(handle_export_download))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle POST requests to /mcp (JSON-RPC over HTTP).
async fn handle_mcp_post(
    State(state): State<Arc<HttpTransportState>>,
    headers: HeaderMap,
    Json(request): Json<JsonRpcRequest>,
) -> Response {
    let tenant = state.credential(&headers);
    match credential::scope(tenant, state.server.handle_message(request)).await {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Handle GET /sse: open a session and stream its responses.
async fn handle_sse(State(state): State<Arc<HttpTransportState>>) -> impl IntoResponse {
    let session_id = uuid::Uuid::new_v4().simple().to_string();
    let (event_tx, event_rx) = mpsc::channel(100);

    state
        .sse_sessions
        .write()
        .await
        .insert(session_id.clone(), event_tx);
    tracing::info!(session_id = %session_id, "Opened SSE session");

    let endpoint = format!("/messages/?session_id={}", session_id);
    let guard = SessionGuard {
        state: state.clone(),
        session_id,
    };

    let stream = async_stream::stream! {
        let _guard = guard;
        let mut rx = event_rx;
        yield Ok::<_, Infallible>(Event::default().event("endpoint").data(endpoint));
        while let Some(event) = rx.recv().await {
            yield Ok::<_, Infallible>(Event::default().event(event.event).data(event.data));
        }
    };

    let keep_alive = state.server.config().sse_keep_alive_seconds.max(1);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(keep_alive))
            .text("ping"),
    )
}

/// Removes a session when its stream is dropped (client disconnected).
struct SessionGuard {
    state: Arc<HttpTransportState>,
    session_id: String,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let state = self.state.clone();
        let session_id = std::mem::take(&mut self.session_id);
        tokio::spawn(async move {
            state.sse_sessions.write().await.remove(&session_id);
            tracing::info!(session_id = %session_id, "Closed SSE session");
        });
    }
}

/// Handle POST /messages/?session_id=: answer on the session's stream.
async fn handle_sse_message(
    State(state): State<Arc<HttpTransportState>>,
    Query(query): Query<MessageQuery>,
    headers: HeaderMap,
    Json(request): Json<JsonRpcRequest>,
) -> Response {
    let Some(session_id) = query.session_id else {
        return error_response(StatusCode::BAD_REQUEST, "session_id is required");
    };
    let sender = state.sse_sessions.read().await.get(&session_id).cloned();
    let Some(sender) = sender else {
        return error_response(StatusCode::NOT_FOUND, "Unknown session");
    };

    let tenant = state.credential(&headers);
    if let Some(response) = credential::scope(tenant, state.server.handle_message(request)).await {
        let data = match serde_json::to_string(&response) {
            Ok(data) => data,
            Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
        };
        let event = SseEvent {
            event: "message".to_string(),
            data,
        };
        if sender.send(event).await.is_err() {
            return error_response(StatusCode::GONE, "Session closed");
        }
    }

    StatusCode::ACCEPTED.into_response()
}

/// Handle GET /exports/{name}.
async fn handle_export_download(
    State(state): State<Arc<HttpTransportState>>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Response {
    let tenant = state.credential(&headers);
    let server = state.server.clone();
    let resolved = credential::scope(tenant, async move { server.credentials().resolve() }).await;
    let tenant = match resolved {
        Ok(tenant) => tenant,
        Err(e) => return error_response(StatusCode::UNAUTHORIZED, &e.to_string()),
    };

    match state.server.executor().retrieve_artifact(&tenant, &name).await {
        Ok(Some(artifact)) => {
            let disposition = format!("attachment; filename=\"{}\"", artifact.file_name);
            let mut response = artifact.content.into_response();
            let headers = response.headers_mut();
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(artifact.format.content_type()),
            );
            if let Ok(value) = HeaderValue::from_str(&disposition) {
                headers.insert(header::CONTENT_DISPOSITION, value);
            }
            response
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"status": "empty", "row_count": 0})),
        )
            .into_response(),
        Err(ExportError::InvalidFileName(_)) => {
            error_response(StatusCode::BAD_REQUEST, "Invalid file name")
        }
        Err(e) => {
            tracing::error!(tenant = %tenant, error = %e, "Export download failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

/// Handle health check requests.
async fn handle_health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "rolodex-mcp",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"status": "error", "message": message}))).into_response()
}

/// HTTP server for MCP transport.
pub struct HttpServer {
    bind_addr: String,
    state: Arc<HttpTransportState>,
}

impl HttpServer {
    /// Create a new HTTP server bound to the server's configured address.
    pub fn new(server: Arc<McpServer>) -> Self {
        Self {
            bind_addr: server.config().bind_addr(),
            state: Arc::new(HttpTransportState::new(server)),
        }
    }

    /// Run the HTTP server until Ctrl-C.
    pub async fn run(self) -> Result<(), McpError> {
        let app = create_router(self.state);

        let listener = tokio::net::TcpListener::bind(&self.bind_addr)
            .await
            .map_err(|e| {
                McpError::StartupFailed(format!("Failed to bind to {}: {}", self.bind_addr, e))
            })?;

        tracing::info!(addr = %self.bind_addr, "MCP HTTP server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down HTTP server");
}
