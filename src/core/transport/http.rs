//! HTTP transport: JSON-RPC 2.0 over POST.
//!
//! A bridge for clients that speak plain HTTP instead of an MCP session
//! transport. It answers `initialize`, `tools/list`, `tools/call` and
//! `ping`; notifications are acknowledged.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, instrument, warn};

use super::{TransportError, TransportResult, config::HttpConfig};
use crate::core::McpServer;
use crate::core::server::INSTRUCTIONS;

const PROTOCOL_VERSION: &str = "2024-11-05";

const INVALID_REQUEST: i32 = -32600;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;

pub struct HttpTransport {
    config: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// `tools/call` parameters.
#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

#[derive(Clone)]
struct AppState {
    server: McpServer,
    session: Arc<RwLock<Option<Session>>>,
    rpc_path: String,
}

/// What the last `initialize` told us about the client.
#[derive(Debug, Clone, Serialize)]
struct Session {
    client: Option<String>,
    protocol_version: String,
    initialized: bool,
}

impl HttpTransport {
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Serve until the process is stopped.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();

        let mut app = build_router(&self.config, server);
        if self.config.enable_cors {
            app = app.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        info!(
            "Ready - listening on http://{}{} (JSON-RPC, CORS {})",
            addr,
            self.config.rpc_path,
            if self.config.enable_cors { "on" } else { "off" }
        );

        axum::serve(listener, app)
            .await
            .map_err(|e| TransportError::http(e.to_string()))
    }
}

fn build_router(config: &HttpConfig, server: McpServer) -> Router {
    let state = AppState {
        server,
        session: Arc::new(RwLock::new(None)),
        rpc_path: config.rpc_path.clone(),
    };

    Router::new()
        .route(&config.rpc_path, post(handle_rpc))
        .route("/health", get(health_check))
        .route("/", get(root_handler))
        .with_state(state)
}

async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "name": state.server.name(),
        "version": state.server.version(),
        "protocol": "JSON-RPC 2.0",
        "endpoints": {
            "rpc": state.rpc_path,
            "health": "/health"
        },
        "anki_connect": state.server.config().anki.url
    }))
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await.clone();
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "session": session
    }))
}

#[instrument(skip_all, fields(method = %request.method))]
async fn handle_rpc(
    State(state): State<AppState>,
    Json(request): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    debug!("JSON-RPC request received");
    (StatusCode::OK, Json(process_request(&state, request).await))
}

async fn process_request(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    if request.jsonrpc != "2.0" {
        return JsonRpcResponse::error(request.id, INVALID_REQUEST, "Invalid Request");
    }

    match request.method.as_str() {
        "initialize" => initialize(state, request).await,
        "tools/list" => {
            let tools = state.server.list_tools();
            JsonRpcResponse::success(request.id, json!({ "tools": tools }))
        }
        "tools/call" => call_tool(state, request).await,
        "ping" => JsonRpcResponse::success(request.id, json!({})),
        method if method.starts_with("notifications/") => {
            if method == "notifications/initialized" {
                if let Some(session) = state.session.write().await.as_mut() {
                    session.initialized = true;
                }
            }
            info!("Notification: {}", method);
            JsonRpcResponse::success(request.id, Value::Null)
        }
        other => {
            warn!("Unknown method: {}", other);
            JsonRpcResponse::error(request.id, METHOD_NOT_FOUND, "Method not found")
        }
    }
}

async fn initialize(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let client = request
        .params
        .as_ref()
        .and_then(|p| p.pointer("/clientInfo/name"))
        .and_then(Value::as_str)
        .map(str::to_string);
    info!("Initialize from {}", client.as_deref().unwrap_or("unknown client"));

    *state.session.write().await = Some(Session {
        client,
        protocol_version: PROTOCOL_VERSION.to_string(),
        initialized: false,
    });

    JsonRpcResponse::success(
        request.id,
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": state.server.name(),
                "version": state.server.version()
            },
            "instructions": INSTRUCTIONS
        }),
    )
}

async fn call_tool(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let Some(params) = request.params else {
        return JsonRpcResponse::error(request.id, INVALID_PARAMS, "Missing params");
    };
    let params: CallParams = match serde_json::from_value(params) {
        Ok(p) => p,
        Err(e) => {
            return JsonRpcResponse::error(request.id, INVALID_PARAMS, format!("Invalid params: {e}"));
        }
    };

    let arguments = params.arguments.unwrap_or_else(|| json!({}));
    match state.server.call_tool(&params.name, arguments).await {
        Ok(result) => JsonRpcResponse::success(request.id, result),
        Err(e) => JsonRpcResponse::error(request.id, INVALID_PARAMS, e),
    }
}
