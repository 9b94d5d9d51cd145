//! JSON-RPC request handlers.

use crate::server::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use roster_core::{Registry, RosterError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error};

/// JSON-RPC 2.0 request structure.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 error structure.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data: None,
            }),
            id,
        }
    }
}

/// Health check endpoint.
pub async fn handle_health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// Main JSON-RPC handler.
pub async fn handle_rpc(
    State(state): State<Arc<AppState>>,
    Json(request): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    let method = request.method;
    let params = request.params.unwrap_or(Value::Object(Default::default()));
    let id = request.id;

    debug!("RPC call: {}({:?})", method, params);

    if method == "health_check" {
        return (
            StatusCode::OK,
            Json(JsonRpcResponse::success(id, json!({"status": "ok"}))),
        );
    }

    // Store calls block on disk I/O
    let registry = Arc::clone(&state.registry);
    let dispatched = {
        let method = method.clone();
        tokio::task::spawn_blocking(move || dispatch_method(&registry, &method, &params)).await
    };
    let result = dispatched
        .unwrap_or_else(|e| Err(RosterError::Other(format!("Handler task failed: {}", e))));

    match result {
        Ok(value) => (StatusCode::OK, Json(JsonRpcResponse::success(id, value))),
        Err(e) => {
            error!("RPC error for {}: {}", method, e);
            let code = e.to_rpc_error_code();
            (
                StatusCode::OK,
                Json(JsonRpcResponse::error(id, code, e.to_string())),
            )
        }
    }
}

/// Extract a required string parameter or return an error.
fn require_str_param(params: &Value, name: &str) -> roster_core::Result<String> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .map(String::from)
        .ok_or_else(|| RosterError::InvalidParams {
            message: format!("Missing required parameter: {}", name),
        })
}

/// Dispatch a method call to the registry.
fn dispatch_method(registry: &Registry, method: &str, params: &Value) -> roster_core::Result<Value> {
    match method {
        "register" => {
            let name = require_str_param(params, "name")?;
            let address = require_str_param(params, "address")?;
            registry.register(&name, &address)?;
            Ok(json!({"success": true}))
        }

        "unregister" => {
            let name = require_str_param(params, "name")?;
            registry.unregister(&name)?;
            Ok(json!({"success": true}))
        }

        "discover" => {
            let name = require_str_param(params, "name")?;
            let record = registry.discover(&name)?;
            Ok(serde_json::to_value(record).map_err(|e| RosterError::Other(e.to_string()))?)
        }

        "heartbeat" => {
            let name = require_str_param(params, "name")?;
            registry.heartbeat(&name)?;
            Ok(json!({"success": true}))
        }

        "sweep" => {
            let report = registry.sweep_once();
            Ok(serde_json::to_value(report).map_err(|e| RosterError::Other(e.to_string()))?)
        }

        _ => Err(RosterError::MethodNotFound {
            method: method.to_string(),
        }),
    }
}
