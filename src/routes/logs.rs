/**
 * Logs Route Handler
 * Receives batched client-side logs from the SPA and forwards them into tracing
 */
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tower_http::request_id::RequestId;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientLogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// A single log line emitted by the front end
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientLogEntry {
    pub timestamp: String,
    pub level: ClientLogLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

/// Batch of client logs
#[derive(Debug, Deserialize)]
pub struct ClientLogBatch {
    pub logs: Vec<ClientLogEntry>,
}

/// Ingestion summary
#[derive(Debug, Serialize, Deserialize)]
pub struct LogResponse {
    pub success: bool,
    pub received: usize,
}

/// POST /api/logs - Receive client logs
pub async fn receive_client_logs(
    request_id: Option<Extension<RequestId>>,
    Json(batch): Json<ClientLogBatch>,
) -> impl IntoResponse {
    let req_id = request_id
        .as_ref()
        .and_then(|ext| ext.0.header_value().to_str().ok())
        .unwrap_or("unknown");

    for entry in &batch.logs {
        forward_client_log(entry, req_id);
    }

    tracing::debug!(
        request_id = %req_id,
        batch_size = batch.logs.len(),
        "client log batch ingested"
    );

    (
        StatusCode::ACCEPTED,
        Json(LogResponse {
            success: true,
            received: batch.logs.len(),
        }),
    )
}

fn forward_client_log(entry: &ClientLogEntry, request_id: &str) {
    match entry.level {
        ClientLogLevel::Trace => tracing::trace!(
            request_id = %request_id,
            client_timestamp = %entry.timestamp,
            context = ?entry.context,
            source = "client",
            "{}", entry.message
        ),
        ClientLogLevel::Debug => tracing::debug!(
            request_id = %request_id,
            client_timestamp = %entry.timestamp,
            context = ?entry.context,
            source = "client",
            "{}", entry.message
        ),
        ClientLogLevel::Info => tracing::info!(
            request_id = %request_id,
            client_timestamp = %entry.timestamp,
            context = ?entry.context,
            source = "client",
            "{}", entry.message
        ),
        ClientLogLevel::Warn => tracing::warn!(
            request_id = %request_id,
            client_timestamp = %entry.timestamp,
            context = ?entry.context,
            source = "client",
            "{}", entry.message
        ),
        ClientLogLevel::Error => tracing::error!(
            request_id = %request_id,
            client_timestamp = %entry.timestamp,
            context = ?entry.context,
            source = "client",
            "{}", entry.message
        ),
    }
}
