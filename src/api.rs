//! REST API server for the banking assistant
//!
//! Exposes the agent via HTTP endpoints.

use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::agent::BankAgent;
use crate::models::TokenUsage;

/// =============================
/// Request / Response Models
/// =============================

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub input: String,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub final_output: String,
    pub tokens: Option<TokenUsage>,
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub agent: Arc<BankAgent>,
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

/// =============================
/// Query Endpoint
/// =============================

async fn query(
    State(state): State<ApiState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, (StatusCode, Json<serde_json::Value>)> {
    info!("Received query: {}", req.input);

    match state.agent.run(&req.input).await {
        Ok(result) => Ok(Json(QueryResponse {
            final_output: result.final_output,
            tokens: result.tokens,
        })),
        Err(e) => {
            // Upstream model/network failures surface as a generic
            // server error; detail goes to the log only.
            error!("Agent run failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Internal server error" })),
            ))
        }
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(agent: Arc<BankAgent>) -> Router {
    let state = ApiState { agent };

    Router::new()
        .route("/health", get(health))
        .route("/query", post(query))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    agent: Arc<BankAgent>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(agent);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
