// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use crate::application::QueryOrchestrator;
use crate::domain::app_config::ServerConfig;
use crate::domain::prompt::{BiasPrompt, BiasPromptCatalog};
use crate::domain::query::{ComparisonResult, QueryError, QueryRequest};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;

pub struct AppState {
    pub orchestrator: Arc<QueryOrchestrator>,
    pub prompts: Arc<BiasPromptCatalog>,
}

/// API routes only, no middleware
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/models", get(list_models_handler))
        .route("/api/query", post(query_handler))
        .route("/api/bias-prompts", get(list_prompts_handler))
        .with_state(state)
}

/// Full application: routes, CORS, request tracing and the optional
/// static front-end
pub fn app(state: Arc<AppState>, server: &ServerConfig) -> Router {
    let mut app = router(state);

    if let Some(dir) = &server.frontend_dir {
        if dir.is_dir() {
            app = app.fallback_service(ServeDir::new(dir));
        } else {
            warn!("Front-end directory {:?} not found; serving API only", dir);
        }
    }

    app.layer(cors_layer(&server.cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Whole-request failure, rendered as `{"detail": "..."}`
pub struct ApiError(QueryError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let QueryError::InvalidRequest(detail) = self.0;
        (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        Self(err)
    }
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "available_models": state.orchestrator.registry().available_count(),
    }))
}

async fn list_models_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({ "models": state.orchestrator.registry().list() }))
}

async fn query_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<ComparisonResult>, ApiError> {
    // Missing fields or wrong types are as invalid as an empty prompt
    let Json(request) =
        payload.map_err(|rejection| QueryError::InvalidRequest(rejection.body_text()))?;
    let result = state.orchestrator.run(request).await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
struct PromptFilter {
    category: Option<String>,
}

async fn list_prompts_handler(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<PromptFilter>,
) -> Json<serde_json::Value> {
    let prompts: Vec<&BiasPrompt> = match filter.category.as_deref() {
        Some(category) => state.prompts.by_category(category).collect(),
        None => state.prompts.prompts.iter().collect(),
    };
    Json(json!({ "prompts": prompts }))
}
