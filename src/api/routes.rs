//! HTTP routes.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::Method,
    routing::get,
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use crate::agent::{Agent, TaskReport};
use crate::config::Config;

use super::types::{HealthResponse, TaskQuery, TaskResponse};

/// Shared application state. Immutable after startup.
pub struct AppState {
    pub config: Config,
    pub agent: Agent,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let agent = Agent::new(&config);
        Self { config, agent }
    }

    pub fn with_agent(config: Config, agent: Agent) -> Self {
        Self { config, agent }
    }
}

/// Build the router: `GET /task`, `GET /api/health`, open CORS for GET.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/task", get(run_task))
        .route("/api/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /task?q=... - Resolve and run a task.
///
/// Always answers 200 with the full response shape; failures are reported
/// in `output`.
async fn run_task(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TaskQuery>,
) -> Json<TaskResponse> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("task", %request_id);

    // Own task so a panic inside the pipeline still yields a response.
    let worker_state = Arc::clone(&state);
    let task = query.q.clone();
    let handle = tokio::spawn(
        async move { worker_state.agent.run_task(&task).await }.instrument(span),
    );

    let report = match handle.await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(%request_id, error = %e, "Task worker aborted");
            TaskReport::fault(&query.q, state.agent.name(), format!("task aborted: {}", e))
        }
    };

    Json(TaskResponse::from_report(
        report,
        &state.config.operator_email,
    ))
}

/// GET /api/health - Liveness plus engine readiness.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let ready = state.agent.is_ready();
    Json(HealthResponse {
        status: if ready { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        agent: state.agent.name().to_string(),
        engine_ready: ready,
    })
}
