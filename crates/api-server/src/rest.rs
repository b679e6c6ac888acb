//! REST API handlers for pipeline runs, payload ingestion and operational
//! endpoints.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use insight_agents::{DataSource, Dataset, InMemoryDataSource, PipelineOrchestrator};
use insight_core::types::{Customer, CustomerResult, Transaction};
use insight_core::{DomainProfile, InsightError};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use utoipa::ToSchema;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<PipelineOrchestrator>,
    /// Backing store for `/run`.
    pub source: Arc<dyn DataSource>,
    pub default_audience_size: u32,
    pub node_id: String,
    pub start_time: Instant,
}

impl AppState {
    fn audience(&self, requested: Option<u32>) -> u32 {
        requested.unwrap_or(self.default_audience_size)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RunRequest {
    #[schema(example = "supermarket")]
    pub domain: String,
    /// Customers assumed reachable by the campaign; defaults to the
    /// configured audience size.
    #[serde(default)]
    pub audience_size: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RunResponse {
    pub results: Vec<CustomerResult>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct IngestRequest {
    pub domain: String,
    /// Customer records; each needs a `customer_id`.
    #[schema(value_type = Vec<Object>)]
    pub customers: Vec<Customer>,
    /// Transaction records keyed per the domain profile.
    #[schema(value_type = Vec<Object>)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub past_campaigns: Vec<serde_json::Value>,
    #[serde(default)]
    pub audience_size: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IngestResponse {
    pub domain: String,
    pub results: Vec<CustomerResult>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DomainsResponse {
    pub domains: Vec<DomainProfile>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub node_id: String,
    pub uptime_secs: u64,
}

/// Pipeline failure rendered as `{error, message}` with a matching status.
pub struct ApiError(pub InsightError);

impl From<InsightError> for ApiError {
    fn from(err: InsightError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            InsightError::UnknownDomain(_) => (StatusCode::BAD_REQUEST, "unsupported_domain"),
            InsightError::Validation(_) => (StatusCode::BAD_REQUEST, "invalid_transactions"),
            InsightError::DataSource(_) => (StatusCode::NOT_FOUND, "dataset_unavailable"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "pipeline_failed"),
        };

        metrics::counter!("api.errors", "code" => code).increment(1);
        let message = if status.is_server_error() {
            error!(error = %self.0, "Pipeline request failed");
            "Internal processing error".to_string()
        } else {
            warn!(error = %self.0, "Pipeline request rejected");
            self.0.to_string()
        };

        (
            status,
            Json(ErrorResponse {
                error: code.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

/// POST /run: Analyze the stored dataset for a domain.
#[utoipa::path(
    post,
    path = "/run",
    tag = "Pipeline",
    request_body = RunRequest,
    responses(
        (status = 200, description = "Per-customer results in dataset order", body = RunResponse),
        (status = 400, description = "Unsupported domain or malformed transactions", body = ErrorResponse),
        (status = 404, description = "No stored dataset for the domain", body = ErrorResponse),
    )
)]
pub async fn handle_run(
    State(state): State<AppState>,
    Json(request): Json<RunRequest>,
) -> Result<Json<RunResponse>, ApiError> {
    let audience_size = state.audience(request.audience_size);
    let run = state
        .orchestrator
        .run(&request.domain, state.source.as_ref(), audience_size)
        .await?;
    Ok(Json(RunResponse {
        results: run.results,
    }))
}

/// POST /ingest-and-analyze: Analyze a caller-supplied dataset.
#[utoipa::path(
    post,
    path = "/ingest-and-analyze",
    tag = "Pipeline",
    request_body = IngestRequest,
    responses(
        (status = 200, description = "Per-customer results in payload order", body = IngestResponse),
        (status = 400, description = "Unsupported domain or malformed transactions", body = ErrorResponse),
    )
)]
pub async fn handle_ingest(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, ApiError> {
    let audience_size = state.audience(request.audience_size);
    info!(
        domain = %request.domain,
        customers = request.customers.len(),
        transactions = request.transactions.len(),
        past_campaigns = request.past_campaigns.len(),
        "Ingestion payload received"
    );

    let source = InMemoryDataSource::new(Dataset {
        customers: request.customers,
        transactions: request.transactions,
        past_campaigns: request.past_campaigns,
    });
    let run = state
        .orchestrator
        .run(&request.domain, &source, audience_size)
        .await?;

    Ok(Json(IngestResponse {
        domain: run.domain,
        results: run.results,
    }))
}

/// GET /v1/domains: Supported domain profiles.
#[utoipa::path(
    get,
    path = "/v1/domains",
    tag = "Pipeline",
    responses((status = 200, description = "Registered domain profiles", body = DomainsResponse))
)]
pub async fn list_domains(State(state): State<AppState>) -> Json<DomainsResponse> {
    Json(DomainsResponse {
        domains: state.orchestrator.registry().profiles().cloned().collect(),
    })
}

/// GET /: Service status.
#[utoipa::path(
    get,
    path = "/",
    tag = "Operations",
    responses((status = 200, description = "Service is up", body = StatusResponse))
)]
pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
    })
}

/// GET /health: Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Operations",
    responses((status = 200, description = "Node health", body = HealthResponse))
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        node_id: state.node_id.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /ready: Readiness probe.
/// Ready once at least one domain profile is registered.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Operations",
    responses(
        (status = 200, description = "Ready to accept traffic"),
        (status = 503, description = "No domains registered"),
    )
)]
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.orchestrator.registry().names().next().is_some() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /live: Liveness probe.
#[utoipa::path(
    get,
    path = "/live",
    tag = "Operations",
    responses((status = 200, description = "Process is alive"))
)]
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}
