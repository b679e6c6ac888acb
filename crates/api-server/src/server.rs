//! API server: HTTP REST endpoints plus the Prometheus exporter.

use crate::rest::{self, AppState};
use crate::swagger::ApiDoc;
use axum::routing::{get, post};
use axum::Router;
use insight_agents::{DataSource, PipelineOrchestrator};
use insight_core::config::AppConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub struct ApiServer {
    config: AppConfig,
    orchestrator: Arc<PipelineOrchestrator>,
    source: Arc<dyn DataSource>,
}

impl ApiServer {
    pub fn new(
        config: AppConfig,
        orchestrator: Arc<PipelineOrchestrator>,
        source: Arc<dyn DataSource>,
    ) -> Self {
        Self {
            config,
            orchestrator,
            source,
        }
    }

    /// Full application router with middleware and state attached.
    pub fn router(&self) -> Router {
        let state = AppState {
            orchestrator: self.orchestrator.clone(),
            source: self.source.clone(),
            default_audience_size: self.config.pipeline.default_audience_size,
            node_id: self.config.node_id.clone(),
            start_time: Instant::now(),
        };

        Router::new()
            // Pipeline
            .route("/run", post(rest::handle_run))
            .route("/ingest-and-analyze", post(rest::handle_ingest))
            .route("/v1/domains", get(rest::list_domains))
            // Operational endpoints
            .route("/", get(rest::root))
            .route("/health", get(rest::health_check))
            .route("/ready", get(rest::readiness))
            .route("/live", get(rest::liveness))
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
            // Middleware
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Start the HTTP REST server.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let app = self.router();

        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(addr = %addr, node_id = %self.config.node_id, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Install the global recorder and serve `/metrics` on the metrics port.
    pub fn start_metrics(&self) -> anyhow::Result<()> {
        if !self.config.metrics.enabled {
            info!("Metrics exporter disabled");
            return Ok(());
        }

        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");
        Ok(())
    }
}
