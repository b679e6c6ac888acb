//! OpenAPI specification and Swagger UI configuration.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Loyalty Insight API",
        version = "0.1.0",
        description = "Behavioral segmentation, campaign recommendation and ROI estimation for loyalty programs.\n\nSupports supermarket, fuel retail and retail banking transaction data.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Pipeline", description = "Segmentation and campaign recommendation runs"),
        (name = "Operations", description = "Status, health, readiness, and liveness probes"),
    ),
    paths(
        // Pipeline
        crate::rest::handle_run,
        crate::rest::handle_ingest,
        crate::rest::list_domains,
        // Operations
        crate::rest::root,
        crate::rest::health_check,
        crate::rest::readiness,
        crate::rest::liveness,
    ),
    components(schemas(
        // Request / response envelopes
        crate::rest::RunRequest,
        crate::rest::RunResponse,
        crate::rest::IngestRequest,
        crate::rest::IngestResponse,
        crate::rest::DomainsResponse,
        crate::rest::StatusResponse,
        crate::rest::ErrorResponse,
        crate::rest::HealthResponse,
        // Results
        insight_core::types::CustomerResult,
        insight_core::types::Segment,
        insight_core::types::BehaviorSignals,
        insight_core::types::VelocityTrend,
        insight_core::types::CategoryConcentration,
        insight_core::types::Reasoning,
        insight_core::types::Confidence,
        insight_core::types::CampaignProposal,
        insight_core::types::CampaignType,
        insight_core::types::Channel,
        // Domains
        insight_core::domain::DomainProfile,
        insight_core::domain::QualityKeywords,
        insight_core::domain::QualityTier,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_pipeline_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/run", "/ingest-and-analyze", "/v1/domains", "/health"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let schemas = doc.components.expect("components").schemas;
        assert!(schemas.contains_key("CustomerResult"));
    }
}
