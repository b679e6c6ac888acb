//! End-to-end pipeline runs over the shipped sample datasets, with stub
//! explainers in place of the network client.

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use insight_agents::{
        CustomerProcessor, Dataset, InMemoryDataSource, PipelineOrchestrator, StaticDataSource,
    };
    use insight_core::types::{Confidence, Segment, SignalSet};
    use insight_core::{DomainRegistry, InsightError};
    use insight_loyalty::CampaignRecommender;
    use insight_reasoning::{Explainer, ReasoningAgent, ReasoningError, StaticExplainer};
    use insight_segmentation::SegmentationEngine;

    fn data_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data")
    }

    fn orchestrator(explainer: Arc<dyn Explainer>) -> PipelineOrchestrator {
        let processor = CustomerProcessor::new(
            Arc::new(SegmentationEngine::new()),
            ReasoningAgent::new(explainer, Duration::from_secs(2)),
            CampaignRecommender::new(),
        );
        PipelineOrchestrator::new(Arc::new(DomainRegistry::builtin()), Arc::new(processor), 4)
    }

    /// Counts calls and fails for one chosen customer segment.
    struct CountingExplainer {
        calls: AtomicUsize,
        fail_for: Option<Segment>,
    }

    impl CountingExplainer {
        fn new(fail_for: Option<Segment>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_for,
            }
        }
    }

    #[async_trait]
    impl Explainer for CountingExplainer {
        async fn explain(
            &self,
            segment: Segment,
            _signals: &SignalSet,
            domain: &str,
        ) -> Result<String, ReasoningError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_for == Some(segment) {
                return Err(ReasoningError::Network("connection reset".to_string()));
            }
            Ok(format!("{domain}: {segment}"))
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    /// Panics instead of returning an error for one segment.
    struct PanickingExplainer(Segment);

    #[async_trait]
    impl Explainer for PanickingExplainer {
        async fn explain(
            &self,
            segment: Segment,
            _signals: &SignalSet,
            domain: &str,
        ) -> Result<String, ReasoningError> {
            if segment == self.0 {
                panic!("unexpected completion shape");
            }
            Ok(format!("{domain}: {segment}"))
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    fn segments(run: &insight_agents::PipelineRun) -> Vec<(String, Segment)> {
        run.results
            .iter()
            .map(|r| (r.customer_id.clone(), r.segment))
            .collect()
    }

    #[tokio::test]
    async fn test_supermarket_sample_run() {
        let source = StaticDataSource::new(data_dir());
        let run = orchestrator(Arc::new(StaticExplainer::new()))
            .run("supermarket", &source, 1000)
            .await
            .unwrap();

        assert_eq!(run.domain, "supermarket");
        assert_eq!(
            segments(&run),
            vec![
                ("S001".to_string(), Segment::PriceSensitiveDisengagers),
                ("S002".to_string(), Segment::StableCore),
                ("S003".to_string(), Segment::ReEngaging),
                ("S004".to_string(), Segment::Monitor),
                ("S005".to_string(), Segment::Monitor),
                ("S006".to_string(), Segment::NoActivity),
            ]
        );

        let price_sensitive = &run.results[0];
        let signals = price_sensitive.signals.signals().unwrap();
        assert_eq!(signals.quality_shift.to_string(), "Premium → Value");
        assert!(signals.habit_break_detected);
        assert_eq!(price_sensitive.reasoning.confidence, Confidence::High);
        assert_eq!(price_sensitive.campaign.estimated_cost, 7500.0);

        let stable = &run.results[1];
        assert_eq!(stable.campaign.estimated_roi, 39.0);
        assert!(run.results[5].signals.is_empty());
    }

    #[tokio::test]
    async fn test_oil_and_banking_sample_runs() {
        let source = StaticDataSource::new(data_dir());
        let orchestrator = orchestrator(Arc::new(StaticExplainer::new()));

        let oil = orchestrator.run("oil", &source, 1000).await.unwrap();
        assert_eq!(
            oil.results.iter().map(|r| r.segment).collect::<Vec<_>>(),
            vec![
                Segment::PriceSensitiveDisengagers,
                Segment::StableCore,
                Segment::ReEngaging,
                Segment::Monitor,
                Segment::NoActivity,
            ]
        );
        assert!(oil.results.iter().all(|r| r
            .signals
            .signals()
            .map_or(true, |s| s.velocity_unit == "refuel_frequency")));

        let banking = orchestrator.run("banking", &source, 1000).await.unwrap();
        assert_eq!(
            banking.results.iter().map(|r| r.segment).collect::<Vec<_>>(),
            vec![
                Segment::PriceSensitiveDisengagers,
                Segment::StableCore,
                Segment::Monitor,
                Segment::NoActivity,
                Segment::ReEngaging,
            ]
        );
    }

    #[tokio::test]
    async fn test_explainer_failure_is_isolated() {
        let explainer = Arc::new(CountingExplainer::new(Some(Segment::StableCore)));
        let source = StaticDataSource::new(data_dir());
        let run = orchestrator(explainer.clone())
            .run("supermarket", &source, 1000)
            .await
            .unwrap();

        assert_eq!(run.results.len(), 6);
        assert_eq!(explainer.calls.load(Ordering::SeqCst), 6);
        for result in &run.results {
            if result.segment == Segment::StableCore {
                assert_eq!(
                    result.reasoning.llm_explanation,
                    "Explanation unavailable: Network error: connection reset"
                );
            } else {
                assert_eq!(
                    result.reasoning.llm_explanation,
                    format!("supermarket: {}", result.segment)
                );
            }
        }
    }

    #[tokio::test]
    async fn test_explainer_panic_does_not_abort_run() {
        let explainer = Arc::new(PanickingExplainer(Segment::ReEngaging));
        let source = StaticDataSource::new(data_dir());
        let run = orchestrator(explainer)
            .run("supermarket", &source, 1000)
            .await
            .unwrap();

        assert_eq!(run.results.len(), 6);
        let re_engaging = &run.results[2];
        assert_eq!(re_engaging.segment, Segment::ReEngaging);
        assert_eq!(
            re_engaging.reasoning.llm_explanation,
            "Explanation unavailable: Explainer panicked: unexpected completion shape"
        );
        assert_eq!(run.results[1].reasoning.llm_explanation, "supermarket: Stable Core Customers");
    }

    #[tokio::test]
    async fn test_unknown_domain_never_reaches_explainer() {
        let explainer = Arc::new(CountingExplainer::new(None));
        let source = StaticDataSource::new(data_dir());
        let err = orchestrator(explainer.clone())
            .run("pharmacy", &source, 1000)
            .await
            .unwrap_err();

        assert!(matches!(err, InsightError::UnknownDomain(_)));
        assert_eq!(err.to_string(), "Unsupported domain: pharmacy");
        assert_eq!(explainer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_ingested_payload_matches_static_run() {
        let static_source = StaticDataSource::new(data_dir());
        let orchestrator = orchestrator(Arc::new(StaticExplainer::new()));
        let from_disk = orchestrator.run("oil", &static_source, 250).await.unwrap();

        let raw_customers = std::fs::read(data_dir().join("oil/customers.json")).unwrap();
        let raw_transactions = std::fs::read(data_dir().join("oil/transactions.json")).unwrap();
        let dataset = Dataset {
            customers: serde_json::from_slice(&raw_customers).unwrap(),
            transactions: serde_json::from_slice(&raw_transactions).unwrap(),
            past_campaigns: vec![serde_json::json!({"campaign": "winter-fuel", "roi": 3.2})],
        };
        let ingested = orchestrator
            .run("oil", &InMemoryDataSource::new(dataset), 250)
            .await
            .unwrap();

        assert_eq!(from_disk, ingested);
    }
}
