//! Pipeline orchestrator: resolves the domain, loads and validates the
//! dataset, then fans customers out over bounded Tokio tasks.

use std::sync::Arc;

use insight_core::types::{CustomerResult, Transaction};
use insight_core::{DomainProfile, DomainRegistry, InsightError, InsightResult};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};
use uuid::Uuid;

use crate::processor::CustomerProcessor;
use crate::source::{DataSource, Dataset};

/// Output of one run over a domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineRun {
    pub domain: String,
    pub results: Vec<CustomerResult>,
}

pub struct PipelineOrchestrator {
    registry: Arc<DomainRegistry>,
    processor: Arc<CustomerProcessor>,
    max_concurrency: usize,
}

impl PipelineOrchestrator {
    pub fn new(
        registry: Arc<DomainRegistry>,
        processor: Arc<CustomerProcessor>,
        max_concurrency: usize,
    ) -> Self {
        Self {
            registry,
            processor,
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn registry(&self) -> &DomainRegistry {
        &self.registry
    }

    /// Load `domain` from `source` and analyze every customer in it.
    pub async fn run(
        &self,
        domain: &str,
        source: &dyn DataSource,
        audience_size: u32,
    ) -> InsightResult<PipelineRun> {
        // Unknown domains fail before any data is touched.
        self.registry.get(domain)?;
        let dataset = source.load(domain).await?;
        self.analyze(domain, dataset, audience_size).await
    }

    /// Analyze an already loaded dataset. Results follow the input customer
    /// order regardless of task completion order.
    pub async fn analyze(
        &self,
        domain: &str,
        dataset: Dataset,
        audience_size: u32,
    ) -> InsightResult<PipelineRun> {
        let start = std::time::Instant::now();
        let run_id = Uuid::new_v4();
        let profile = Arc::new(self.registry.get(domain)?.clone());

        validate_transactions(&dataset.transactions, &profile)?;

        metrics::counter!("pipeline.runs").increment(1);
        info!(
            run_id = %run_id,
            domain = %domain,
            customers = dataset.customers.len(),
            transactions = dataset.transactions.len(),
            past_campaigns = dataset.past_campaigns.len(),
            audience_size,
            explainer = self.processor.reasoning().explainer_name(),
            "Pipeline run started"
        );

        let Dataset {
            customers,
            transactions,
            ..
        } = dataset;
        let transactions = Arc::new(transactions);
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();

        for (index, customer) in customers.into_iter().enumerate() {
            let semaphore = semaphore.clone();
            let processor = self.processor.clone();
            let transactions = transactions.clone();
            let profile = profile.clone();

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| InsightError::Internal(e.into()))?;
                let result = processor
                    .process(&customer.customer_id, &transactions, &profile, audience_size)
                    .await?;
                Ok::<_, InsightError>((index, result))
            });
        }

        let mut slots: Vec<Option<CustomerResult>> = vec![None; tasks.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok((index, result))) => slots[index] = Some(result),
                Ok(Err(e)) => {
                    tasks.abort_all();
                    return Err(e);
                }
                Err(e) => {
                    error!(run_id = %run_id, error = %e, "Customer task panicked");
                    tasks.abort_all();
                    return Err(InsightError::Internal(e.into()));
                }
            }
        }
        let results: Vec<CustomerResult> = slots.into_iter().flatten().collect();

        let latency_us = start.elapsed().as_micros() as u64;
        metrics::histogram!("pipeline.latency_us").record(latency_us as f64);
        info!(
            run_id = %run_id,
            domain = %domain,
            results = results.len(),
            latency_us,
            "Pipeline run completed"
        );

        Ok(PipelineRun {
            domain: domain.to_string(),
            results,
        })
    }
}

/// Reject the whole batch on the first record the extractor could not read.
fn validate_transactions(transactions: &[Transaction], profile: &DomainProfile) -> InsightResult<()> {
    for (index, txn) in transactions.iter().enumerate() {
        txn.validate(profile).map_err(|e| match e {
            InsightError::Validation(msg) => {
                InsightError::Validation(format!("transaction {index}: {msg}"))
            }
            other => other,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemoryDataSource;
    use insight_core::types::{Customer, Segment};
    use insight_loyalty::CampaignRecommender;
    use insight_reasoning::{ReasoningAgent, StaticExplainer};
    use insight_segmentation::SegmentationEngine;
    use serde_json::json;
    use std::time::Duration;

    fn orchestrator(max_concurrency: usize) -> PipelineOrchestrator {
        let processor = CustomerProcessor::new(
            Arc::new(SegmentationEngine::new()),
            ReasoningAgent::new(Arc::new(StaticExplainer::new()), Duration::from_secs(1)),
            CampaignRecommender::new(),
        );
        PipelineOrchestrator::new(
            Arc::new(DomainRegistry::builtin()),
            Arc::new(processor),
            max_concurrency,
        )
    }

    fn txn(customer: &str, item: &str, day: u32) -> Transaction {
        serde_json::from_value(json!({
            "customer_id": customer,
            "category": "grocery",
            "item_name": item,
            "timestamp": format!("2024-04-{day:02}T12:00:00"),
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_results_follow_input_order() {
        let customers: Vec<Customer> = (0..40).map(|i| Customer::new(format!("C{i:02}"))).collect();
        let transactions = vec![
            txn("C03", "Organic Milk", 1),
            txn("C03", "Organic Eggs", 2),
            txn("C03", "Artisan Bread", 3),
            txn("C03", "Basic Rice", 4),
            txn("C03", "Budget Pasta", 5),
            txn("C07", "Milk", 2),
        ];
        let dataset = Dataset {
            customers: customers.clone(),
            transactions,
            past_campaigns: Vec::new(),
        };

        let run = orchestrator(3).analyze("supermarket", dataset, 1000).await.unwrap();
        let ids: Vec<_> = run.results.iter().map(|r| r.customer_id.clone()).collect();
        let expected: Vec<_> = customers.iter().map(|c| c.customer_id.clone()).collect();
        assert_eq!(ids, expected);
        assert_eq!(run.results[3].segment, Segment::PriceSensitiveDisengagers);
        assert_eq!(run.results[7].segment, Segment::Monitor);
        assert_eq!(run.results[0].segment, Segment::NoActivity);
    }

    #[tokio::test]
    async fn test_unknown_domain_fails_before_loading() {
        let source = InMemoryDataSource::new(Dataset {
            customers: vec![Customer::new("C1")],
            ..Dataset::default()
        });
        let err = orchestrator(4).run("pharmacy", &source, 1000).await.unwrap_err();
        assert!(matches!(err, InsightError::UnknownDomain(ref d) if d == "pharmacy"));
    }

    #[tokio::test]
    async fn test_malformed_transaction_rejects_batch() {
        let mut bad = txn("C1", "Organic Milk", 3);
        bad.0.remove("timestamp");
        let dataset = Dataset {
            customers: vec![Customer::new("C1")],
            transactions: vec![txn("C1", "Organic Milk", 1), bad],
            past_campaigns: Vec::new(),
        };
        let err = orchestrator(4).analyze("supermarket", dataset, 1000).await.unwrap_err();
        match err {
            InsightError::Validation(msg) => {
                assert!(msg.starts_with("transaction 1:"), "{msg}");
                assert!(msg.contains("timestamp"), "{msg}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_customer_list() {
        let run = orchestrator(4)
            .analyze("banking", Dataset::default(), 1000)
            .await
            .unwrap();
        assert_eq!(run.domain, "banking");
        assert!(run.results.is_empty());
    }
}
