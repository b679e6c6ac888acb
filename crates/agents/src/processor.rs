//! Per-customer pipeline: behavior analysis, then reasoning, then a campaign
//! recommendation sized to the audience.

use std::sync::Arc;

use insight_core::types::{CustomerResult, Transaction};
use insight_core::{DomainProfile, InsightResult};
use insight_loyalty::CampaignRecommender;
use insight_reasoning::ReasoningAgent;
use insight_segmentation::SegmentationEngine;
use tracing::debug;

/// Processes a single customer. Holds no per-customer state, so one
/// instance is shared by every task of a run.
pub struct CustomerProcessor {
    segmentation: Arc<SegmentationEngine>,
    reasoning: ReasoningAgent,
    recommender: CampaignRecommender,
}

impl CustomerProcessor {
    pub fn new(
        segmentation: Arc<SegmentationEngine>,
        reasoning: ReasoningAgent,
        recommender: CampaignRecommender,
    ) -> Self {
        Self {
            segmentation,
            reasoning,
            recommender,
        }
    }

    pub fn reasoning(&self) -> &ReasoningAgent {
        &self.reasoning
    }

    pub async fn process(
        &self,
        customer_id: &str,
        transactions: &[Transaction],
        profile: &DomainProfile,
        audience_size: u32,
    ) -> InsightResult<CustomerResult> {
        let start = std::time::Instant::now();

        let analysis = self
            .segmentation
            .analyze_customer(customer_id, transactions, profile)?;

        let reasoning = self
            .reasoning
            .reason(analysis.segment, &analysis.signals, &profile.name)
            .await;

        let campaign = self.recommender.recommend(analysis.segment, audience_size);

        metrics::counter!("pipeline.customers").increment(1);
        metrics::counter!("pipeline.segments", "segment" => analysis.segment.as_str())
            .increment(1);
        debug!(
            customer_id = %customer_id,
            segment = %analysis.segment,
            latency_us = start.elapsed().as_micros() as u64,
            "Customer processed"
        );

        Ok(CustomerResult {
            customer_id: analysis.customer_id,
            segment: analysis.segment,
            signals: analysis.signals,
            reasoning,
            campaign,
        })
    }
}
