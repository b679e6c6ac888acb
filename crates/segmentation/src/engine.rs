//! Core segmentation engine: extracts signals for a customer and assigns
//! exactly one segment through an ordered rule list (first match wins).

use insight_core::types::{BehaviorSignals, Segment, SignalSet, Transaction, VelocityTrend};
use insight_core::{DomainProfile, InsightResult, QualityTier};
use tracing::debug;

use crate::builder::SegmentRuleBuilder;
use crate::predicates::SegmentRule;
use crate::signals::{self, WindowSplit};

/// Segment assigned when no rule matches.
pub const FALLBACK_SEGMENT: Segment = Segment::Monitor;

/// Segment and signals for one customer.
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorAnalysis {
    pub customer_id: String,
    pub segment: Segment,
    pub signals: SignalSet,
    pub windows: Option<WindowSplit>,
}

pub struct SegmentationEngine {
    rules: Vec<SegmentRule>,
}

impl SegmentationEngine {
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    /// Rules are evaluated in the given order; order encodes priority.
    pub fn with_rules(rules: Vec<SegmentRule>) -> Self {
        Self { rules }
    }

    /// Map fully-analyzed signals to a segment.
    pub fn classify(&self, signals: &BehaviorSignals) -> Segment {
        self.rules
            .iter()
            .find(|rule| rule.matches(signals))
            .map(|rule| rule.segment)
            .unwrap_or(FALLBACK_SEGMENT)
    }

    /// Extract signals for `customer_id` and decide its segment. The
    /// no-activity and sparse cases bypass the rule list.
    pub fn analyze_customer(
        &self,
        customer_id: &str,
        transactions: &[Transaction],
        profile: &DomainProfile,
    ) -> InsightResult<BehaviorAnalysis> {
        let extraction = signals::extract(customer_id, transactions, profile)?;

        let segment = match (extraction.segment, extraction.signals()) {
            (Some(decided), _) => decided,
            (None, Some(signals)) => self.classify(signals),
            (None, None) => Segment::NoActivity,
        };

        metrics::counter!("segmentation.assigned", "segment" => segment.as_str()).increment(1);
        debug!(
            customer_id = %customer_id,
            domain = %profile.name,
            segment = %segment,
            windows = ?extraction.windows,
            "Customer segmented"
        );

        Ok(BehaviorAnalysis {
            customer_id: customer_id.to_string(),
            segment,
            signals: extraction.signals,
            windows: extraction.windows,
        })
    }
}

impl Default for SegmentationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// The behavioral segment rules, highest priority first.
pub fn default_rules() -> Vec<SegmentRule> {
    vec![
        SegmentRuleBuilder::new("dormant_at_risk", Segment::DormantAtRisk)
            .engagement_below(0.4)
            .habit_break()
            .build(),
        SegmentRuleBuilder::new("price_sensitive", Segment::PriceSensitiveDisengagers)
            .quality_shift(QualityTier::Premium, QualityTier::Value)
            .build(),
        SegmentRuleBuilder::new("stable_core", Segment::StableCore)
            .engagement_above(0.85)
            .velocity(VelocityTrend::Stable)
            .build(),
        SegmentRuleBuilder::new("re_engaging", Segment::ReEngaging)
            .velocity(VelocityTrend::Increasing)
            .build(),
    ]
}
