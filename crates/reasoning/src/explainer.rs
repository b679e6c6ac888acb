use async_trait::async_trait;
use insight_core::types::{Segment, SignalSet};

use crate::error::ReasoningError;

/// Produces the free-text explanation for one customer's segment.
///
/// Implementations only read their inputs. A failure is confined to the
/// customer being explained; see [`crate::ReasoningAgent`].
#[async_trait]
pub trait Explainer: Send + Sync {
    async fn explain(
        &self,
        segment: Segment,
        signals: &SignalSet,
        domain: &str,
    ) -> Result<String, ReasoningError>;

    /// Short identifier for logs.
    fn name(&self) -> &str;
}

/// Deterministic template explanations, used offline and when no model
/// credentials are configured.
#[derive(Debug, Clone, Default)]
pub struct StaticExplainer;

impl StaticExplainer {
    pub fn new() -> Self {
        Self
    }

    fn rationale(segment: Segment) -> &'static str {
        match segment {
            Segment::DormantAtRisk => {
                "Recent activity has dropped well below the customer's earlier cadence \
                 and their usual purchase categories have narrowed."
            }
            Segment::PriceSensitiveDisengagers => {
                "Recent purchases have moved from premium items toward value options."
            }
            Segment::StableCore => {
                "Purchase cadence is steady and engagement is holding at or above the \
                 earlier level."
            }
            Segment::ReEngaging => "Purchase cadence has picked up compared with the earlier period.",
            Segment::Monitor => "No strong behavioral pattern stands out yet.",
            Segment::NoActivity => "No transactions were recorded for this customer.",
        }
    }
}

#[async_trait]
impl Explainer for StaticExplainer {
    async fn explain(
        &self,
        segment: Segment,
        signals: &SignalSet,
        domain: &str,
    ) -> Result<String, ReasoningError> {
        let mut text = format!("[{domain}] {segment}: {}", Self::rationale(segment));
        if let Some(s) = signals.signals() {
            text.push_str(&format!(
                " Velocity ({}) is {:?} at {:+.2}%, engagement {:.2}, quality {}.",
                s.velocity_unit, s.velocity_trend, s.velocity_change_pct, s.engagement_score, s.quality_shift
            ));
        }
        Ok(text)
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insight_core::types::BehaviorSignals;

    #[tokio::test]
    async fn test_static_explanation_is_deterministic() {
        let explainer = StaticExplainer::new();
        let signals = SignalSet::from(BehaviorSignals::placeholder("basket_frequency"));
        let a = explainer.explain(Segment::Monitor, &signals, "supermarket").await.unwrap();
        let b = explainer.explain(Segment::Monitor, &signals, "supermarket").await.unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with("[supermarket] Monitor:"));
        assert!(a.contains("basket_frequency"));
        assert!(a.contains("quality Stable"));
    }

    #[tokio::test]
    async fn test_no_activity_omits_signal_summary() {
        let text = StaticExplainer::new()
            .explain(Segment::NoActivity, &SignalSet::empty(), "banking")
            .await
            .unwrap();
        assert_eq!(text, "[banking] No Activity: No transactions were recorded for this customer.");
    }
}
