//! Reasoning agent: wraps an [`Explainer`] with a timeout and attaches the
//! fixed confidence and business-risk framing for a segment.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use insight_core::types::{Confidence, Reasoning, Segment, SignalSet};
use tracing::warn;

use crate::error::ReasoningError;
use crate::explainer::Explainer;

/// Prefix of the explanation reported when the explainer fails.
pub const UNAVAILABLE_PREFIX: &str = "Explanation unavailable: ";

#[derive(Clone)]
pub struct ReasoningAgent {
    explainer: Arc<dyn Explainer>,
    timeout: Duration,
}

impl ReasoningAgent {
    pub fn new(explainer: Arc<dyn Explainer>, timeout: Duration) -> Self {
        Self { explainer, timeout }
    }

    pub fn explainer_name(&self) -> &str {
        self.explainer.name()
    }

    /// Never fails: explainer errors, panics and timeouts degrade to a
    /// placeholder explanation for this customer only.
    pub async fn reason(&self, segment: Segment, signals: &SignalSet, domain: &str) -> Reasoning {
        let explain = AssertUnwindSafe(self.explainer.explain(segment, signals, domain))
            .catch_unwind();
        let outcome = match tokio::time::timeout(self.timeout, explain).await {
            Ok(Ok(result)) => result,
            Ok(Err(payload)) => Err(ReasoningError::Panicked(panic_message(payload.as_ref()))),
            Err(_) => Err(ReasoningError::Timeout(self.timeout.as_millis() as u64)),
        };

        let llm_explanation = match outcome {
            Ok(text) => text,
            Err(e) => {
                metrics::counter!("reasoning.failures").increment(1);
                warn!(
                    explainer = self.explainer.name(),
                    segment = %segment,
                    domain = %domain,
                    error = %e,
                    "Explanation failed, using placeholder"
                );
                format!("{UNAVAILABLE_PREFIX}{e}")
            }
        };

        Reasoning {
            llm_explanation,
            confidence: confidence(segment),
            business_risk: business_risk(segment).to_string(),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Strength of the behavioral evidence behind a segment.
pub fn confidence(segment: Segment) -> Confidence {
    match segment {
        Segment::DormantAtRisk | Segment::PriceSensitiveDisengagers => Confidence::High,
        Segment::ReEngaging => Confidence::Medium,
        Segment::StableCore | Segment::Monitor | Segment::NoActivity => Confidence::Low,
    }
}

pub fn business_risk(segment: Segment) -> &'static str {
    match segment {
        Segment::DormantAtRisk => "High churn risk if re-engagement is delayed.",
        Segment::PriceSensitiveDisengagers => {
            "Revenue erosion risk if value perception is not addressed."
        }
        Segment::ReEngaging => "Missed opportunity to reinforce renewed engagement.",
        Segment::StableCore => "Low immediate risk, but loyalty erosion if ignored.",
        Segment::Monitor | Segment::NoActivity => "Low immediate business risk.",
    }
}
