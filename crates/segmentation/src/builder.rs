//! Segment rule builder: fluent API for constructing rule predicates.

use crate::predicates::{Predicate, SegmentRule};
use insight_core::types::{Segment, VelocityTrend};
use insight_core::QualityTier;

pub struct SegmentRuleBuilder {
    name: String,
    segment: Segment,
    predicates: Vec<Predicate>,
}

impl SegmentRuleBuilder {
    pub fn new(name: impl Into<String>, segment: Segment) -> Self {
        Self {
            name: name.into(),
            segment,
            predicates: Vec::new(),
        }
    }

    pub fn engagement_below(mut self, bound: f64) -> Self {
        self.predicates.push(Predicate::EngagementBelow(bound));
        self
    }

    pub fn engagement_above(mut self, bound: f64) -> Self {
        self.predicates.push(Predicate::EngagementAbove(bound));
        self
    }

    pub fn habit_break(mut self) -> Self {
        self.predicates.push(Predicate::HabitBreak);
        self
    }

    pub fn velocity(mut self, trend: VelocityTrend) -> Self {
        self.predicates.push(Predicate::VelocityTrend(trend));
        self
    }

    pub fn quality_shift(mut self, from: QualityTier, to: QualityTier) -> Self {
        self.predicates.push(Predicate::QualityShift { from, to });
        self
    }

    pub fn build(self) -> SegmentRule {
        SegmentRule {
            name: self.name,
            segment: self.segment,
            predicates: self.predicates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_predicates_in_order() {
        let rule = SegmentRuleBuilder::new("dormant", Segment::DormantAtRisk)
            .engagement_below(0.4)
            .habit_break()
            .build();
        assert_eq!(rule.segment, Segment::DormantAtRisk);
        assert_eq!(
            rule.predicates,
            vec![Predicate::EngagementBelow(0.4), Predicate::HabitBreak]
        );
    }

    #[test]
    fn test_built_rule_is_a_conjunction() {
        let rule = SegmentRuleBuilder::new("re_engaging", Segment::ReEngaging)
            .velocity(VelocityTrend::Increasing)
            .quality_shift(QualityTier::Value, QualityTier::Premium)
            .build();
        let mut signals = insight_core::types::BehaviorSignals::placeholder("refuel_frequency");
        signals.velocity_trend = VelocityTrend::Increasing;
        assert!(!rule.matches(&signals));
        signals.quality_shift =
            insight_core::types::QualityShift::between(QualityTier::Value, QualityTier::Premium);
        assert!(rule.matches(&signals));
    }
}
