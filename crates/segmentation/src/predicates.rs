//! Predicate types and evaluation logic for segment rules.

use insight_core::types::{BehaviorSignals, QualityShift, Segment, VelocityTrend};
use insight_core::QualityTier;

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `engagement_score` strictly below the bound.
    EngagementBelow(f64),
    /// `engagement_score` strictly above the bound.
    EngagementAbove(f64),
    HabitBreak,
    VelocityTrend(VelocityTrend),
    QualityShift { from: QualityTier, to: QualityTier },
}

/// A named rule: when every predicate holds, the customer lands in `segment`.
#[derive(Debug, Clone)]
pub struct SegmentRule {
    pub name: String,
    pub segment: Segment,
    pub predicates: Vec<Predicate>,
}

impl SegmentRule {
    pub fn matches(&self, signals: &BehaviorSignals) -> bool {
        self.predicates.iter().all(|p| evaluate(p, signals))
    }
}

pub fn evaluate(predicate: &Predicate, signals: &BehaviorSignals) -> bool {
    match predicate {
        Predicate::EngagementBelow(bound) => signals.engagement_score < *bound,
        Predicate::EngagementAbove(bound) => signals.engagement_score > *bound,
        Predicate::HabitBreak => signals.habit_break_detected,
        Predicate::VelocityTrend(trend) => signals.velocity_trend == *trend,
        Predicate::QualityShift { from, to } => {
            signals.quality_shift
                == QualityShift::Shift {
                    from: *from,
                    to: *to,
                }
        }
    }
}
