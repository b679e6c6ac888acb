//! Behavior signal extraction.
//!
//! A customer's transactions are sorted chronologically and split by count
//! into a baseline window (the earlier ~60%) and a recent window (the rest).
//! Signals compare the two windows along cadence, category breadth and
//! quality tier. Customers with fewer than three transactions never reach
//! the split: zero yields `No Activity`, one or two a fixed `Monitor` set.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use insight_core::math::{round2, safe_divide};
use insight_core::types::{
    BehaviorSignals, CategoryConcentration, QualityShift, Segment, SignalSet, Transaction,
    VelocityTrend,
};
use insight_core::{DomainProfile, InsightResult, QualityTier};

/// Below this many transactions no window comparison is attempted.
pub const MIN_TRANSACTIONS_FOR_ANALYSIS: usize = 3;
/// Share of transactions (by count) assigned to the baseline window.
pub const BASELINE_FRACTION: f64 = 0.6;
/// Velocity change (percent) beyond which the trend is no longer `Stable`.
pub const VELOCITY_TREND_THRESHOLD_PCT: f64 = 15.0;

/// Window sizes of a full analysis. Both are at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSplit {
    pub baseline: usize,
    pub recent: usize,
}

/// Outcome of signal extraction for one customer.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Decided here for the short-circuit cases, `None` when the segment
    /// rules still have to run.
    pub segment: Option<Segment>,
    pub signals: SignalSet,
    pub windows: Option<WindowSplit>,
}

/// Extract behavioral signals for `customer_id` from the full transaction
/// collection. Filtering by customer happens here.
pub fn extract(
    customer_id: &str,
    all_transactions: &[Transaction],
    profile: &DomainProfile,
) -> InsightResult<Extraction> {
    let customer_txns: Vec<&Transaction> = all_transactions
        .iter()
        .filter(|t| t.belongs_to(&profile.customer_id_field, customer_id))
        .collect();

    match customer_txns.len() {
        0 => Ok(Extraction {
            segment: Some(Segment::NoActivity),
            signals: SignalSet::empty(),
            windows: None,
        }),
        n if n < MIN_TRANSACTIONS_FOR_ANALYSIS => Ok(Extraction {
            segment: Some(Segment::Monitor),
            signals: BehaviorSignals::placeholder(&profile.velocity_unit).into(),
            windows: None,
        }),
        _ => {
            let sorted = sort_chronologically(customer_txns)?;
            let (baseline, recent) = split_windows(&sorted);
            let signals = compare_windows(baseline, recent, profile)?;
            Ok(Extraction {
                segment: None,
                signals: signals.into(),
                windows: Some(WindowSplit {
                    baseline: baseline.len(),
                    recent: recent.len(),
                }),
            })
        }
    }
}

/// Stable ascending sort by parsed timestamp.
fn sort_chronologically(txns: Vec<&Transaction>) -> InsightResult<Vec<&Transaction>> {
    let mut keyed: Vec<(NaiveDateTime, &Transaction)> = txns
        .into_iter()
        .map(|t| t.timestamp().map(|ts| (ts, t)))
        .collect::<InsightResult<_>>()?;
    keyed.sort_by_key(|(ts, _)| *ts);
    Ok(keyed.into_iter().map(|(_, t)| t).collect())
}

/// Baseline gets `max(1, floor(0.6 * n))` transactions, recent the rest.
pub fn split_windows<'a, T>(sorted: &'a [T]) -> (&'a [T], &'a [T]) {
    let split_index = ((sorted.len() as f64 * BASELINE_FRACTION).floor() as usize)
        .max(1)
        .min(sorted.len());
    sorted.split_at(split_index)
}

fn compare_windows(
    baseline: &[&Transaction],
    recent: &[&Transaction],
    profile: &DomainProfile,
) -> InsightResult<BehaviorSignals> {
    let baseline_count = baseline.len() as f64;
    let recent_count = recent.len() as f64;

    let velocity_change_pct = safe_divide(recent_count - baseline_count, baseline_count) * 100.0;
    let velocity_trend = if velocity_change_pct < -VELOCITY_TREND_THRESHOLD_PCT {
        VelocityTrend::Decreasing
    } else if velocity_change_pct > VELOCITY_TREND_THRESHOLD_PCT {
        VelocityTrend::Increasing
    } else {
        VelocityTrend::Stable
    };

    let engagement_score = if baseline.is_empty() {
        1.0
    } else {
        recent_count / baseline_count
    };

    let baseline_categories = distinct_categories(baseline, profile)?;
    let recent_categories = distinct_categories(recent, profile)?;
    let category_concentration = match recent_categories.cmp(&baseline_categories) {
        std::cmp::Ordering::Less => CategoryConcentration::Narrowing,
        std::cmp::Ordering::Greater => CategoryConcentration::Expanding,
        std::cmp::Ordering::Equal => CategoryConcentration::Stable,
    };

    let quality_shift = QualityShift::between(
        classify_quality(baseline, profile)?,
        classify_quality(recent, profile)?,
    );

    let habit_break_detected = velocity_trend == VelocityTrend::Decreasing
        || category_concentration == CategoryConcentration::Narrowing
        || quality_shift.is_transition();

    Ok(BehaviorSignals {
        velocity_trend,
        velocity_change_pct: round2(velocity_change_pct),
        engagement_score: round2(engagement_score),
        category_concentration,
        quality_shift,
        habit_break_detected,
        velocity_unit: profile.velocity_unit.clone(),
    })
}

fn distinct_categories(window: &[&Transaction], profile: &DomainProfile) -> InsightResult<usize> {
    let categories = window
        .iter()
        .map(|t| t.category(profile))
        .collect::<InsightResult<HashSet<&str>>>()?;
    Ok(categories.len())
}

/// Tier of a window by keyword hit counts. Every keyword found in an item
/// name counts once, and one item may hit both lexicons.
pub fn classify_quality(
    window: &[&Transaction],
    profile: &DomainProfile,
) -> InsightResult<QualityTier> {
    let mut premium_hits = 0usize;
    let mut value_hits = 0usize;

    for txn in window {
        let name = txn.item_name()?.to_lowercase();
        premium_hits += count_hits(&name, &profile.quality_keywords.premium);
        value_hits += count_hits(&name, &profile.quality_keywords.value);
    }

    Ok(match premium_hits.cmp(&value_hits) {
        std::cmp::Ordering::Greater => QualityTier::Premium,
        std::cmp::Ordering::Less => QualityTier::Value,
        std::cmp::Ordering::Equal => QualityTier::Neutral,
    })
}

/// `name` must already be lower-case.
fn count_hits(name: &str, keywords: &[String]) -> usize {
    keywords
        .iter()
        .filter(|kw| name.contains(kw.to_lowercase().as_str()))
        .count()
}

impl Extraction {
    pub fn signals(&self) -> Option<&BehaviorSignals> {
        self.signals.signals()
    }
}
