//! Value types flowing through the pipeline: raw records in, signals,
//! segments, campaign proposals and per-customer results out.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

use crate::domain::{DomainProfile, QualityTier};
use crate::error::{InsightError, InsightResult};

pub const ITEM_NAME_FIELD: &str = "item_name";
pub const TIMESTAMP_FIELD: &str = "timestamp";

// ─── Input Records ──────────────────────────────────────────────────────────

/// A single transaction record. Key names for the customer and category are
/// domain-specific, so the record is kept as an opaque JSON object and read
/// through the accessors below.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Transaction(pub serde_json::Map<String, serde_json::Value>);

impl Transaction {
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// Whether the record's `field` holds exactly `customer_id`.
    /// Absent or non-string ids never match.
    pub fn belongs_to(&self, field: &str, customer_id: &str) -> bool {
        self.0.get(field).and_then(|v| v.as_str()) == Some(customer_id)
    }

    /// A required string field. Missing or non-string values are errors.
    pub fn str_field(&self, key: &str) -> InsightResult<&str> {
        match self.0.get(key) {
            Some(serde_json::Value::String(s)) => Ok(s),
            Some(other) => Err(InsightError::Validation(format!(
                "field '{key}' must be a string, got {other}"
            ))),
            None => Err(InsightError::Validation(format!(
                "missing required field '{key}'"
            ))),
        }
    }

    pub fn item_name(&self) -> InsightResult<&str> {
        self.str_field(ITEM_NAME_FIELD)
    }

    pub fn category<'a>(&'a self, profile: &DomainProfile) -> InsightResult<&'a str> {
        self.str_field(&profile.category_field)
    }

    /// Parsed `timestamp`, normalized to naive UTC.
    pub fn timestamp(&self) -> InsightResult<NaiveDateTime> {
        let raw = self.str_field(TIMESTAMP_FIELD)?;
        parse_timestamp(raw).ok_or_else(|| {
            InsightError::Validation(format!("unparseable timestamp '{raw}'"))
        })
    }

    /// Check every field the signal extractor reads.
    pub fn validate(&self, profile: &DomainProfile) -> InsightResult<()> {
        self.category(profile)?;
        self.item_name()?;
        self.timestamp()?;
        Ok(())
    }
}

/// ISO 8601 timestamps: RFC 3339 with offset, naive date-times with `T` or a
/// space separator, or a bare date (midnight).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// A customer to analyze. Attributes beyond the id are carried untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub customer_id: String,
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl Customer {
    pub fn new(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            attributes: serde_json::Map::new(),
        }
    }
}

// ─── Behavior Signals ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum VelocityTrend {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum CategoryConcentration {
    Narrowing,
    Expanding,
    Stable,
}

/// Tier transition between the baseline and recent windows. Serialized as
/// `"Stable"` or `"<baseline> → <recent>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityShift {
    Stable,
    Shift { from: QualityTier, to: QualityTier },
}

pub const SHIFT_ARROW: &str = " → ";

impl QualityShift {
    pub fn between(baseline: QualityTier, recent: QualityTier) -> Self {
        if baseline == recent {
            QualityShift::Stable
        } else {
            QualityShift::Shift {
                from: baseline,
                to: recent,
            }
        }
    }

    pub fn is_transition(&self) -> bool {
        matches!(self, QualityShift::Shift { .. })
    }
}

impl fmt::Display for QualityShift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityShift::Stable => f.write_str("Stable"),
            QualityShift::Shift { from, to } => write!(f, "{from}{SHIFT_ARROW}{to}"),
        }
    }
}

impl FromStr for QualityShift {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        fn tier(s: &str) -> Result<QualityTier, String> {
            match s.trim() {
                "Premium" => Ok(QualityTier::Premium),
                "Value" => Ok(QualityTier::Value),
                "Neutral" => Ok(QualityTier::Neutral),
                other => Err(format!("unknown quality tier '{other}'")),
            }
        }

        if s == "Stable" {
            return Ok(QualityShift::Stable);
        }
        let (from, to) = s
            .split_once('→')
            .ok_or_else(|| format!("invalid quality shift '{s}'"))?;
        Ok(QualityShift::between(tier(from)?, tier(to)?))
    }
}

impl Serialize for QualityShift {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for QualityShift {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

/// Behavioral signals for one customer, derived per run and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct BehaviorSignals {
    pub velocity_trend: VelocityTrend,
    pub velocity_change_pct: f64,
    pub engagement_score: f64,
    pub category_concentration: CategoryConcentration,
    #[schema(value_type = String, example = "Premium → Value")]
    pub quality_shift: QualityShift,
    pub habit_break_detected: bool,
    pub velocity_unit: String,
}

impl BehaviorSignals {
    /// Fixed set reported for customers with too few transactions to split.
    pub fn placeholder(velocity_unit: &str) -> Self {
        Self {
            velocity_trend: VelocityTrend::Stable,
            velocity_change_pct: 0.0,
            engagement_score: 1.0,
            category_concentration: CategoryConcentration::Stable,
            quality_shift: QualityShift::Stable,
            habit_break_detected: false,
            velocity_unit: velocity_unit.to_string(),
        }
    }
}

/// Signals as reported on a result: empty (`{}`) for customers with no
/// activity, otherwise the full signal set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalSet(pub Option<BehaviorSignals>);

impl SignalSet {
    pub fn empty() -> Self {
        Self(None)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn signals(&self) -> Option<&BehaviorSignals> {
        self.0.as_ref()
    }
}

impl From<BehaviorSignals> for SignalSet {
    fn from(signals: BehaviorSignals) -> Self {
        Self(Some(signals))
    }
}

impl Serialize for SignalSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        match &self.0 {
            Some(signals) => signals.serialize(serializer),
            None => serializer.serialize_map(Some(0))?.end(),
        }
    }
}

impl<'de> Deserialize<'de> for SignalSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        if map.is_empty() {
            return Ok(SignalSet::empty());
        }
        serde_json::from_value(serde_json::Value::Object(map))
            .map(|s| SignalSet(Some(s)))
            .map_err(D::Error::custom)
    }
}

// ─── Segments ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
pub enum Segment {
    #[serde(rename = "No Activity")]
    NoActivity,
    Monitor,
    #[serde(rename = "Dormant / At-Risk")]
    DormantAtRisk,
    #[serde(rename = "Price-Sensitive Disengagers")]
    PriceSensitiveDisengagers,
    #[serde(rename = "Stable Core Customers")]
    StableCore,
    #[serde(rename = "Re-Engaging Customers")]
    ReEngaging,
}

impl Segment {
    pub const ALL: [Segment; 6] = [
        Segment::NoActivity,
        Segment::Monitor,
        Segment::DormantAtRisk,
        Segment::PriceSensitiveDisengagers,
        Segment::StableCore,
        Segment::ReEngaging,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::NoActivity => "No Activity",
            Segment::Monitor => "Monitor",
            Segment::DormantAtRisk => "Dormant / At-Risk",
            Segment::PriceSensitiveDisengagers => "Price-Sensitive Disengagers",
            Segment::StableCore => "Stable Core Customers",
            Segment::ReEngaging => "Re-Engaging Customers",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Campaigns ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
pub enum CampaignType {
    #[serde(rename = "Bonus Points")]
    BonusPoints,
    #[serde(rename = "Extra Points")]
    ExtraPoints,
    #[serde(rename = "Welcome Back Reward")]
    WelcomeBackReward,
    #[serde(rename = "Access / Perk")]
    AccessPerk,
    Informational,
}

impl CampaignType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignType::BonusPoints => "Bonus Points",
            CampaignType::ExtraPoints => "Extra Points",
            CampaignType::WelcomeBackReward => "Welcome Back Reward",
            CampaignType::AccessPerk => "Access / Perk",
            CampaignType::Informational => "Informational",
        }
    }
}

impl fmt::Display for CampaignType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
pub enum Channel {
    #[serde(rename = "SMS")]
    Sms,
    Push,
    Email,
}

/// Marketing-ready campaign proposal with its economics estimate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct CampaignProposal {
    pub segment: Segment,
    pub campaign_type: CampaignType,
    pub channel: Channel,
    pub duration_days: u32,
    pub message: String,
    pub estimated_participation_rate: f64,
    pub estimated_cost: f64,
    pub estimated_revenue: f64,
    pub estimated_roi: f64,
}

// ─── Reasoning & Results ────────────────────────────────────────────────────

/// Reflects signal strength behind a segment, not model certainty.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Reasoning {
    pub llm_explanation: String,
    pub confidence: Confidence,
    pub business_risk: String,
}

/// One combined record per analyzed customer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct CustomerResult {
    pub customer_id: String,
    pub segment: Segment,
    #[schema(value_type = Object)]
    pub signals: SignalSet,
    pub reasoning: Reasoning,
    pub campaign: CampaignProposal,
}
