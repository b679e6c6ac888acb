//! Domain profiles: how to read one business vertical's transaction records.
//!
//! Each supported vertical (supermarket, fuel retail, retail banking) gets an
//! immutable profile naming the record keys to read and the keyword lexicon
//! used to place a window of purchases into a quality tier.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{InsightError, InsightResult};

// ─── Quality Tiers ──────────────────────────────────────────────────────────

/// Tier of a transaction window, decided by keyword hit counts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
pub enum QualityTier {
    Premium,
    Value,
    Neutral,
}

impl QualityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Premium => "Premium",
            QualityTier::Value => "Value",
            QualityTier::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword lexicon for tier classification. Keywords match case-insensitively
/// as substrings of the item name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct QualityKeywords {
    #[serde(rename = "Premium", default)]
    pub premium: Vec<String>,
    #[serde(rename = "Value", default)]
    pub value: Vec<String>,
}

impl QualityKeywords {
    pub fn new<P, V>(premium: P, value: V) -> Self
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        V: IntoIterator,
        V::Item: AsRef<str>,
    {
        Self {
            premium: premium.into_iter().map(|k| k.as_ref().to_lowercase()).collect(),
            value: value.into_iter().map(|k| k.as_ref().to_lowercase()).collect(),
        }
    }
}

// ─── Domain Profile ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct DomainProfile {
    pub name: String,
    /// Record key holding the customer identifier.
    pub customer_id_field: String,
    /// Record key holding the product or service category.
    pub category_field: String,
    /// Label for the cadence signal, e.g. `basket_frequency`.
    pub velocity_unit: String,
    pub quality_keywords: QualityKeywords,
}

impl DomainProfile {
    pub fn supermarket() -> Self {
        Self {
            name: "supermarket".to_string(),
            customer_id_field: "customer_id".to_string(),
            category_field: "category".to_string(),
            velocity_unit: "basket_frequency".to_string(),
            quality_keywords: QualityKeywords::new(
                [
                    "organic",
                    "premium",
                    "artisan",
                    "wagyu",
                    "imported",
                    "single origin",
                    "luxury",
                ],
                ["basic", "store brand", "instant", "budget", "frozen", "economy"],
            ),
        }
    }

    pub fn oil() -> Self {
        Self {
            name: "oil".to_string(),
            customer_id_field: "customer_id".to_string(),
            category_field: "category".to_string(),
            velocity_unit: "refuel_frequency".to_string(),
            quality_keywords: QualityKeywords::new(
                ["premium", "power", "xtra", "high octane"],
                ["regular", "standard", "basic"],
            ),
        }
    }

    pub fn banking() -> Self {
        Self {
            name: "banking".to_string(),
            customer_id_field: "customer_id".to_string(),
            category_field: "category".to_string(),
            velocity_unit: "transaction_frequency".to_string(),
            quality_keywords: QualityKeywords::new(
                ["credit", "loan", "investment"],
                ["debit", "savings"],
            ),
        }
    }
}

// ─── Registry ───────────────────────────────────────────────────────────────

/// Immutable name → profile lookup, built once at startup.
#[derive(Debug, Clone)]
pub struct DomainRegistry {
    profiles: BTreeMap<String, DomainProfile>,
}

impl DomainRegistry {
    /// Registry holding the three built-in verticals.
    pub fn builtin() -> Self {
        Self::from_profiles([
            DomainProfile::supermarket(),
            DomainProfile::oil(),
            DomainProfile::banking(),
        ])
    }

    /// Later profiles with a duplicate name replace earlier ones.
    pub fn from_profiles(profiles: impl IntoIterator<Item = DomainProfile>) -> Self {
        Self {
            profiles: profiles
                .into_iter()
                .map(|p| (p.name.clone(), p))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> InsightResult<&DomainProfile> {
        self.profiles
            .get(name)
            .ok_or_else(|| InsightError::UnknownDomain(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn profiles(&self) -> impl Iterator<Item = &DomainProfile> {
        self.profiles.values()
    }
}

impl Default for DomainRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let registry = DomainRegistry::builtin();
        let profile = registry.get("oil").unwrap();
        assert_eq!(profile.velocity_unit, "refuel_frequency");
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["banking", "oil", "supermarket"]);
    }

    #[test]
    fn test_unknown_domain_is_error() {
        let registry = DomainRegistry::builtin();
        let err = registry.get("pharmacy").unwrap_err();
        assert!(matches!(err, InsightError::UnknownDomain(ref d) if d == "pharmacy"));
    }

    #[test]
    fn test_keywords_are_lowercased() {
        let keywords = QualityKeywords::new(["Single Origin"], ["STORE Brand"]);
        assert_eq!(keywords.premium, vec!["single origin"]);
        assert_eq!(keywords.value, vec!["store brand"]);
    }

    #[test]
    fn test_keywords_serialize_with_tier_names() {
        let json = serde_json::to_value(DomainProfile::banking().quality_keywords).unwrap();
        assert_eq!(json["Premium"][0], "credit");
        assert_eq!(json["Value"][1], "savings");
    }
}
