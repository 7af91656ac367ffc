use crate::domain::values::platform::Platform;
use crate::domain::values::severity::Severity;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    FlagAd,
    DisableAd,
}

impl RecommendationKind {
    pub fn for_strikes(strikes: u8) -> Self {
        if strikes >= 3 {
            RecommendationKind::DisableAd
        } else {
            RecommendationKind::FlagAd
        }
    }
}

/// Which per-ad rule produced a recommendation. Also the flag type in flag history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    NoEngagement,
    LowConnectRate,
    LowLeadRate,
    HighCostPerPurchase,
    LowClickToPurchase,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::NoEngagement => "no_engagement",
            RuleKind::LowConnectRate => "low_connect_rate",
            RuleKind::LowLeadRate => "low_lead_rate",
            RuleKind::HighCostPerPurchase => "high_cpp",
            RuleKind::LowClickToPurchase => "low_click_to_purchase",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RuleKind::NoEngagement => "No Engagement",
            RuleKind::LowConnectRate => "Low Connect Rate",
            RuleKind::LowLeadRate => "Low Lead Rate",
            RuleKind::HighCostPerPurchase => "High Cost Per Purchase",
            RuleKind::LowClickToPurchase => "Low Click-to-Purchase Rate",
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A per-ad recommendation. Built fresh on every run; never updated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    pub kind: RecommendationKind,
    pub rule: RuleKind,
    pub severity: Severity,
    pub ad_id: String,
    pub ad_name: String,
    pub adset_id: String,
    pub campaign_id: String,
    pub platform: Platform,
    /// Day of the record the rules ran against.
    pub date: NaiveDate,
    pub title: String,
    pub description: String,
    pub action_required: String,
    pub expected_impact: String,
    pub strike_count: u8,
    /// Ratios, thresholds and raw counters behind the decision.
    /// A `BTreeMap` keeps serialization order stable across runs.
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Recommendation {
    /// True when the good-CPP override reclassified this finding.
    pub fn is_override(&self) -> bool {
        self.metadata
            .get("override")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}
