use crate::domain::values::severity::Severity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostTrend {
    Increasing,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CtrTrend {
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatigueMetrics {
    /// Always `None`: the daily rows cannot produce a per-window frequency.
    /// Kept in the contract so consumers do not break once a source supplies it.
    pub frequency: Option<f64>,
    pub unsupported_metrics: Vec<String>,
    pub cost_trend: CostTrend,
    pub ctr_trend: CtrTrend,
    pub recent_cpp: f64,
    pub older_cpp: f64,
    pub recent_ctr: f64,
    pub older_ctr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatigueAlert {
    pub ad_id: String,
    pub adset_id: String,
    pub campaign_id: String,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub metrics: FatigueMetrics,
}
