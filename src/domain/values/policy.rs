//! Tunable numeric policy shared by every detector.
//!
//! Defaults are the reference policy. A policy file only needs the fields it
//! overrides; everything else falls back through `#[serde(default)]`.

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    pub strikes: StrikePolicy,
    pub rules: RulePolicy,
    pub funnel: FunnelPolicy,
    pub fatigue: FatiguePolicy,
    pub alerts: AlertPolicy,
    pub timeouts: TimeoutPolicy,
}

/// What makes a single day "poor" for the strike streak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrikePolicy {
    pub good_cpp_threshold: f64,
    pub min_purchases_for_cpp_eval: u64,
    pub min_click_to_purchase: f64,
    pub min_clicks_for_evaluation: u64,
    pub min_spend_no_clicks: f64,
    /// How many most-recent days the streak may span.
    pub window_days: usize,
}

impl Default for StrikePolicy {
    fn default() -> Self {
        Self {
            good_cpp_threshold: 60.0,
            min_purchases_for_cpp_eval: 3,
            min_click_to_purchase: 0.07,
            min_clicks_for_evaluation: 10,
            min_spend_no_clicks: 10.0,
            window_days: 3,
        }
    }
}

/// Per-ad recommendation rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulePolicy {
    pub min_spend_no_clicks: f64,
    pub min_clicks_for_evaluation: u64,
    pub min_connect_rate: f64,
    pub min_page_views_for_evaluation: u64,
    pub min_lead_rate: f64,
    pub min_purchases_for_cpp_eval: u64,
    /// Upper bound of an acceptable cost-per-purchase. Above it rule 4 fires;
    /// at or below it (and above zero) the good-CPP override applies.
    pub max_cpp: f64,
    pub min_click_to_purchase: f64,
    /// Trailing window used to build each ad's history.
    pub evaluation_window_days: u32,
}

impl Default for RulePolicy {
    fn default() -> Self {
        Self {
            min_spend_no_clicks: 10.0,
            min_clicks_for_evaluation: 10,
            min_connect_rate: 0.50,
            min_page_views_for_evaluation: 20,
            min_lead_rate: 0.25,
            min_purchases_for_cpp_eval: 3,
            max_cpp: 90.0,
            min_click_to_purchase: 0.07,
            evaluation_window_days: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunnelPolicy {
    pub min_purchase_rate: f64,
    pub min_leads_for_purchase_rate: u64,
    pub min_click_to_purchase: f64,
    pub min_link_clicks_for_click_to_purchase: u64,
    pub min_lead_rate: f64,
    pub min_page_views_for_lead_rate: u64,
    pub min_connect_rate: f64,
    pub min_link_clicks_for_connect_rate: u64,
}

impl Default for FunnelPolicy {
    fn default() -> Self {
        Self {
            min_purchase_rate: 0.12,
            min_leads_for_purchase_rate: 10,
            min_click_to_purchase: 0.07,
            min_link_clicks_for_click_to_purchase: 50,
            min_lead_rate: 0.25,
            min_page_views_for_lead_rate: 20,
            min_connect_rate: 0.8,
            min_link_clicks_for_connect_rate: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FatiguePolicy {
    /// Days per comparison window; an ad needs twice this many days of history.
    pub window_days: usize,
    /// Recent mean CPP above `older × cost_inflation_ratio` is inflation.
    pub cost_inflation_ratio: f64,
    /// Recent mean CTR strictly below `older × ctr_decay_ratio` is decay.
    pub ctr_decay_ratio: f64,
}

impl Default for FatiguePolicy {
    fn default() -> Self {
        Self {
            window_days: 3,
            cost_inflation_ratio: 1.3,
            ctr_decay_ratio: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertPolicy {
    pub high_cpp: f64,
    pub low_click_to_purchase: f64,
    pub high_frequency: f64,
    pub window_days: u32,
    pub dedup_window_hours: i64,
    /// Shown in notification bodies as the healthy cost-per-purchase band.
    pub cpp_target_min: f64,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            high_cpp: 60.0,
            low_click_to_purchase: 0.05,
            high_frequency: 3.0,
            window_days: 7,
            dedup_window_hours: 24,
            cpp_target_min: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutPolicy {
    pub fetch_secs: u64,
    pub notify_secs: u64,
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self {
            fetch_secs: 30,
            notify_secs: 10,
        }
    }
}

impl Policy {
    /// Load a policy from a JSON file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, DomainError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DomainError::Policy(format!("cannot read {}: {e}", path.display())))?;
        let policy: Policy = serde_json::from_str(&raw)
            .map_err(|e| DomainError::Policy(format!("cannot parse {}: {e}", path.display())))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Reject thresholds that cannot mean anything.
    pub fn validate(&self) -> Result<(), DomainError> {
        let s = &self.strikes;
        non_negative("strikes.good_cpp_threshold", s.good_cpp_threshold)?;
        ratio("strikes.min_click_to_purchase", s.min_click_to_purchase)?;
        non_negative("strikes.min_spend_no_clicks", s.min_spend_no_clicks)?;
        if s.window_days == 0 {
            return Err(DomainError::Policy("strikes.window_days must be at least 1".into()));
        }

        let r = &self.rules;
        non_negative("rules.min_spend_no_clicks", r.min_spend_no_clicks)?;
        ratio("rules.min_connect_rate", r.min_connect_rate)?;
        ratio("rules.min_lead_rate", r.min_lead_rate)?;
        ratio("rules.min_click_to_purchase", r.min_click_to_purchase)?;
        non_negative("rules.max_cpp", r.max_cpp)?;
        if r.evaluation_window_days == 0 {
            return Err(DomainError::Policy(
                "rules.evaluation_window_days must be at least 1".into(),
            ));
        }
        if (r.evaluation_window_days as usize) < s.window_days {
            return Err(DomainError::Policy(format!(
                "rules.evaluation_window_days ({}) is shorter than strikes.window_days ({})",
                r.evaluation_window_days, s.window_days
            )));
        }

        let f = &self.funnel;
        ratio("funnel.min_purchase_rate", f.min_purchase_rate)?;
        ratio("funnel.min_click_to_purchase", f.min_click_to_purchase)?;
        ratio("funnel.min_lead_rate", f.min_lead_rate)?;
        ratio("funnel.min_connect_rate", f.min_connect_rate)?;

        let fa = &self.fatigue;
        if fa.window_days == 0 || fa.window_days * 2 > r.evaluation_window_days as usize {
            return Err(DomainError::Policy(format!(
                "fatigue.window_days ({}) must be at least 1 and fit twice in the {}-day evaluation window",
                fa.window_days, r.evaluation_window_days
            )));
        }
        positive("fatigue.cost_inflation_ratio", fa.cost_inflation_ratio)?;
        positive("fatigue.ctr_decay_ratio", fa.ctr_decay_ratio)?;

        let a = &self.alerts;
        non_negative("alerts.high_cpp", a.high_cpp)?;
        ratio("alerts.low_click_to_purchase", a.low_click_to_purchase)?;
        non_negative("alerts.high_frequency", a.high_frequency)?;
        non_negative("alerts.cpp_target_min", a.cpp_target_min)?;
        if a.window_days == 0 {
            return Err(DomainError::Policy("alerts.window_days must be at least 1".into()));
        }
        if a.dedup_window_hours <= 0 {
            return Err(DomainError::Policy(
                "alerts.dedup_window_hours must be positive".into(),
            ));
        }

        let t = &self.timeouts;
        if t.fetch_secs == 0 || t.notify_secs == 0 {
            return Err(DomainError::Policy("timeouts must be at least one second".into()));
        }
        Ok(())
    }
}

fn non_negative(name: &str, value: f64) -> Result<(), DomainError> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::Policy(format!(
            "{name} must be a non-negative number, got {value}"
        )));
    }
    Ok(())
}

fn positive(name: &str, value: f64) -> Result<(), DomainError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DomainError::Policy(format!(
            "{name} must be greater than zero, got {value}"
        )));
    }
    Ok(())
}

fn ratio(name: &str, value: f64) -> Result<(), DomainError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(DomainError::Policy(format!(
            "{name} must be between 0.0 and 1.0, got {value}"
        )));
    }
    Ok(())
}
