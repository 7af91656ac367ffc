//! Creative fatigue: compare each ad's last few calendar days against the
//! same number of days just before them and flag cost inflation or
//! click-through decay.

use crate::domain::entities::ad_history::AdHistory;
use crate::domain::entities::ad_record::DailyAdRecord;
use crate::domain::entities::fatigue_alert::{CostTrend, CtrTrend, FatigueAlert, FatigueMetrics};
use crate::domain::values::policy::FatiguePolicy;
use crate::domain::values::severity::Severity;
use chrono::{Days, NaiveDate};

pub struct FatigueDetector {
    policy: FatiguePolicy,
}

impl FatigueDetector {
    pub fn new(policy: FatiguePolicy) -> Self {
        Self { policy }
    }

    pub fn detect(&self, histories: &[AdHistory], as_of: NaiveDate) -> Vec<FatigueAlert> {
        histories
            .iter()
            .filter_map(|h| self.detect_ad(h, as_of))
            .collect()
    }

    /// `None` when the ad is healthy or is missing a day in either window.
    ///
    /// The recent window is the `window_days` days ending on `as_of`; the
    /// older window is the `window_days` days before that.
    pub fn detect_ad(&self, history: &AdHistory, as_of: NaiveDate) -> Option<FatigueAlert> {
        let w = self.policy.window_days;
        let recent_start = as_of.checked_sub_days(Days::new(w.saturating_sub(1) as u64))?;
        let older_start = recent_start.checked_sub_days(Days::new(w as u64))?;

        let (recent, older): (Vec<&DailyAdRecord>, Vec<&DailyAdRecord>) = history
            .records()
            .iter()
            .filter(|r| r.date >= older_start && r.date <= as_of)
            .partition(|r| r.date >= recent_start);
        if recent.len() < w || older.len() < w {
            return None;
        }

        // A day without purchases (or impressions) has no CPP (or CTR) to average.
        let recent_cpp = mean_where(&recent, |r| r.purchases > 0, |r| r.cost_per_purchase);
        let older_cpp = mean_where(&older, |r| r.purchases > 0, |r| r.cost_per_purchase);
        let recent_ctr = mean_where(&recent, |r| r.impressions > 0, |r| r.ctr);
        let older_ctr = mean_where(&older, |r| r.impressions > 0, |r| r.ctr);

        let cost_inflating =
            older_cpp > 0.0 && recent_cpp > older_cpp * self.policy.cost_inflation_ratio;
        let ctr_decaying = older_ctr > 0.0 && recent_ctr < older_ctr * self.policy.ctr_decay_ratio;
        if !cost_inflating && !ctr_decaying {
            return None;
        }

        let latest = recent[0];
        let mut notes = Vec::new();
        if cost_inflating {
            notes.push(format!(
                "CPP rose {:.1}% (${:.2} to ${:.2}) over the last {w} days.",
                (recent_cpp / older_cpp - 1.0) * 100.0,
                older_cpp,
                recent_cpp
            ));
        }
        if ctr_decaying {
            notes.push(format!(
                "CTR fell {:.1}% ({:.2}% to {:.2}%) over the last {w} days.",
                (1.0 - recent_ctr / older_ctr) * 100.0,
                older_ctr * 100.0,
                recent_ctr * 100.0
            ));
        }

        Some(FatigueAlert {
            ad_id: latest.ad_id.clone(),
            adset_id: latest.adset_id.clone(),
            campaign_id: latest.campaign_id.clone(),
            severity: if cost_inflating && ctr_decaying {
                Severity::Warning
            } else {
                Severity::Info
            },
            title: format!("Creative Fatigue Detected: {}", latest.display_name()),
            description: notes.join(" "),
            metrics: FatigueMetrics {
                frequency: None,
                unsupported_metrics: vec!["frequency".to_string()],
                cost_trend: if cost_inflating {
                    CostTrend::Increasing
                } else {
                    CostTrend::Stable
                },
                ctr_trend: if ctr_decaying {
                    CtrTrend::Decreasing
                } else {
                    CtrTrend::Stable
                },
                recent_cpp,
                older_cpp,
                recent_ctr,
                older_ctr,
            },
        })
    }
}

fn mean_where(
    days: &[&DailyAdRecord],
    has_value: impl Fn(&DailyAdRecord) -> bool,
    value: impl Fn(&DailyAdRecord) -> f64,
) -> f64 {
    let values: Vec<f64> = days
        .iter()
        .filter(|d| has_value(d))
        .map(|d| value(d))
        .collect();
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
