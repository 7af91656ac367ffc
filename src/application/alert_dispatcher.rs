//! Campaign-wide threshold alerts with time-window deduplication.
//!
//! Each check that trips fires at most once per dedup window: if an unresolved
//! alert of the same type was created inside the window, the check is a no-op.
//! The check-then-append sequence runs under a per-type lock, so concurrent
//! dispatches in one process cannot double-fire.

use crate::application::evaluate::load_window;
use crate::domain::entities::ad_record::DailyAdRecord;
use crate::domain::entities::alert_record::AlertRecord;
use crate::domain::entities::campaign_totals::CampaignTotals;
use crate::domain::error::DomainError;
use crate::domain::ports::ad_performance::AdPerformanceSource;
use crate::domain::ports::alert_history::AlertHistory;
use crate::domain::ports::notifier::Notifier;
use crate::domain::values::alert_type::AlertType;
use crate::domain::values::campaign_filter::CampaignFilter;
use crate::domain::values::policy::Policy;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckOutcome {
    /// Metric within threshold.
    Clear,
    /// Not enough data to compute the metric (no purchases, no clicks, no frequency).
    NoData,
    /// Tripped, but an unresolved alert of this type is still inside the dedup window.
    Suppressed,
    Fired {
        alert_id: String,
        notification_sent: bool,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub alert_type: AlertType,
    pub metric_value: Option<f64>,
    pub threshold: f64,
    pub outcome: CheckOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub checked_at: DateTime<Utc>,
    pub window_days: u32,
    pub rows_scanned: usize,
    pub partial: bool,
    pub errors: Vec<String>,
    pub checks: Vec<CheckResult>,
}

impl DispatchReport {
    pub fn fired(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| matches!(c.outcome, CheckOutcome::Fired { .. }))
            .count()
    }
}

/// A tripped check, ready to notify.
struct Trip {
    alert_type: AlertType,
    value: f64,
    threshold: f64,
    title: String,
    body: String,
}

enum Evaluation {
    Clear(f64),
    NoData,
    Tripped(Trip),
}

struct AlertLocks {
    high_cpp: Mutex<()>,
    low_click_to_purchase: Mutex<()>,
    high_frequency: Mutex<()>,
}

impl AlertLocks {
    fn new() -> Self {
        Self {
            high_cpp: Mutex::new(()),
            low_click_to_purchase: Mutex::new(()),
            high_frequency: Mutex::new(()),
        }
    }

    fn get(&self, alert_type: AlertType) -> &Mutex<()> {
        match alert_type {
            AlertType::HighCpp => &self.high_cpp,
            AlertType::LowClickToPurchase => &self.low_click_to_purchase,
            AlertType::HighFrequency => &self.high_frequency,
        }
    }
}

pub struct AlertDispatcher {
    source: Arc<dyn AdPerformanceSource>,
    history: Arc<dyn AlertHistory>,
    notifier: Arc<dyn Notifier>,
    filter: CampaignFilter,
    policy: Policy,
    locks: AlertLocks,
}

impl AlertDispatcher {
    pub fn new(
        source: Arc<dyn AdPerformanceSource>,
        history: Arc<dyn AlertHistory>,
        notifier: Arc<dyn Notifier>,
        filter: CampaignFilter,
        policy: Policy,
    ) -> Self {
        Self {
            source,
            history,
            notifier,
            filter,
            policy,
            locks: AlertLocks::new(),
        }
    }

    /// Run all three checks as of `now`.
    pub async fn dispatch_at(&self, now: DateTime<Utc>) -> DispatchReport {
        let window_days = self.policy.alerts.window_days;
        let snapshot = load_window(
            self.source.as_ref(),
            &self.filter,
            now.date_naive(),
            window_days,
            Duration::from_secs(self.policy.timeouts.fetch_secs),
        )
        .await;

        let checks = if snapshot.records.is_empty() {
            AlertType::ALL
                .iter()
                .map(|&alert_type| CheckResult {
                    alert_type,
                    metric_value: None,
                    threshold: self.threshold(alert_type),
                    outcome: CheckOutcome::NoData,
                })
                .collect()
        } else {
            let totals = CampaignTotals::from_records(&snapshot.records);
            let (cpp, ctp, freq) = tokio::join!(
                self.settle(self.check_high_cpp(&totals), AlertType::HighCpp, now),
                self.settle(
                    self.check_low_click_to_purchase(&totals),
                    AlertType::LowClickToPurchase,
                    now
                ),
                self.settle(
                    self.check_high_frequency(&snapshot.records),
                    AlertType::HighFrequency,
                    now
                ),
            );
            vec![cpp, ctp, freq]
        };

        let report = DispatchReport {
            checked_at: now,
            window_days,
            rows_scanned: snapshot.rows_fetched,
            partial: !snapshot.errors.is_empty(),
            errors: snapshot.errors,
            checks,
        };
        tracing::info!(
            filter = %self.filter,
            rows = report.rows_scanned,
            fired = report.fired(),
            partial = report.partial,
            "alert checks finished"
        );
        report
    }

    fn threshold(&self, alert_type: AlertType) -> f64 {
        let a = &self.policy.alerts;
        match alert_type {
            AlertType::HighCpp => a.high_cpp,
            AlertType::LowClickToPurchase => a.low_click_to_purchase,
            AlertType::HighFrequency => a.high_frequency,
        }
    }

    fn check_high_cpp(&self, totals: &CampaignTotals) -> Evaluation {
        let a = &self.policy.alerts;
        if totals.purchases == 0 {
            return Evaluation::NoData;
        }
        let cpp = totals.cost_per_purchase();
        if cpp <= a.high_cpp {
            return Evaluation::Clear(cpp);
        }
        Evaluation::Tripped(Trip {
            alert_type: AlertType::HighCpp,
            value: cpp,
            threshold: a.high_cpp,
            title: "High Cost Per Purchase Alert".into(),
            body: format!(
                "Cost Per Purchase is ${cpp:.2} (target: ${:.0}-${:.0}).\n\n\
                 Campaign: {}\n\
                 Last {} days: {} purchases, ${:.2} spend\n\n\
                 Action required: review funnel leaks and per-ad recommendations.",
                a.cpp_target_min, a.high_cpp, self.filter, a.window_days, totals.purchases, totals.spend
            ),
        })
    }

    fn check_low_click_to_purchase(&self, totals: &CampaignTotals) -> Evaluation {
        let a = &self.policy.alerts;
        if totals.link_clicks == 0 {
            return Evaluation::NoData;
        }
        let rate = totals.click_to_purchase_rate();
        if rate >= a.low_click_to_purchase {
            return Evaluation::Clear(rate);
        }
        Evaluation::Tripped(Trip {
            alert_type: AlertType::LowClickToPurchase,
            value: rate,
            threshold: a.low_click_to_purchase,
            title: "Low Click-to-Purchase Rate Alert".into(),
            body: format!(
                "Click-to-Purchase Rate is {:.2}% (threshold: {:.2}%).\n\n\
                 Campaign: {}\n\
                 Last {} days: {} purchases from {} link clicks\n\n\
                 Action required: check funnel leaks. Likely causes:\n\
                 - landing page not loading (click-to-page)\n\
                 - lead form problems (click-to-lead)\n\
                 - purchase page problems (lead-to-purchase)",
                rate * 100.0,
                a.low_click_to_purchase * 100.0,
                self.filter,
                a.window_days,
                totals.purchases,
                totals.link_clicks
            ),
        })
    }

    /// Averages frequency over the rows above the threshold.
    fn check_high_frequency(&self, records: &[DailyAdRecord]) -> Evaluation {
        let a = &self.policy.alerts;
        let reported: Vec<f64> = records.iter().filter_map(|r| r.frequency).collect();
        if reported.is_empty() {
            return Evaluation::NoData;
        }
        let high: Vec<f64> = reported
            .iter()
            .copied()
            .filter(|f| *f > a.high_frequency)
            .collect();
        if high.is_empty() {
            let peak = reported.iter().copied().fold(0.0_f64, f64::max);
            return Evaluation::Clear(peak);
        }
        let average = high.iter().sum::<f64>() / high.len() as f64;
        let mut ads: Vec<&str> = records
            .iter()
            .filter(|r| r.frequency.is_some_and(|f| f > a.high_frequency))
            .map(|r| r.ad_id.as_str())
            .collect();
        ads.sort_unstable();
        ads.dedup();

        Evaluation::Tripped(Trip {
            alert_type: AlertType::HighFrequency,
            value: average,
            threshold: a.high_frequency,
            title: "Creative Fatigue Alert".into(),
            body: format!(
                "{} ads showing creative fatigue (frequency above {:.1}).\n\n\
                 Campaign: {}\n\
                 Average frequency: {average:.2} over the last {} days\n\n\
                 Action required: consider\n\
                 - refreshing creative assets\n\
                 - expanding audience targeting\n\
                 - pausing fatigued ads",
                ads.len(),
                a.high_frequency,
                self.filter,
                a.window_days
            ),
        })
    }

    async fn settle(
        &self,
        evaluation: Evaluation,
        alert_type: AlertType,
        now: DateTime<Utc>,
    ) -> CheckResult {
        let threshold = self.threshold(alert_type);
        let trip = match evaluation {
            Evaluation::Clear(value) => {
                return CheckResult {
                    alert_type,
                    metric_value: Some(value),
                    threshold,
                    outcome: CheckOutcome::Clear,
                }
            }
            Evaluation::NoData => {
                return CheckResult {
                    alert_type,
                    metric_value: None,
                    threshold,
                    outcome: CheckOutcome::NoData,
                }
            }
            Evaluation::Tripped(trip) => trip,
        };

        let outcome = self.fire_once(&trip, now).await;
        CheckResult {
            alert_type: trip.alert_type,
            metric_value: Some(trip.value),
            threshold: trip.threshold,
            outcome,
        }
    }

    /// Alert history is sqlite-backed; run its calls on the blocking pool.
    async fn on_history<T, F>(&self, call: F) -> Result<T, DomainError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn AlertHistory) -> Result<T, DomainError> + Send + 'static,
    {
        let history = self.history.clone();
        tokio::task::spawn_blocking(move || call(history.as_ref()))
            .await
            .map_err(|e| DomainError::Database(format!("alert history task failed: {e}")))?
    }

    async fn fire_once(&self, trip: &Trip, now: DateTime<Utc>) -> CheckOutcome {
        let _guard = self.locks.get(trip.alert_type).lock().await;

        let since = now - chrono::Duration::hours(self.policy.alerts.dedup_window_hours);
        let alert_type = trip.alert_type;
        match self
            .on_history(move |h| h.has_unresolved_alert(alert_type, since))
            .await
        {
            Ok(true) => {
                tracing::debug!(alert_type = %trip.alert_type, value = trip.value, "alert suppressed, unresolved alert inside dedup window");
                return CheckOutcome::Suppressed;
            }
            Ok(false) => {}
            Err(e) => {
                tracing::error!(alert_type = %trip.alert_type, error = %e, "alert history lookup failed");
                return CheckOutcome::Failed {
                    error: e.to_string(),
                };
            }
        }

        let notify_timeout = Duration::from_secs(self.policy.timeouts.notify_secs);
        let sent = match tokio::time::timeout(
            notify_timeout,
            self.notifier.send(&trip.title, &trip.body),
        )
        .await
        {
            Ok(sent) => sent,
            Err(_) => {
                tracing::warn!(alert_type = %trip.alert_type, notifier = self.notifier.name(), "notification timed out");
                false
            }
        };
        if !sent {
            tracing::warn!(alert_type = %trip.alert_type, notifier = self.notifier.name(), "notification not delivered, recording alert anyway");
        }

        let record = AlertRecord::new(
            trip.alert_type,
            trip.value,
            trip.threshold,
            trip.body.clone(),
            sent,
            now,
        );
        let alert_id = record.id.clone();
        match self.on_history(move |h| h.append_alert(&record)).await {
            Ok(()) => {
                tracing::info!(alert_type = %trip.alert_type, value = trip.value, threshold = trip.threshold, notification_sent = sent, "alert fired");
                CheckOutcome::Fired {
                    alert_id,
                    notification_sent: sent,
                }
            }
            Err(e) => {
                tracing::error!(alert_type = %trip.alert_type, error = %e, "failed to record alert");
                CheckOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}
