//! The evaluate entry point: one fetch, one normalization pass, three detectors.

use crate::application::fatigue::FatigueDetector;
use crate::application::funnel_leaks::FunnelLeakDetector;
use crate::application::recommendations::RecommendationEvaluator;
use crate::domain::entities::ad_history::AdHistory;
use crate::domain::entities::ad_record::{DailyAdRecord, RawAdRow};
use crate::domain::entities::campaign_totals::CampaignTotals;
use crate::domain::entities::fatigue_alert::FatigueAlert;
use crate::domain::entities::funnel_leak::FunnelLeak;
use crate::domain::entities::recommendation::Recommendation;
use crate::domain::error::DomainError;
use crate::domain::ports::ad_performance::AdPerformanceSource;
use crate::domain::values::campaign_filter::CampaignFilter;
use crate::domain::values::policy::Policy;
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Everything one run produced. Each run is complete and authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub evaluated_at: DateTime<Utc>,
    pub as_of: NaiveDate,
    pub since: NaiveDate,
    pub filter: CampaignFilter,
    pub rows_fetched: usize,
    pub records_evaluated: usize,
    /// True when rows were dropped or the source failed.
    pub partial: bool,
    pub errors: Vec<String>,
    pub totals: CampaignTotals,
    pub recommendations: Vec<Recommendation>,
    pub funnel_leaks: Vec<FunnelLeak>,
    pub fatigue_alerts: Vec<FatigueAlert>,
}

impl EvaluationReport {
    pub fn find_recommendation(&self, id: &str) -> Option<&Recommendation> {
        self.recommendations.iter().find(|r| r.id == id)
    }
}

/// Rows fetched and normalized for one window.
pub(crate) struct Snapshot {
    pub since: NaiveDate,
    pub rows_fetched: usize,
    pub records: Vec<DailyAdRecord>,
    pub errors: Vec<String>,
}

/// Fetch `window_days` days ending at `as_of` (inclusive) and normalize them.
/// Never fails: source problems come back as errors on an empty snapshot.
pub(crate) async fn load_window(
    source: &dyn AdPerformanceSource,
    filter: &CampaignFilter,
    as_of: NaiveDate,
    window_days: u32,
    fetch_timeout: Duration,
) -> Snapshot {
    let since = as_of
        .checked_sub_days(Days::new(u64::from(window_days.saturating_sub(1))))
        .unwrap_or(as_of);

    let rows = match tokio::time::timeout(fetch_timeout, source.fetch(filter, since)).await {
        Ok(Ok(rows)) => rows,
        Ok(Err(e)) => {
            tracing::error!(source = source.name(), %filter, %since, %as_of, error = %e, "row fetch failed");
            return Snapshot::failed(since, e.to_string());
        }
        Err(_) => {
            let e = DomainError::Timeout(format!(
                "{} did not answer within {}s",
                source.name(),
                fetch_timeout.as_secs()
            ));
            tracing::error!(source = source.name(), %filter, %since, %as_of, error = %e, "row fetch timed out");
            return Snapshot::failed(since, e.to_string());
        }
    };

    let rows_fetched = rows.len();
    let (records, errors) = normalize(rows, filter, since, as_of);
    Snapshot {
        since,
        rows_fetched,
        records,
        errors,
    }
}

impl Snapshot {
    fn failed(since: NaiveDate, error: String) -> Self {
        Self {
            since,
            rows_fetched: 0,
            records: Vec::new(),
            errors: vec![error],
        }
    }
}

/// Keep rows inside the window and the filter, dropping malformed ones.
fn normalize(
    rows: Vec<RawAdRow>,
    filter: &CampaignFilter,
    since: NaiveDate,
    as_of: NaiveDate,
) -> (Vec<DailyAdRecord>, Vec<String>) {
    let mut records = Vec::with_capacity(rows.len());
    let mut errors = Vec::new();
    for row in rows {
        if row.date < since || row.date > as_of {
            continue;
        }
        if !filter.matches(&row.campaign_name, row.campaign_type.as_deref()) {
            continue;
        }
        match DailyAdRecord::from_row(row) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(error = %e, "dropping malformed row");
                errors.push(e.to_string());
            }
        }
    }
    (records, errors)
}

pub struct EvaluateUseCase {
    source: Arc<dyn AdPerformanceSource>,
    filter: CampaignFilter,
    policy: Policy,
    recommendations: RecommendationEvaluator,
    funnel: FunnelLeakDetector,
    fatigue: FatigueDetector,
}

impl EvaluateUseCase {
    pub fn new(source: Arc<dyn AdPerformanceSource>, filter: CampaignFilter, policy: Policy) -> Self {
        Self {
            recommendations: RecommendationEvaluator::new(policy.clone()),
            funnel: FunnelLeakDetector::new(policy.funnel.clone()),
            fatigue: FatigueDetector::new(policy.fatigue.clone()),
            source,
            filter,
            policy,
        }
    }

    pub fn filter(&self) -> &CampaignFilter {
        &self.filter
    }

    pub async fn execute(&self, as_of: NaiveDate) -> EvaluationReport {
        let snapshot = load_window(
            self.source.as_ref(),
            &self.filter,
            as_of,
            self.policy.rules.evaluation_window_days,
            Duration::from_secs(self.policy.timeouts.fetch_secs),
        )
        .await;

        let totals = CampaignTotals::from_records(&snapshot.records);
        let funnel_leaks = self.funnel.detect_totals(&totals);
        let records_evaluated = snapshot.records.len();
        let histories = AdHistory::group(snapshot.records);
        let recommendations = self.recommendations.evaluate(&histories, as_of);
        let fatigue_alerts = self.fatigue.detect(&histories, as_of);

        tracing::info!(
            filter = %self.filter,
            %as_of,
            rows = snapshot.rows_fetched,
            ads = histories.len(),
            recommendations = recommendations.len(),
            funnel_leaks = funnel_leaks.len(),
            fatigue_alerts = fatigue_alerts.len(),
            partial = !snapshot.errors.is_empty(),
            "evaluation finished"
        );

        EvaluationReport {
            evaluated_at: Utc::now(),
            as_of,
            since: snapshot.since,
            filter: self.filter.clone(),
            rows_fetched: snapshot.rows_fetched,
            records_evaluated,
            partial: !snapshot.errors.is_empty(),
            errors: snapshot.errors,
            totals,
            recommendations,
            funnel_leaks,
            fatigue_alerts,
        }
    }
}
