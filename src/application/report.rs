use crate::application::evaluate::{EvaluateUseCase, EvaluationReport};
use crate::domain::entities::campaign_totals::CampaignTotals;
use crate::domain::ports::report_cache::{CacheMetadata, ReportCache};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How long a campaign report stays fresh.
pub const REPORT_TTL_MINUTES: i64 = 30;

/// Headline numbers for the report header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub total_spend: f64,
    pub total_link_clicks: u64,
    pub total_purchases: u64,
    pub click_to_purchase_rate: f64,
    pub avg_cost_per_purchase: f64,
}

impl CampaignSummary {
    pub fn from_totals(totals: &CampaignTotals) -> Self {
        Self {
            total_spend: totals.spend,
            total_link_clicks: totals.link_clicks,
            total_purchases: totals.purchases,
            click_to_purchase_rate: totals.click_to_purchase_rate(),
            avg_cost_per_purchase: totals.cost_per_purchase(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignReport {
    pub generated_at: DateTime<Utc>,
    pub summary: CampaignSummary,
    pub evaluation: EvaluationReport,
    /// Set on the way out when the report came from cache.
    #[serde(default)]
    pub cached: bool,
}

pub struct ReportUseCase {
    evaluate: Arc<EvaluateUseCase>,
    cache: Arc<dyn ReportCache>,
}

impl ReportUseCase {
    pub fn new(evaluate: Arc<EvaluateUseCase>, cache: Arc<dyn ReportCache>) -> Self {
        Self { evaluate, cache }
    }

    fn cache_key(&self) -> String {
        format!("report:{}", self.evaluate.filter())
    }

    /// Serve the cached report for `as_of` if one is fresh, otherwise evaluate
    /// and cache the result. Partial reports are returned but never cached.
    pub async fn execute(&self, as_of: NaiveDate) -> CampaignReport {
        let key = self.cache_key();
        if let Some(value) = self.cache.get(&key) {
            match serde_json::from_value::<CampaignReport>(value) {
                Ok(mut report) if report.evaluation.as_of == as_of => {
                    tracing::debug!(%key, %as_of, "serving cached report");
                    report.cached = true;
                    return report;
                }
                Ok(_) => tracing::debug!(%key, %as_of, "cached report is for another day"),
                Err(e) => tracing::warn!(%key, error = %e, "discarding unreadable cached report"),
            }
        }

        let evaluation = self.evaluate.execute(as_of).await;
        let report = CampaignReport {
            generated_at: Utc::now(),
            summary: CampaignSummary::from_totals(&evaluation.totals),
            evaluation,
            cached: false,
        };

        if report.evaluation.partial {
            tracing::warn!(%key, errors = report.evaluation.errors.len(), "partial report not cached");
            return report;
        }
        match serde_json::to_value(&report) {
            Ok(value) => self
                .cache
                .set(&key, value, chrono::Duration::minutes(REPORT_TTL_MINUTES)),
            Err(e) => tracing::warn!(%key, error = %e, "failed to serialize report for cache"),
        }
        report
    }

    pub fn invalidate(&self) {
        self.cache.invalidate(&self.cache_key());
    }

    pub fn metadata(&self) -> Option<CacheMetadata> {
        self.cache.metadata(&self.cache_key())
    }
}
