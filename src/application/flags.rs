use crate::application::evaluate::EvaluationReport;
use crate::domain::entities::flag_event::{FlagEvent, FlagStatus};
use crate::domain::entities::recommendation::Recommendation;
use crate::domain::error::DomainError;
use crate::domain::ports::flag_history::{FlagFilter, FlagHistory};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlagRecordSummary {
    /// Strike-bearing recommendations in the report.
    pub considered: usize,
    pub recorded: usize,
    /// Already logged for the same ad, day and rule.
    pub duplicates: usize,
}

pub struct FlagsUseCase {
    history: Arc<dyn FlagHistory>,
}

impl FlagsUseCase {
    pub fn new(history: Arc<dyn FlagHistory>) -> Self {
        Self { history }
    }

    /// Log every strike from a report. Overrides carry no strike and are skipped.
    pub fn record(
        &self,
        report: &EvaluationReport,
        now: DateTime<Utc>,
    ) -> Result<FlagRecordSummary, DomainError> {
        let mut summary = FlagRecordSummary::default();
        for rec in report
            .recommendations
            .iter()
            .filter(|r| !r.is_override() && r.strike_count > 0)
        {
            summary.considered += 1;
            if self.history.append_flag(&flag_event(rec, now))? {
                summary.recorded += 1;
            } else {
                summary.duplicates += 1;
            }
        }
        tracing::info!(
            recorded = summary.recorded,
            duplicates = summary.duplicates,
            "flag history updated"
        );
        Ok(summary)
    }

    pub fn list(&self, filter: &FlagFilter) -> Result<Vec<FlagEvent>, DomainError> {
        self.history.list_flags(filter)
    }
}

fn flag_event(rec: &Recommendation, now: DateTime<Utc>) -> FlagEvent {
    let number = |key: &str| rec.metadata.get(key).and_then(|v| v.as_f64());
    FlagEvent {
        ad_id: rec.ad_id.clone(),
        ad_name: rec.ad_name.clone(),
        adset_id: rec.adset_id.clone(),
        campaign_id: rec.campaign_id.clone(),
        date: rec.date,
        strike_count: rec.strike_count,
        flag_type: rec.rule.as_str().to_string(),
        severity: rec.severity,
        status: FlagStatus::for_strikes(rec.strike_count),
        metric_value: number("metric_value"),
        threshold: number("threshold"),
        created_at: now,
    }
}
