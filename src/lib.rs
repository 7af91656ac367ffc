pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use crate::application::alert_dispatcher::{AlertDispatcher, DispatchReport};
use crate::application::evaluate::{EvaluateUseCase, EvaluationReport};
use crate::application::flags::{FlagRecordSummary, FlagsUseCase};
use crate::application::import::{ImportSummary, ImportUseCase};
use crate::application::report::{CampaignReport, ReportUseCase};
use crate::config::Config;
use crate::domain::entities::ad_record::RawAdRow;
use crate::domain::entities::alert_record::AlertRecord;
use crate::domain::entities::flag_event::FlagEvent;
use crate::domain::error::DomainError;
use crate::domain::ports::ad_performance::AdPerformanceSource;
use crate::domain::ports::alert_history::AlertHistory;
use crate::domain::ports::flag_history::{FlagFilter, FlagHistory};
use crate::domain::ports::notifier::Notifier;
use crate::domain::ports::report_cache::{CacheMetadata, ReportCache};
use crate::domain::values::campaign_filter::CampaignFilter;
use crate::domain::values::policy::Policy;
use crate::infrastructure::cache::memory::MemoryReportCache;
use crate::infrastructure::notify::log::LogNotifier;
use crate::infrastructure::notify::webhook::WebhookNotifier;
use crate::infrastructure::sqlite::ad_performance_repo::SqliteAdPerformanceRepo;
use crate::infrastructure::sqlite::alert_repo::SqliteAlertRepo;
use crate::infrastructure::sqlite::flag_repo::SqliteFlagRepo;
use crate::infrastructure::sqlite::open_connection;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// One scheduled pass: evaluate, log strikes, run the alert checks.
///
/// A failed step shows up in `errors`; the steps after it still run.
#[derive(Debug, Clone, Serialize)]
pub struct CycleSummary {
    pub evaluation: EvaluationReport,
    pub flags: FlagRecordSummary,
    pub alerts: DispatchReport,
    pub errors: Vec<String>,
}

pub struct AdWatch {
    filter: CampaignFilter,
    policy: Policy,
    evaluate_uc: Arc<EvaluateUseCase>,
    report_uc: ReportUseCase,
    dispatcher: AlertDispatcher,
    flags_uc: FlagsUseCase,
    import_uc: ImportUseCase,
    alerts: Arc<dyn AlertHistory>,
}

impl AdWatch {
    pub fn new(config: &Config) -> Result<Self, DomainError> {
        let policy = config.policy()?;
        let notifier: Arc<dyn Notifier> = match &config.webhook_url {
            Some(url) => Arc::new(WebhookNotifier::new(
                url.clone(),
                Duration::from_secs(policy.timeouts.notify_secs),
            )),
            None => Arc::new(LogNotifier),
        };

        Self::with_providers(
            &config.db_path,
            notifier,
            Arc::new(MemoryReportCache::new()),
            policy,
            config.filter.clone(),
        )
    }

    /// Rows come from the `ad_performance` table of the same database.
    pub fn with_providers(
        db_path: &str,
        notifier: Arc<dyn Notifier>,
        cache: Arc<dyn ReportCache>,
        policy: Policy,
        filter: CampaignFilter,
    ) -> Result<Self, DomainError> {
        let rows = Arc::new(SqliteAdPerformanceRepo::new(open_connection(db_path)?));
        Self::assemble(db_path, rows.clone(), rows, notifier, cache, policy, filter)
    }

    /// Same as [`AdWatch::with_providers`] but reading rows from `source`.
    /// Imports still land in the database.
    pub fn with_source(
        db_path: &str,
        source: Arc<dyn AdPerformanceSource>,
        notifier: Arc<dyn Notifier>,
        cache: Arc<dyn ReportCache>,
        policy: Policy,
        filter: CampaignFilter,
    ) -> Result<Self, DomainError> {
        let store = Arc::new(SqliteAdPerformanceRepo::new(open_connection(db_path)?));
        Self::assemble(db_path, source, store, notifier, cache, policy, filter)
    }

    fn assemble(
        db_path: &str,
        source: Arc<dyn AdPerformanceSource>,
        store: Arc<SqliteAdPerformanceRepo>,
        notifier: Arc<dyn Notifier>,
        cache: Arc<dyn ReportCache>,
        policy: Policy,
        filter: CampaignFilter,
    ) -> Result<Self, DomainError> {
        policy.validate()?;

        let alerts: Arc<dyn AlertHistory> =
            Arc::new(SqliteAlertRepo::new(open_connection(db_path)?));
        let flags: Arc<dyn FlagHistory> = Arc::new(SqliteFlagRepo::new(open_connection(db_path)?));

        let evaluate_uc = Arc::new(EvaluateUseCase::new(
            source.clone(),
            filter.clone(),
            policy.clone(),
        ));
        tracing::debug!(%filter, db = db_path, "adwatch ready");

        Ok(Self {
            report_uc: ReportUseCase::new(evaluate_uc.clone(), cache),
            dispatcher: AlertDispatcher::new(
                source,
                alerts.clone(),
                notifier,
                filter.clone(),
                policy.clone(),
            ),
            flags_uc: FlagsUseCase::new(flags),
            import_uc: ImportUseCase::new(store),
            evaluate_uc,
            alerts,
            filter,
            policy,
        })
    }

    /// Log strikes somewhere other than this database's `ad_flag_history`.
    pub fn with_flag_history(mut self, flags: Arc<dyn FlagHistory>) -> Self {
        self.flags_uc = FlagsUseCase::new(flags);
        self
    }

    pub fn filter(&self) -> &CampaignFilter {
        &self.filter
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub async fn evaluate(&self) -> EvaluationReport {
        self.evaluate_as_of(Utc::now().date_naive()).await
    }

    pub async fn evaluate_as_of(&self, as_of: NaiveDate) -> EvaluationReport {
        self.evaluate_uc.execute(as_of).await
    }

    pub async fn dispatch_alerts(&self) -> DispatchReport {
        self.dispatch_alerts_at(Utc::now()).await
    }

    pub async fn dispatch_alerts_at(&self, now: DateTime<Utc>) -> DispatchReport {
        self.dispatcher.dispatch_at(now).await
    }

    pub async fn campaign_report(&self) -> CampaignReport {
        self.campaign_report_as_of(Utc::now().date_naive()).await
    }

    pub async fn campaign_report_as_of(&self, as_of: NaiveDate) -> CampaignReport {
        self.report_uc.execute(as_of).await
    }

    pub fn invalidate_report(&self) {
        self.report_uc.invalidate()
    }

    pub fn report_cache_metadata(&self) -> Option<CacheMetadata> {
        self.report_uc.metadata()
    }

    pub fn import_rows(&self, rows: Vec<RawAdRow>) -> Result<ImportSummary, DomainError> {
        self.import_uc.execute(rows)
    }

    pub fn record_flags(&self, report: &EvaluationReport) -> Result<FlagRecordSummary, DomainError> {
        self.flags_uc.record(report, Utc::now())
    }

    pub fn flag_history(
        &self,
        ad_id: Option<String>,
        limit: Option<usize>,
    ) -> Result<Vec<FlagEvent>, DomainError> {
        self.flags_uc.list(&FlagFilter { ad_id, limit })
    }

    pub fn recent_alerts(&self, limit: usize) -> Result<Vec<AlertRecord>, DomainError> {
        self.alerts.recent_alerts(limit)
    }

    pub fn resolve_alert(&self, id: &str) -> Result<(), DomainError> {
        self.alerts.resolve_alert(id, Utc::now())
    }

    pub async fn run_cycle(&self) -> CycleSummary {
        self.run_cycle_at(Utc::now()).await
    }

    pub async fn run_cycle_at(&self, now: DateTime<Utc>) -> CycleSummary {
        let mut errors = Vec::new();
        let evaluation = self.evaluate_as_of(now.date_naive()).await;
        let flags = match self.flags_uc.record(&evaluation, now) {
            Ok(flags) => flags,
            Err(e) => {
                tracing::error!(error = %e, "flag recording failed");
                errors.push(format!("flag history: {e}"));
                FlagRecordSummary::default()
            }
        };
        let alerts = self.dispatch_alerts_at(now).await;
        tracing::info!(
            recommendations = evaluation.recommendations.len(),
            flags_recorded = flags.recorded,
            alerts_fired = alerts.fired(),
            errors = errors.len(),
            "cycle complete"
        );
        CycleSummary {
            evaluation,
            flags,
            alerts,
            errors,
        }
    }
}
