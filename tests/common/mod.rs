//! Shared test helpers.
#![allow(dead_code)]

use adwatch::domain::entities::ad_record::RawAdRow;
use adwatch::domain::entities::flag_event::FlagEvent;
use adwatch::domain::error::DomainError;
use adwatch::domain::ports::ad_performance::AdPerformanceSource;
use adwatch::domain::ports::flag_history::{FlagFilter, FlagHistory};
use adwatch::domain::ports::notifier::Notifier;
use adwatch::domain::values::campaign_filter::CampaignFilter;
use adwatch::domain::values::platform::Platform;
use adwatch::domain::values::policy::Policy;
use adwatch::infrastructure::cache::memory::MemoryReportCache;
use adwatch::AdWatch;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, n).unwrap()
}

pub fn at(n: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, n, hour, minute, 0).unwrap()
}

/// A zeroed Meta row in the default campaign.
pub fn row(ad_id: &str, date: NaiveDate) -> RawAdRow {
    RawAdRow {
        ad_id: ad_id.to_string(),
        adset_id: format!("{ad_id}-set"),
        campaign_id: "cmp-1".into(),
        ad_name: format!("Ad {ad_id}"),
        adset_name: "Ad Set 1".into(),
        campaign_name: "31DWC2026 - SALES".into(),
        campaign_type: Some("sales".into()),
        platform: Platform::Meta,
        date,
        spend: 0.0,
        clicks: 0,
        impressions: 0,
        link_clicks: 0,
        landing_page_views: 0,
        leads: 0,
        purchases: 0,
        frequency: None,
    }
}

/// A healthy, profitable day: $40 CPP, 10% click-to-purchase, full funnel.
pub fn healthy(ad_id: &str, date: NaiveDate) -> RawAdRow {
    let mut r = row(ad_id, date);
    r.spend = 200.0;
    r.impressions = 2000;
    r.clicks = 60;
    r.link_clicks = 50;
    r.landing_page_views = 45;
    r.leads = 20;
    r.purchases = 5;
    r
}

pub struct RecordingNotifier {
    deliver: bool,
    delay: Duration,
    sent: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            deliver: true,
            delay: Duration::ZERO,
            sent: Mutex::new(Vec::new()),
        })
    }

    /// Every send fails.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            deliver: false,
            delay: Duration::ZERO,
            sent: Mutex::new(Vec::new()),
        })
    }

    /// Delivers, but only after `delay`.
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            deliver: true,
            delay,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn titles(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, title: &str, _body: &str) -> bool {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.sent.lock().unwrap().push(title.to_string());
        self.deliver
    }
}

/// Serves a fixed set of rows and counts fetches.
pub struct StaticSource {
    rows: Vec<RawAdRow>,
    fetches: AtomicUsize,
}

impl StaticSource {
    pub fn new(rows: Vec<RawAdRow>) -> Arc<Self> {
        Arc::new(Self {
            rows,
            fetches: AtomicUsize::new(0),
        })
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AdPerformanceSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(
        &self,
        _filter: &CampaignFilter,
        since: NaiveDate,
    ) -> Result<Vec<RawAdRow>, DomainError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows.iter().filter(|r| r.date >= since).cloned().collect())
    }
}

pub struct FailingSource;

#[async_trait]
impl AdPerformanceSource for FailingSource {
    fn name(&self) -> &str {
        "failing"
    }

    async fn fetch(
        &self,
        _filter: &CampaignFilter,
        _since: NaiveDate,
    ) -> Result<Vec<RawAdRow>, DomainError> {
        Err(DomainError::Source("ads API returned 503".into()))
    }
}

/// Every write and read fails as a broken database would.
pub struct FailingFlagHistory;

impl FlagHistory for FailingFlagHistory {
    fn append_flag(&self, _event: &FlagEvent) -> Result<bool, DomainError> {
        Err(DomainError::Database("disk I/O error".into()))
    }

    fn list_flags(&self, _filter: &FlagFilter) -> Result<Vec<FlagEvent>, DomainError> {
        Err(DomainError::Database("disk I/O error".into()))
    }
}

pub fn setup() -> AdWatch {
    setup_with(RecordingNotifier::new())
}

pub fn setup_with(notifier: Arc<RecordingNotifier>) -> AdWatch {
    AdWatch::with_providers(
        ":memory:",
        notifier,
        Arc::new(MemoryReportCache::new()),
        Policy::default(),
        CampaignFilter::default(),
    )
    .unwrap()
}

pub fn setup_with_source(
    source: Arc<dyn AdPerformanceSource>,
    notifier: Arc<RecordingNotifier>,
) -> AdWatch {
    AdWatch::with_source(
        ":memory:",
        source,
        notifier,
        Arc::new(MemoryReportCache::new()),
        Policy::default(),
        CampaignFilter::default(),
    )
    .unwrap()
}
