use crate::domain::entities::ad_record::RawAdRow;
use crate::domain::error::DomainError;
use crate::domain::values::campaign_filter::CampaignFilter;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Where daily ad rows come from. Implementations apply the campaign filter
/// and return every row dated on or after `since`.
#[async_trait]
pub trait AdPerformanceSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(
        &self,
        filter: &CampaignFilter,
        since: NaiveDate,
    ) -> Result<Vec<RawAdRow>, DomainError>;
}

/// Write side of the row store, used by imports.
pub trait AdPerformanceStore: Send + Sync {
    /// Insert or replace rows keyed by (ad id, date). Returns rows written.
    fn upsert_rows(&self, rows: &[RawAdRow]) -> Result<usize, DomainError>;
}
