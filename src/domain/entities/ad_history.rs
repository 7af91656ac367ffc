use crate::domain::entities::ad_record::DailyAdRecord;
use std::collections::BTreeMap;

/// One ad's records within the evaluation window, most recent first.
#[derive(Debug, Clone, PartialEq)]
pub struct AdHistory {
    ad_id: String,
    records: Vec<DailyAdRecord>,
}

impl AdHistory {
    pub fn new(ad_id: impl Into<String>, mut records: Vec<DailyAdRecord>) -> Self {
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Self {
            ad_id: ad_id.into(),
            records,
        }
    }

    /// Split a flat record set into per-ad histories, ordered by ad id.
    pub fn group(records: Vec<DailyAdRecord>) -> Vec<AdHistory> {
        let mut by_ad: BTreeMap<String, Vec<DailyAdRecord>> = BTreeMap::new();
        for record in records {
            by_ad.entry(record.ad_id.clone()).or_default().push(record);
        }
        by_ad
            .into_iter()
            .map(|(ad_id, records)| AdHistory::new(ad_id, records))
            .collect()
    }

    pub fn ad_id(&self) -> &str {
        &self.ad_id
    }

    pub fn latest(&self) -> Option<&DailyAdRecord> {
        self.records.first()
    }

    /// Descending by date.
    pub fn records(&self) -> &[DailyAdRecord] {
        &self.records
    }

    pub fn days(&self) -> usize {
        self.records.len()
    }
}
