use crate::domain::entities::ad_record::{ratio, DailyAdRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Sums over every record in a window, with the funnel ratios derived from the sums.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignTotals {
    pub ads: usize,
    pub spend: f64,
    pub clicks: u64,
    pub impressions: u64,
    pub link_clicks: u64,
    pub landing_page_views: u64,
    pub leads: u64,
    pub purchases: u64,
}

impl CampaignTotals {
    pub fn from_records(records: &[DailyAdRecord]) -> Self {
        let mut totals = CampaignTotals::default();
        let mut ads = BTreeSet::new();
        for r in records {
            ads.insert(r.ad_id.as_str());
            totals.spend += r.spend;
            totals.clicks += r.clicks;
            totals.impressions += r.impressions;
            totals.link_clicks += r.link_clicks;
            totals.landing_page_views += r.landing_page_views;
            totals.leads += r.leads;
            totals.purchases += r.purchases;
        }
        totals.ads = ads.len();
        totals
    }

    pub fn connect_rate(&self) -> f64 {
        ratio(self.landing_page_views as f64, self.link_clicks as f64)
    }

    pub fn lead_rate(&self) -> f64 {
        ratio(self.leads as f64, self.link_clicks as f64)
    }

    pub fn purchase_rate(&self) -> f64 {
        ratio(self.purchases as f64, self.leads as f64)
    }

    pub fn click_to_purchase_rate(&self) -> f64 {
        ratio(self.purchases as f64, self.link_clicks as f64)
    }

    pub fn cost_per_purchase(&self) -> f64 {
        ratio(self.spend, self.purchases as f64)
    }
}
