use crate::domain::error::DomainError;
use crate::domain::values::platform::Platform;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of performance for one ad, as the row source delivers it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAdRow {
    pub ad_id: String,
    pub adset_id: String,
    pub campaign_id: String,
    #[serde(default)]
    pub ad_name: String,
    #[serde(default)]
    pub adset_name: String,
    pub campaign_name: String,
    /// Campaign type tag (e.g. "sales", "leads"), matched by the campaign filter.
    #[serde(default)]
    pub campaign_type: Option<String>,
    pub platform: Platform,
    pub date: NaiveDate,
    #[serde(default)]
    pub spend: f64,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub impressions: u64,
    #[serde(default, alias = "inline_link_clicks")]
    pub link_clicks: u64,
    #[serde(default)]
    pub landing_page_views: u64,
    #[serde(default)]
    pub leads: u64,
    #[serde(default)]
    pub purchases: u64,
    /// Average impressions per reached user. Only Meta reports it.
    #[serde(default)]
    pub frequency: Option<f64>,
}

/// Canonical per-ad-per-day record with every derived ratio computed once.
///
/// Ratios are zero whenever their denominator is zero, so nothing downstream
/// ever sees NaN or infinity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyAdRecord {
    pub ad_id: String,
    pub adset_id: String,
    pub campaign_id: String,
    pub ad_name: String,
    pub adset_name: String,
    pub campaign_name: String,
    pub platform: Platform,
    pub date: NaiveDate,
    pub spend: f64,
    pub clicks: u64,
    pub impressions: u64,
    pub link_clicks: u64,
    pub landing_page_views: u64,
    pub leads: u64,
    pub purchases: u64,
    pub frequency: Option<f64>,

    pub cost_per_purchase: f64,
    pub cost_per_lead: f64,
    /// landing-page views / link clicks
    pub connect_rate: f64,
    /// leads / link clicks
    pub lead_rate: f64,
    /// purchases / leads
    pub purchase_rate: f64,
    /// purchases / link clicks
    pub click_to_purchase_rate: f64,
    /// clicks / impressions
    pub ctr: f64,
}

impl DailyAdRecord {
    /// Normalize a raw row. Fails only on values no ad platform can report.
    pub fn from_row(row: RawAdRow) -> Result<Self, DomainError> {
        if row.ad_id.trim().is_empty() {
            return Err(DomainError::InvalidInput(format!(
                "row for {} on {} has no ad id",
                row.campaign_name, row.date
            )));
        }
        if !row.spend.is_finite() || row.spend < 0.0 {
            return Err(DomainError::InvalidInput(format!(
                "ad {} on {} has invalid spend {}",
                row.ad_id, row.date, row.spend
            )));
        }
        if let Some(freq) = row.frequency {
            if !freq.is_finite() || freq < 0.0 {
                return Err(DomainError::InvalidInput(format!(
                    "ad {} on {} has invalid frequency {freq}",
                    row.ad_id, row.date
                )));
            }
        }

        let spend = row.spend;
        let link_clicks = row.link_clicks as f64;
        let leads = row.leads as f64;
        let purchases = row.purchases as f64;

        Ok(Self {
            cost_per_purchase: ratio(spend, purchases),
            cost_per_lead: ratio(spend, leads),
            connect_rate: ratio(row.landing_page_views as f64, link_clicks),
            lead_rate: ratio(leads, link_clicks),
            purchase_rate: ratio(purchases, leads),
            click_to_purchase_rate: ratio(purchases, link_clicks),
            ctr: ratio(row.clicks as f64, row.impressions as f64),
            ad_id: row.ad_id,
            adset_id: row.adset_id,
            campaign_id: row.campaign_id,
            ad_name: row.ad_name,
            adset_name: row.adset_name,
            campaign_name: row.campaign_name,
            platform: row.platform,
            date: row.date,
            spend,
            clicks: row.clicks,
            impressions: row.impressions,
            link_clicks: row.link_clicks,
            landing_page_views: row.landing_page_views,
            leads: row.leads,
            purchases: row.purchases,
            frequency: row.frequency,
        })
    }

    /// Name for titles; falls back to the id when the platform sent no name.
    pub fn display_name(&self) -> &str {
        if self.ad_name.is_empty() {
            &self.ad_id
        } else {
            &self.ad_name
        }
    }
}

/// Zero-denominator-safe division.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A Meta row for `ad_id` on `date` with everything zeroed.
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

    pub fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, n).unwrap()
    }
}
