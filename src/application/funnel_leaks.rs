//! Funnel-wide leak detection over the whole filtered window.

use crate::domain::entities::ad_record::DailyAdRecord;
use crate::domain::entities::campaign_totals::CampaignTotals;
use crate::domain::entities::funnel_leak::{FunnelLeak, LeakType};
use crate::domain::values::policy::FunnelPolicy;
use serde_json::{json, Value};
use std::collections::BTreeMap;

pub struct FunnelLeakDetector {
    policy: FunnelPolicy,
}

impl FunnelLeakDetector {
    pub fn new(policy: FunnelPolicy) -> Self {
        Self { policy }
    }

    pub fn detect(&self, records: &[DailyAdRecord]) -> Vec<FunnelLeak> {
        self.detect_totals(&CampaignTotals::from_records(records))
    }

    /// Every stage is checked independently; the result is sorted by priority.
    pub fn detect_totals(&self, totals: &CampaignTotals) -> Vec<FunnelLeak> {
        let p = &self.policy;
        let connect_rate = totals.connect_rate();
        let lead_rate = totals.lead_rate();
        let purchase_rate = totals.purchase_rate();
        let click_to_purchase = totals.click_to_purchase_rate();
        let mut leaks = Vec::new();

        if totals.leads >= p.min_leads_for_purchase_rate && purchase_rate < p.min_purchase_rate {
            leaks.push(self.leak(
                LeakType::LeadToPurchase,
                totals,
                format!(
                    "Purchase rate is {:.1}% (below {:.1}% threshold): {} purchases from {} leads.",
                    purchase_rate * 100.0,
                    p.min_purchase_rate * 100.0,
                    totals.purchases,
                    totals.leads
                ),
                vec![
                    ("purchase_rate", json!(purchase_rate)),
                    ("purchases", json!(totals.purchases)),
                    ("leads", json!(totals.leads)),
                    ("threshold", json!(p.min_purchase_rate)),
                ],
            ));
        }

        if totals.link_clicks >= p.min_link_clicks_for_click_to_purchase
            && click_to_purchase < p.min_click_to_purchase
        {
            leaks.push(self.leak(
                LeakType::ClickToPurchase,
                totals,
                format!(
                    "Click-to-purchase rate is {:.1}% (below {:.1}% target) across {} link clicks.",
                    click_to_purchase * 100.0,
                    p.min_click_to_purchase * 100.0,
                    totals.link_clicks
                ),
                vec![
                    ("click_to_purchase_rate", json!(click_to_purchase)),
                    ("purchases", json!(totals.purchases)),
                    ("link_clicks", json!(totals.link_clicks)),
                    ("connect_rate", json!(connect_rate)),
                    ("lead_rate", json!(lead_rate)),
                    ("purchase_rate", json!(purchase_rate)),
                    ("threshold", json!(p.min_click_to_purchase)),
                ],
            ));
        }

        // Only a lead problem when the page itself loads fine.
        if totals.landing_page_views >= p.min_page_views_for_lead_rate
            && connect_rate >= p.min_connect_rate
            && lead_rate < p.min_lead_rate
        {
            leaks.push(self.leak(
                LeakType::ClickToLead,
                totals,
                format!(
                    "Lead rate is {:.1}% (below {:.1}% threshold) while {:.1}% of clicks reach the page.",
                    lead_rate * 100.0,
                    p.min_lead_rate * 100.0,
                    connect_rate * 100.0
                ),
                vec![
                    ("lead_rate", json!(lead_rate)),
                    ("leads", json!(totals.leads)),
                    ("link_clicks", json!(totals.link_clicks)),
                    ("connect_rate", json!(connect_rate)),
                    ("threshold", json!(p.min_lead_rate)),
                ],
            ));
        }

        if totals.link_clicks >= p.min_link_clicks_for_connect_rate
            && connect_rate < p.min_connect_rate
        {
            leaks.push(self.leak(
                LeakType::ClickToPage,
                totals,
                format!(
                    "Connect rate is {:.1}% (below {:.1}% threshold). Users click but do not reach the landing page.",
                    connect_rate * 100.0,
                    p.min_connect_rate * 100.0
                ),
                vec![
                    ("connect_rate", json!(connect_rate)),
                    ("link_clicks", json!(totals.link_clicks)),
                    ("landing_page_views", json!(totals.landing_page_views)),
                    ("threshold", json!(p.min_connect_rate)),
                ],
            ));
        }

        leaks.sort_by_key(|l| l.priority);
        leaks
    }

    fn leak(
        &self,
        leak_type: LeakType,
        totals: &CampaignTotals,
        description: String,
        metrics: Vec<(&'static str, Value)>,
    ) -> FunnelLeak {
        FunnelLeak {
            leak_type,
            severity: leak_type.severity(),
            priority: leak_type.priority(),
            title: leak_type.title().to_string(),
            description,
            root_cause: leak_type.root_cause().to_string(),
            actions: leak_type.actions().iter().map(|a| a.to_string()).collect(),
            affected_ads: totals.ads,
            metrics: metrics
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect::<BTreeMap<_, _>>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::values::severity::Severity;

    fn totals(link_clicks: u64, page_views: u64, leads: u64, purchases: u64) -> CampaignTotals {
        CampaignTotals {
            ads: 4,
            spend: 1000.0,
            clicks: link_clicks,
            impressions: link_clicks * 40,
            link_clicks,
            landing_page_views: page_views,
            leads,
            purchases,
        }
    }

    fn detector() -> FunnelLeakDetector {
        FunnelLeakDetector::new(FunnelPolicy::default())
    }

    #[test]
    fn test_clean_funnel_has_no_leaks() {
        let leaks = detector().detect_totals(&totals(100, 90, 30, 15));
        assert!(leaks.is_empty(), "unexpected leaks: {leaks:?}");
    }

    #[test]
    fn test_every_leak_at_once_sorted_by_priority() {
        // 100 clicks, 50 page views, 10 leads, 1 purchase
        let leaks = detector().detect_totals(&totals(100, 50, 10, 1));
        let types: Vec<_> = leaks.iter().map(|l| l.leak_type).collect();
        // click-to-lead is gated off because the page itself is broken
        assert_eq!(
            types,
            vec![
                LeakType::LeadToPurchase,
                LeakType::ClickToPurchase,
                LeakType::ClickToPage
            ]
        );
        assert!(leaks.windows(2).all(|w| w[0].priority <= w[1].priority));
    }

    #[test]
    fn test_click_to_lead_requires_healthy_connect_rate() {
        let leaks = detector().detect_totals(&totals(100, 85, 10, 8));
        assert_eq!(leaks.len(), 1);
        assert_eq!(leaks[0].leak_type, LeakType::ClickToLead);
        assert_eq!(leaks[0].severity, Severity::Warning);
        assert_eq!(leaks[0].priority, 3);
    }

    #[test]
    fn test_sample_gates() {
        // 9 leads and 40 link clicks: too small to judge purchase or click-to-purchase rate
        let leaks = detector().detect_totals(&totals(40, 38, 9, 0));
        assert!(leaks.iter().all(|l| l.leak_type != LeakType::LeadToPurchase));
        assert!(leaks.iter().all(|l| l.leak_type != LeakType::ClickToPurchase));
    }

    #[test]
    fn test_empty_window_has_no_leaks() {
        assert!(detector().detect(&[]).is_empty());
    }

    #[test]
    fn test_leak_text_is_fixed_per_type() {
        let leaks = detector().detect_totals(&totals(100, 50, 30, 15));
        let page = leaks
            .iter()
            .find(|l| l.leak_type == LeakType::ClickToPage)
            .unwrap();
        assert_eq!(page.root_cause, LeakType::ClickToPage.root_cause());
        assert_eq!(page.actions.len(), LeakType::ClickToPage.actions().len());
        assert_eq!(page.affected_ads, 4);
    }
}
