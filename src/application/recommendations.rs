//! Per-ad recommendation rules.
//!
//! Rules run against each ad's record for the evaluation day, in order:
//!
//! 1. no engagement: terminal, always strike-based
//! 2. low connect rate: terminal, good-CPP override applies
//! 3. low lead rate: terminal, good-CPP override applies
//! 4. high cost-per-purchase: strike-based, not terminal
//! 5. low click-to-purchase: good-CPP override applies
//!
//! So an ad gets at most one finding from rules 1-3/5 plus possibly one from rule 4.
//! An ad with no record on the evaluation day gets nothing.

use crate::application::strikes::strike_count;
use crate::domain::entities::ad_history::AdHistory;
use crate::domain::entities::ad_record::DailyAdRecord;
use crate::domain::entities::recommendation::{Recommendation, RecommendationKind, RuleKind};
use crate::domain::values::policy::Policy;
use crate::domain::values::severity::Severity;
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// What a rule saw, before strike or override handling turns it into a recommendation.
struct Finding {
    rule: RuleKind,
    description: String,
    metric_value: f64,
    threshold: f64,
    counters: Vec<(&'static str, Value)>,
}

pub struct RecommendationEvaluator {
    policy: Policy,
}

impl RecommendationEvaluator {
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }

    pub fn evaluate(&self, histories: &[AdHistory], as_of: NaiveDate) -> Vec<Recommendation> {
        histories
            .iter()
            .flat_map(|h| self.evaluate_ad(h, as_of))
            .collect()
    }

    pub fn evaluate_ad(&self, history: &AdHistory, as_of: NaiveDate) -> Vec<Recommendation> {
        let Some(latest) = history.latest() else {
            return Vec::new();
        };
        if latest.date != as_of {
            tracing::debug!(ad_id = %latest.ad_id, last_seen = %latest.date, %as_of, "no row for evaluation day");
            return Vec::new();
        }
        let strikes = strike_count(history.records(), as_of, &self.policy.strikes);
        let good_cpp = self.has_good_cpp(latest);
        let rules = &self.policy.rules;
        let mut out = Vec::new();

        if latest.clicks == 0 && latest.spend > rules.min_spend_no_clicks {
            let finding = Finding {
                rule: RuleKind::NoEngagement,
                description: format!(
                    "Ad spent ${:.2} on {} without generating a single click.",
                    latest.spend, latest.date
                ),
                metric_value: latest.spend,
                threshold: rules.min_spend_no_clicks,
                counters: vec![("spend", json!(latest.spend)), ("clicks", json!(latest.clicks))],
            };
            out.push(self.strike_based(latest, finding, strikes));
            return out;
        }

        if latest.link_clicks >= rules.min_clicks_for_evaluation
            && latest.connect_rate < rules.min_connect_rate
        {
            let finding = Finding {
                rule: RuleKind::LowConnectRate,
                description: format!(
                    "Connect rate is {:.1}% (below {:.1}% threshold). Users click but do not reach the landing page.",
                    latest.connect_rate * 100.0,
                    rules.min_connect_rate * 100.0
                ),
                metric_value: latest.connect_rate,
                threshold: rules.min_connect_rate,
                counters: vec![
                    ("connect_rate", json!(latest.connect_rate)),
                    ("link_clicks", json!(latest.link_clicks)),
                    ("landing_page_views", json!(latest.landing_page_views)),
                ],
            };
            out.push(self.overridable(latest, finding, strikes, good_cpp));
            return out;
        }

        if latest.landing_page_views >= rules.min_page_views_for_evaluation
            && latest.lead_rate < rules.min_lead_rate
        {
            let finding = Finding {
                rule: RuleKind::LowLeadRate,
                description: format!(
                    "Lead rate is {:.1}% (below {:.1}% threshold). The landing page is not turning traffic into leads.",
                    latest.lead_rate * 100.0,
                    rules.min_lead_rate * 100.0
                ),
                metric_value: latest.lead_rate,
                threshold: rules.min_lead_rate,
                counters: vec![
                    ("lead_rate", json!(latest.lead_rate)),
                    ("leads", json!(latest.leads)),
                    ("link_clicks", json!(latest.link_clicks)),
                    ("landing_page_views", json!(latest.landing_page_views)),
                ],
            };
            out.push(self.overridable(latest, finding, strikes, good_cpp));
            return out;
        }

        if latest.purchases >= rules.min_purchases_for_cpp_eval
            && latest.cost_per_purchase > rules.max_cpp
        {
            let finding = Finding {
                rule: RuleKind::HighCostPerPurchase,
                description: format!(
                    "Cost per purchase is ${:.2} (above ${:.2} ceiling) across {} purchases.",
                    latest.cost_per_purchase, rules.max_cpp, latest.purchases
                ),
                metric_value: latest.cost_per_purchase,
                threshold: rules.max_cpp,
                counters: vec![
                    ("cost_per_purchase", json!(latest.cost_per_purchase)),
                    ("purchases", json!(latest.purchases)),
                    ("spend", json!(latest.spend)),
                ],
            };
            out.push(self.strike_based(latest, finding, strikes));
        }

        if latest.link_clicks >= rules.min_clicks_for_evaluation
            && latest.click_to_purchase_rate < rules.min_click_to_purchase
        {
            let finding = Finding {
                rule: RuleKind::LowClickToPurchase,
                description: format!(
                    "Click-to-purchase rate is {:.1}% (below {:.1}% target): {} purchases from {} link clicks.",
                    latest.click_to_purchase_rate * 100.0,
                    rules.min_click_to_purchase * 100.0,
                    latest.purchases,
                    latest.link_clicks
                ),
                metric_value: latest.click_to_purchase_rate,
                threshold: rules.min_click_to_purchase,
                counters: vec![
                    ("click_to_purchase_rate", json!(latest.click_to_purchase_rate)),
                    ("purchases", json!(latest.purchases)),
                    ("link_clicks", json!(latest.link_clicks)),
                ],
            };
            out.push(self.overridable(latest, finding, strikes, good_cpp));
        }

        out
    }

    /// Profitability check behind the override. Judged on the triggering
    /// record alone, not a trailing average.
    pub fn has_good_cpp(&self, record: &DailyAdRecord) -> bool {
        let rules = &self.policy.rules;
        record.cost_per_purchase > 0.0
            && record.cost_per_purchase <= rules.max_cpp
            && record.purchases >= rules.min_purchases_for_cpp_eval
    }

    fn overridable(
        &self,
        record: &DailyAdRecord,
        finding: Finding,
        strikes: u8,
        good_cpp: bool,
    ) -> Recommendation {
        if good_cpp {
            self.keep_running(record, finding, strikes)
        } else {
            self.strike_based(record, finding, strikes)
        }
    }

    /// A fired rule is always at least strike 1, even on a day the strike
    /// tracker does not count as poor; `raw_strikes` is kept in metadata.
    fn strike_based(&self, record: &DailyAdRecord, finding: Finding, raw_strikes: u8) -> Recommendation {
        let strikes = raw_strikes.max(1);
        let severity = Severity::for_strikes(strikes);
        let kind = RecommendationKind::for_strikes(strikes);
        let name = record.display_name();
        let label = finding.rule.label();

        let (title, action, impact) = match severity {
            Severity::Critical => (
                format!("Disable Ad: {name} - {label}"),
                format!("Disable ad {} immediately.", record.ad_id),
                format!("Save ${:.2}/day in underperforming spend.", record.spend),
            ),
            Severity::Warning => (
                format!("Critical Flag: {name} - {label}"),
                "Prepare a backup creative and monitor hourly. One more poor day disables this ad."
                    .to_string(),
                "Lines up a replacement before the ad has to be switched off.".to_string(),
            ),
            Severity::Info => (
                format!("Flag: {name} - {label}"),
                "Flag for monitoring and re-check tomorrow.".to_string(),
                "Catches a declining ad before it burns more budget.".to_string(),
            ),
        };

        let mut metadata = self.base_metadata(record, &finding);
        metadata.insert("strike_count".into(), json!(strikes));
        metadata.insert("raw_strike_count".into(), json!(raw_strikes));
        metadata.insert("override".into(), json!(false));

        Recommendation {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            rule: finding.rule,
            severity,
            ad_id: record.ad_id.clone(),
            ad_name: record.ad_name.clone(),
            adset_id: record.adset_id.clone(),
            campaign_id: record.campaign_id.clone(),
            platform: record.platform,
            date: record.date,
            title,
            description: finding.description,
            action_required: action,
            expected_impact: impact,
            strike_count: strikes,
            metadata,
        }
    }

    /// Good-CPP override: the ad is profitable, so report and keep it running.
    fn keep_running(&self, record: &DailyAdRecord, finding: Finding, raw_strikes: u8) -> Recommendation {
        let name = record.display_name();
        let label = finding.rule.label();

        let mut metadata = self.base_metadata(record, &finding);
        metadata.insert("strike_count".into(), json!(0));
        metadata.insert("raw_strike_count".into(), json!(raw_strikes));
        metadata.insert("override".into(), json!(true));
        metadata.insert("override_reason".into(), json!("good_cpp"));
        metadata.insert("cost_per_purchase".into(), json!(record.cost_per_purchase));
        metadata.insert("cpp_ceiling".into(), json!(self.policy.rules.max_cpp));

        Recommendation {
            id: uuid::Uuid::new_v4().to_string(),
            kind: RecommendationKind::FlagAd,
            rule: finding.rule,
            severity: Severity::Info,
            ad_id: record.ad_id.clone(),
            ad_name: record.ad_name.clone(),
            adset_id: record.adset_id.clone(),
            campaign_id: record.campaign_id.clone(),
            platform: record.platform,
            date: record.date,
            title: format!("Keep Running: {name} - {label}"),
            description: format!(
                "{} Cost per purchase is ${:.2} across {} purchases, within target, so the ad stays on.",
                finding.description, record.cost_per_purchase, record.purchases
            ),
            action_required: format!(
                "Keep running. Look into the {} when convenient.",
                label.to_lowercase()
            ),
            expected_impact: "Keeps a profitable ad live despite a weak intermediate funnel ratio."
                .to_string(),
            strike_count: 0,
            metadata,
        }
    }

    fn base_metadata(&self, record: &DailyAdRecord, finding: &Finding) -> BTreeMap<String, Value> {
        let mut metadata: BTreeMap<String, Value> = finding
            .counters
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        metadata.insert("rule".into(), json!(finding.rule.as_str()));
        metadata.insert("metric_value".into(), json!(finding.metric_value));
        metadata.insert("threshold".into(), json!(finding.threshold));
        metadata.insert("date".into(), json!(record.date.to_string()));
        metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ad_record::fixtures::{day, row};
    use crate::domain::entities::ad_record::RawAdRow;

    fn history(rows: Vec<RawAdRow>) -> AdHistory {
        let records = rows
            .into_iter()
            .map(|r| DailyAdRecord::from_row(r).unwrap())
            .collect();
        AdHistory::new("a1", records)
    }

    fn evaluator() -> RecommendationEvaluator {
        RecommendationEvaluator::new(Policy::default())
    }

    fn evaluate_day_7(rows: Vec<RawAdRow>) -> Vec<Recommendation> {
        evaluator().evaluate_ad(&history(rows), day(7))
    }

    fn no_clicks(n: u32, spend: f64) -> RawAdRow {
        let mut r = row("a1", day(n));
        r.spend = spend;
        r
    }

    /// 40 link clicks, 10 page views (25% connect), 1 purchase (2.5% click-to-purchase).
    fn broken_page(n: u32) -> RawAdRow {
        let mut r = row("a1", day(n));
        r.spend = 80.0;
        r.clicks = 50;
        r.impressions = 2000;
        r.link_clicks = 40;
        r.landing_page_views = 10;
        r.leads = 2;
        r.purchases = 1;
        r
    }

    #[test]
    fn test_no_engagement_fires_above_floor() {
        let recs = evaluate_day_7(vec![no_clicks(7, 15.0)]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].rule, RuleKind::NoEngagement);
        assert_eq!(recs[0].severity, Severity::Info);
        assert_eq!(recs[0].strike_count, 1);
        assert_eq!(recs[0].kind, RecommendationKind::FlagAd);
    }

    #[test]
    fn test_no_engagement_silent_below_floor() {
        let recs = evaluate_day_7(vec![no_clicks(7, 5.0)]);
        assert!(recs.is_empty());
    }

    #[test]
    fn test_no_engagement_escalates_with_strikes() {
        let two = evaluate_day_7(vec![no_clicks(7, 15.0), no_clicks(6, 15.0)]);
        assert_eq!(two[0].severity, Severity::Warning);
        assert_eq!(two[0].strike_count, 2);

        let three = evaluate_day_7(vec![no_clicks(7, 15.0), no_clicks(6, 15.0), no_clicks(5, 15.0)]);
        assert_eq!(three[0].severity, Severity::Critical);
        assert_eq!(three[0].kind, RecommendationKind::DisableAd);
        assert!(three[0].title.starts_with("Disable Ad"));
    }

    #[test]
    fn test_connect_rate_rule_is_terminal() {
        let recs = evaluate_day_7(vec![broken_page(7)]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].rule, RuleKind::LowConnectRate);
        // the day is also poor on click-to-purchase, so it counts as a strike
        assert_eq!(recs[0].strike_count, 1);
    }

    #[test]
    fn test_rule_firing_on_a_non_poor_day_is_strike_one() {
        // 20 link clicks, 5 page views; 2 purchases is 10% click-to-purchase, too few to judge CPP.
        let mut r = row("a1", day(7));
        r.spend = 50.0;
        r.clicks = 25;
        r.link_clicks = 20;
        r.landing_page_views = 5;
        r.purchases = 2;
        let recs = evaluate_day_7(vec![r]);
        assert_eq!(recs[0].rule, RuleKind::LowConnectRate);
        assert_eq!(recs[0].strike_count, 1);
        assert_eq!(recs[0].metadata["raw_strike_count"], json!(0));
    }

    #[test]
    fn test_connect_rate_escalates_to_disable() {
        let recs = evaluate_day_7(vec![broken_page(7), broken_page(6), broken_page(5)]);
        assert_eq!(recs[0].severity, Severity::Critical);
        assert_eq!(recs[0].kind, RecommendationKind::DisableAd);
        assert_eq!(recs[0].metadata["override"], json!(false));
    }

    #[test]
    fn test_good_cpp_overrides_connect_rate_even_at_three_strikes() {
        // Every day is poor. Today's $75 CPP on 4 purchases is above the strike
        // threshold but within the ceiling, so the override still applies.
        let mut today = broken_page(7);
        today.spend = 300.0;
        today.purchases = 4;
        let recs = evaluate_day_7(vec![today, broken_page(6), broken_page(5)]);
        assert_eq!(recs.len(), 1);
        let rec = &recs[0];
        assert_eq!(rec.rule, RuleKind::LowConnectRate);
        assert_eq!(rec.severity, Severity::Info);
        assert_eq!(rec.strike_count, 0);
        assert!(rec.is_override());
        assert_eq!(rec.metadata["raw_strike_count"], json!(3));
        assert!(rec.title.starts_with("Keep Running"));
    }

    #[test]
    fn test_override_uses_only_the_triggering_day() {
        // Two poor, unprofitable days followed by one profitable day: today's CPP wins.
        let mut today = broken_page(7);
        today.spend = 150.0;
        today.purchases = 3;
        let mut yesterday = broken_page(6);
        yesterday.spend = 600.0;
        yesterday.purchases = 3; // $200 CPP
        let recs = evaluate_day_7(vec![today, yesterday]);
        assert!(recs[0].is_override());

        // Same history with the days swapped: today is the expensive one.
        let mut today = broken_page(7);
        today.spend = 600.0;
        today.purchases = 3;
        let mut yesterday = broken_page(6);
        yesterday.spend = 150.0;
        yesterday.purchases = 3;
        let recs = evaluate_day_7(vec![today, yesterday]);
        assert!(!recs[0].is_override());
    }

    #[test]
    fn test_lead_rate_rule() {
        let mut r = row("a1", day(7));
        r.spend = 60.0;
        r.clicks = 45;
        r.link_clicks = 40;
        r.landing_page_views = 36; // 90% connect
        r.leads = 4; // 10% lead rate
        r.purchases = 3; // $20 CPP, 7.5% click-to-purchase
        let recs = evaluate_day_7(vec![r]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].rule, RuleKind::LowLeadRate);
        assert!(recs[0].is_override());
    }

    #[test]
    fn test_high_cpp_is_not_terminal() {
        // 100 link clicks, 3 purchases at $100 each: rule 4 and rule 5 both fire.
        let mut r = row("a1", day(7));
        r.spend = 300.0;
        r.clicks = 120;
        r.link_clicks = 100;
        r.landing_page_views = 90;
        r.leads = 30;
        r.purchases = 3;
        let recs = evaluate_day_7(vec![r]);
        let rules: Vec<_> = recs.iter().map(|r| r.rule).collect();
        assert_eq!(
            rules,
            vec![RuleKind::HighCostPerPurchase, RuleKind::LowClickToPurchase]
        );
        // CPP above the ceiling means no override on rule 5 either.
        assert!(recs.iter().all(|r| !r.is_override()));
    }

    #[test]
    fn test_healthy_ad_gets_nothing() {
        let mut r = row("a1", day(7));
        r.spend = 200.0;
        r.clicks = 110;
        r.link_clicks = 100;
        r.landing_page_views = 90;
        r.leads = 30;
        r.purchases = 10;
        let recs = evaluate_day_7(vec![r]);
        assert!(recs.is_empty());
    }

    #[test]
    fn test_gap_in_history_does_not_escalate() {
        // Poor on the 7th, 4th and 1st: only the 7th belongs to a streak.
        let recs = evaluate_day_7(vec![no_clicks(7, 20.0), no_clicks(4, 20.0), no_clicks(1, 20.0)]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].strike_count, 1);
        assert_eq!(recs[0].severity, Severity::Info);
        assert_eq!(recs[0].kind, RecommendationKind::FlagAd);
    }

    #[test]
    fn test_ad_without_a_row_today_is_skipped() {
        let rows = vec![no_clicks(5, 20.0), no_clicks(4, 20.0), no_clicks(3, 20.0)];
        assert!(evaluate_day_7(rows.clone()).is_empty());
        let on_the_day = evaluator().evaluate_ad(&history(rows), day(5));
        assert_eq!(on_the_day[0].strike_count, 3);
    }

    #[test]
    fn test_metadata_carries_threshold_and_value() {
        let recs = evaluate_day_7(vec![broken_page(7)]);
        let md = &recs[0].metadata;
        assert_eq!(md["threshold"], json!(0.5));
        assert_eq!(md["metric_value"], json!(0.25));
        assert_eq!(md["rule"], json!("low_connect_rate"));
        assert_eq!(md["date"], json!("2026-01-07"));
    }
}
