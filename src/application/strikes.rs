//! Strike tracker: how many calendar days in a row, ending on the evaluation
//! day, an ad has been performing poorly.
//!
//! Recomputed from the trailing history on every run; nothing is stored.

use crate::domain::entities::ad_record::DailyAdRecord;
use crate::domain::values::policy::StrikePolicy;
use chrono::{Days, NaiveDate};

/// A day is poor when any of these holds:
/// - cost-per-purchase above target with enough purchases to trust it
/// - click-to-purchase below target with enough link clicks to trust it
/// - spend above the floor with no clicks at all
pub fn is_poor_day(record: &DailyAdRecord, policy: &StrikePolicy) -> bool {
    let expensive = record.purchases >= policy.min_purchases_for_cpp_eval
        && record.cost_per_purchase > policy.good_cpp_threshold;
    let not_converting = record.link_clicks >= policy.min_clicks_for_evaluation
        && record.click_to_purchase_rate < policy.min_click_to_purchase;
    let no_clicks = record.clicks == 0 && record.spend > policy.min_spend_no_clicks;
    expensive || not_converting || no_clicks
}

/// Length of the unbroken poor streak ending on `as_of`.
///
/// `history` must be most-recent-first with one record per day. Day `i` of
/// the streak must be dated `as_of - i`: a missing day ends the streak just
/// like a healthy one. At most `policy.window_days` days are counted.
pub fn strike_count(history: &[DailyAdRecord], as_of: NaiveDate, policy: &StrikePolicy) -> u8 {
    let streak = history
        .iter()
        .take(policy.window_days)
        .enumerate()
        .take_while(|(i, day)| {
            as_of.checked_sub_days(Days::new(*i as u64)) == Some(day.date)
                && is_poor_day(day, policy)
        })
        .count();
    u8::try_from(streak).unwrap_or(u8::MAX)
}
