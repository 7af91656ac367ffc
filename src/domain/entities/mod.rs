pub mod ad_history;
pub mod ad_record;
pub mod alert_record;
pub mod campaign_totals;
pub mod fatigue_alert;
pub mod flag_event;
pub mod funnel_leak;
pub mod recommendation;
