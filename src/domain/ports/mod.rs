pub mod ad_performance;
pub mod alert_history;
pub mod flag_history;
pub mod notifier;
pub mod report_cache;
