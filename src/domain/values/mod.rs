pub mod alert_type;
pub mod campaign_filter;
pub mod platform;
pub mod policy;
pub mod severity;
