use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheMetadata {
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Keyed JSON cache with an explicit TTL per entry. Expired entries read as absent.
pub trait ReportCache: Send + Sync {
    fn get(&self, key: &str) -> Option<serde_json::Value>;
    fn set(&self, key: &str, value: serde_json::Value, ttl: Duration);
    fn invalidate(&self, key: &str);
    fn metadata(&self, key: &str) -> Option<CacheMetadata>;
}
