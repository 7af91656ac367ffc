use crate::domain::ports::report_cache::{CacheMetadata, ReportCache};
use chrono::{Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

struct Entry {
    value: Value,
    meta: CacheMetadata,
}

/// Process-local TTL cache. Expired entries are dropped on read.
#[derive(Default)]
pub struct MemoryReportCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryReportCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportCache for MemoryReportCache {
    fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(key) {
            Some(e) if Utc::now() < e.meta.expires_at => Some(e.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, value: Value, ttl: Duration) {
        let created_at = Utc::now();
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                key.to_string(),
                Entry {
                    value,
                    meta: CacheMetadata {
                        created_at,
                        expires_at: created_at + ttl,
                    },
                },
            );
        }
    }

    fn invalidate(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }

    fn metadata(&self, key: &str) -> Option<CacheMetadata> {
        let entries = self.entries.lock().ok()?;
        entries
            .get(key)
            .filter(|e| Utc::now() < e.meta.expires_at)
            .map(|e| e.meta.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_get_invalidate() {
        let cache = MemoryReportCache::new();
        cache.set("k", json!({"a": 1}), Duration::minutes(30));
        assert_eq!(cache.get("k"), Some(json!({"a": 1})));
        let meta = cache.metadata("k").unwrap();
        assert_eq!(meta.expires_at - meta.created_at, Duration::minutes(30));

        cache.invalidate("k");
        assert_eq!(cache.get("k"), None);
        assert!(cache.metadata("k").is_none());
    }

    #[test]
    fn test_expired_entry_reads_as_absent() {
        let cache = MemoryReportCache::new();
        cache.set("k", json!(1), Duration::zero());
        assert_eq!(cache.get("k"), None);
        assert!(cache.metadata("k").is_none());
    }
}
