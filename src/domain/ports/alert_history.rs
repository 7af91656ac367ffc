use crate::domain::entities::alert_record::AlertRecord;
use crate::domain::error::DomainError;
use crate::domain::values::alert_type::AlertType;
use chrono::{DateTime, Utc};

pub trait AlertHistory: Send + Sync {
    /// Is there an alert of this type, created at or after `since`, still unresolved?
    fn has_unresolved_alert(
        &self,
        alert_type: AlertType,
        since: DateTime<Utc>,
    ) -> Result<bool, DomainError>;
    fn append_alert(&self, record: &AlertRecord) -> Result<(), DomainError>;
    /// Newest first.
    fn recent_alerts(&self, limit: usize) -> Result<Vec<AlertRecord>, DomainError>;
    fn resolve_alert(&self, id: &str, resolved_at: DateTime<Utc>) -> Result<(), DomainError>;
}
