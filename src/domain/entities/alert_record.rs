use crate::domain::values::alert_type::AlertType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted campaign alert. Created once per fire; only resolution changes it later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: String,
    pub alert_type: AlertType,
    pub metric_value: f64,
    pub threshold: f64,
    pub message: String,
    pub notification_sent: bool,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl AlertRecord {
    pub fn new(
        alert_type: AlertType,
        metric_value: f64,
        threshold: f64,
        message: String,
        notification_sent: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            alert_type,
            metric_value,
            threshold,
            message,
            notification_sent,
            created_at,
            resolved_at: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved_at.is_some()
    }
}
