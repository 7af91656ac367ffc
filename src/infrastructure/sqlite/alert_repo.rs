use super::{bad_column, parse_timestamp, timestamp};
use crate::domain::entities::alert_record::AlertRecord;
use crate::domain::error::DomainError;
use crate::domain::ports::alert_history::AlertHistory;
use crate::domain::values::alert_type::AlertType;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::sync::Mutex;

pub struct SqliteAlertRepo {
    conn: Mutex<Connection>,
}

impl SqliteAlertRepo {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn row_to_alert(row: &rusqlite::Row) -> Result<AlertRecord, rusqlite::Error> {
        let type_str: String = row.get(1)?;
        let created_str: String = row.get(6)?;
        let resolved_str: Option<String> = row.get(7)?;
        Ok(AlertRecord {
            id: row.get(0)?,
            alert_type: type_str.parse().map_err(|_| bad_column(1, &type_str))?,
            metric_value: row.get(2)?,
            threshold: row.get(3)?,
            message: row.get(4)?,
            notification_sent: row.get(5)?,
            created_at: parse_timestamp(&created_str).ok_or_else(|| bad_column(6, &created_str))?,
            resolved_at: resolved_str.as_deref().and_then(parse_timestamp),
        })
    }
}

impl AlertHistory for SqliteAlertRepo {
    fn has_unresolved_alert(
        &self,
        alert_type: AlertType,
        since: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM alerts
                 WHERE alert_type = ?1 AND created_at >= ?2 AND resolved_at IS NULL",
                params![alert_type.as_str(), timestamp(&since)],
                |row| row.get(0),
            )
            .map_err(|e| DomainError::Database(format!("Failed to check alerts: {e}")))?;
        Ok(count > 0)
    }

    fn append_alert(&self, record: &AlertRecord) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        conn.execute(
            "INSERT INTO alerts (id, alert_type, metric_value, threshold, message, notification_sent, created_at, resolved_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.id,
                record.alert_type.as_str(),
                record.metric_value,
                record.threshold,
                record.message,
                record.notification_sent,
                timestamp(&record.created_at),
                record.resolved_at.as_ref().map(timestamp),
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to add alert: {e}")))?;
        Ok(())
    }

    fn recent_alerts(&self, limit: usize) -> Result<Vec<AlertRecord>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut stmt = conn
            .prepare(
                "SELECT id, alert_type, metric_value, threshold, message, notification_sent, created_at, resolved_at
                 FROM alerts ORDER BY created_at DESC LIMIT ?1",
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let alerts = stmt
            .query_map(params![limit as i64], Self::row_to_alert)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(alerts)
    }

    fn resolve_alert(&self, id: &str, resolved_at: DateTime<Utc>) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let rows = conn
            .execute(
                "UPDATE alerts SET resolved_at = ?1 WHERE id = ?2 AND resolved_at IS NULL",
                params![timestamp(&resolved_at), id],
            )
            .map_err(|e| DomainError::Database(format!("Failed to resolve alert: {e}")))?;
        if rows == 0 {
            return Err(DomainError::NotFound(format!("Open alert not found: {id}")));
        }
        Ok(())
    }
}
