use super::{bad_column, parse_date, parse_timestamp, timestamp};
use crate::domain::entities::flag_event::FlagEvent;
use crate::domain::error::DomainError;
use crate::domain::ports::flag_history::{FlagFilter, FlagHistory};
use rusqlite::{params, Connection};
use std::sync::Mutex;

pub struct SqliteFlagRepo {
    conn: Mutex<Connection>,
}

impl SqliteFlagRepo {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn row_to_flag(row: &rusqlite::Row) -> Result<FlagEvent, rusqlite::Error> {
        let date_str: String = row.get(4)?;
        let severity_str: String = row.get(7)?;
        let status_str: String = row.get(8)?;
        let created_str: String = row.get(11)?;
        Ok(FlagEvent {
            ad_id: row.get(0)?,
            ad_name: row.get(1)?,
            adset_id: row.get(2)?,
            campaign_id: row.get(3)?,
            date: parse_date(&date_str).ok_or_else(|| bad_column(4, &date_str))?,
            strike_count: row.get::<_, i64>(5)?.clamp(0, u8::MAX as i64) as u8,
            flag_type: row.get(6)?,
            severity: severity_str
                .parse()
                .map_err(|_| bad_column(7, &severity_str))?,
            status: status_str.parse().map_err(|_| bad_column(8, &status_str))?,
            metric_value: row.get(9)?,
            threshold: row.get(10)?,
            created_at: parse_timestamp(&created_str).ok_or_else(|| bad_column(11, &created_str))?,
        })
    }
}

impl FlagHistory for SqliteFlagRepo {
    fn append_flag(&self, event: &FlagEvent) -> Result<bool, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO ad_flag_history (ad_id, ad_name, adset_id, campaign_id, date,
                    strike_count, flag_type, severity, status, metric_value, threshold, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    event.ad_id,
                    event.ad_name,
                    event.adset_id,
                    event.campaign_id,
                    event.date.to_string(),
                    event.strike_count as i64,
                    event.flag_type,
                    event.severity.to_string(),
                    event.status.to_string(),
                    event.metric_value,
                    event.threshold,
                    timestamp(&event.created_at),
                ],
            )
            .map_err(|e| DomainError::Database(format!("Failed to add flag: {e}")))?;
        Ok(inserted > 0)
    }

    fn list_flags(&self, filter: &FlagFilter) -> Result<Vec<FlagEvent>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut sql = String::from(
            "SELECT ad_id, ad_name, adset_id, campaign_id, date, strike_count, flag_type, severity,
                    status, metric_value, threshold, created_at
             FROM ad_flag_history WHERE 1=1",
        );
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(ad_id) = &filter.ad_id {
            sql.push_str(&format!(" AND ad_id = ?{}", param_values.len() + 1));
            param_values.push(Box::new(ad_id.clone()));
        }
        sql.push_str(" ORDER BY date DESC, id DESC");
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT ?{}", param_values.len() + 1));
            param_values.push(Box::new(limit as i64));
        }

        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let flags = stmt
            .query_map(params_refs.as_slice(), Self::row_to_flag)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(flags)
    }
}
