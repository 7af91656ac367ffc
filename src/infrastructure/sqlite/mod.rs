pub mod ad_performance_repo;
pub mod alert_repo;
pub mod flag_repo;
pub mod migrations;

use crate::domain::error::DomainError;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::Connection;
use std::time::Duration;

/// Open a connection in WAL mode with the schema in place.
/// Several processes may share one file, so writers wait on the lock instead of failing.
pub fn open_connection(db_path: &str) -> Result<Connection, DomainError> {
    let conn =
        Connection::open(db_path).map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(|e| DomainError::Database(format!("WAL error: {e}")))?;
    conn.busy_timeout(Duration::from_secs(5))
        .map_err(|e| DomainError::Database(format!("busy timeout: {e}")))?;
    migrations::run_migrations(&conn)?;
    Ok(conn)
}

/// Fixed-width UTC timestamps so text comparison in SQL matches time order.
pub(crate) fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Column conversion failure for values stored in a form this crate never writes.
pub(crate) fn bad_column(idx: usize, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        format!("unreadable value '{value}'").into(),
    )
}
