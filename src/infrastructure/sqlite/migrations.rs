use crate::domain::error::DomainError;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), DomainError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS ad_performance (
            ad_id TEXT NOT NULL,
            date TEXT NOT NULL,
            adset_id TEXT NOT NULL,
            campaign_id TEXT NOT NULL,
            ad_name TEXT NOT NULL DEFAULT '',
            adset_name TEXT NOT NULL DEFAULT '',
            campaign_name TEXT NOT NULL,
            campaign_type TEXT,
            platform TEXT NOT NULL,
            spend REAL NOT NULL DEFAULT 0,
            clicks INTEGER NOT NULL DEFAULT 0,
            impressions INTEGER NOT NULL DEFAULT 0,
            link_clicks INTEGER NOT NULL DEFAULT 0,
            landing_page_views INTEGER NOT NULL DEFAULT 0,
            leads INTEGER NOT NULL DEFAULT 0,
            purchases INTEGER NOT NULL DEFAULT 0,
            frequency REAL,
            PRIMARY KEY (ad_id, date)
        );

        CREATE TABLE IF NOT EXISTS alerts (
            id TEXT PRIMARY KEY,
            alert_type TEXT NOT NULL,
            metric_value REAL NOT NULL,
            threshold REAL NOT NULL,
            message TEXT NOT NULL,
            notification_sent INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            resolved_at TEXT
        );

        CREATE TABLE IF NOT EXISTS ad_flag_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ad_id TEXT NOT NULL,
            ad_name TEXT NOT NULL,
            adset_id TEXT NOT NULL,
            campaign_id TEXT NOT NULL,
            date TEXT NOT NULL,
            strike_count INTEGER NOT NULL,
            flag_type TEXT NOT NULL,
            severity TEXT NOT NULL,
            status TEXT NOT NULL,
            metric_value REAL,
            threshold REAL,
            created_at TEXT NOT NULL,
            UNIQUE (ad_id, date, flag_type)
        );

        CREATE INDEX IF NOT EXISTS idx_perf_date ON ad_performance(date);
        CREATE INDEX IF NOT EXISTS idx_alerts_type_created ON alerts(alert_type, created_at);
        CREATE INDEX IF NOT EXISTS idx_flags_ad ON ad_flag_history(ad_id, date);
        ",
    )
    .map_err(|e| DomainError::Database(format!("Migration failed: {e}")))
}
