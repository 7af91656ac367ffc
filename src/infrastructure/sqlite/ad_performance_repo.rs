use super::{bad_column, parse_date};
use crate::domain::entities::ad_record::RawAdRow;
use crate::domain::error::DomainError;
use crate::domain::ports::ad_performance::{AdPerformanceSource, AdPerformanceStore};
use crate::domain::values::campaign_filter::CampaignFilter;
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::sync::Mutex;

/// Daily ad rows kept in sqlite, keyed by (ad id, date). Serves both as the
/// row source for evaluation and as the target for imports.
pub struct SqliteAdPerformanceRepo {
    conn: Mutex<Connection>,
}

impl SqliteAdPerformanceRepo {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn row_to_raw(row: &rusqlite::Row) -> Result<RawAdRow, rusqlite::Error> {
        let date_str: String = row.get(1)?;
        let platform_str: String = row.get(8)?;
        Ok(RawAdRow {
            ad_id: row.get(0)?,
            date: parse_date(&date_str).ok_or_else(|| bad_column(1, &date_str))?,
            adset_id: row.get(2)?,
            campaign_id: row.get(3)?,
            ad_name: row.get(4)?,
            adset_name: row.get(5)?,
            campaign_name: row.get(6)?,
            campaign_type: row.get(7)?,
            platform: platform_str
                .parse()
                .map_err(|_| bad_column(8, &platform_str))?,
            spend: row.get(9)?,
            clicks: row.get::<_, i64>(10)?.max(0) as u64,
            impressions: row.get::<_, i64>(11)?.max(0) as u64,
            link_clicks: row.get::<_, i64>(12)?.max(0) as u64,
            landing_page_views: row.get::<_, i64>(13)?.max(0) as u64,
            leads: row.get::<_, i64>(14)?.max(0) as u64,
            purchases: row.get::<_, i64>(15)?.max(0) as u64,
            frequency: row.get(16)?,
        })
    }
}

#[async_trait]
impl AdPerformanceSource for SqliteAdPerformanceRepo {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn fetch(
        &self,
        filter: &CampaignFilter,
        since: NaiveDate,
    ) -> Result<Vec<RawAdRow>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        // LIKE is case-insensitive for ASCII; type tags are checked below.
        let mut stmt = conn
            .prepare(
                "SELECT ad_id, date, adset_id, campaign_id, ad_name, adset_name, campaign_name,
                        campaign_type, platform, spend, clicks, impressions, link_clicks,
                        landing_page_views, leads, purchases, frequency
                 FROM ad_performance
                 WHERE date >= ?1 AND campaign_name LIKE '%' || ?2 || '%'
                 ORDER BY ad_id, date DESC",
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(
                params![since.to_string(), filter.name_contains],
                Self::row_to_raw,
            )
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| match r {
                Ok(row) => Some(row),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable ad_performance row");
                    None
                }
            })
            .filter(|r| filter.matches(&r.campaign_name, r.campaign_type.as_deref()))
            .collect();
        Ok(rows)
    }
}

impl AdPerformanceStore for SqliteAdPerformanceRepo {
    fn upsert_rows(&self, rows: &[RawAdRow]) -> Result<usize, DomainError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR REPLACE INTO ad_performance (ad_id, date, adset_id, campaign_id,
                        ad_name, adset_name, campaign_name, campaign_type, platform, spend, clicks,
                        impressions, link_clicks, landing_page_views, leads, purchases, frequency)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
                )
                .map_err(|e| DomainError::Database(e.to_string()))?;
            for r in rows {
                stmt.execute(params![
                    r.ad_id,
                    r.date.to_string(),
                    r.adset_id,
                    r.campaign_id,
                    r.ad_name,
                    r.adset_name,
                    r.campaign_name,
                    r.campaign_type,
                    r.platform.to_string(),
                    r.spend,
                    r.clicks as i64,
                    r.impressions as i64,
                    r.link_clicks as i64,
                    r.landing_page_views as i64,
                    r.leads as i64,
                    r.purchases as i64,
                    r.frequency,
                ])
                .map_err(|e| {
                    DomainError::Database(format!("Failed to store row {}/{}: {e}", r.ad_id, r.date))
                })?;
            }
        }
        tx.commit()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ad_record::fixtures::{day, row};
    use crate::infrastructure::sqlite::open_connection;

    fn repo() -> SqliteAdPerformanceRepo {
        SqliteAdPerformanceRepo::new(open_connection(":memory:").unwrap())
    }

    #[tokio::test]
    async fn test_upsert_replaces_same_ad_and_day() {
        let repo = repo();
        let mut r = row("a1", day(5));
        r.spend = 10.0;
        repo.upsert_rows(&[r.clone()]).unwrap();
        r.spend = 25.0;
        repo.upsert_rows(&[r]).unwrap();

        let rows = repo.fetch(&CampaignFilter::default(), day(1)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].spend, 25.0);
    }

    #[tokio::test]
    async fn test_fetch_applies_since_and_filter() {
        let repo = repo();
        let mut other = row("b1", day(5));
        other.campaign_name = "Evergreen".into();
        let mut leads = row("c1", day(5));
        leads.campaign_type = Some("leads".into());
        repo.upsert_rows(&[row("a1", day(2)), row("a1", day(5)), other, leads])
            .unwrap();

        let filter = CampaignFilter::new("31dwc2026", vec!["sales".into()]);
        let rows = repo.fetch(&filter, day(3)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ad_id, "a1");
        assert_eq!(rows[0].date, day(5));
    }
}
