use crate::domain::entities::ad_record::{DailyAdRecord, RawAdRow};
use crate::domain::error::DomainError;
use crate::domain::ports::ad_performance::AdPerformanceStore;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSummary {
    pub received: usize,
    pub written: usize,
    pub rejected: Vec<String>,
}

pub struct ImportUseCase {
    store: Arc<dyn AdPerformanceStore>,
}

impl ImportUseCase {
    pub fn new(store: Arc<dyn AdPerformanceStore>) -> Self {
        Self { store }
    }

    /// Validate and upsert rows. Invalid rows are reported, not written.
    pub fn execute(&self, rows: Vec<RawAdRow>) -> Result<ImportSummary, DomainError> {
        let received = rows.len();
        let mut valid = Vec::with_capacity(received);
        let mut rejected = Vec::new();
        for row in rows {
            // Validate on a copy; the store keeps the raw shape.
            match DailyAdRecord::from_row(row.clone()) {
                Ok(_) => valid.push(row),
                Err(e) => rejected.push(e.to_string()),
            }
        }
        let written = self.store.upsert_rows(&valid)?;
        if !rejected.is_empty() {
            tracing::warn!(rejected = rejected.len(), "rejected rows during import");
        }
        tracing::info!(received, written, "rows imported");
        Ok(ImportSummary {
            received,
            written,
            rejected,
        })
    }

    /// Parse a JSON array of rows.
    pub fn parse(json: &str) -> Result<Vec<RawAdRow>, DomainError> {
        Ok(serde_json::from_str(json)?)
    }
}
