use crate::domain::values::severity::Severity;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagStatus {
    Flagged,
    Recovered,
    Disabled,
}

impl FlagStatus {
    pub fn for_strikes(strikes: u8) -> Self {
        if strikes >= 3 {
            FlagStatus::Disabled
        } else {
            FlagStatus::Flagged
        }
    }
}

impl fmt::Display for FlagStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagStatus::Flagged => write!(f, "flagged"),
            FlagStatus::Recovered => write!(f, "recovered"),
            FlagStatus::Disabled => write!(f, "disabled"),
        }
    }
}

impl FromStr for FlagStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flagged" => Ok(FlagStatus::Flagged),
            "recovered" => Ok(FlagStatus::Recovered),
            "disabled" => Ok(FlagStatus::Disabled),
            _ => Err(format!("Unknown flag status: {s}")),
        }
    }
}

/// One strike logged against an ad. The flag history is append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagEvent {
    pub ad_id: String,
    pub ad_name: String,
    pub adset_id: String,
    pub campaign_id: String,
    pub date: NaiveDate,
    pub strike_count: u8,
    pub flag_type: String,
    pub severity: Severity,
    pub status: FlagStatus,
    pub metric_value: Option<f64>,
    pub threshold: Option<f64>,
    pub created_at: DateTime<Utc>,
}
