use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three campaign-wide alert checks. Each type is deduplicated independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    HighCpp,
    LowClickToPurchase,
    HighFrequency,
}

impl AlertType {
    pub const ALL: [AlertType; 3] = [
        AlertType::HighCpp,
        AlertType::LowClickToPurchase,
        AlertType::HighFrequency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::HighCpp => "high_cpp",
            AlertType::LowClickToPurchase => "low_click_to_purchase",
            AlertType::HighFrequency => "high_frequency",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AlertType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high_cpp" => Ok(AlertType::HighCpp),
            "low_click_to_purchase" => Ok(AlertType::LowClickToPurchase),
            "high_frequency" => Ok(AlertType::HighFrequency),
            _ => Err(format!("Unknown alert type: {s}")),
        }
    }
}
