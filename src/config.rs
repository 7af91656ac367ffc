use crate::domain::error::DomainError;
use crate::domain::values::campaign_filter::CampaignFilter;
use crate::domain::values::policy::Policy;
use std::path::PathBuf;

/// Runtime configuration loaded from environment variables (and `.env`).
///
/// | Env Var                  | Default          |
/// |--------------------------|------------------|
/// | `ADWATCH_DB`             | `./adwatch.db`   |
/// | `ADWATCH_CAMPAIGN`       | `31DWC2026`      |
/// | `ADWATCH_CAMPAIGN_TYPES` | empty (any type) |
/// | `ADWATCH_WEBHOOK_URL`    | unset (log only) |
/// | `ADWATCH_POLICY`         | unset (defaults) |
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub filter: CampaignFilter,
    pub webhook_url: Option<String>,
    pub policy_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        let db_path = std::env::var("ADWATCH_DB").unwrap_or_else(|_| "./adwatch.db".into());
        let name = std::env::var("ADWATCH_CAMPAIGN")
            .unwrap_or_else(|_| CampaignFilter::default().name_contains);
        let type_tags: Vec<String> = std::env::var("ADWATCH_CAMPAIGN_TYPES")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let webhook_url = std::env::var("ADWATCH_WEBHOOK_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let policy_path = std::env::var("ADWATCH_POLICY").ok().map(PathBuf::from);

        Self {
            db_path,
            filter: CampaignFilter::new(name, type_tags),
            webhook_url,
            policy_path,
        }
    }

    /// The policy file if one is configured, otherwise the built-in defaults.
    pub fn policy(&self) -> Result<Policy, DomainError> {
        match &self.policy_path {
            Some(path) => Policy::from_file(path),
            None => Ok(Policy::default()),
        }
    }
}
