use crate::domain::entities::flag_event::FlagEvent;
use crate::domain::error::DomainError;

#[derive(Debug, Clone, Default)]
pub struct FlagFilter {
    pub ad_id: Option<String>,
    pub limit: Option<usize>,
}

pub trait FlagHistory: Send + Sync {
    /// Append an event. Returns `false` when the same (ad, date, flag type)
    /// was already logged.
    fn append_flag(&self, event: &FlagEvent) -> Result<bool, DomainError>;
    /// Newest first.
    fn list_flags(&self, filter: &FlagFilter) -> Result<Vec<FlagEvent>, DomainError>;
}
