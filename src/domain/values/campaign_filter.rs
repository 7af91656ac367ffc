use serde::{Deserialize, Serialize};

/// Which rows a run looks at: a campaign-name substring plus optional
/// campaign type tags. An empty tag list accepts every type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignFilter {
    pub name_contains: String,
    #[serde(default)]
    pub type_tags: Vec<String>,
}

impl CampaignFilter {
    pub fn new(name_contains: impl Into<String>, type_tags: Vec<String>) -> Self {
        Self {
            name_contains: name_contains.into(),
            type_tags,
        }
    }

    /// Case-insensitive substring match on the campaign name and
    /// exact (case-insensitive) match on the type tag.
    pub fn matches(&self, campaign_name: &str, campaign_type: Option<&str>) -> bool {
        let name_ok = campaign_name
            .to_lowercase()
            .contains(&self.name_contains.to_lowercase());
        let type_ok = self.type_tags.is_empty()
            || campaign_type
                .map(|t| self.type_tags.iter().any(|tag| tag.eq_ignore_ascii_case(t)))
                .unwrap_or(false);
        name_ok && type_ok
    }
}

impl Default for CampaignFilter {
    fn default() -> Self {
        Self::new("31DWC2026", Vec::new())
    }
}

impl std::fmt::Display for CampaignFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.type_tags.is_empty() {
            write!(f, "*{}*", self.name_contains)
        } else {
            write!(f, "*{}* [{}]", self.name_contains, self.type_tags.join(","))
        }
    }
}
