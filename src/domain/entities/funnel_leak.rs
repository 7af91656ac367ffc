use crate::domain::values::severity::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The four funnel stages a leak can sit in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeakType {
    LeadToPurchase,
    ClickToPurchase,
    ClickToLead,
    ClickToPage,
}

impl LeakType {
    /// Fixed business priority, 1 = fix first.
    pub fn priority(&self) -> u8 {
        match self {
            LeakType::LeadToPurchase => 1,
            LeakType::ClickToPurchase => 2,
            LeakType::ClickToLead => 3,
            LeakType::ClickToPage => 4,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            LeakType::LeadToPurchase | LeakType::ClickToPurchase => Severity::Critical,
            LeakType::ClickToLead | LeakType::ClickToPage => Severity::Warning,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            LeakType::LeadToPurchase => "Lead-to-Purchase Leak Detected",
            LeakType::ClickToPurchase => "Click-to-Purchase Leak Detected (Primary Metric)",
            LeakType::ClickToLead => "Click-to-Lead Leak Detected",
            LeakType::ClickToPage => "Click-to-Page Leak Detected",
        }
    }

    pub fn root_cause(&self) -> &'static str {
        match self {
            LeakType::LeadToPurchase => {
                "VIP offer not compelling or email nurture sequence weak."
            }
            LeakType::ClickToPurchase => {
                "Overall funnel is under target. Check the stage-specific leaks for the root cause."
            }
            LeakType::ClickToLead => {
                "Landing page conversion issue (weak copy, unclear CTA, complicated form)."
            }
            LeakType::ClickToPage => {
                "Landing page speed issue or broken pixel tracking."
            }
        }
    }

    pub fn actions(&self) -> &'static [&'static str] {
        match self {
            LeakType::LeadToPurchase => &[
                "Optimize the VIP sales page (copy, bonuses, urgency)",
                "Improve the email sequence (timing, copy, CTAs)",
                "Test pricing and payment plans",
                "Add social proof and testimonials",
            ],
            LeakType::ClickToPurchase => &[
                "Fix the lead-to-purchase stage first",
                "Then the click-to-lead stage",
                "Then the click-to-page stage",
            ],
            LeakType::ClickToLead => &[
                "Rework landing page headline and value proposition",
                "Make the CTA clearer and move it above the fold",
                "Reduce form fields",
                "Test a different lead magnet or offer",
            ],
            LeakType::ClickToPage => &[
                "Reduce landing page load time",
                "Check mobile performance",
                "Verify the pixel fires on page load",
            ],
        }
    }
}

impl std::fmt::Display for LeakType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LeakType::LeadToPurchase => "lead_to_purchase",
            LeakType::ClickToPurchase => "click_to_purchase",
            LeakType::ClickToLead => "click_to_lead",
            LeakType::ClickToPage => "click_to_page",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelLeak {
    pub leak_type: LeakType,
    pub severity: Severity,
    pub priority: u8,
    pub title: String,
    pub description: String,
    pub root_cause: String,
    pub actions: Vec<String>,
    pub affected_ads: usize,
    pub metrics: BTreeMap<String, serde_json::Value>,
}
