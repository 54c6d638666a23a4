use serde::{Deserialize, Serialize};

use crate::normalize::normalize_label;
use crate::tier::Tier;

pub const NOT_ASSIGNED: &str = "Not Assigned";
pub const NO_DATA: &str = "No Data";

pub fn is_sentinel_label(label: &str) -> bool {
    matches!(
        normalize_label(Some(label)).as_deref(),
        Some(NOT_ASSIGNED) | Some(NO_DATA)
    )
}

/// The license a user currently holds, as recorded in the activity data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum LicenseAssignment {
    Assigned(String),
    NotAssigned,
}

impl LicenseAssignment {
    pub fn from_label(raw: Option<&str>) -> Self {
        match normalize_label(raw) {
            Some(label) if label != NOT_ASSIGNED => Self::Assigned(label),
            _ => Self::NotAssigned,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Assigned(label) => label.as_str(),
            Self::NotAssigned => NOT_ASSIGNED,
        }
    }

    pub fn tier(&self) -> Option<Tier> {
        match self {
            Self::Assigned(label) => Tier::from_label(label),
            Self::NotAssigned => None,
        }
    }
}

impl From<LicenseAssignment> for String {
    fn from(value: LicenseAssignment) -> Self {
        value.label().to_owned()
    }
}

impl From<String> for LicenseAssignment {
    fn from(value: String) -> Self {
        Self::from_label(Some(value.as_str()))
    }
}

impl std::fmt::Display for LicenseAssignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The tier a user's activity requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Recommendation {
    Tier(Tier),
    NoData,
}

impl Recommendation {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Tier(tier) => tier.as_str(),
            Self::NoData => NO_DATA,
        }
    }

    pub fn tier(&self) -> Option<Tier> {
        match self {
            Self::Tier(tier) => Some(*tier),
            Self::NoData => None,
        }
    }
}

impl From<Recommendation> for String {
    fn from(value: Recommendation) -> Self {
        value.label().to_owned()
    }
}

impl From<String> for Recommendation {
    fn from(value: String) -> Self {
        Tier::from_label(&value)
            .map(Self::Tier)
            .unwrap_or(Self::NoData)
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
