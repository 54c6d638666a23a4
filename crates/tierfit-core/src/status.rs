use serde::{Deserialize, Serialize};

use crate::license::is_sentinel_label;
use crate::normalize::normalize_label;
use crate::tier::rank_of;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Ord, PartialOrd)]
pub enum Status {
    Optimized,
    #[serde(rename = "Over-Licensed")]
    OverLicensed,
    #[serde(rename = "Under-Licensed")]
    UnderLicensed,
    Review,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Self::Optimized,
        Self::OverLicensed,
        Self::UnderLicensed,
        Self::Review,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Optimized => "Optimized",
            Self::OverLicensed => "Over-Licensed",
            Self::UnderLicensed => "Under-Licensed",
            Self::Review => "Review",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How "Not Assigned" compares with "No Data".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SentinelPolicy {
    /// Different sentinels are different labels, so the pair falls through to `Review`.
    #[default]
    Distinct,
    /// Any two sentinels count as a match.
    Equivalent,
}

impl SentinelPolicy {
    pub fn from_match_flag(sentinels_match: bool) -> Self {
        if sentinels_match {
            Self::Equivalent
        } else {
            Self::Distinct
        }
    }
}

pub fn classify(current: &str, recommended: &str, policy: SentinelPolicy) -> Status {
    let current_label = normalize_label(Some(current));
    let recommended_label = normalize_label(Some(recommended));
    if current_label == recommended_label {
        return Status::Optimized;
    }

    if policy == SentinelPolicy::Equivalent
        && is_sentinel_label(current)
        && is_sentinel_label(recommended)
    {
        return Status::Optimized;
    }

    let current_rank = rank_of(current_label.as_deref());
    let recommended_rank = rank_of(recommended_label.as_deref());
    match current_rank.cmp(&recommended_rank) {
        std::cmp::Ordering::Greater => Status::OverLicensed,
        std::cmp::Ordering::Less => Status::UnderLicensed,
        std::cmp::Ordering::Equal => Status::Review,
    }
}
