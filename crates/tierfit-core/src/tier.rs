use serde::{Deserialize, Serialize};

use crate::license::Recommendation;
use crate::normalize::normalize_label;

/// Rank reported for labels outside the tier table, sentinels included.
pub const UNRANKED: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Ord, PartialOrd)]
pub enum Tier {
    Productivity,
    Functional,
    Professional,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Self::Productivity, Self::Functional, Self::Professional];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Productivity => "Productivity",
            Self::Functional => "Functional",
            Self::Professional => "Professional",
        }
    }

    pub fn rank(self) -> u8 {
        match self {
            Self::Productivity => 1,
            Self::Functional => 2,
            Self::Professional => 3,
        }
    }

    /// Resolves a raw label against the tier table after label normalization.
    pub fn from_label(raw: &str) -> Option<Self> {
        let normalized = normalize_label(Some(raw))?;
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str() == normalized)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_label(value).ok_or_else(|| {
            format!(
                "invalid license tier '{}', expected one of: Productivity, Functional, Professional",
                value.trim()
            )
        })
    }
}

pub fn rank_of(label: Option<&str>) -> u8 {
    label
        .and_then(Tier::from_label)
        .map(Tier::rank)
        .unwrap_or(UNRANKED)
}

/// Picks the highest-ranked recognized tier, or `NoData` when none is recognized.
pub fn highest<I, S>(labels: I) -> Recommendation
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    labels
        .into_iter()
        .filter_map(|label| Tier::from_label(label.as_ref()))
        .max_by_key(|tier| tier.rank())
        .map(Recommendation::Tier)
        .unwrap_or(Recommendation::NoData)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_follow_fixed_priority_order() {
        assert_eq!(Tier::Productivity.rank(), 1);
        assert_eq!(Tier::Functional.rank(), 2);
        assert_eq!(Tier::Professional.rank(), 3);

        let mut ranks = Tier::ALL.map(Tier::rank).to_vec();
        ranks.dedup();
        assert_eq!(ranks.len(), Tier::ALL.len());
        assert!(Tier::Productivity < Tier::Functional && Tier::Functional < Tier::Professional);
    }

    #[test]
    fn rank_of_floors_unknown_and_sentinel_labels() {
        assert_eq!(rank_of(Some(" professional ")), 3);
        assert_eq!(rank_of(Some("Limited Professional")), UNRANKED);
        assert_eq!(rank_of(Some("Not Assigned")), UNRANKED);
        assert_eq!(rank_of(Some("No Data")), UNRANKED);
        assert_eq!(rank_of(None), UNRANKED);
    }

    #[test]
    fn highest_of_empty_input_is_no_data() {
        assert_eq!(highest(Vec::<String>::new()), Recommendation::NoData);
    }

    #[test]
    fn highest_of_single_tier_is_that_tier() {
        assert_eq!(
            highest(["Productivity"]),
            Recommendation::Tier(Tier::Productivity)
        );
    }

    #[test]
    fn highest_wins_regardless_of_order() {
        assert_eq!(
            highest(["Productivity", "Professional", "Functional"]),
            Recommendation::Tier(Tier::Professional)
        );
        assert_eq!(
            highest(["functional", "PRODUCTIVITY", "functional"]),
            Recommendation::Tier(Tier::Functional)
        );
    }

    #[test]
    fn highest_ignores_unrecognized_labels() {
        assert_eq!(highest(["Nan", "Developer"]), Recommendation::NoData);
        assert_eq!(
            highest(["Developer", "productivity"]),
            Recommendation::Tier(Tier::Productivity)
        );
    }

    #[test]
    fn tier_parses_from_loose_labels() {
        assert_eq!("  FUNCTIONAL".parse::<Tier>(), Ok(Tier::Functional));
        let err = "gold".parse::<Tier>().expect_err("expected error");
        assert!(err.contains("invalid license tier 'gold'"));
    }
}
