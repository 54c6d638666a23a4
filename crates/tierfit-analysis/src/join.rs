use std::collections::HashMap;

use thiserror::Error;
use tierfit_config::CatalogKeyPolicy;
use tierfit_core::{ActivityRecord, CatalogEntry, Tier, normalize_key};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog tcode '{code}' appears at rows {first_row} and {duplicate_row}")]
    DuplicateKey {
        code: String,
        first_row: usize,
        duplicate_row: usize,
    },
}

/// License catalog indexed by normalized activity code.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    by_code: HashMap<String, Vec<usize>>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>, policy: CatalogKeyPolicy) -> Result<Self, CatalogError> {
        let mut by_code = HashMap::<String, Vec<usize>>::new();
        for (index, entry) in entries.iter().enumerate() {
            let Some(code) = normalize_key(Some(entry.activity_code.as_str())) else {
                continue;
            };

            let positions = by_code.entry(code).or_default();
            if let (CatalogKeyPolicy::Reject, Some(first_row)) = (policy, positions.first()) {
                return Err(CatalogError::DuplicateKey {
                    code: entry.activity_code.clone(),
                    first_row: *first_row,
                    duplicate_row: index,
                });
            }
            positions.push(index);
        }

        Ok(Self { entries, by_code })
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries for `code` in catalog row order.
    pub fn lookup(&self, code: &str) -> impl Iterator<Item = &CatalogEntry> {
        normalize_key(Some(code))
            .and_then(|code| self.by_code.get(&code))
            .into_iter()
            .flatten()
            .map(|index| &self.entries[*index])
    }

    /// Codes that map to more than one entry, sorted.
    pub fn duplicate_codes(&self) -> Vec<&str> {
        let mut codes = self
            .by_code
            .iter()
            .filter(|(_, positions)| positions.len() > 1)
            .map(|(code, _)| code.as_str())
            .collect::<Vec<_>>();
        codes.sort_unstable();
        codes
    }
}

/// One activity row paired with at most one catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinedRecord<'a> {
    /// Position of the activity record in the activity input.
    pub row: usize,
    pub activity: &'a ActivityRecord,
    pub entry: Option<&'a CatalogEntry>,
}

impl<'a> JoinedRecord<'a> {
    pub fn license_type(&self) -> Option<&'a str> {
        self.entry.and_then(|entry| entry.license_type.as_deref())
    }

    pub fn description(&self) -> Option<&'a str> {
        self.entry.and_then(|entry| entry.description.as_deref())
    }

    pub fn tier(&self) -> Option<Tier> {
        self.entry.and_then(CatalogEntry::tier)
    }

    pub fn is_matched(&self) -> bool {
        self.entry.is_some()
    }
}

/// Left outer join: every activity record yields one row per catalog match, or one
/// unmatched row.
pub fn join<'a>(activity: &'a [ActivityRecord], catalog: &'a Catalog) -> Vec<JoinedRecord<'a>> {
    let mut joined = Vec::with_capacity(activity.len());
    for (row, record) in activity.iter().enumerate() {
        let before = joined.len();
        joined.extend(catalog.lookup(&record.activity_code).map(|entry| JoinedRecord {
            row,
            activity: record,
            entry: Some(entry),
        }));

        if joined.len() == before {
            joined.push(JoinedRecord {
                row,
                activity: record,
                entry: None,
            });
        }
    }

    tracing::debug!(
        activity_rows = activity.len(),
        joined_rows = joined.len(),
        "joined activity against catalog"
    );
    joined
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(user: &str, code: &str) -> ActivityRecord {
        ActivityRecord::from_raw(None, Some(user), Some(code), None).expect("activity record")
    }

    fn entry(code: &str, license_type: &str) -> CatalogEntry {
        CatalogEntry::from_raw(Some(code), Some(license_type), None).expect("catalog entry")
    }

    #[test]
    fn join_keeps_unmatched_activity_rows() {
        let activity = vec![usage("Alice", "VA01"), usage("Alice", "ZZ99")];
        let catalog = Catalog::new(vec![entry("va01", "Functional")], CatalogKeyPolicy::FanOut)
            .expect("catalog");

        let joined = join(&activity, &catalog);

        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].tier(), Some(Tier::Functional));
        assert!(!joined[1].is_matched());
        assert_eq!(joined[1].license_type(), None);
        assert_eq!(joined[1].activity.activity_code, "ZZ99");
    }

    #[test]
    fn join_matches_codes_after_key_normalization() {
        let activity = vec![ActivityRecord {
            user_id: None,
            user_name: "Alice".to_owned(),
            activity_code: " me21n ".to_owned(),
            license: None,
        }];
        let catalog = Catalog::new(vec![entry("ME21N", "Professional")], CatalogKeyPolicy::FanOut)
            .expect("catalog");

        let joined = join(&activity, &catalog);

        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].license_type(), Some("Professional"));
    }

    #[test]
    fn duplicate_catalog_codes_fan_out_in_catalog_order() {
        let activity = vec![usage("Alice", "VA01"), usage("Bob", "ME21N")];
        let catalog = Catalog::new(
            vec![
                entry("VA01", "Functional"),
                entry("ME21N", "Productivity"),
                entry("va01", "Professional"),
            ],
            CatalogKeyPolicy::FanOut,
        )
        .expect("catalog");

        let joined = join(&activity, &catalog);

        let rows = joined
            .iter()
            .map(|record| (record.row, record.license_type()))
            .collect::<Vec<_>>();
        assert_eq!(
            rows,
            vec![
                (0, Some("Functional")),
                (0, Some("Professional")),
                (1, Some("Productivity")),
            ]
        );
        assert_eq!(catalog.duplicate_codes(), vec!["VA01"]);
    }

    #[test]
    fn reject_policy_refuses_duplicate_codes() {
        let err = Catalog::new(
            vec![
                entry("VA01", "Functional"),
                entry("ME21N", "Productivity"),
                entry("VA01", "Professional"),
            ],
            CatalogKeyPolicy::Reject,
        )
        .expect_err("expected duplicate key error");

        assert_eq!(
            err,
            CatalogError::DuplicateKey {
                code: "VA01".to_owned(),
                first_row: 0,
                duplicate_row: 2,
            }
        );
    }

    #[test]
    fn join_never_drops_activity_rows() {
        let activity = (0..20)
            .map(|index| usage("Alice", &format!("T{}", index % 7)))
            .collect::<Vec<_>>();
        let catalog = Catalog::new(
            vec![entry("T1", "Functional"), entry("T1", "Productivity"), entry("T3", "Gold")],
            CatalogKeyPolicy::FanOut,
        )
        .expect("catalog");

        let joined = join(&activity, &catalog);

        assert!(joined.len() >= activity.len());
        for row in 0..activity.len() {
            assert!(joined.iter().any(|record| record.row == row));
        }
    }
}
