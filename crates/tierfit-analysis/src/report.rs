use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tierfit_config::{AnalysisConfig, UserGrouping};
use tierfit_core::{
    ActivityRecord, CatalogEntry, NO_DATA, SentinelPolicy, UserAssessment, classify,
};

use crate::join::{Catalog, CatalogError, JoinedRecord, join};
use crate::recommend::recommend;

pub const REPORT_SCHEMA_VERSION: &str = "1.0";
/// Marks listing keys for rows that had no user id under `group_by = "user_id"`.
pub const NAME_KEY_PREFIX: &str = "name:";
const UNMATCHED_CODES_IN_NOTE: usize = 10;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("user '{0}' not found in activity data")]
    UnknownUser(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionEntry {
    pub label: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRow {
    pub activity_code: String,
    pub license_type: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserReport {
    pub schema_version: String,
    pub assessment: UserAssessment,
    pub tier_distribution: Vec<DistributionEntry>,
    pub details: Vec<DetailRow>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_users: u32,
    pub activity_rows: u32,
    pub joined_rows: u32,
    pub unmatched_activity_rows: u32,
    pub catalog_entries: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationReport {
    pub schema_version: String,
    pub summary: ReportSummary,
    pub assessments: Vec<UserAssessment>,
    pub recommended_distribution: Vec<DistributionEntry>,
    pub status_distribution: Vec<DistributionEntry>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserListing {
    pub key: String,
    pub user_name: String,
    pub user_id: Option<String>,
    pub activity_rows: u32,
}

/// Immutable snapshot of one activity dataset and one catalog.
#[derive(Debug, Clone)]
pub struct LicenseAnalyzer {
    activity: Vec<ActivityRecord>,
    catalog: Catalog,
    grouping: UserGrouping,
    sentinel_policy: SentinelPolicy,
}

impl LicenseAnalyzer {
    pub fn new(
        activity: Vec<ActivityRecord>,
        catalog: Vec<CatalogEntry>,
        config: &AnalysisConfig,
    ) -> Result<Self, AnalysisError> {
        let catalog = Catalog::new(catalog, config.catalog_keys)?;
        Ok(Self {
            activity,
            catalog,
            grouping: config.group_by,
            sentinel_policy: SentinelPolicy::from_match_flag(config.sentinels_match),
        })
    }

    pub fn activity(&self) -> &[ActivityRecord] {
        &self.activity
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn users(&self) -> Vec<UserListing> {
        let joined = join(&self.activity, &self.catalog);
        self.group(&joined)
            .into_iter()
            .map(|(key, records)| {
                let activity_rows = records
                    .iter()
                    .map(|record| record.row)
                    .collect::<BTreeSet<_>>()
                    .len();
                UserListing {
                    key: key.label(),
                    user_name: records[0].activity.user_name.clone(),
                    user_id: first_user_id(&records),
                    activity_rows: count_u32(activity_rows),
                }
            })
            .collect()
    }

    /// Report for one user, looked up by the key shown in [`LicenseAnalyzer::users`].
    ///
    /// Under user-id grouping a bare key matches an id first, then a user without an id.
    pub fn user_report(&self, user: &str) -> Result<UserReport, AnalysisError> {
        let key = user.trim();
        let joined = join(&self.activity, &self.catalog);
        let mut groups = self.group(&joined);
        let Some(records) = self
            .lookup_candidates(key)
            .into_iter()
            .find_map(|candidate| groups.remove(&candidate))
        else {
            return Err(AnalysisError::UnknownUser(key.to_owned()));
        };

        let assessment = self.assess(&records);
        let tier_distribution =
            distribution(records.iter().filter_map(JoinedRecord::license_type));
        let details = records
            .iter()
            .map(|record| DetailRow {
                activity_code: record.activity.activity_code.clone(),
                license_type: record.license_type().unwrap_or(NO_DATA).to_owned(),
                description: record.description().unwrap_or(NO_DATA).to_owned(),
            })
            .collect();
        let notes = unmatched_note(&records).into_iter().collect();

        tracing::info!(
            user = key,
            status = assessment.status.as_str(),
            rows = records.len(),
            "user report generated"
        );
        Ok(UserReport {
            schema_version: REPORT_SCHEMA_VERSION.to_owned(),
            assessment,
            tier_distribution,
            details,
            notes,
        })
    }

    pub fn population_report(&self) -> PopulationReport {
        let joined = join(&self.activity, &self.catalog);
        let assessments = self
            .group(&joined)
            .values()
            .map(|records| self.assess(records))
            .collect::<Vec<_>>();

        let recommended_distribution = distribution(
            assessments
                .iter()
                .map(|assessment| assessment.recommended_license.label()),
        );
        let status_distribution = distribution(
            assessments
                .iter()
                .map(|assessment| assessment.status.as_str()),
        );

        let unmatched_activity_rows = joined.iter().filter(|record| !record.is_matched()).count();

        let mut notes = unmatched_note(&joined).into_iter().collect::<Vec<_>>();
        let duplicates = self.catalog.duplicate_codes();
        if !duplicates.is_empty() {
            notes.push(format!(
                "catalog tcodes with multiple entries were fanned out: {}",
                duplicates.join(", ")
            ));
        }

        tracing::info!(
            users = assessments.len(),
            joined_rows = joined.len(),
            unmatched_rows = unmatched_activity_rows,
            "population report generated"
        );
        PopulationReport {
            schema_version: REPORT_SCHEMA_VERSION.to_owned(),
            summary: ReportSummary {
                total_users: count_u32(assessments.len()),
                activity_rows: count_u32(self.activity.len()),
                joined_rows: count_u32(joined.len()),
                unmatched_activity_rows: count_u32(unmatched_activity_rows),
                catalog_entries: count_u32(self.catalog.len()),
            },
            assessments,
            recommended_distribution,
            status_distribution,
            notes,
        }
    }

    fn group<'a>(&self, joined: &[JoinedRecord<'a>]) -> BTreeMap<GroupKey, Vec<JoinedRecord<'a>>> {
        let mut groups = BTreeMap::<GroupKey, Vec<JoinedRecord<'a>>>::new();
        for record in joined {
            groups
                .entry(self.group_key(record.activity))
                .or_default()
                .push(*record);
        }
        groups
    }

    fn group_key(&self, record: &ActivityRecord) -> GroupKey {
        match (self.grouping, record.user_id.as_deref()) {
            (UserGrouping::UserId, Some(user_id)) => GroupKey::primary(user_id),
            (UserGrouping::UserId, None) => GroupKey {
                value: record.user_name.clone(),
                name_fallback: true,
            },
            (UserGrouping::UserName, _) => GroupKey::primary(&record.user_name),
        }
    }

    fn lookup_candidates(&self, key: &str) -> Vec<GroupKey> {
        if self.grouping == UserGrouping::UserName {
            return vec![GroupKey::primary(key)];
        }
        if let Some(name) = key.strip_prefix(NAME_KEY_PREFIX) {
            return vec![GroupKey {
                value: name.trim().to_owned(),
                name_fallback: true,
            }];
        }
        vec![
            GroupKey::primary(key),
            GroupKey {
                value: key.to_owned(),
                name_fallback: true,
            },
        ]
    }

    fn assess(&self, records: &[JoinedRecord<'_>]) -> UserAssessment {
        let (current, recommended) = recommend(records);
        let status = classify(current.label(), recommended.label(), self.sentinel_policy);
        UserAssessment {
            user_name: records
                .first()
                .map(|record| record.activity.user_name.clone())
                .unwrap_or_default(),
            user_id: first_user_id(records),
            current_license: current,
            recommended_license: recommended,
            status,
        }
    }
}

/// Orders by value, then ids before name fallbacks. Ids and fallback names never share a group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct GroupKey {
    value: String,
    name_fallback: bool,
}

impl GroupKey {
    fn primary(value: &str) -> Self {
        Self {
            value: value.to_owned(),
            name_fallback: false,
        }
    }

    fn label(&self) -> String {
        if self.name_fallback {
            format!("{NAME_KEY_PREFIX}{}", self.value)
        } else {
            self.value.clone()
        }
    }
}

/// Unmatched joined rows map one-to-one onto activity rows.
fn unmatched_note(records: &[JoinedRecord<'_>]) -> Option<String> {
    let unmatched = records
        .iter()
        .filter(|record| !record.is_matched())
        .collect::<Vec<_>>();
    if unmatched.is_empty() {
        return None;
    }

    let codes = unmatched
        .iter()
        .map(|record| record.activity.activity_code.as_str())
        .collect::<BTreeSet<_>>();
    let sample = codes
        .iter()
        .take(UNMATCHED_CODES_IN_NOTE)
        .copied()
        .collect::<Vec<_>>()
        .join(", ");
    let more = codes.len().saturating_sub(UNMATCHED_CODES_IN_NOTE);
    let suffix = if more > 0 {
        format!(" and {more} more")
    } else {
        String::new()
    };
    Some(format!(
        "{} activity rows had no catalog match (tcodes: {sample}{suffix})",
        unmatched.len()
    ))
}

fn count_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

fn first_user_id(records: &[JoinedRecord<'_>]) -> Option<String> {
    records
        .iter()
        .find_map(|record| record.activity.user_id.clone())
}

/// Counts labels, ordered by count descending then label ascending.
fn distribution<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<DistributionEntry> {
    let mut counts = BTreeMap::<&str, u32>::new();
    for label in labels {
        let count = counts.entry(label).or_insert(0);
        *count = count.saturating_add(1);
    }

    let mut entries = counts
        .into_iter()
        .map(|(label, count)| DistributionEntry {
            label: label.to_owned(),
            count,
        })
        .collect::<Vec<_>>();
    entries.sort_by(|left, right| {
        right
            .count
            .cmp(&left.count)
            .then_with(|| left.label.cmp(&right.label))
    });
    entries
}
