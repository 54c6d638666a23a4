use serde::{Deserialize, Serialize};

use crate::license::{LicenseAssignment, Recommendation};
use crate::normalize::{normalize_key, normalize_label, normalize_text};
use crate::status::Status;
use crate::tier::Tier;

/// One (user, activity code) usage fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub user_id: Option<String>,
    pub user_name: String,
    pub activity_code: String,
    pub license: Option<String>,
}

impl ActivityRecord {
    /// Normalizes raw cell values. Returns `None` when the user name or activity code is blank.
    pub fn from_raw(
        user_id: Option<&str>,
        user_name: Option<&str>,
        activity_code: Option<&str>,
        license: Option<&str>,
    ) -> Option<Self> {
        Some(Self {
            user_id: normalize_text(user_id),
            user_name: normalize_text(user_name)?,
            activity_code: normalize_key(activity_code)?,
            license: normalize_label(license),
        })
    }
}

/// One activity code in the license catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub activity_code: String,
    pub license_type: Option<String>,
    pub description: Option<String>,
}

impl CatalogEntry {
    /// Normalizes raw cell values. Returns `None` when the activity code is blank.
    pub fn from_raw(
        activity_code: Option<&str>,
        license_type: Option<&str>,
        description: Option<&str>,
    ) -> Option<Self> {
        Some(Self {
            activity_code: normalize_key(activity_code)?,
            license_type: normalize_label(license_type),
            description: normalize_text(description),
        })
    }

    pub fn tier(&self) -> Option<Tier> {
        self.license_type.as_deref().and_then(Tier::from_label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAssessment {
    pub user_name: String,
    pub user_id: Option<String>,
    pub current_license: LicenseAssignment,
    pub recommended_license: Recommendation,
    pub status: Status,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_record_normalizes_each_field_by_role() {
        let record = ActivityRecord::from_raw(
            Some(" U100 "),
            Some(" Alice Smith "),
            Some(" va01 "),
            Some("professional"),
        )
        .expect("valid record");

        assert_eq!(record.user_id.as_deref(), Some("U100"));
        assert_eq!(record.user_name, "Alice Smith");
        assert_eq!(record.activity_code, "VA01");
        assert_eq!(record.license.as_deref(), Some("Professional"));
    }

    #[test]
    fn activity_record_requires_user_name_and_code() {
        assert!(ActivityRecord::from_raw(None, Some("Alice"), Some(" "), None).is_none());
        assert!(ActivityRecord::from_raw(None, None, Some("VA01"), None).is_none());
    }

    #[test]
    fn catalog_entry_keeps_unrecognized_license_type_without_tier() {
        let entry = CatalogEntry::from_raw(Some("se16n"), Some("developer"), Some(" Data Browser "))
            .expect("valid entry");

        assert_eq!(entry.activity_code, "SE16N");
        assert_eq!(entry.license_type.as_deref(), Some("Developer"));
        assert_eq!(entry.description.as_deref(), Some("Data Browser"));
        assert_eq!(entry.tier(), None);

        let entry = CatalogEntry::from_raw(Some("VA01"), Some(" FUNCTIONAL"), None)
            .expect("valid entry");
        assert_eq!(entry.tier(), Some(Tier::Functional));
    }
}
