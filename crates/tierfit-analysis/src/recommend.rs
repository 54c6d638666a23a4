use std::collections::HashSet;

use tierfit_core::{LicenseAssignment, Recommendation, highest, normalize_label};

use crate::join::JoinedRecord;

/// Current license and recommended tier for one user's joined rows.
pub fn recommend(records: &[JoinedRecord<'_>]) -> (LicenseAssignment, Recommendation) {
    let recommended = highest(records.iter().filter_map(JoinedRecord::license_type));
    (current_license(records), recommended)
}

/// Most frequent current-license label across the user's activity rows.
///
/// Each activity row counts once even when the catalog join fanned it out. Ties go to the
/// label that appears first in input order.
pub fn current_license(records: &[JoinedRecord<'_>]) -> LicenseAssignment {
    let mut seen_rows = HashSet::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for record in records {
        if !seen_rows.insert(record.row) {
            continue;
        }
        let Some(label) = normalize_label(record.activity.license.as_deref()) else {
            continue;
        };

        match counts.iter_mut().find(|(existing, _)| *existing == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((label, 1)),
        }
    }

    let mut best: Option<(String, usize)> = None;
    for (label, count) in counts {
        if best.as_ref().is_none_or(|(_, best_count)| count > *best_count) {
            best = Some((label, count));
        }
    }

    best.map(|(label, _)| LicenseAssignment::from_label(Some(label.as_str())))
        .unwrap_or(LicenseAssignment::NotAssigned)
}
