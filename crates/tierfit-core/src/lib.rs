mod license;
mod normalize;
mod records;
mod status;
mod tier;

pub use license::{LicenseAssignment, NO_DATA, NOT_ASSIGNED, Recommendation, is_sentinel_label};
pub use normalize::{normalize_header, normalize_key, normalize_label, normalize_text};
pub use records::{ActivityRecord, CatalogEntry, UserAssessment};
pub use status::{SentinelPolicy, Status, classify};
pub use tier::{Tier, UNRANKED, highest, rank_of};
